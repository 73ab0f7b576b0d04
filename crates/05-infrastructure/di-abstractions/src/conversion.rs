//! 类型转换抽象接口

use crate::instance::Value;
use infrastructure_common::{ConversionError, ConversionResult, TypeInfo};
use std::any::Any;
use std::sync::Arc;

/// 类型转换器
///
/// 每个转换器只声明一个目标类型，由 [`supports`](TypeConverter::supports) 决定接受哪些源类型。
pub trait TypeConverter: Send + Sync {
    /// 目标类型
    fn target_type(&self) -> TypeInfo;

    /// 是否支持从指定源类型转换
    fn supports(&self, source: &TypeInfo) -> bool;

    /// 执行转换，返回装箱的目标类型值
    fn convert(&self, value: &(dyn Any + Send + Sync)) -> ConversionResult<Value>;
}

/// 类型转换服务
///
/// 以目标类型维护转换器列表，注册顺序即尝试顺序。
pub trait ConversionService: Send + Sync {
    /// 注册转换器
    fn register(&self, converter: Arc<dyn TypeConverter>);

    /// 注销转换器，按实例身份匹配
    fn unregister(&self, converter: &Arc<dyn TypeConverter>) -> bool;

    /// 是否支持从源类型转换为目标类型
    fn supports(&self, source: &TypeInfo, target: &TypeInfo) -> bool;

    /// 转换装箱的值，源类型与目标类型相同时原样返回
    fn convert_value(&self, value: Value, source: TypeInfo, target: &TypeInfo) -> ConversionResult<Value>;
}

/// 类型转换服务的泛型便捷方法
pub trait ConversionServiceExt {
    /// 将 `S` 转换为 `T`
    fn convert<S, T>(&self, value: S) -> ConversionResult<T>
    where
        S: Any + Send + Sync,
        T: Any;

    /// 是否支持从 `S` 转换为 `T`
    fn can_convert<S: ?Sized + 'static, T: ?Sized + 'static>(&self) -> bool;
}

impl<X: ConversionService + ?Sized> ConversionServiceExt for X {
    fn convert<S, T>(&self, value: S) -> ConversionResult<T>
    where
        S: Any + Send + Sync,
        T: Any,
    {
        let target = TypeInfo::of::<T>();
        let converted = self.convert_value(Box::new(value), TypeInfo::of::<S>(), &target)?;
        converted
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ConversionError::failed(
                TypeInfo::of::<S>().short_name(),
                target.short_name(),
                "转换器返回了错误的类型",
            ))
    }

    fn can_convert<S: ?Sized + 'static, T: ?Sized + 'static>(&self) -> bool {
        self.supports(&TypeInfo::of::<S>(), &TypeInfo::of::<T>())
    }
}

/// 转换错误信息中使用的值描述
pub fn describe_value(value: &(dyn Any + Send + Sync), source: &TypeInfo) -> String {
    if let Some(text) = value.downcast_ref::<String>() {
        return format!("{text:?}");
    }
    if let Some(text) = value.downcast_ref::<&'static str>() {
        return format!("{text:?}");
    }
    format!("<{}>", source.short_name())
}
