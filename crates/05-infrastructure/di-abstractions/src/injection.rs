//! 注入点描述与参数传递

use crate::instance::{downcast_component, downcast_value, Value};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// 注入目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionTarget {
    /// 依赖另一个组件；有限定名时按 `(名称, 类型)` 查找，否则按类型查找
    Component {
        type_info: TypeInfo,
        qualifier: Option<String>,
    },
    /// 占位符表达式，解析后转换为目标类型
    Placeholder {
        expression: String,
        target: TypeInfo,
    },
}

/// 注入点
///
/// 构造函数参数、工厂方法参数或字段的描述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    /// 注入目标
    pub target: InjectionTarget,
    /// 是否必需
    pub required: bool,
}

impl InjectionPoint {
    /// 按类型依赖组件 `T`，`T` 可以是 `dyn Trait`
    pub fn component<T: ?Sized + 'static>() -> Self {
        Self {
            target: InjectionTarget::Component {
                type_info: TypeInfo::of::<T>(),
                qualifier: None,
            },
            required: true,
        }
    }

    /// 按名称依赖类型为 `T` 的组件
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::component::<T>().qualified(name)
    }

    /// 占位符值，解析后转换为 `V`
    pub fn value<V: Any>(expression: impl Into<String>) -> Self {
        Self {
            target: InjectionTarget::Placeholder {
                expression: expression.into(),
                target: TypeInfo::of::<V>(),
            },
            required: true,
        }
    }

    /// 设置限定名，仅对组件依赖有效
    pub fn qualified(mut self, name: impl Into<String>) -> Self {
        if let InjectionTarget::Component { qualifier, .. } = &mut self.target {
            *qualifier = Some(name.into());
        }
        self
    }

    /// 标记为非必需
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// 注入点的类型
    pub fn type_info(&self) -> TypeInfo {
        match &self.target {
            InjectionTarget::Component { type_info, .. } => *type_info,
            InjectionTarget::Placeholder { target, .. } => *target,
        }
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            InjectionTarget::Component {
                type_info,
                qualifier: Some(name),
            } => write!(f, "{name}: {}", type_info.short_name()),
            InjectionTarget::Component { type_info, .. } => f.write_str(type_info.short_name()),
            InjectionTarget::Placeholder { expression, target } => {
                write!(f, "{expression} -> {}", target.short_name())
            }
        }
    }
}

/// 已解析的参数列表
///
/// 按声明顺序依次取出，类型需与注入点声明一致。
pub struct Arguments {
    values: VecDeque<(InjectionPoint, Option<Value>)>,
    position: usize,
}

impl Arguments {
    /// 由注入点与解析结果创建参数列表
    pub fn new(values: Vec<(InjectionPoint, Option<Value>)>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// 空参数列表
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// 剩余参数数量
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// 取出必需的组件参数
    pub fn component<T: ?Sized + 'static>(&mut self) -> DependencyResult<Arc<T>> {
        let (point, value) = self.next()?;
        let value = value.ok_or_else(|| missing(&point))?;
        downcast_component::<T>(value, &point.to_string())
    }

    /// 取出非必需的组件参数
    pub fn optional_component<T: ?Sized + 'static>(&mut self) -> DependencyResult<Option<Arc<T>>> {
        let (point, value) = self.next()?;
        value
            .map(|value| downcast_component::<T>(value, &point.to_string()))
            .transpose()
    }

    /// 取出必需的值参数
    pub fn value<V: Any>(&mut self) -> DependencyResult<V> {
        let (point, value) = self.next()?;
        let value = value.ok_or_else(|| missing(&point))?;
        downcast_value::<V>(value, &point.to_string())
    }

    /// 取出非必需的值参数
    pub fn optional_value<V: Any>(&mut self) -> DependencyResult<Option<V>> {
        let (point, value) = self.next()?;
        value
            .map(|value| downcast_value::<V>(value, &point.to_string()))
            .transpose()
    }

    fn next(&mut self) -> DependencyResult<(InjectionPoint, Option<Value>)> {
        let position = self.position;
        self.position += 1;
        self.values
            .pop_front()
            .ok_or_else(|| DependencyError::InvalidArgument {
                message: format!("参数索引 {position} 超出声明的参数数量"),
            })
    }
}

fn missing(point: &InjectionPoint) -> DependencyError {
    DependencyError::InvalidArgument {
        message: format!("参数 {point} 未解析到值，应使用 optional 方法取出"),
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("position", &self.position)
            .field("remaining", &self.values.len())
            .finish()
    }
}
