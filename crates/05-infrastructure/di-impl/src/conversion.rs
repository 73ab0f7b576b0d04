//! 类型转换服务实现

use dashmap::DashMap;
use di_abstractions::{describe_value, ConversionService, TypeConverter, Value};
use infrastructure_common::{ConversionError, ConversionResult, TypeInfo};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

type CacheKey = (TypeId, TypeId);

/// 通用类型转换服务
///
/// 转换器按目标类型分组，组内按注册顺序尝试；
/// `(源类型, 目标类型)` 的查找结果会被缓存，任何注册或注销都会清空缓存。
#[derive(Default)]
pub struct GenericConversionService {
    converters: RwLock<HashMap<TypeId, Vec<Arc<dyn TypeConverter>>>>,
    cache: DashMap<CacheKey, Option<Arc<dyn TypeConverter>>>,
}

impl GenericConversionService {
    /// 创建空的转换服务
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建并注册所有基于 `FromStr` 的内置转换器
    pub fn with_defaults() -> Self {
        let service = Self::new();
        service.register_defaults();
        service
    }

    /// 注册内置转换器：布尔、字符、整数、浮点数与路径
    pub fn register_defaults(&self) {
        self.register(Arc::new(FromStrConverter::<bool>::new()));
        self.register(Arc::new(FromStrConverter::<char>::new()));
        self.register(Arc::new(FromStrConverter::<i8>::new()));
        self.register(Arc::new(FromStrConverter::<i16>::new()));
        self.register(Arc::new(FromStrConverter::<i32>::new()));
        self.register(Arc::new(FromStrConverter::<i64>::new()));
        self.register(Arc::new(FromStrConverter::<i128>::new()));
        self.register(Arc::new(FromStrConverter::<isize>::new()));
        self.register(Arc::new(FromStrConverter::<u8>::new()));
        self.register(Arc::new(FromStrConverter::<u16>::new()));
        self.register(Arc::new(FromStrConverter::<u32>::new()));
        self.register(Arc::new(FromStrConverter::<u64>::new()));
        self.register(Arc::new(FromStrConverter::<u128>::new()));
        self.register(Arc::new(FromStrConverter::<usize>::new()));
        self.register(Arc::new(FromStrConverter::<f32>::new()));
        self.register(Arc::new(FromStrConverter::<f64>::new()));
        self.register(Arc::new(FromStrConverter::<PathBuf>::new()));
    }

    /// 已注册的转换器数量
    pub fn converter_count(&self) -> usize {
        self.converters.read().values().map(Vec::len).sum()
    }

    /// 缓存的查找结果数量
    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }

    fn find_converter(&self, source: &TypeInfo, target: &TypeInfo) -> Option<Arc<dyn TypeConverter>> {
        let key = (source.id, target.id);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        // 持有读锁写入缓存，注册方在写锁下清空缓存，不会留下过期条目
        let converters = self.converters.read();
        let found = converters
            .get(&target.id)
            .and_then(|candidates| candidates.iter().find(|c| c.supports(source)).cloned());
        self.cache.insert(key, found.clone());
        found
    }
}

impl ConversionService for GenericConversionService {
    fn register(&self, converter: Arc<dyn TypeConverter>) {
        let target = converter.target_type();
        let mut converters = self.converters.write();
        converters.entry(target.id).or_default().push(converter);
        self.cache.clear();
        debug!("注册类型转换器: -> {}", target.short_name());
    }

    fn unregister(&self, converter: &Arc<dyn TypeConverter>) -> bool {
        let target = converter.target_type();
        let mut converters = self.converters.write();
        let Some(candidates) = converters.get_mut(&target.id) else {
            return false;
        };

        let before = candidates.len();
        candidates.retain(|c| !same_converter(c, converter));
        let removed = candidates.len() != before;
        if candidates.is_empty() {
            converters.remove(&target.id);
        }
        if removed {
            self.cache.clear();
            debug!("注销类型转换器: -> {}", target.short_name());
        }
        removed
    }

    fn supports(&self, source: &TypeInfo, target: &TypeInfo) -> bool {
        let source = canonical_type(source);
        source.id == target.id || self.find_converter(&source, target).is_some()
    }

    fn convert_value(
        &self,
        value: Value,
        source: TypeInfo,
        target: &TypeInfo,
    ) -> ConversionResult<Value> {
        if source.id == target.id {
            return Ok(value);
        }

        let (value, source) = normalize_string(value, source);
        if source.id == target.id {
            return Ok(value);
        }

        match self.find_converter(&source, target) {
            Some(converter) => converter.convert(&*value),
            None => Err(ConversionError::unsupported(
                describe_value(&*value, &source),
                target.short_name(),
            )),
        }
    }
}

impl std::fmt::Debug for GenericConversionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericConversionService")
            .field("converters", &self.converter_count())
            .field("cached_pairs", &self.cache.len())
            .finish()
    }
}

fn same_converter(a: &Arc<dyn TypeConverter>, b: &Arc<dyn TypeConverter>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// 字符串族的源类型统一归为 `String`
fn canonical_type(source: &TypeInfo) -> TypeInfo {
    if is_string_family(source) {
        TypeInfo::of::<String>()
    } else {
        *source
    }
}

fn is_string_family(source: &TypeInfo) -> bool {
    source.is::<&'static str>()
        || source.is::<Box<str>>()
        || source.is::<Arc<str>>()
        || source.is::<Cow<'static, str>>()
}

fn normalize_string(value: Value, source: TypeInfo) -> (Value, TypeInfo) {
    if !is_string_family(&source) {
        return (value, source);
    }

    let text = if let Some(s) = value.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = value.downcast_ref::<Box<str>>() {
        s.to_string()
    } else if let Some(s) = value.downcast_ref::<Arc<str>>() {
        s.to_string()
    } else if let Some(s) = value.downcast_ref::<Cow<'static, str>>() {
        s.to_string()
    } else {
        return (value, source);
    };
    (Box::new(text), TypeInfo::of::<String>())
}

/// 基于 `FromStr` 的字符串转换器，解析前去除首尾空白
pub struct FromStrConverter<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> FromStrConverter<T> {
    /// 创建转换器
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for FromStrConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeConverter for FromStrConverter<T>
where
    T: FromStr + Any + Send + Sync,
    T::Err: Display,
{
    fn target_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn supports(&self, source: &TypeInfo) -> bool {
        source.is::<String>()
    }

    fn convert(&self, value: &(dyn Any + Send + Sync)) -> ConversionResult<Value> {
        let target = TypeInfo::of::<T>();
        let text = value
            .downcast_ref::<String>()
            .ok_or_else(|| ConversionError::unsupported("<非字符串>", target.short_name()))?;
        text.trim()
            .parse::<T>()
            .map(|parsed| Box::new(parsed) as Value)
            .map_err(|e| ConversionError::failed(text.as_str(), target.short_name(), e.to_string()))
    }
}

/// JSON 字符串转换器，需显式注册
pub struct JsonConverter<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    /// 创建转换器
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeConverter for JsonConverter<T>
where
    T: DeserializeOwned + Any + Send + Sync,
{
    fn target_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn supports(&self, source: &TypeInfo) -> bool {
        source.is::<String>()
    }

    fn convert(&self, value: &(dyn Any + Send + Sync)) -> ConversionResult<Value> {
        let target = TypeInfo::of::<T>();
        let text = value
            .downcast_ref::<String>()
            .ok_or_else(|| ConversionError::unsupported("<非字符串>", target.short_name()))?;
        serde_json::from_str::<T>(text)
            .map(|parsed| Box::new(parsed) as Value)
            .map_err(|e| ConversionError::failed(text.as_str(), target.short_name(), e.to_string()))
    }
}
