//! 属性源实现

use config_abstractions::PropertySource;
use infrastructure_common::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// 内存属性源
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    name: String,
    properties: BTreeMap<String, String>,
}

impl MapPropertySource {
    /// 创建新的内存属性源
    pub fn new<K, V>(name: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 从 JSON 值创建，嵌套对象展开为 `.` 分隔的键
    pub fn from_json(name: impl Into<String>, value: &Value) -> Self {
        let mut properties = BTreeMap::new();
        flatten_json("", value, &mut properties);
        Self {
            name: name.into(),
            properties,
        }
    }

    /// 设置属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn contains_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

/// TOML 属性源
#[derive(Debug, Clone)]
pub struct TomlPropertySource {
    inner: MapPropertySource,
}

impl TomlPropertySource {
    /// 从 TOML 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("加载 TOML 配置文件: {}", path.display());
        let content = read_config_file(path)?;
        Self::parse(format!("toml:{}", path.display()), &content)
    }

    /// 从 TOML 文本加载
    pub fn parse(name: impl Into<String>, content: &str) -> ConfigResult<Self> {
        let value: toml::Value = toml::from_str(content).map_err(ConfigError::parse_error)?;
        let json = toml_to_json(&value);
        let inner = MapPropertySource::from_json(name, &json);
        debug!("TOML 配置加载完成, 共 {} 个属性", inner.len());
        Ok(Self { inner })
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_property(&self, key: &str) -> Option<String> {
        self.inner.get_property(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.inner.property_names()
    }
}

/// JSON 属性源
#[derive(Debug, Clone)]
pub struct JsonPropertySource {
    inner: MapPropertySource,
}

impl JsonPropertySource {
    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("加载 JSON 配置文件: {}", path.display());
        let content = read_config_file(path)?;
        Self::parse(format!("json:{}", path.display()), &content)
    }

    /// 从 JSON 文本加载
    pub fn parse(name: impl Into<String>, content: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self {
            inner: MapPropertySource::from_json(name, &value),
        })
    }
}

impl PropertySource for JsonPropertySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_property(&self, key: &str) -> Option<String> {
        self.inner.get_property(key)
    }

    fn property_names(&self) -> Vec<String> {
        self.inner.property_names()
    }
}

/// 环境变量属性源
///
/// `APP_SERVER_PORT` 在前缀为 `APP` 时映射为 `server.port`。
#[derive(Debug, Clone)]
pub struct EnvironmentVariablePropertySource {
    name: String,
    prefix: String,
    separator: String,
    variables: HashMap<String, String>,
}

impl EnvironmentVariablePropertySource {
    /// 从当前进程的环境变量创建
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// 从给定的变量集合创建
    pub fn from_vars(
        prefix: impl Into<String>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self::with_separator(prefix, "_", vars)
    }

    /// 使用自定义分隔符创建
    pub fn with_separator(
        prefix: impl Into<String>,
        separator: impl Into<String>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let prefix = prefix.into();
        let separator = separator.into();
        let mut source = Self {
            name: format!("env:{prefix}"),
            prefix,
            separator,
            variables: HashMap::new(),
        };

        for (key, value) in vars {
            if key.starts_with(&source.prefix) {
                let config_key = source.env_key_to_config_key(&key);
                if !config_key.is_empty() {
                    source.variables.insert(config_key, value);
                }
            }
        }

        debug!("加载了 {} 个环境变量，前缀: {}", source.variables.len(), source.prefix);
        source
    }

    /// 环境变量前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 将环境变量键转换为配置键
    fn env_key_to_config_key(&self, env_key: &str) -> String {
        let key = env_key
            .strip_prefix(&self.prefix)
            .unwrap_or(env_key)
            .trim_start_matches(self.separator.as_str());

        key.replace(&self.separator, ".").to_lowercase()
    }
}

impl PropertySource for EnvironmentVariablePropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_property(&self, key: &str) -> Option<String> {
        self.variables.get(key).cloned()
    }

    fn property_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.keys().cloned().collect();
        names.sort();
        names
    }
}

fn read_config_file(path: &Path) -> ConfigResult<String> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// 将 TOML 值转换为 JSON 值
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number(serde_json::Number::from(*i)),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or_else(|| Value::String(f.to_string()), Value::Number),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(arr) => Value::Array(arr.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
    }
}

/// 展开嵌套对象；数组同时提供 `key[i]` 与逗号拼接的 `key`
fn flatten_json(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_json(&path, child, out);
            }
        }
        Value::Array(items) => {
            let mut scalars = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                flatten_json(&format!("{prefix}[{index}]"), item, out);
                if let Some(text) = scalar_text(item) {
                    scalars.push(text);
                }
            }
            if !prefix.is_empty() && scalars.len() == items.len() {
                out.insert(prefix.to_string(), scalars.join(","));
            }
        }
        Value::Null => {}
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.insert(prefix.to_string(), text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
