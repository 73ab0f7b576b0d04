//! 占位符解析
//!
//! 支持 `${key}` 与 `${key:default}` 两种形式，一段文本中可以包含多个占位符。

use infrastructure_common::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// `${key}` 或 `${key:default}`
///
/// 模式为常量，能否编译由 `test_pattern_compiles` 保证，运行时不会失败。
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]*)(?::([^}]*))?\}").expect("占位符正则表达式无效")
});

/// 文本中的一个占位符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// 占位符原文，例如 `${server.port:8080}`
    pub text: &'a str,
    /// 配置键
    pub key: &'a str,
    /// 默认值
    pub default: Option<&'a str>,
}

/// 查找文本中的全部占位符
pub fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
    PLACEHOLDER_PATTERN
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let key = captures.get(1)?.as_str().trim();
            Some(Placeholder {
                text: whole.as_str(),
                key,
                default: captures.get(2).map(|m| m.as_str()),
            })
        })
        .collect()
}

/// 文本中是否包含占位符
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_PATTERN.is_match(text)
}

/// 替换文本中的占位符
///
/// 配置键不存在且没有默认值时：`required` 为真返回 [`ConfigError::PlaceholderUnresolved`]，
/// 否则替换为空字符串。
pub fn replace_placeholders<F>(text: &str, mut lookup: F, required: bool) -> ConfigResult<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for captures in PLACEHOLDER_PATTERN.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let key = captures.get(1).map_or("", |m| m.as_str().trim());
        result.push_str(&text[last..whole.start()]);

        let value = lookup(key).or_else(|| captures.get(2).map(|m| m.as_str().to_string()));
        match value {
            Some(value) => result.push_str(&value),
            None if required => {
                return Err(ConfigError::PlaceholderUnresolved {
                    placeholder: whole.as_str().to_string(),
                    key: key.to_string(),
                });
            }
            None => {}
        }
        last = whole.end();
    }

    result.push_str(&text[last..]);
    Ok(result)
}
