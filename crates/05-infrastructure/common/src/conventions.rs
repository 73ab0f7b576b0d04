//! 约定规范定义
//!
//! 组件默认名称与配置清单资源名称的约定

use crate::metadata::TypeInfo;

/// 配置清单资源所在目录
pub const MANIFEST_DIRECTORY: &str = "components";

/// 配置清单资源扩展名
pub const MANIFEST_EXTENSION: &str = "imports";

/// 组件默认名称：简短类型名首字母小写
///
/// 前两个字符都是大写时保持原样，例如 `URLResolver`。
pub fn default_component_name(type_info: &TypeInfo) -> String {
    decapitalize(type_info.short_name())
}

/// 首字母小写
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => {
            let mut result: String = first.to_lowercase().collect();
            result.push_str(&name[first.len_utf8()..]);
            result
        }
        (None, _) => String::new(),
    }
}

/// 配置模块对应的清单资源名称：`components/{a.b.Module}.imports`
pub fn manifest_resource_name(module: &TypeInfo) -> String {
    format!(
        "{MANIFEST_DIRECTORY}/{}.{MANIFEST_EXTENSION}",
        module.dotted_name()
    )
}
