//! 元数据定义
//!
//! 提供组件类型的元数据信息

use std::any::TypeId;
use std::fmt;

/// 类型信息
///
/// `name` 为不含模块路径的简短名称，`module_path` 为完整的类型路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称
    pub name: &'static str,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径
    pub module_path: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait` 这类非固定大小类型
    pub fn of<T: ?Sized + 'static>() -> Self {
        let module_path = std::any::type_name::<T>();
        Self {
            name: short_type_name(module_path),
            id: TypeId::of::<T>(),
            module_path,
        }
    }

    /// 判断是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        self.name
    }

    /// 以 `.` 分隔的完整类型名，用于清单文件等文本场景
    pub fn dotted_name(&self) -> String {
        dotted_type_name(self.module_path)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_path)
    }
}

/// 将 `a::b::C` 形式的类型路径转为 `a.b.C`
pub fn dotted_type_name(path: &str) -> String {
    path.trim().replace("::", ".")
}

fn short_type_name(full: &'static str) -> &'static str {
    let full = full.strip_prefix("dyn ").unwrap_or(full);
    // 泛型参数中也可能出现 `::`，只看尖括号之前的部分
    let head_end = full.find('<').unwrap_or(full.len());
    let start = full[..head_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}
