//! 声明式配置模块
//!
//! 提供 ACL 配置载荷的类型化结构与校验，对应的载荷形态为：
//!
//! ```json
//! {
//!   "roles": { "Role/admin": null, "Role/editor": "Role/admin" },
//!   "map":   { "User": "User/username", "Role": "User/role" },
//!   "alias": { "Role/1": "Role/admin" },
//!   "rules": {
//!     "allow": { "controllers/posts": "Role/editor, Role/admin" },
//!     "deny":  { "controllers/posts/delete": "Role/editor" }
//!   }
//! }
//! ```
//!
//! `roles` 与 `map` 的键顺序具有语义：`map` 的顺序是主体解析的分组优先级，
//! `roles` 的顺序决定继承边的插入（及循环检测）次序，因此二者使用保序映射。
//!
//! ## 使用示例
//!
//! ```rust
//! use aclrs::config::AclConfig;
//!
//! let config = AclConfig::from_json(r#"{
//!     "roles": { "Role/admin": null },
//!     "rules": { "allow": { "posts": "Role/admin" } }
//! }"#).unwrap();
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 主体清单
///
/// 规则值与角色继承值的三种书写形态：单个标识符、逗号分隔的标识符串、
/// 或标识符数组。统一规范化为修剪后的键列表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectList {
    /// 单个标识符或逗号分隔的标识符串
    One(String),
    /// 标识符数组
    Many(Vec<String>),
    /// 空（JSON null）
    None,
}

impl Default for SubjectList {
    fn default() -> Self {
        SubjectList::None
    }
}

impl SubjectList {
    /// 规范化为修剪后的键列表，空项被丢弃
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SubjectList::One(s) => s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            SubjectList::Many(list) => list
                .iter()
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            SubjectList::None => Vec::new(),
        }
    }

    /// 检查清单是否为空
    pub fn is_empty(&self) -> bool {
        self.to_vec().is_empty()
    }
}

impl From<&str> for SubjectList {
    fn from(s: &str) -> Self {
        SubjectList::One(s.to_string())
    }
}

impl From<String> for SubjectList {
    fn from(s: String) -> Self {
        SubjectList::One(s)
    }
}

impl From<Vec<String>> for SubjectList {
    fn from(list: Vec<String>) -> Self {
        SubjectList::Many(list)
    }
}

impl From<Vec<&str>> for SubjectList {
    fn from(list: Vec<&str>) -> Self {
        SubjectList::Many(list.into_iter().map(String::from).collect())
    }
}

/// 规则配置段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 资源路径 -> 允许的主体清单
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub allow: IndexMap<String, SubjectList>,
    /// 资源路径 -> 拒绝的主体清单
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deny: IndexMap<String, SubjectList>,
}

/// ACL 声明式配置
///
/// 可直接从 JSON 反序列化（见模块文档的载荷形态），
/// 也可通过流式 API 构造：
///
/// ```rust
/// use aclrs::config::AclConfig;
///
/// let config = AclConfig::new()
///     .role("Role/admin", "")
///     .role("Role/editor", "Role/admin")
///     .allow("posts/*", "Role/admin")
///     .deny("posts/delete", "Role/editor");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclConfig {
    /// 角色 -> 它继承的父角色清单
    #[serde(default)]
    pub roles: IndexMap<String, SubjectList>,
    /// 分组映射（`Group => "Model/field"`），顺序即解析优先级
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub map: IndexMap<String, String>,
    /// 角色别名（`Role/1 => Role/admin`）
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub alias: HashMap<String, String>,
    /// allow/deny 规则段
    #[serde(default)]
    pub rules: RuleConfig,
}

impl AclConfig {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本解析配置
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| ConfigError::Parse(err.to_string()).into())
    }

    /// 添加角色及其继承清单
    pub fn role(mut self, role: impl Into<String>, inherits: impl Into<SubjectList>) -> Self {
        self.roles.insert(role.into(), inherits.into());
        self
    }

    /// 添加分组映射项
    pub fn mapping(mut self, group: impl Into<String>, target: impl Into<String>) -> Self {
        self.map.insert(group.into(), target.into());
        self
    }

    /// 添加角色别名
    pub fn alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.alias.insert(from.into(), to.into());
        self
    }

    /// 添加允许规则
    pub fn allow(mut self, path: impl Into<String>, subjects: impl Into<SubjectList>) -> Self {
        self.rules.allow.insert(path.into(), subjects.into());
        self
    }

    /// 添加拒绝规则
    pub fn deny(mut self, path: impl Into<String>, subjects: impl Into<SubjectList>) -> Self {
        self.rules.deny.insert(path.into(), subjects.into());
        self
    }

    /// 校验配置
    ///
    /// `roles` 段为空，或 `allow` 与 `deny` 规则段同时为空，都是致命配置错误。
    pub fn validate(&self) -> Result<()> {
        if self.roles.is_empty() {
            return Err(ConfigError::MissingRoles.into());
        }
        if self.rules.allow.is_empty() && self.rules.deny.is_empty() {
            return Err(ConfigError::MissingRules.into());
        }
        Ok(())
    }
}
