//! # aclrs
//!
//! 一个配置驱动的层级 ACL（访问控制列表）引擎。
//!
//! ## 功能特性
//!
//! - **角色继承图 (ARO)**: 有向继承图、逐层祖先枚举、插入期循环检测
//! - **资源规则树 (ACO)**: 层级资源路径、`*` 通配段、逐层 allow/deny 收集
//! - **策略评估**: 默认策略 + 祖先层级 × 资源层级的双重嵌套折叠
//! - **主体解析**: 字符串/结构化记录到规范角色键的全函数解析与别名替换
//! - **声明式配置**: serde 反序列化的类型化载荷，装载期校验
//!
//! 引擎回答的问题是：**主体 X 能否对资源 Z 执行操作 Y**。
//! 两份结构从配置构建一次后只读查询；所有操作是无 I/O 的纯内存计算，
//! 不提供内部同步，并发变更由调用方串行化。
//!
//! ## 快速上手
//!
//! ```rust
//! use aclrs::{AclConfig, AclEngine};
//!
//! let config = AclConfig::from_json(r#"{
//!     "roles": {
//!         "Role/admin": null,
//!         "Role/editor": "Role/admin",
//!         "User/jeff": "Role/editor"
//!     },
//!     "rules": {
//!         "allow": { "controllers/posts": "Role/editor" },
//!         "deny":  { "controllers/posts/delete": "Role/editor" }
//!     }
//! }"#).unwrap();
//!
//! // 默认拒绝策略：没有显式 allow 的资源一律拒绝
//! let engine = AclEngine::build(&config).unwrap();
//!
//! assert!(engine.check("jeff", "controllers/posts", Some("index")));
//! assert!(!engine.check("jeff", "controllers/posts", Some("delete")));
//! assert!(!engine.check("jeff", "controllers/users", None));
//! ```
//!
//! ## 通配符与默认角色
//!
//! ```rust
//! use aclrs::{AclConfig, AclEngine};
//!
//! let config = AclConfig::new()
//!     .role("Role/default", "")
//!     .allow("posts/index", "Role/default");
//!
//! let engine = AclEngine::build(&config).unwrap();
//!
//! // 任何无法解析的主体都回退到 Role/default
//! assert!(engine.check("anonymous", "posts/index", None));
//! assert!(!engine.check("anonymous", "posts/delete", None));
//! ```
//!
//! ## 循环继承
//!
//! 会闭合循环的继承边不是致命错误：问题边被丢弃并记录诊断，
//! 配置装载继续进行，以便一次暴露全部循环问题。
//!
//! ```rust
//! use aclrs::{AclConfig, AclEngine};
//!
//! let config = AclConfig::new()
//!     .role("Role/a", "Role/b")
//!     .role("Role/b", "Role/a") // 闭合 a -> b -> a
//!     .allow("posts", "Role/a");
//!
//! let engine = AclEngine::build(&config).unwrap();
//! assert_eq!(engine.aro().diagnostics().len(), 1);
//! ```

pub mod aco;
pub mod aro;
pub mod config;
pub mod engine;
pub mod error;

// ============================================================================
// 引擎相关导出
// ============================================================================

pub use engine::{AclEngine, DefaultPolicy};

// ============================================================================
// 配置相关导出
// ============================================================================

pub use config::{AclConfig, RuleConfig, SubjectList};

// ============================================================================
// ARO / ACO 相关导出
// ============================================================================

pub use aco::{AcoLevel, AcoTree, RuleType, WILDCARD};
pub use aro::{AroGraph, CycleDiagnostic, Subject, SubjectRecord, DEFAULT_ROLE};

// ============================================================================
// 错误相关导出
// ============================================================================

pub use error::{ConfigError, Error, Result};
