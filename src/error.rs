//! 统一错误类型模块
//!
//! 提供 aclrs 库中所有操作的错误类型定义。
//!
//! 按照规则引擎的错误模型，只有配置装载可能失败；
//! 查询评估（`check`）永远不会返回错误。

use std::fmt;

/// aclrs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// aclrs 库的错误类型
#[derive(Debug)]
pub enum Error {
    /// 配置错误
    Config(ConfigError),

    /// 其他错误
    Other(String),
}

impl Error {
    /// 创建一个配置错误
    pub fn config(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// 配置相关错误
///
/// 配置错误是致命的：任何一种都会中止配置装载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少 `roles` 配置段
    MissingRoles,
    /// `allow` 与 `deny` 规则段均为空
    MissingRules,
    /// 配置文本解析失败
    Parse(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRoles => {
                write!(f, "\"roles\" section not found in configuration")
            }
            ConfigError::MissingRules => {
                write!(
                    f,
                    "neither \"allow\" nor \"deny\" rules were provided in configuration"
                )
            }
            ConfigError::Parse(msg) => write!(f, "configuration parse failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
