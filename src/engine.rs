//! ACL 引擎模块
//!
//! 把默认策略、ARO 继承图与 ACO 资源树组合为最终的授权决策，
//! 对外提供 `check` / `allow` / `deny` / `inherit` 查询面。
//!
//! ## 决策算法
//!
//! 1. 以默认策略作为初始决策
//! 2. 枚举主体的祖先层级（由最泛化到最具体）
//! 3. 提供 action 时把它拼接到资源路径（已含 `.` 用点连接，否则用 `/`）
//! 4. 收集资源路径上每个深度的 allow/deny 集合；为空则直接返回默认策略
//! 5. 对每个资源层（外层，根到叶）与每个祖先层（内层，泛化到具体）：
//!    allow 集合以 OR 语义并入决策，deny 集合以 AND 语义并入决策
//!
//! allow/deny 的语义不对称是刻意保留的兼容行为：两个条件按序施加在同一个
//! 累积决策变量上，并在每个（资源层 × 角色层）组合上重复评估——
//! 浅层的拒绝可能被循环中更靠后的允许重新打开。不要"修正"这个折叠。
//!
//! ## 使用示例
//!
//! ```rust
//! use aclrs::{AclConfig, AclEngine, DefaultPolicy};
//!
//! let config = AclConfig::new()
//!     .role("Role/admin", "")
//!     .role("Role/editor", "Role/admin")
//!     .allow("posts/*", "Role/admin")
//!     .deny("posts/*", "Role/editor");
//!
//! let engine = AclEngine::with_policy(&config, DefaultPolicy::Allow).unwrap();
//!
//! assert!(engine.check("Role/admin", "posts/delete", None));
//! assert!(!engine.check("Role/editor", "posts/delete", None));
//! ```

use crate::aco::{AcoTree, RuleType};
use crate::aro::{AroGraph, Subject};
use crate::config::AclConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 默认策略
///
/// 无具体规则命中时的回退决策。Deny 策略需要显式 allow 规则，
/// Allow 策略需要显式 deny 规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefaultPolicy {
    /// 默认允许
    Allow,
    /// 默认拒绝
    #[default]
    Deny,
}

impl DefaultPolicy {
    fn as_bool(self) -> bool {
        matches!(self, DefaultPolicy::Allow)
    }
}

/// ACL 引擎
///
/// 持有一份 ARO 图与一份 ACO 树，查询期间只读；
/// 增量变更（`allow` / `deny` / [`AclEngine::aro_mut`]）由调用方自行串行化，
/// 引擎内部不做同步。
#[derive(Debug)]
pub struct AclEngine {
    policy: DefaultPolicy,
    aro: AroGraph,
    aco: AcoTree,
}

impl AclEngine {
    /// 从配置构建引擎，使用默认的拒绝策略
    pub fn build(config: &AclConfig) -> Result<Self> {
        Self::with_policy(config, DefaultPolicy::default())
    }

    /// 从配置构建引擎并指定默认策略
    ///
    /// 配置校验失败（缺少 `roles`，或 allow/deny 规则段均为空）时
    /// 中止构建并返回配置错误。循环继承不是致命错误：
    /// 问题边被丢弃并记入 [`AroGraph::diagnostics`]，构建继续。
    pub fn with_policy(config: &AclConfig, policy: DefaultPolicy) -> Result<Self> {
        config.validate()?;

        let mut aro = AroGraph::new();
        aro.set_map(&config.map);
        // 别名先于角色注册：继承边的循环检测要经过别名解析
        for (from, to) in &config.alias {
            aro.add_alias(from.clone(), to.clone());
        }
        for (role, inherits) in &config.roles {
            aro.add_role(role.clone(), inherits.to_vec());
        }

        let mut aco = AcoTree::new();
        for (path, subjects) in &config.rules.allow {
            aco.access(subjects.to_vec(), path, RuleType::Allow);
        }
        for (path, subjects) in &config.rules.deny {
            aco.access(subjects.to_vec(), path, RuleType::Deny);
        }

        Ok(Self { policy, aro, aco })
    }

    /// 主授权检查：主体能否对资源执行操作
    ///
    /// 评估不会出错：无法解析的主体退化为默认角色，
    /// 不存在的资源路径返回默认策略。
    pub fn check(&self, aro: impl Into<Subject>, aco: &str, action: Option<&str>) -> bool {
        let mut allow = self.policy.as_bool();
        let prioritized = self.aro.roles(&aro.into());
        let aco = append_action(aco, action);

        let path = self.aco.path(&aco);
        if path.is_empty() {
            return allow;
        }

        for node in &path {
            for aros in &prioritized {
                if !node.allow.is_empty() {
                    allow = allow || aros.iter().any(|role| node.allow.contains(role));
                }

                if !node.deny.is_empty() {
                    allow = allow && !aros.iter().any(|role| node.deny.contains(role));
                }
            }
        }

        allow
    }

    /// 注册一条允许规则
    ///
    /// 主体先经 ARO 图解析（未知主体退化为默认角色），再挂到资源节点上。
    pub fn allow(&mut self, aro: impl Into<Subject>, aco: &str, action: Option<&str>) -> bool {
        let subject = self.aro.resolve(&aro.into());
        let aco = append_action(aco, action);
        self.aco.access([subject], &aco, RuleType::Allow);
        true
    }

    /// 注册一条拒绝规则
    pub fn deny(&mut self, aro: impl Into<Subject>, aco: &str, action: Option<&str>) -> bool {
        let subject = self.aro.resolve(&aro.into());
        let aco = append_action(aco, action);
        self.aco.access([subject], &aco, RuleType::Deny);
        true
    }

    /// 继承注册在配置驱动的实现中不受支持，恒定报告失败。
    /// 仅为与其他后备存储的接口兼容而保留。
    pub fn inherit(&mut self, _aro: impl Into<Subject>, _aco: &str, _action: Option<&str>) -> bool {
        false
    }

    /// 获取默认策略
    pub fn policy(&self) -> DefaultPolicy {
        self.policy
    }

    /// 获取 ARO 图
    pub fn aro(&self) -> &AroGraph {
        &self.aro
    }

    /// 获取可变 ARO 图（增量添加角色/别名）
    pub fn aro_mut(&mut self) -> &mut AroGraph {
        &mut self.aro
    }

    /// 获取 ACO 树
    pub fn aco(&self) -> &AcoTree {
        &self.aco
    }
}

/// 把 action 拼接到资源路径：路径已用点记法时以点连接，否则以斜杠连接
fn append_action(aco: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => {
            let separator = if aco.contains('.') { '.' } else { '/' };
            format!("{}{}{}", aco, separator, action)
        }
        None => aco.to_string(),
    }
}
