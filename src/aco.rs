//! ACO (Access Control Object) 树模块
//!
//! 提供层级资源命名空间上的 allow/deny 规则存储与查询，包括：
//!
//! - **路径规范化**: 把资源引用解析为小写的斜杠分段序列
//! - **规则注册**: 沿路径逐段建节点，在末端节点合并主体集合
//! - **路径收集**: 从根到请求节点逐层收集所有匹配节点的 allow/deny 集合，
//!   节点键支持 `*` 通配段
//!
//! ## 使用示例
//!
//! ```rust
//! use aclrs::aco::{AcoTree, RuleType};
//!
//! let mut tree = AcoTree::new();
//! tree.access(["Role/admin"], "controllers/posts/*", RuleType::Allow);
//!
//! let levels = tree.path("controllers/posts/delete");
//! assert_eq!(levels.len(), 3);
//! assert!(levels[2].allow.contains("Role/admin"));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 通配符常量，匹配段内任意字符序列
pub const WILDCARD: &str = "*";

/// 规则类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleType {
    /// 允许规则
    Allow,
    /// 拒绝规则
    Deny,
}

/// 资源节点
///
/// 以路径段为键挂在父节点的 `children` 下；`allow`/`deny` 为去重集合，
/// 重复注册天然幂等。键含 `*` 时在建节点处一次性编译为锚定正则。
#[derive(Debug, Default)]
pub struct AcoNode {
    allow: HashSet<String>,
    deny: HashSet<String>,
    children: HashMap<String, AcoNode>,
    pattern: Option<Regex>,
}

impl AcoNode {
    fn new(key: &str) -> Self {
        Self {
            pattern: compile_wildcard(key),
            ..Self::default()
        }
    }

    /// 节点键是否匹配请求的路径段（字面相等或通配正则命中）
    fn matches(&self, key: &str, segment: &str) -> bool {
        key == segment
            || self
                .pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(segment))
    }
}

/// 某一路径深度上累积的规则集合
///
/// 同一深度的多个匹配节点（字面段与通配段兄弟）合并进同一个累加器。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcoLevel {
    /// 该深度累积的允许主体集合
    pub allow: HashSet<String>,
    /// 该深度累积的拒绝主体集合
    pub deny: HashSet<String>,
}

impl AcoLevel {
    /// 检查该层是否没有任何规则
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

/// ACO 资源树
///
/// 结构构建一次后只读查询；增量注册（[`AcoTree::access`]）由调用方自行串行化。
#[derive(Debug, Default)]
pub struct AcoTree {
    root: HashMap<String, AcoNode>,
}

impl AcoTree {
    /// 创建空树
    pub fn new() -> Self {
        Self::default()
    }

    /// 将资源引用解析为规范路径段序列
    ///
    /// 小写化、去掉前导 `/`、按 `/` 切分并修剪每段。
    /// 空字符串产生单个空段；解析不设长度上限、不会出错。
    pub fn resolve(aco: &str) -> Vec<String> {
        aco.to_lowercase()
            .trim_start_matches('/')
            .split('/')
            .map(|segment| segment.trim().to_string())
            .collect()
    }

    /// 将已分段的资源引用规范化（逐段小写）
    pub fn resolve_segments<I, S>(segments: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments
            .into_iter()
            .map(|segment| segment.as_ref().to_lowercase())
            .collect()
    }

    /// 注册 allow/deny 规则
    ///
    /// 沿解析后的路径逐段走树，缺失的中间节点即时创建；
    /// 在末端节点把主体集合合并（而非替换）进对应规则集，重复注册是累加的。
    pub fn access<I, S>(&mut self, aros: I, aco: &str, rule: RuleType)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = Self::resolve(aco);
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut tree = &mut self.root;
        for segment in parents {
            tree = &mut tree
                .entry(segment.clone())
                .or_insert_with(|| AcoNode::new(segment))
                .children;
        }

        let node = tree
            .entry(last.clone())
            .or_insert_with(|| AcoNode::new(last));
        let set = match rule {
            RuleType::Allow => &mut node.allow,
            RuleType::Deny => &mut node.deny,
        };
        set.extend(aros.into_iter().map(Into::into));
    }

    /// 收集从根到请求节点沿途每个深度的 allow/deny 规则集合
    ///
    /// 深度 `d` 上，当前活动节点集的每个直接子节点只要键与 `path[d]`
    /// 字面相等或按通配正则命中，其 allow/deny 就并入第 `d` 层累加器；
    /// 命中节点有子节点且请求路径在 `d + 1` 还有段时继续下行。
    /// 返回按路径顺序（根在前）排列的层列表；深度 0 无任何命中时返回空列表，
    /// 表示"无具体规则，回退默认策略"。
    pub fn path(&self, aco: &str) -> Vec<AcoLevel> {
        let aco = Self::resolve(aco);
        let mut path: Vec<AcoLevel> = Vec::new();
        let mut stack: Vec<(&HashMap<String, AcoNode>, usize)> = vec![(&self.root, 0)];

        while let Some((nodes, level)) = stack.pop() {
            let Some(segment) = aco.get(level) else {
                continue;
            };

            for (key, node) in nodes {
                if !node.matches(key, segment) {
                    continue;
                }

                if path.len() <= level {
                    path.resize_with(level + 1, AcoLevel::default);
                }
                path[level].allow.extend(node.allow.iter().cloned());
                path[level].deny.extend(node.deny.iter().cloned());

                if !node.children.is_empty() && level + 1 < aco.len() {
                    stack.push((&node.children, level + 1));
                }
            }
        }

        path
    }
}

/// 把含 `*` 的节点键翻译为两端锚定的正则，`*` 匹配任意字符序列。
/// 字面片段经过转义，键中的其他正则元字符不生效。
fn compile_wildcard(key: &str) -> Option<Regex> {
    if !key.contains(WILDCARD) {
        return None;
    }
    let pattern = key
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", pattern)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_normalization() {
        assert_eq!(AcoTree::resolve("Posts/Index"), vec!["posts", "index"]);
        assert_eq!(AcoTree::resolve("/posts/index"), vec!["posts", "index"]);
        assert_eq!(
            AcoTree::resolve("posts / index"),
            vec!["posts", "index"]
        );
        assert_eq!(AcoTree::resolve(""), vec![""]);
    }

    #[test]
    fn test_resolve_segments() {
        assert_eq!(
            AcoTree::resolve_segments(["Posts", "Index"]),
            vec!["posts", "index"]
        );
    }

    #[test]
    fn test_dot_notation_is_a_single_segment() {
        // 点号不是路径分隔符：点路径整体构成一个段
        assert_eq!(
            AcoTree::resolve("controllers.posts.index"),
            vec!["controllers.posts.index"]
        );
    }

    #[test]
    fn test_access_and_path_literal() {
        let mut tree = AcoTree::new();
        tree.access(["Role/editor"], "posts/index", RuleType::Allow);

        let levels = tree.path("posts/index");
        assert_eq!(levels.len(), 2);
        assert!(levels[0].is_empty());
        assert!(levels[1].allow.contains("Role/editor"));
        assert!(levels[1].deny.is_empty());
    }

    #[test]
    fn test_access_merges_instead_of_replacing() {
        let mut tree = AcoTree::new();
        tree.access(["Role/editor"], "posts", RuleType::Allow);
        tree.access(["Role/author"], "posts", RuleType::Allow);
        tree.access(["Role/banned"], "posts", RuleType::Deny);

        let levels = tree.path("posts");
        assert!(levels[0].allow.contains("Role/editor"));
        assert!(levels[0].allow.contains("Role/author"));
        assert!(levels[0].deny.contains("Role/banned"));
    }

    #[test]
    fn test_access_is_idempotent() {
        let mut tree = AcoTree::new();
        tree.access(["Role/editor"], "posts/index", RuleType::Allow);
        tree.access(["Role/editor"], "posts/index", RuleType::Allow);

        let levels = tree.path("posts/index");
        assert_eq!(levels[1].allow.len(), 1);
    }

    #[test]
    fn test_path_no_match_at_root_is_empty() {
        let mut tree = AcoTree::new();
        tree.access(["Role/editor"], "posts/index", RuleType::Allow);

        assert!(tree.path("users/index").is_empty());
    }

    #[test]
    fn test_wildcard_matches_any_segment() {
        let mut tree = AcoTree::new();
        tree.access(["Role/admin"], "posts/*", RuleType::Allow);

        for action in ["index", "add", "delete", "anything-at-all"] {
            let levels = tree.path(&format!("posts/{}", action));
            assert!(
                levels[1].allow.contains("Role/admin"),
                "wildcard should match segment {:?}",
                action
            );
        }
    }

    #[test]
    fn test_wildcard_merges_with_exact_sibling() {
        let mut tree = AcoTree::new();
        tree.access(["Role/admin"], "posts/*", RuleType::Allow);
        tree.access(["Role/editor"], "posts/index", RuleType::Allow);

        // 精确段与通配段在同一深度合并
        let levels = tree.path("posts/index");
        assert!(levels[1].allow.contains("Role/admin"));
        assert!(levels[1].allow.contains("Role/editor"));

        // 无精确兄弟的段只由通配段命中
        let levels = tree.path("posts/delete");
        assert!(levels[1].allow.contains("Role/admin"));
        assert!(!levels[1].allow.contains("Role/editor"));
    }

    #[test]
    fn test_partial_wildcard_segment() {
        let mut tree = AcoTree::new();
        tree.access(["Role/reporter"], "reports/annual_*", RuleType::Allow);

        let levels = tree.path("reports/annual_2024");
        assert!(levels[1].allow.contains("Role/reporter"));

        let levels = tree.path("reports/monthly_2024");
        assert_eq!(levels.len(), 1);
        assert!(levels[0].is_empty());
    }

    #[test]
    fn test_wildcard_key_metacharacters_stay_literal() {
        let mut tree = AcoTree::new();
        tree.access(["Role/admin"], "files/report.v1*", RuleType::Allow);

        let levels = tree.path("files/report.v1-final");
        assert!(levels[1].allow.contains("Role/admin"));

        // 键里的 '.' 是字面字符，不是正则通配
        let levels = tree.path("files/reportxv1-final");
        assert_eq!(levels.len(), 1);
    }

    #[test]
    fn test_path_stops_at_requested_depth() {
        let mut tree = AcoTree::new();
        tree.access(["Role/admin"], "a/b/c", RuleType::Allow);

        // 请求路径比规则路径短：不会下行越过请求长度
        let levels = tree.path("a/b");
        assert_eq!(levels.len(), 2);
        assert!(levels.iter().all(AcoLevel::is_empty));
    }

    #[test]
    fn test_wildcard_descends_into_children() {
        let mut tree = AcoTree::new();
        tree.access(["Role/admin"], "controllers/*/index", RuleType::Allow);

        let levels = tree.path("controllers/posts/index");
        assert_eq!(levels.len(), 3);
        assert!(levels[2].allow.contains("Role/admin"));
    }
}
