//! ARO (Access Request Object) 图模块
//!
//! 提供角色继承图的构建与查询功能，包括：
//!
//! - **主体解析**: 将字符串或结构化记录解析为规范角色键（如 `Role/admin`）
//! - **祖先枚举**: 按继承距离分层枚举一个角色的全部祖先
//! - **循环检测**: 每次插入继承边前重新计算祖先链，拒绝并记录会成环的边
//!
//! 继承边以 `父角色 -> 继承它的子角色集合` 的方向存储，
//! "子继承父的权限"。`Role/default` 是除它自身以外所有角色的最外层祖先。
//!
//! ## 使用示例
//!
//! ```rust
//! use aclrs::aro::{AroGraph, DEFAULT_ROLE};
//!
//! let mut graph = AroGraph::new();
//! graph.add_role("Role/admin", Vec::<String>::new());
//! graph.add_role("Role/editor", ["Role/admin"]);
//!
//! // 祖先层级：由最远（默认角色）到最近（查询角色自身）
//! let levels = graph.roles(&"Role/editor".into());
//! assert_eq!(levels[0], vec![DEFAULT_ROLE.to_string()]);
//! assert_eq!(levels[1], vec!["Role/admin".to_string()]);
//! assert_eq!(levels[2], vec!["Role/editor".to_string()]);
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 默认角色键
///
/// 提供的主体无法在图中解析时回退到的角色。
pub const DEFAULT_ROLE: &str = "Role/default";

/// 访问主体
///
/// 授权检查的发起方标识，可以是字符串（`"User/jeff"`、`"jeff"`），
/// 也可以是结构化记录（模型字段、外键等）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    /// 字符串标识（`"jeff"` 或 `"User/jeff"`）
    Ident(String),
    /// 结构化记录
    Record(SubjectRecord),
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject::Ident(s.to_string())
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Subject::Ident(s)
    }
}

impl From<SubjectRecord> for Subject {
    fn from(record: SubjectRecord) -> Self {
        Subject::Record(record)
    }
}

/// 结构化主体记录
///
/// 对应外部系统传入的记录形态，解析优先级为：
///
/// 1. `model` + `foreign_key` 直接命名分组（外键捷径）
/// 2. 嵌套字段 `model[field]`
/// 3. 扁平字段 `field`
///
/// ## 示例
///
/// ```rust
/// use aclrs::aro::SubjectRecord;
///
/// // 外键捷径：直接解析为 Role/editor
/// let record = SubjectRecord::new()
///     .with_model("Role")
///     .with_foreign_key("editor");
///
/// // 嵌套字段：按 map 配置解析（默认 User/username）
/// let record = SubjectRecord::new().with_nested("User", "username", "jeff");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// 记录所属模型
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 外键值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// 其余字段（扁平值或按模型嵌套的值）
    #[serde(flatten)]
    pub fields: HashMap<String, RecordValue>,
}

/// 记录字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// 扁平字段值
    Field(String),
    /// 按模型嵌套的字段集
    Nested(HashMap<String, String>),
}

impl SubjectRecord {
    /// 创建空记录
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置模型名
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 设置外键值
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// 添加扁平字段
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.into(), RecordValue::Field(value.into()));
        self
    }

    /// 添加嵌套字段（`model[field] = value`）
    pub fn with_nested(
        mut self,
        model: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let entry = self
            .fields
            .entry(model.into())
            .or_insert_with(|| RecordValue::Nested(HashMap::new()));
        if let RecordValue::Nested(nested) = entry {
            nested.insert(field.into(), value.into());
        }
        self
    }
}

/// 循环继承诊断
///
/// 插入继承边会导致循环时记录的诊断条目。被拒绝的边不会写入图中，
/// 配置装载继续进行，以便一次暴露全部循环问题。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleDiagnostic {
    /// 发起继承的角色
    pub role: String,
    /// 被继承的角色
    pub inherited: String,
    /// 检测到的循环路径（用于调试，形如 `Role/a -> Role/b -> Role/a`）
    pub path: String,
    /// 检测时间
    pub detected_at: DateTime<Utc>,
}

/// 主体分组映射项
///
/// 对应配置 `map` 段中的一条 `Group => "Model/field"` 映射。
#[derive(Debug, Clone)]
struct AroGroup {
    group: String,
    model: String,
    field: String,
}

/// ARO 继承图
///
/// 角色继承关系的内部表示：`tree` 以 `父 -> 继承它的子集合` 存边，
/// 祖先枚举因此是沿子引用反向扫描的逐层上行。
///
/// 图在每次插入边时重新计算父角色的祖先链做循环检测，
/// 插入是配置期操作而非查询热路径，保留这一 O(V) 代价。
#[derive(Debug)]
pub struct AroGraph {
    /// 分组映射，按声明顺序尝试，先命中者胜出
    groups: Vec<AroGroup>,
    /// 角色别名（如 `Role/1 -> Role/admin`），仅参与解析
    aliases: HashMap<String, String>,
    /// 继承边：父角色 -> 继承它的子角色集合
    tree: HashMap<String, HashSet<String>>,
    /// 已记录的循环诊断
    diagnostics: Vec<CycleDiagnostic>,
}

impl Default for AroGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AroGraph {
    /// 创建空图，使用默认分组映射
    /// （`User => User/username`，`Role => User/role`）
    pub fn new() -> Self {
        Self {
            groups: vec![
                AroGroup {
                    group: "User".to_string(),
                    model: "User".to_string(),
                    field: "username".to_string(),
                },
                AroGroup {
                    group: "Role".to_string(),
                    model: "User".to_string(),
                    field: "role".to_string(),
                },
            ],
            aliases: HashMap::new(),
            tree: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// 覆盖分组映射
    ///
    /// 空映射保留默认值；缺少 `/` 的映射项被跳过。
    /// 映射顺序即解析优先级。
    pub fn set_map(&mut self, map: &IndexMap<String, String>) {
        if map.is_empty() {
            return;
        }
        self.groups = map
            .iter()
            .filter_map(|(group, target)| {
                target.split_once('/').map(|(model, field)| AroGroup {
                    group: group.clone(),
                    model: model.to_string(),
                    field: field.to_string(),
                })
            })
            .collect();
    }

    /// 添加角色及其继承关系
    ///
    /// 对每个被继承的父角色，先重新计算该父角色的祖先链；
    /// 若子角色已出现在其中，该边会成环，被丢弃并记录诊断。
    /// 父角色不存在时按原始键创建节点，因此允许前向引用。
    pub fn add_role<I, S>(&mut self, role: impl Into<String>, inherits: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let role = role.into();
        self.tree.entry(role.clone()).or_default();

        for dependency in inherits {
            let dependency = dependency.into();
            if dependency.is_empty() {
                continue;
            }

            // 循环检测：父角色的祖先链中不得已经包含子角色
            let levels = self.roles(&Subject::Ident(dependency.clone()));
            if levels.iter().flatten().any(|r| r == &role) {
                let mut path = String::new();
                for level in &levels {
                    path.push_str(&level.join("|"));
                    path.push_str(" -> ");
                }
                path.push_str(&role);

                self.diagnostics.push(CycleDiagnostic {
                    role: role.clone(),
                    inherited: dependency,
                    path,
                    detected_at: Utc::now(),
                });
                continue;
            }

            self.tree
                .entry(dependency)
                .or_default()
                .insert(role.clone());
        }
    }

    /// 添加或覆盖别名（如 `Role/1 -> Role/admin`）
    pub fn add_alias(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.aliases.insert(from.into(), to.into());
    }

    /// 检查角色节点是否存在
    pub fn contains(&self, role: &str) -> bool {
        self.tree.contains_key(role)
    }

    /// 获取角色节点数量
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// 检查图是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// 获取已记录的循环诊断
    pub fn diagnostics(&self) -> &[CycleDiagnostic] {
        &self.diagnostics
    }

    /// 将主体标识解析为规范角色键
    ///
    /// 按声明顺序尝试每个分组映射，计算出的候选键若存在于图中则立即命中；
    /// 否则查询别名表。全部分组落空时回退到 [`DEFAULT_ROLE`]。
    /// 解析是全函数：任何输入都会产出一个角色键，不会出错。
    pub fn resolve(&self, subject: &Subject) -> String {
        for AroGroup {
            group,
            model,
            field,
        } in &self.groups
        {
            let mapped = match subject {
                Subject::Record(record) => Self::resolve_record(record, group, model, field),
                Subject::Ident(ident) => Self::resolve_ident(ident, group, model),
            };

            if let Some(mapped) = mapped {
                if self.tree.contains_key(&mapped) {
                    return mapped;
                }
                // 是否定义了匹配的别名（如 Role/1 => Role/admin）？
                if let Some(alias) = self.aliases.get(&mapped) {
                    return alias.clone();
                }
            }
        }

        DEFAULT_ROLE.to_string()
    }

    /// 结构化记录按 外键捷径 / 嵌套字段 / 扁平字段 的顺序匹配
    fn resolve_record(
        record: &SubjectRecord,
        group: &str,
        model: &str,
        field: &str,
    ) -> Option<String> {
        if record.model.as_deref() == Some(group) {
            if let Some(foreign_key) = &record.foreign_key {
                return Some(format!("{}/{}", group, foreign_key));
            }
        }

        if let Some(RecordValue::Nested(nested)) = record.fields.get(model) {
            if let Some(value) = nested.get(field) {
                return Some(format!("{}/{}", group, value));
            }
        }

        if let Some(RecordValue::Field(value)) = record.fields.get(field) {
            return Some(format!("{}/{}", group, value));
        }

        None
    }

    /// 字符串标识：不含分隔符时直接挂到当前分组；
    /// 含分隔符时校验模型名（规范化后须等于配置的模型名或分组名）
    fn resolve_ident(ident: &str, group: &str, model: &str) -> Option<String> {
        let ident = ident.trim_start_matches('/');

        if !ident.contains('/') {
            return Some(format!("{}/{}", group, ident));
        }

        let mut parts = ident.split('/');
        let aro_model = parts.next().unwrap_or("");
        let aro_value = parts.next().unwrap_or("");
        let aro_model = camelize(aro_model);

        if aro_model == model || aro_model == group {
            Some(format!("{}/{}", group, aro_value))
        } else {
            None
        }
    }

    /// 按继承距离分层枚举主体的全部祖先角色
    ///
    /// 从解析后的主体出发逐层上行：反复扫描把当前角色列入子集合的节点，
    /// 每个发现的节点按跳数归入对应层级，同距离的角色归入同一层。
    /// 除非主体就是默认角色，[`DEFAULT_ROLE`] 追加为最外层。
    /// 返回顺序由最远到最近（默认角色在前，查询主体在后）。
    pub fn roles(&self, subject: &Subject) -> Vec<Vec<String>> {
        let aro = self.resolve(subject);
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut stack: Vec<(String, usize)> = vec![(aro.clone(), 0)];

        while let Some((element, depth)) = stack.pop() {
            if levels.len() <= depth {
                levels.resize_with(depth + 1, Vec::new);
            }

            for (node, children) in &self.tree {
                if children.contains(&element) {
                    stack.push((node.clone(), depth + 1));
                }
            }

            levels[depth].push(element);
        }

        // 所有角色都继承自默认角色
        if aro != DEFAULT_ROLE {
            levels.push(vec![DEFAULT_ROLE.to_string()]);
        }

        levels.reverse();
        levels
    }
}

/// 规范化模型名：下划线/连字符分隔的每个单词首字母大写
fn camelize(word: &str) -> String {
    word.split(['_', '-'])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
