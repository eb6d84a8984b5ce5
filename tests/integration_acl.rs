//! 集成测试：配置驱动的层级 ACL 引擎
//!
//! 覆盖从 JSON 配置装载到授权决策的完整流程：角色继承、别名、
//! 通配资源、默认策略回退与循环诊断。

use aclrs::{
    AclConfig, AclEngine, ConfigError, DefaultPolicy, Error, SubjectRecord, DEFAULT_ROLE,
};

/// 博客场景的完整配置：作者 < 编辑 < 管理员，用户各自挂在角色下
fn blog_config() -> AclConfig {
    AclConfig::from_json(
        r#"{
            "roles": {
                "Role/author": null,
                "Role/editor": "Role/author",
                "Role/admin": "Role/editor",
                "Role/default": null,
                "User/jeff": "Role/author",
                "User/stan": "Role/editor",
                "User/hardy": "Role/admin"
            },
            "alias": {
                "Role/1": "Role/admin",
                "Role/4": "Role/author"
            },
            "rules": {
                "allow": {
                    "controllers/pages/display": "Role/default",
                    "controllers/posts": "Role/author",
                    "controllers/posts/publish": "Role/editor",
                    "controllers/users/*": "Role/admin"
                },
                "deny": {
                    "controllers/posts/publish": "Role/author"
                }
            }
        }"#,
    )
    .unwrap()
}

/// 测试装载校验：缺少 roles 或同时缺少 allow/deny 规则段都中止构建
#[test]
fn test_build_rejects_incomplete_config() {
    let no_roles = AclConfig::from_json(
        r#"{ "rules": { "allow": { "posts": "Role/admin" } } }"#,
    )
    .unwrap();
    assert!(matches!(
        AclEngine::build(&no_roles),
        Err(Error::Config(ConfigError::MissingRoles))
    ));

    let no_rules = AclConfig::from_json(r#"{ "roles": { "Role/admin": null } }"#).unwrap();
    assert!(matches!(
        AclEngine::build(&no_rules),
        Err(Error::Config(ConfigError::MissingRules))
    ));
}

/// 测试允许规则沿继承链向下生效
#[test]
fn test_allow_flows_to_inheriting_roles() {
    let engine = AclEngine::build(&blog_config()).unwrap();

    // 授予 Role/author 的权限对作者及继承它的编辑、管理员可见
    for subject in ["Role/author", "jeff", "Role/editor", "stan", "hardy"] {
        assert!(
            engine.check(subject, "controllers/posts", Some("index")),
            "{} should read posts",
            subject
        );
    }

    // 授予 Role/admin 的权限不向祖先方向泄露
    assert!(engine.check("hardy", "controllers/users", Some("edit")));
    assert!(!engine.check("stan", "controllers/users", Some("edit")));
    assert!(!engine.check("jeff", "controllers/users", Some("edit")));
}

/// 测试同一资源节点上 deny(author) + allow(editor) 的折叠结果
#[test]
fn test_deny_for_ancestor_reopened_for_descendant() {
    let engine = AclEngine::build(&blog_config()).unwrap();

    // 作者被显式拒绝发布
    assert!(!engine.check("jeff", "controllers/posts", Some("publish")));
    assert!(!engine.check("Role/author", "controllers/posts", Some("publish")));

    // 编辑在同一折叠中更靠后的祖先层命中允许，决策被重新打开
    assert!(engine.check("stan", "controllers/posts", Some("publish")));
    assert!(engine.check("hardy", "controllers/posts", Some("publish")));
}

/// 测试未知主体回退默认角色并拿到 Role/default 的授权
#[test]
fn test_unknown_subject_falls_back_to_default_role() {
    let engine = AclEngine::build(&blog_config()).unwrap();

    assert!(engine.check("anonymous", "controllers/pages", Some("display")));
    assert!(!engine.check("anonymous", "controllers/posts", Some("index")));
}

/// 测试数字别名解析到命名角色
#[test]
fn test_numeric_alias_resolution() {
    let engine = AclEngine::build(&blog_config()).unwrap();

    assert!(engine.check("Role/1", "controllers/users", Some("edit")));
    assert!(engine.check("Role/4", "controllers/posts", Some("index")));
    assert!(!engine.check("Role/4", "controllers/users", Some("edit")));
}

/// 测试结构化记录的三种匹配路径
#[test]
fn test_record_subjects_end_to_end() {
    let engine = AclEngine::build(&blog_config()).unwrap();

    // 外键捷径
    let by_key = SubjectRecord::new()
        .with_model("Role")
        .with_foreign_key("editor");
    assert!(engine.check(by_key, "controllers/posts", Some("publish")));

    // 嵌套字段 User[username]
    let nested = SubjectRecord::new().with_nested("User", "username", "hardy");
    assert!(engine.check(nested, "controllers/users/edit", None));

    // 扁平字段 username
    let flat = SubjectRecord::new().with_field("username", "jeff");
    assert!(engine.check(flat, "controllers/posts", Some("index")));
}

/// 规格场景：单一默认角色，显式允许之外全部回退默认拒绝
#[test]
fn test_single_default_role_scenario() {
    let config = AclConfig::from_json(
        r#"{
            "roles": { "Role/default": null },
            "rules": { "allow": { "posts/index": "Role/default" } }
        }"#,
    )
    .unwrap();
    let engine = AclEngine::build(&config).unwrap();

    assert!(engine.check(DEFAULT_ROLE, "posts/index", None));
    assert!(!engine.check(DEFAULT_ROLE, "posts/delete", None));
}

/// 规格场景：默认允许策略下，通配节点上 allow(admin) + deny(editor)
#[test]
fn test_wildcard_allow_admin_deny_editor() {
    let config = AclConfig::from_json(
        r#"{
            "roles": {
                "Role/admin": null,
                "Role/editor": "Role/admin"
            },
            "rules": {
                "allow": { "posts/*": "Role/admin" },
                "deny": { "posts/*": "Role/editor" }
            }
        }"#,
    )
    .unwrap();
    let engine = AclEngine::with_policy(&config, DefaultPolicy::Allow).unwrap();

    assert!(engine.check("Role/admin", "posts/delete", None));
    // editor 的拒绝在祖先层折叠的最后一步命中，翻转此前的允许
    assert!(!engine.check("Role/editor", "posts/delete", None));
    // 无规则路径返回默认策略（允许）
    assert!(engine.check("Role/editor", "pages/view", None));
}

/// 测试循环继承：构建继续、问题边被丢弃、诊断可查询
#[test]
fn test_cycle_diagnostics_on_load() {
    let config = AclConfig::from_json(
        r#"{
            "roles": {
                "Role/a": "Role/c",
                "Role/b": "Role/a",
                "Role/c": "Role/b"
            },
            "rules": { "allow": { "posts": "Role/a" } }
        }"#,
    )
    .unwrap();

    // 装载成功，最后一条闭环的边被拒绝
    let engine = AclEngine::build(&config).unwrap();
    let diagnostics = engine.aro().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].role, "Role/c");
    assert_eq!(diagnostics[0].inherited, "Role/b");
    assert!(diagnostics[0].path.ends_with("Role/c"));

    // 存活的链 c -> a -> b 仍然可用
    assert!(engine.check("Role/b", "posts", None));
}

/// 测试运行期变更：增量添加角色、别名与规则
#[test]
fn test_runtime_mutation() {
    let mut engine = AclEngine::build(&blog_config()).unwrap();

    // 新用户挂到编辑角色下
    engine.aro_mut().add_role("User/maria", ["Role/editor"]);
    assert!(engine.check("maria", "controllers/posts", Some("publish")));

    // 新别名立即参与解析
    engine.aro_mut().add_alias("Role/7", "Role/editor");
    assert!(engine.check("Role/7", "controllers/posts", Some("publish")));

    // 运行期拒绝覆盖配置期允许
    assert!(engine.deny("Role/editor", "controllers/posts", Some("publish")));
    assert!(!engine.check("maria", "controllers/posts", Some("publish")));
}

/// 测试 inherit 接口恒定失败
#[test]
fn test_inherit_is_unsupported() {
    let mut engine = AclEngine::build(&blog_config()).unwrap();
    assert!(!engine.inherit("Role/editor", "controllers/posts", None));
}

/// 测试重复注册的幂等性：同一规则注册两次不改变任何决策
#[test]
fn test_duplicate_registration_is_idempotent() {
    let mut once = AclEngine::build(&blog_config()).unwrap();
    let mut twice = AclEngine::build(&blog_config()).unwrap();
    twice.allow("Role/author", "controllers/posts", None);
    once.allow("Role/author", "controllers/posts", None);
    twice.allow("Role/author", "controllers/posts", None);

    for subject in ["jeff", "stan", "hardy", "anonymous"] {
        for action in ["index", "publish", "delete"] {
            assert_eq!(
                once.check(subject, "controllers/posts", Some(action)),
                twice.check(subject, "controllers/posts", Some(action)),
                "{}/{}",
                subject,
                action
            );
        }
    }
}
