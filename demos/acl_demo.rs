//! 层级 ACL 引擎示例
//!
//! 展示如何从声明式配置构建引擎、检查授权并做运行期变更。
//!
//! 运行: cargo run --example acl_demo

use aclrs::{AclConfig, AclEngine, DefaultPolicy, SubjectRecord};

/// 演示基本的配置装载与授权检查
fn demo_basic_check() {
    println!("📚 配置装载与基本检查\n");

    let config = AclConfig::from_json(
        r#"{
            "roles": {
                "Role/author": null,
                "Role/editor": "Role/author",
                "Role/admin": "Role/editor",
                "User/jeff": "Role/author",
                "User/stan": "Role/editor"
            },
            "rules": {
                "allow": {
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
    .expect("demo config is valid");

    let engine = AclEngine::build(&config).expect("demo config builds");

    for subject in ["jeff", "stan", "Role/admin"] {
        println!("   主体: {}", subject);
        println!(
            "   - 浏览文章: {}",
            bool_emoji(engine.check(subject, "controllers/posts", Some("index")))
        );
        println!(
            "   - 发布文章: {}",
            bool_emoji(engine.check(subject, "controllers/posts", Some("publish")))
        );
        println!(
            "   - 管理用户: {}",
            bool_emoji(engine.check(subject, "controllers/users", Some("edit")))
        );
        println!();
    }
}

/// 演示结构化主体记录的解析
fn demo_record_subjects() {
    println!("🗂  结构化主体记录\n");

    let config = AclConfig::new()
        .role("Role/editor", "")
        .role("User/maria", "Role/editor")
        .allow("reports/*", "Role/editor");
    let engine = AclEngine::build(&config).expect("demo config builds");

    // 外键捷径：{model: Role, foreign_key: editor}
    let by_key = SubjectRecord::new()
        .with_model("Role")
        .with_foreign_key("editor");
    println!(
        "   Role 外键记录读取报表: {}",
        bool_emoji(engine.check(by_key, "reports/annual", None))
    );

    // 嵌套字段：User[username] = maria
    let nested = SubjectRecord::new().with_nested("User", "username", "maria");
    println!(
        "   User[username] 记录读取报表: {}",
        bool_emoji(engine.check(nested, "reports/annual", None))
    );

    // 解析不到的记录退化为默认角色
    let unknown = SubjectRecord::new().with_field("username", "nobody");
    println!(
        "   未知记录读取报表: {}",
        bool_emoji(engine.check(unknown, "reports/annual", None))
    );
    println!();
}

/// 演示默认策略与运行期变更
fn demo_policies_and_mutation() {
    println!("⚙️  默认策略与运行期变更\n");

    let config = AclConfig::new()
        .role("Role/admin", "")
        .role("Role/editor", "Role/admin")
        .allow("posts/*", "Role/admin")
        .deny("posts/*", "Role/editor");

    let mut engine =
        AclEngine::with_policy(&config, DefaultPolicy::Allow).expect("demo config builds");

    println!(
        "   admin 删除文章（显式允许）: {}",
        bool_emoji(engine.check("Role/admin", "posts/delete", None))
    );
    println!(
        "   editor 删除文章（显式拒绝）: {}",
        bool_emoji(engine.check("Role/editor", "posts/delete", None))
    );
    println!(
        "   editor 浏览页面（默认允许）: {}",
        bool_emoji(engine.check("Role/editor", "pages/view", None))
    );

    engine.deny("Role/editor", "pages", Some("view"));
    println!(
        "   editor 浏览页面（运行期拒绝后）: {}",
        bool_emoji(engine.check("Role/editor", "pages/view", None))
    );
    println!();
}

/// 演示循环继承的诊断
fn demo_cycle_diagnostics() {
    println!("🔁 循环继承诊断\n");

    let config = AclConfig::new()
        .role("Role/a", "Role/b")
        .role("Role/b", "Role/a")
        .allow("posts", "Role/a");

    let engine = AclEngine::build(&config).expect("cycles are not fatal");
    for diag in engine.aro().diagnostics() {
        println!(
            "   拒绝边 {} -> {}，路径: {}",
            diag.inherited, diag.role, diag.path
        );
    }
    println!();
}

fn bool_emoji(value: bool) -> &'static str {
    if value { "✅" } else { "❌" }
}

fn main() {
    println!("=== aclrs ACL 示例 ===\n");

    demo_basic_check();
    println!("{}\n", "=".repeat(50));

    demo_record_subjects();
    println!("{}\n", "=".repeat(50));

    demo_policies_and_mutation();
    println!("{}\n", "=".repeat(50));

    demo_cycle_diagnostics();

    println!("=== 示例结束 ===");
}
