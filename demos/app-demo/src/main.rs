use std::sync::Arc;
use std::time::Duration;

use trellis_core::prelude::*;
use trellis_core::submit_lifecycle;

// ==================== 配置与业务 bean ====================

/// 数据库配置，由 initializer 从配置环境装配
#[derive(Debug, Clone)]
struct DatabaseConfig {
    host: String,
    port: i64,
    max_connections: i64,
}

/// 数据库服务，config 字段由遍历器注入
#[derive(Debug)]
struct DatabaseService {
    config: Option<Arc<DatabaseConfig>>,
}

impl DatabaseService {
    fn connect(&self) -> anyhow::Result<()> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| anyhow!("DatabaseService not wired"))?;
        println!("📊 Connecting to database: {}:{}", config.host, config.port);
        println!("   Max connections: {}", config.max_connections);
        Ok(())
    }

    fn query(&self, sql: &str) -> String {
        format!("Query result for: {}", sql)
    }
}

/// 服务器服务，db 字段由遍历器注入
#[derive(Debug)]
struct ServerService {
    name: String,
    db: Option<Arc<DatabaseService>>,
}

impl ServerService {
    fn start(&self) -> anyhow::Result<()> {
        println!("\n🚀 Starting server: {}", self.name);
        if self.db.is_none() {
            return Err(anyhow!("ServerService not wired"));
        }
        println!("✅ Server is running!");
        Ok(())
    }

    fn handle_request(&self, path: &str) -> anyhow::Result<()> {
        println!("\n🔧 Handling request: {}", path);
        let db = self.db.as_ref().ok_or_else(|| anyhow!("ServerService not wired"))?;
        println!("   Response: {}", db.query("SELECT * FROM users"));
        Ok(())
    }
}

// ==================== 字段遍历器 ====================

/// 手写的装配遍历器：上报依赖并在注入阶段完成装配
struct DemoWalker;

impl FieldWalker for DemoWalker {
    fn name(&self) -> &str {
        "demo-walker"
    }

    fn instantiate(
        &self,
        bean: &BeanHandle,
        _bean_name: &str,
        sink: &mut WiringSink,
    ) -> anyhow::Result<Option<BeanHandle>> {
        if bean.downcast_ref::<DatabaseService>().is_some() {
            sink.depends_on(
                canonical_type_of::<DatabaseService>(),
                canonical_type_of::<DatabaseConfig>(),
            );
        } else if bean.downcast_ref::<ServerService>().is_some() {
            sink.depends_on(
                canonical_type_of::<ServerService>(),
                canonical_type_of::<DatabaseService>(),
            );
        }
        Ok(None)
    }

    fn inject(
        &self,
        bean: &BeanHandle,
        _bean_name: &str,
        beans: &dyn BeanLookup,
    ) -> anyhow::Result<Option<BeanHandle>> {
        if bean.downcast_ref::<DatabaseService>().is_some() {
            let config = beans
                .get_bean(&canonical_type_of::<DatabaseConfig>())?
                .downcast::<DatabaseConfig>()
                .map_err(|_| anyhow!("DatabaseConfig bean has unexpected type"))?;
            return Ok(Some(Arc::new(DatabaseService {
                config: Some(config),
            })));
        }
        if let Some(server) = bean.downcast_ref::<ServerService>() {
            let db = beans
                .get_bean(&canonical_type_of::<DatabaseService>())?
                .downcast::<DatabaseService>()
                .map_err(|_| anyhow!("DatabaseService bean has unexpected type"))?;
            return Ok(Some(Arc::new(ServerService {
                name: server.name.clone(),
                db: Some(db),
            })));
        }
        Ok(None)
    }
}

// ==================== 生命周期参与者 ====================

/// 主参与者：贡献业务 bean，在 Main 阶段处理请求并要求销毁
struct ServerBoot;

impl Lifecycle for ServerBoot {
    fn name(&self) -> &str {
        "server-boot"
    }

    fn create(&self) -> Option<BeanConfig> {
        Some(
            BeanConfig::new()
                .single(DatabaseService { config: None })
                .single(ServerService {
                    name: "trellis-demo".to_string(),
                    db: None,
                }),
        )
    }

    fn after_initialization(&self, ctx: &AppContext) -> ContainerResult<()> {
        // 装配结果以容器里的存储值为准，依赖要从容器取最新实例
        let db = ctx.get_single::<DatabaseService>()?;
        db.connect()?;
        let server = ctx.get_single::<ServerService>()?;
        server.start()?;
        Ok(())
    }

    fn on_main(&self, ctx: &AppContext) -> ContainerResult<MainDirective> {
        let server = ctx.get_single::<ServerService>()?;
        server.handle_request("/api/users")?;

        // 后台任务派发后立刻执行本参与者的 destroy
        Ok(MainDirective::with_continuation(|| {
            println!("💤 Background task: flushing caches...");
        })
        .then_destroy())
    }

    fn destroy(&self, _ctx: &AppContext) -> ContainerResult<()> {
        println!("\n👋 ServerBoot shutting down, cleanup complete");
        Ok(())
    }
}

/// 通过 submit_lifecycle! 全局提交的参与者
#[derive(Default)]
struct ContainerReporter;

impl Lifecycle for ContainerReporter {
    fn name(&self) -> &str {
        "container-reporter"
    }

    fn after_initialization(&self, ctx: &AppContext) -> ContainerResult<()> {
        tracing::info!("Container wired: {} bean(s) registered", ctx.bean_count());
        for name in ctx.all_bean_names() {
            tracing::debug!("  bean: {}", name);
        }
        Ok(())
    }
}

submit_lifecycle!(ContainerReporter);

// ==================== 入口 ====================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║            Trellis Runtime - App Demo              ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    // 工作区根目录与 crate 目录两种运行方式都能找到配置
    let config_paths = ["demos/app-demo/application.toml", "application.toml"];
    let config_file = config_paths
        .iter()
        .copied()
        .find(|path| std::path::Path::new(path).exists())
        .unwrap_or("application.toml");

    let context = TrellisApplication::new("TrellisDemo")
        .config_file(config_file)
        .env_prefix("TRELLIS_")
        .banner(false)
        .participant(Arc::new(ServerBoot))
        .walker(Arc::new(DemoWalker))
        .initializer(|ctx| {
            // 从配置环境装配数据库配置 bean，环境变量可覆盖
            let env = ctx.environment();
            ctx.add_single(DatabaseConfig {
                host: env.get_string_or("database.host", "localhost"),
                port: env.get_i64_or("database.port", 5432),
                max_connections: env.get_i64_or("database.max-connections", 8),
            })?;
            Ok(())
        })
        .run()?;

    // 留给后台任务一点执行时间
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║              Configuration Summary                 ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    let config = context.get_single::<DatabaseConfig>()?;
    println!("🗄️  Database:");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Max Connections: {}", config.max_connections);

    println!("\n📒 Beans: {:?}", context.all_bean_names());
    println!("🧭 Dependency edges: {}", context.graph().edge_count());

    println!("\n💡 Try these commands:");
    println!("   TRELLIS_DATABASE_HOST=prod-db cargo run -p app-demo");
    println!("   TRELLIS_LOGGING_LEVEL=debug cargo run -p app-demo");
    println!();

    Ok(())
}
