use std::path::Path;
use std::sync::Arc;

use crate::config::{Environment, EnvironmentPropertySource, PropertySource, TomlPropertySource};
use crate::context::AppContext;
use crate::engine::LifecycleEngine;
use crate::error::ContainerResult;
use crate::filter::{FilterMode, FilterPhase};
use crate::lifecycle::{submitted_lifecycles, Lifecycle};
use crate::logging::LoggingConfig;
use crate::registry::BeanHandle;
use crate::walker::FieldWalker;

/// Trellis 应用入口
///
/// builder 收集配置文件、日志、参与者等启动参数，[`Self::run`]
/// 负责装配配置环境并驱动生命周期引擎。
pub struct TrellisApplication {
    name: String,

    /// 按顺序加载的配置文件
    config_files: Vec<String>,

    /// 环境变量进入配置环境时剥掉的前缀
    env_prefix: String,

    /// 启动时是否打印 banner
    show_banner: bool,

    /// 自动装配开关，未设置时读配置键 auto-config
    auto_config: Option<bool>,

    /// 显式日志参数，缺省时从配置环境取
    logging_config: Option<LoggingConfig>,

    /// 附加配置源
    property_sources: Vec<Box<dyn PropertySource>>,

    /// 生命周期参与者
    participants: Vec<Arc<dyn Lifecycle>>,

    /// 引擎运行前对上下文执行的回调
    initializers: Vec<Box<dyn Fn(&Arc<AppContext>) -> ContainerResult<()> + Send + Sync>>,
}

impl TrellisApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_files: vec!["application.toml".to_string()],
            env_prefix: "TRELLIS_".to_string(),
            show_banner: true,
            auto_config: None,
            logging_config: None,
            property_sources: Vec::new(),
            participants: Vec::new(),
            initializers: Vec::new(),
        }
    }

    /// 用单个路径替换默认的 application.toml
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files = vec![path.into()];
        self
    }

    pub fn config_files(mut self, paths: Vec<String>) -> Self {
        self.config_files = paths;
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 设置自动装配开关
    ///
    /// 代码设置优先于配置键 auto-config
    pub fn auto_config(mut self, enabled: bool) -> Self {
        self.auto_config = Some(enabled);
        self
    }

    /// 显式给定日志参数
    ///
    /// 如果不设置，将从配置环境与环境变量读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 添加附加配置源
    pub fn property_source(mut self, source: Box<dyn PropertySource>) -> Self {
        self.property_sources.push(source);
        self
    }

    /// 添加生命周期参与者
    pub fn participant(mut self, participant: Arc<dyn Lifecycle>) -> Self {
        self.participants.push(participant);
        self
    }

    /// 添加初始化器，在引擎运行前对上下文执行
    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Arc<AppContext>) -> ContainerResult<()> + Send + Sync + 'static,
    {
        self.initializers.push(Box::new(f));
        self
    }

    /// 添加过滤器
    pub fn filter<F>(
        self,
        phase: FilterPhase,
        mode: FilterMode,
        name: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(&BeanHandle, &str) -> anyhow::Result<Option<BeanHandle>> + Send + Sync + 'static,
    {
        let name = name.into();
        let func = Arc::new(func);
        self.initializer(move |ctx| {
            let func = Arc::clone(&func);
            ctx.add_filter(phase, mode, name.clone(), move |bean, bean_name| {
                func(bean, bean_name)
            });
            Ok(())
        })
    }

    /// 添加字段遍历器
    pub fn walker(self, walker: Arc<dyn FieldWalker>) -> Self {
        self.initializer(move |ctx| {
            ctx.register_walker(Arc::clone(&walker));
            Ok(())
        })
    }

    /// 装配并启动，返回就绪的应用上下文
    pub fn run(mut self) -> ContainerResult<Arc<AppContext>> {
        let start_time = std::time::Instant::now();

        // 先装配配置环境，日志配置可能写在配置文件里
        let environment = Arc::new(Environment::new());
        let (loaded, failed) = self.load_configurations(&environment);
        for source in self.property_sources.drain(..) {
            environment.add_property_source(source);
        }
        environment.add_property_source(Box::new(EnvironmentPropertySource::new(
            &self.env_prefix,
        )));

        // 初始化日志系统，重复初始化时沿用现有订阅者
        let logging_config = self
            .logging_config
            .clone()
            .unwrap_or_else(|| LoggingConfig::from_environment(&environment));
        if let Err(e) = logging_config.init() {
            tracing::debug!("Logging already initialized: {}", e);
        }

        for file in &loaded {
            tracing::info!("Loaded configuration from: {}", file);
        }
        for (file, reason) in &failed {
            tracing::warn!("Failed to load {}: {}", file, reason);
        }
        for file in &self.config_files {
            if !loaded.contains(file) && !failed.iter().any(|(f, _)| f == file) {
                tracing::debug!("Configuration file not found: {}", file);
            }
        }
        tracing::debug!("Environment variable prefix: {}", self.env_prefix);

        // 显示 banner，配置键 banner 也可以关掉
        if self.show_banner && environment.get_bool_or("banner", true) {
            self.print_banner();
        }

        tracing::info!("Starting {} application", self.name);

        // 解析自动装配开关
        let auto_config = self
            .auto_config
            .unwrap_or_else(|| environment.get_bool_or("auto-config", true));

        // 创建应用上下文
        let context = Arc::new(AppContext::with_environment(Arc::clone(&environment)));

        // 执行自定义初始化器（注册 bean、过滤器、遍历器）
        for initializer in &self.initializers {
            initializer(&context)?;
        }

        // 装配生命周期引擎：显式参与者在前，全局提交的在后
        let mut engine =
            LifecycleEngine::with_participants(Arc::clone(&context), self.participants.clone());
        engine.set_auto_config(auto_config);
        for participant in submitted_lifecycles() {
            engine.add_participant(participant);
        }
        engine.run()?;

        let elapsed_ms = start_time.elapsed().as_millis();
        tracing::info!("Started {} in {}ms", self.name, elapsed_ms);
        tracing::debug!("Container holds {} bean(s)", context.bean_count());

        Ok(context)
    }

    /// 加载配置文件，返回 (已加载, 解析失败) 两组路径
    ///
    /// 日志系统在配置环境就绪后才初始化，这里只收集结果，
    /// 由调用方在日志可用后统一输出。
    fn load_configurations(
        &self,
        environment: &Environment,
    ) -> (Vec<String>, Vec<(String, String)>) {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for config_file in &self.config_files {
            if !Path::new(config_file).exists() {
                continue;
            }
            match TomlPropertySource::from_file(config_file) {
                Ok(source) => {
                    environment.add_property_source(Box::new(source));
                    loaded.push(config_file.clone());
                }
                Err(e) => failed.push((config_file.clone(), e.to_string())),
            }
        }
        (loaded, failed)
    }

    /// 全默认参数的一键启动
    pub fn run_with_defaults(name: impl Into<String>) -> ContainerResult<Arc<AppContext>> {
        Self::new(name).run()
    }

    fn print_banner(&self) {
        println!();
        println!(r"  _____              _  _  _     ");
        println!(r" |_   _| _ __   ___ | || |(_) ___ ");
        println!(r"   | |  | '__| / _ \| || || |/ __|");
        println!(r"   | |  | |   |  __/| || || |\__ \");
        println!(r"   |_|  |_|    \___||_||_||_||___/");
        println!();
        println!("  :: Trellis Runtime ::        (v{})", env!("CARGO_PKG_VERSION"));
        println!();
    }
}

impl Default for TrellisApplication {
    fn default() -> Self {
        Self::new("TrellisApplication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapPropertySource};
    use crate::lifecycle::BeanConfig;
    use crate::walker::WiringSink;

    #[derive(Debug)]
    struct Settings {
        redis_url: String,
    }

    fn quiet(name: &str) -> TrellisApplication {
        TrellisApplication::new(name).banner(false)
    }

    #[test]
    fn test_run_empty_application() {
        let ctx = quiet("empty-app").run().unwrap();
        assert_eq!(ctx.bean_count(), 0);
    }

    #[test]
    fn test_initializer_contributes_beans() {
        let ctx = quiet("init-app")
            .initializer(|ctx| {
                ctx.add_single(Settings {
                    redis_url: "redis://localhost".to_string(),
                })?;
                Ok(())
            })
            .run()
            .unwrap();

        let settings = ctx.get_single::<Settings>().unwrap();
        assert_eq!(settings.redis_url, "redis://localhost");
    }

    #[test]
    fn test_participant_contributes_beans() {
        struct Seeder;

        impl Lifecycle for Seeder {
            fn name(&self) -> &str {
                "seeder"
            }

            fn create(&self) -> Option<BeanConfig> {
                Some(BeanConfig::new().multi("seed", 42i64))
            }
        }

        let ctx = quiet("seeded-app")
            .participant(Arc::new(Seeder))
            .run()
            .unwrap();
        assert!(ctx.is_multi_bean("seed"));
    }

    #[test]
    fn test_filter_builder_applies() {
        let ctx = quiet("filter-app")
            .initializer(|ctx| {
                ctx.add_single(Settings {
                    redis_url: "redis://raw".to_string(),
                })?;
                Ok(())
            })
            .filter(
                FilterPhase::TagInitialized,
                FilterMode::SingleOnly,
                "url-rewrite",
                |bean, _| {
                    let settings = bean
                        .downcast_ref::<Settings>()
                        .ok_or_else(|| anyhow::anyhow!("unexpected bean type"))?;
                    Ok(Some(Arc::new(Settings {
                        redis_url: format!("{}/0", settings.redis_url),
                    })))
                },
            )
            .run()
            .unwrap();

        assert_eq!(ctx.get_single::<Settings>().unwrap().redis_url, "redis://raw/0");
    }

    #[test]
    fn test_auto_config_disabled_by_config_key() {
        struct EdgeWalker;

        impl FieldWalker for EdgeWalker {
            fn name(&self) -> &str {
                "edge-walker"
            }

            fn instantiate(
                &self,
                _bean: &BeanHandle,
                _bean_name: &str,
                sink: &mut WiringSink,
            ) -> anyhow::Result<Option<BeanHandle>> {
                sink.depends_on("anything", "something");
                Ok(None)
            }
        }

        let ctx = quiet("no-auto")
            .property_source(Box::new(
                MapPropertySource::new("test")
                    .with_property("auto-config", ConfigValue::Bool(false)),
            ))
            .walker(Arc::new(EdgeWalker))
            .initializer(|ctx| {
                ctx.add_single(Settings {
                    redis_url: "redis://quiet".to_string(),
                })?;
                Ok(())
            })
            .run()
            .unwrap();

        assert_eq!(ctx.environment().get_bool("auto-config"), Some(false));
        assert_eq!(ctx.graph().edge_count(), 0);
    }

    #[test]
    fn test_config_file_loaded_into_environment() {
        let path = std::env::temp_dir().join(format!("trellis-app-{}.toml", std::process::id()));
        std::fs::write(&path, "greeting = \"from-file\"\n\n[server]\nport = 9090\n").unwrap();

        let ctx = quiet("config-app")
            .config_file(path.to_string_lossy().to_string())
            .run()
            .unwrap();

        assert_eq!(ctx.environment().get_string("greeting"), Some("from-file".to_string()));
        assert_eq!(ctx.environment().get_i64("server.port"), Some(9090));

        std::fs::remove_file(&path).ok();
    }
}
