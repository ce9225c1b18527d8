//! 日志初始化
//!
//! 级别与格式既可以在代码里用 builder 设置，也可以从配置环境的
//! logging.* 键读出来。真正安装 tracing 订阅者的入口是
//! [`LoggingConfig::init`]。

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Environment;
use crate::error::{ContainerError, ContainerResult};

/// 日志级别，字符串写法与 tracing 的约定一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 输出格式，对应 tracing-subscriber 的几种 fmt 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 单行紧凑输出，默认值
    Compact,
    /// fmt 的标准完整行
    Full,
    /// 一行一条 JSON，便于采集
    Json,
    /// 多行美化输出，开发期用
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Full => write!(f, "full"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// 日志参数集合
///
/// 结构化键（logging.level 等）经配置环境读入，环境变量走
/// 前缀映射同样落到这些键上；RUST_LOG 仍然最直接，整段作为
/// 过滤器表达式使用。
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 级别下限，默认 Info
    pub level: LogLevel,

    /// 输出格式，默认 Compact
    pub format: LogFormat,

    /// 是否带时间戳，仅 compact/full 格式生效，默认开
    pub show_timestamp: bool,

    /// 是否打印事件目标（模块路径），默认关
    pub show_target: bool,

    /// 是否打印线程 ID，默认关
    pub show_thread_ids: bool,

    /// 是否打印线程名，默认关
    pub show_thread_names: bool,

    /// 完整过滤表达式，形如 "my_crate=debug,other=warn"，
    /// 设置后级别字段不再参与
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_timestamp: true,
            show_target: false,
            show_thread_ids: false,
            show_thread_names: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn filter(mut self, filter: String) -> Self {
        self.filter = Some(filter);
        self
    }

    /// 以 RUST_LOG 为种子的默认配置
    ///
    /// 级别、格式等结构化键不走环境变量直读，由配置环境统一
    /// 映射，见 [`Self::from_environment`]。
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            config.filter = Some(rust_log);
        }
        config
    }

    /// 从配置环境读取配置
    ///
    /// 以 [`Self::from_env`] 的结果为底，logging.* 键覆盖其中的
    /// 级别、格式、过滤器与输出开关。
    pub fn from_environment(environment: &Environment) -> Self {
        let mut config = Self::from_env();

        if let Some(level_str) = environment.get_string("logging.level") {
            if let Ok(level) = level_str.parse() {
                config.level = level;
            }
        }
        if let Some(format_str) = environment.get_string("logging.format") {
            if let Ok(format) = format_str.parse() {
                config.format = format;
            }
        }
        if let Some(filter) = environment.get_string("logging.filter") {
            config.filter = Some(filter);
        }
        if let Some(show_target) = environment.get_bool("logging.show-target") {
            config.show_target = show_target;
        }
        if let Some(show_thread_ids) = environment.get_bool("logging.show-thread-ids") {
            config.show_thread_ids = show_thread_ids;
        }

        config
    }

    /// 按当前参数安装全局 tracing 订阅者
    ///
    /// 全局订阅者只能安装一次，重复调用返回
    /// [`ContainerError::LoggingInit`]。
    pub fn init(self) -> ContainerResult<()> {
        // 过滤指令优先级：显式 filter > RUST_LOG > 配置级别
        let env_filter = if let Some(filter) = &self.filter {
            EnvFilter::try_new(filter)
                .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
        };

        // 根据格式初始化订阅者。json/pretty 始终带时间戳
        match self.format {
            LogFormat::Compact => {
                let builder = fmt()
                    .with_env_filter(env_filter)
                    .compact()
                    .with_target(self.show_target)
                    .with_thread_ids(self.show_thread_ids)
                    .with_thread_names(self.show_thread_names);
                if self.show_timestamp {
                    builder.try_init()
                } else {
                    builder.without_time().try_init()
                }
                .map_err(|e| ContainerError::LoggingInit(e.to_string()))?;
            }
            LogFormat::Full => {
                let builder = fmt()
                    .with_env_filter(env_filter)
                    .with_target(self.show_target)
                    .with_thread_ids(self.show_thread_ids)
                    .with_thread_names(self.show_thread_names);
                if self.show_timestamp {
                    builder.try_init()
                } else {
                    builder.without_time().try_init()
                }
                .map_err(|e| ContainerError::LoggingInit(e.to_string()))?;
            }
            LogFormat::Json => {
                fmt()
                    .with_env_filter(env_filter)
                    .json()
                    .with_target(self.show_target)
                    .try_init()
                    .map_err(|e| ContainerError::LoggingInit(e.to_string()))?;
            }
            LogFormat::Pretty => {
                fmt()
                    .with_env_filter(env_filter)
                    .pretty()
                    .with_target(self.show_target)
                    .try_init()
                    .map_err(|e| ContainerError::LoggingInit(e.to_string()))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapPropertySource};

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .level(LogLevel::Debug)
            .format(LogFormat::Json)
            .show_timestamp(false)
            .show_target(true);

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.show_timestamp);
        assert!(config.show_target);
    }

    #[test]
    fn test_from_environment_overrides() {
        let environment = Environment::new();
        environment.add_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property("logging.level", ConfigValue::String("warn".to_string()))
                .with_property("logging.format", ConfigValue::String("pretty".to_string()))
                .with_property("logging.show-target", ConfigValue::Bool(true))
                .with_property("logging.show-thread-ids", ConfigValue::Bool(true)),
        ));

        let config = LoggingConfig::from_environment(&environment);
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.show_target);
        assert!(config.show_thread_ids);
    }

    #[test]
    fn test_from_environment_bad_values_ignored() {
        let environment = Environment::new();
        environment.add_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property("logging.level", ConfigValue::String("loudest".to_string())),
        ));

        // 非法值不生效，级别保持 from_env 的结果
        let config = LoggingConfig::from_environment(&environment);
        assert_eq!(config.level, LoggingConfig::from_env().level);
    }
}
