//! 配置环境
//!
//! 点号分隔的键到标量值的只读视图，由多个配置源按优先级
//! 仲裁。TOML 文件与进程环境变量各是一种源，MapPropertySource
//! 供测试与运行时注入。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::RwLock;

use crate::error::{ContainerError, ContainerResult};

/// 配置值
///
/// 嵌套表在加载时展平为点号分隔的键，因此没有对象变体；
/// 数组只保留标量元素。
#[derive(Debug, Clone)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 整数值，字符串按十进制解析
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            ConfigValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 布尔值，接受 true/yes/1 与 false/no/0 的字符串写法
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// 一组配置键值的来源
pub trait PropertySource: Send + Sync {
    /// 来源名称，用于日志
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<ConfigValue>;

    fn keys(&self) -> Vec<String>;

    /// 数字越大越先被查询
    fn priority(&self) -> i32 {
        0
    }
}

/// 配置环境
///
/// 持有全部配置源，读取时按优先级从高到低命中第一个。
pub struct Environment {
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("sources_count", &self.sources.read().len())
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// 登记一个配置源，高优先级的排在前面
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        sources.push(source);
        // 稳定排序，同优先级保持加入顺序
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 按优先级查找，命中第一个源即返回
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        for source in sources.iter() {
            if let Some(value) = source.get(key) {
                tracing::debug!("Config '{}' found in source '{}'", key, source.name());
                return Some(value);
            }
        }
        tracing::debug!("Config '{}' not found in any source", key);
        None
    }

    // ========== 带类型的便捷读取 ==========

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str().map(String::from))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// 字符串数组，TOML 数组逐项取标量，普通字符串按逗号拆分
    pub fn get_string_array(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            ConfigValue::Array(arr) => {
                Some(arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            }
            ConfigValue::String(s) => {
                Some(s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect())
            }
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 全部配置源可见的键，按优先级首见顺序去重
    pub fn keys(&self) -> Vec<String> {
        let sources = self.sources.read();
        let mut keys = indexmap::IndexSet::new();
        for source in sources.iter() {
            for key in source.keys() {
                keys.insert(key);
            }
        }
        keys.into_iter().collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// ========== 配置源实现 ==========

/// 进程环境变量配置源
///
/// 只暴露带指定前缀的变量，键按
/// `TRELLIS_DATABASE_URL <-> database.url` 的规则双向映射。
/// 默认优先级高于文件源，环境变量可以覆盖文件配置。
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100,
        }
    }

    fn env_to_key(&self, env_key: &str) -> String {
        if let Some(stripped) = env_key.strip_prefix(&self.prefix) {
            stripped.to_lowercase().replace('_', ".")
        } else {
            env_key.to_lowercase().replace('_', ".")
        }
    }

    fn key_to_env(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.replace('.', "_").to_uppercase())
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        let env_key = self.key_to_env(key);
        std::env::var(&env_key).ok().map(ConfigValue::String)
    }

    fn keys(&self) -> Vec<String> {
        std::env::vars()
            .filter(|(k, _)| k.starts_with(&self.prefix))
            .map(|(k, _)| self.env_to_key(&k))
            .collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 文件配置源，加载时整体展平为点号键
#[derive(Debug)]
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl TomlPropertySource {
    pub fn from_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContainerError::Config(format!("failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_str(&content, path.to_string_lossy().to_string())
    }

    /// 解析 TOML 文本，源名称由调用方给定
    pub fn from_str(content: &str, name: String) -> ContainerResult<Self> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| ContainerError::Config(format!("failed to parse TOML: {}", e)))?;

        let mut properties = HashMap::new();
        Self::flatten_toml(&value, String::new(), &mut properties);

        Ok(Self {
            name,
            properties,
            // 文件排在环境变量之后
            priority: 0,
        })
    }

    /// 递归展平：`[database] url = "x"` 变成键 `database.url`，
    /// datetime 存为字符串
    fn flatten_toml(value: &toml::Value, prefix: String, result: &mut HashMap<String, ConfigValue>) {
        match value {
            toml::Value::String(s) => {
                result.insert(prefix, ConfigValue::String(s.clone()));
            }
            toml::Value::Integer(i) => {
                result.insert(prefix, ConfigValue::Int(*i));
            }
            toml::Value::Float(f) => {
                result.insert(prefix, ConfigValue::Float(*f));
            }
            toml::Value::Boolean(b) => {
                result.insert(prefix, ConfigValue::Bool(*b));
            }
            toml::Value::Array(arr) => {
                let values: Vec<ConfigValue> = arr
                    .iter()
                    .filter_map(Self::toml_value_to_config)
                    .collect();
                result.insert(prefix, ConfigValue::Array(values));
            }
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten_toml(val, new_prefix, result);
                }
            }
            toml::Value::Datetime(dt) => {
                result.insert(prefix, ConfigValue::String(dt.to_string()));
            }
        }
    }

    /// 转换数组元素为 ConfigValue，表元素被丢弃
    fn toml_value_to_config(value: &toml::Value) -> Option<ConfigValue> {
        match value {
            toml::Value::String(s) => Some(ConfigValue::String(s.clone())),
            toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
            toml::Value::Float(f) => Some(ConfigValue::Float(*f)),
            toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
            toml::Value::Array(arr) => Some(ConfigValue::Array(
                arr.iter().filter_map(Self::toml_value_to_config).collect(),
            )),
            toml::Value::Table(_) => None,
            toml::Value::Datetime(dt) => Some(ConfigValue::String(dt.to_string())),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源，测试与运行时注入用
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
