//! 错误定义
//!
//! 容器、依赖图与生命周期共用的错误类型

use thiserror::Error;

/// 容器错误
#[derive(Error, Debug)]
pub enum ContainerError {
    /// single/multi 命名空间互斥被破坏
    #[error("namespace conflict: {0}")]
    NamespaceConflict(String),

    /// 同类型的 single bean 重复注册
    #[error("duplicate single bean of type '{0}'")]
    DuplicateType(String),

    /// bean 未找到
    #[error("bean not found: '{0}'")]
    NotFound(String),

    /// 类型下转失败
    #[error("bean '{name}' is not of type {expected}")]
    TypeMismatch { name: String, expected: String },

    /// 依赖图存在环
    #[error("cyclic dependency: {0}")]
    CyclicDependency(String),

    /// 过滤器或遍历器执行失败
    #[error("filter failed on bean '{bean}': {source}")]
    FilterFailure {
        bean: String,
        source: anyhow::Error,
    },

    /// 生命周期阶段状态错误
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// 配置加载失败
    #[error("config error: {0}")]
    Config(String),

    /// 日志初始化失败
    #[error("logging init failed: {0}")]
    LoggingInit(String),

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 容器统一的 Result 类型
pub type ContainerResult<T> = Result<T, ContainerError>;
