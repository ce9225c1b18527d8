// trellis-core: 控制反转运行时
//
// bean 注册表、依赖图与生命周期引擎三件套：
// - 双命名空间 bean 存储（single 按规范类型名，multi 按用户命名）
// - 依赖优先的拓扑排序与环检测
// - Create/TagInitialized/BeanInjected/Main/Destroy 五阶段生命周期
// - 按（阶段，作用范围）注册、顺序应用的 bean 过滤器链

pub mod app;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod graph;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod walker;

// 顶层平铺导出，省去逐模块路径
pub use app::TrellisApplication;
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use context::AppContext;
pub use engine::LifecycleEngine;
pub use error::{ContainerError, ContainerResult};
pub use filter::{BeanFilter, FilterChains, FilterMode, FilterPhase};
pub use graph::{DependencyEdge, DependencyGraph};
pub use lifecycle::{
    submitted_lifecycles, BeanConfig, Continuation, Lifecycle, LifecycleSubmission, MainDirective,
    Stage,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use registry::{
    canonical_name, canonical_type_of, BeanHandle, BeanKind, BeanLookup, BeanRegistry,
};
pub use walker::{FieldWalker, WiringSink};

// 导出 inventory，供 submit_lifecycle! 宏使用
pub use inventory;

/// 一次 use 引入日常所需的 traits 与类型
pub mod prelude {
    pub use crate::app::TrellisApplication;
    pub use crate::config::{
        self, ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource,
        PropertySource, TomlPropertySource,
    };
    pub use crate::context::AppContext;
    pub use crate::engine::LifecycleEngine;
    pub use crate::error::{ContainerError, ContainerResult};
    pub use crate::filter::{FilterMode, FilterPhase};
    pub use crate::graph::{DependencyEdge, DependencyGraph};
    pub use crate::lifecycle::{BeanConfig, Lifecycle, MainDirective, Stage};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::registry::{
        canonical_name, canonical_type_of, BeanHandle, BeanLookup, BeanRegistry,
    };
    pub use crate::walker::{FieldWalker, WiringSink};
    // anyhow 一并带出，过滤器与遍历器签名都用到
    pub use anyhow::{anyhow, Context};
}
