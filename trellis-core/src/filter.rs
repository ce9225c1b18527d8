//! Bean 过滤器
//!
//! 按生命周期阶段注册的 bean 变换链。注册以（阶段，作用范围）
//! 二元组为键，同一阶段内按注册顺序应用。过滤器返回 `None`
//! 表示保持原值，`Some` 表示替换，出错则中止当前阶段。

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::registry::BeanHandle;

/// 可注册过滤器的阶段标记
///
/// 与引擎的运行阶段对应的封闭集合，Create 阶段末尾应用
/// `Created` 链。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPhase {
    /// bean 创建完成后
    Created,
    /// 标签初始化阶段
    TagInitialized,
    /// 依赖注入阶段
    BeanInjected,
}

impl fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterPhase::Created => "created",
            FilterPhase::TagInitialized => "tag-initialized",
            FilterPhase::BeanInjected => "bean-injected",
        };
        write!(f, "{}", s)
    }
}

/// 过滤器作用范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// 只作用于 single bean
    SingleOnly,
    /// 只作用于 multi bean
    MultiOnly,
    /// 作用于全部 bean
    All,
}

impl FilterMode {
    /// 该模式是否作用于指定命名空间的 bean
    pub fn accepts(&self, is_single: bool) -> bool {
        match self {
            FilterMode::SingleOnly => is_single,
            FilterMode::MultiOnly => !is_single,
            FilterMode::All => true,
        }
    }
}

/// 过滤器函数签名，参数为 bean 句柄与 bean 名称
pub type BeanFilterFn =
    dyn Fn(&BeanHandle, &str) -> anyhow::Result<Option<BeanHandle>> + Send + Sync;

/// 一条已注册的过滤器
pub struct BeanFilter {
    /// 诊断用名称，出现在日志里
    pub name: String,
    pub phase: FilterPhase,
    pub mode: FilterMode,
    pub func: Arc<BeanFilterFn>,
}

impl fmt::Debug for BeanFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanFilter")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("mode", &self.mode)
            .finish()
    }
}

/// 按阶段组织的过滤器链
#[derive(Default)]
pub struct FilterChains {
    filters: RwLock<Vec<Arc<BeanFilter>>>,
}

impl FilterChains {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册过滤器，追加到对应阶段链尾
    pub fn add<F>(&self, phase: FilterPhase, mode: FilterMode, name: impl Into<String>, func: F)
    where
        F: Fn(&BeanHandle, &str) -> anyhow::Result<Option<BeanHandle>> + Send + Sync + 'static,
    {
        let filter = BeanFilter {
            name: name.into(),
            phase,
            mode,
            func: Arc::new(func),
        };
        debug!("Registered bean filter '{}' at phase {}", filter.name, filter.phase);
        self.filters.write().push(Arc::new(filter));
    }

    /// 指定阶段的过滤器快照，注册顺序
    pub fn chain(&self, phase: FilterPhase) -> Vec<Arc<BeanFilter>> {
        self.filters
            .read()
            .iter()
            .filter(|f| f.phase == phase)
            .cloned()
            .collect()
    }

    /// 指定阶段的过滤器数量
    pub fn len(&self, phase: FilterPhase) -> usize {
        self.filters.read().iter().filter(|f| f.phase == phase).count()
    }

    pub fn is_empty(&self, phase: FilterPhase) -> bool {
        self.len(phase) == 0
    }
}
