//! 生命周期定义
//!
//! 参与者接口、Create 阶段的 bean 贡献、Main 阶段指令，以及
//! 基于 inventory 的全局参与者收集。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::ContainerResult;
use crate::registry::{canonical_type_of, BeanHandle};

/// 生命周期阶段，按声明顺序推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Create,
    TagInitialized,
    BeanInjected,
    Main,
    Destroy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Create => "create",
            Stage::TagInitialized => "tag-initialized",
            Stage::BeanInjected => "bean-injected",
            Stage::Main => "main",
            Stage::Destroy => "destroy",
        };
        write!(f, "{}", s)
    }
}

/// Create 阶段的声明式 bean 贡献
///
/// multi 条目先于 single 条目入册。类型名在构造时从值捕获。
#[derive(Default)]
pub struct BeanConfig {
    singles: Vec<(String, BeanHandle)>,
    multis: Vec<(String, String, BeanHandle)>,
}

impl BeanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个 single bean
    pub fn single<T: Any + Send + Sync>(mut self, bean: T) -> Self {
        self.singles.push((canonical_type_of::<T>(), Arc::new(bean)));
        self
    }

    /// 追加一个命名的 multi bean
    pub fn multi<T: Any + Send + Sync>(mut self, name: impl Into<String>, bean: T) -> Self {
        self.multis
            .push((name.into(), canonical_type_of::<T>(), Arc::new(bean)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.multis.is_empty()
    }

    /// 拆出 (multi, single) 两组条目，multi 在前
    pub(crate) fn into_entries(
        self,
    ) -> (Vec<(String, String, BeanHandle)>, Vec<(String, BeanHandle)>) {
        (self.multis, self.singles)
    }
}

/// Main 阶段的后台任务
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// 参与者对 Main 阶段的指令
///
/// continuation 由引擎以后台方式派发；`run_destroy` 为 true 时
/// 引擎在派发后立即调用该参与者的 destroy。
pub struct MainDirective {
    pub(crate) continuation: Option<Continuation>,
    pub(crate) run_destroy: bool,
}

impl MainDirective {
    /// 无后续动作
    pub fn done() -> Self {
        Self {
            continuation: None,
            run_destroy: false,
        }
    }

    /// 派发一个后台任务
    pub fn with_continuation<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            continuation: Some(Box::new(f)),
            run_destroy: false,
        }
    }

    /// 要求随后执行本参与者的 destroy
    pub fn then_destroy(mut self) -> Self {
        self.run_destroy = true;
        self
    }
}

impl Default for MainDirective {
    fn default() -> Self {
        Self::done()
    }
}

impl fmt::Debug for MainDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainDirective")
            .field("has_continuation", &self.continuation.is_some())
            .field("run_destroy", &self.run_destroy)
            .finish()
    }
}

/// 生命周期参与者
///
/// 除 `name` 外全部默认实现为 no-op，按需覆写。
pub trait Lifecycle: Send + Sync {
    /// 参与者名称，用于日志
    fn name(&self) -> &str;

    /// Create 阶段：贡献 bean
    fn create(&self) -> Option<BeanConfig> {
        None
    }

    /// TagInitialized 链应用完成后回调
    fn after_instantiation(&self, _ctx: &AppContext) -> ContainerResult<()> {
        Ok(())
    }

    /// BeanInjected 链应用完成后回调
    fn after_initialization(&self, _ctx: &AppContext) -> ContainerResult<()> {
        Ok(())
    }

    /// Main 阶段
    fn on_main(&self, _ctx: &AppContext) -> ContainerResult<MainDirective> {
        Ok(MainDirective::done())
    }

    /// Destroy 阶段，仅当 on_main 的指令要求时执行
    fn destroy(&self, _ctx: &AppContext) -> ContainerResult<()> {
        Ok(())
    }
}

/// 生命周期参与者提交结构，供 inventory 收集
pub struct LifecycleSubmission {
    pub create: fn() -> Arc<dyn Lifecycle>,
}

inventory::collect!(LifecycleSubmission);

/// 用于全局提交生命周期参与者的宏
#[macro_export]
macro_rules! submit_lifecycle {
    ($lifecycle_type:ty) => {
        $crate::inventory::submit! {
            $crate::LifecycleSubmission {
                create: || ::std::sync::Arc::new(<$lifecycle_type>::default()),
            }
        }
    };
}

/// 实例化全部通过 [`submit_lifecycle!`] 提交的参与者
pub fn submitted_lifecycles() -> Vec<Arc<dyn Lifecycle>> {
    inventory::iter::<LifecycleSubmission>
        .into_iter()
        .map(|submission| (submission.create)())
        .collect()
}
