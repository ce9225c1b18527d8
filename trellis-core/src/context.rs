//! 应用上下文
//!
//! 注册表、依赖图、过滤器链、字段遍历器与配置环境的聚合。
//! 生命周期引擎与各协作者共享同一份上下文，常用操作在此处
//! 提供薄委托。

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::Environment;
use crate::error::ContainerResult;
use crate::filter::{FilterChains, FilterMode, FilterPhase};
use crate::graph::DependencyGraph;
use crate::lifecycle::BeanConfig;
use crate::registry::{canonical_name, BeanHandle, BeanLookup, BeanRegistry};
use crate::walker::FieldWalker;

pub(crate) type WalkerList = Arc<RwLock<Vec<Arc<dyn FieldWalker>>>>;

/// 展开一条依赖声明并写入依赖图
///
/// owner 为 multi bean 类型时，该类型下每个已注册名称各得一条边；
/// 否则按原名记录一条边。依赖方按给定名称使用。
pub(crate) fn declare_dependency_on(
    registry: &BeanRegistry,
    graph: &DependencyGraph,
    owner: &str,
    dependency: &str,
) {
    let owner = canonical_name(owner);
    let dependency = canonical_name(dependency);
    if owner.is_empty() || dependency.is_empty() {
        return;
    }
    let names = registry.multi_bean_names(&owner);
    if names.is_empty() {
        graph.add_edge(owner, dependency);
    } else {
        trace!(
            "Expanding dependency of multi type '{}' to {} named beans",
            owner,
            names.len()
        );
        for name in names {
            graph.add_edge(name, dependency.clone());
        }
    }
}

/// 容器四大件（注册表、依赖图、过滤器链、遍历器）加配置环境的共享句柄
pub struct AppContext {
    registry: Arc<BeanRegistry>,
    graph: Arc<DependencyGraph>,
    chains: Arc<FilterChains>,
    walkers: WalkerList,
    environment: Arc<Environment>,
}

impl AppContext {
    /// 创建带空配置环境的上下文
    pub fn new() -> Self {
        Self::with_environment(Arc::new(Environment::new()))
    }

    /// 以给定配置环境创建上下文
    pub fn with_environment(environment: Arc<Environment>) -> Self {
        Self {
            registry: Arc::new(BeanRegistry::new()),
            graph: Arc::new(DependencyGraph::new()),
            chains: Arc::new(FilterChains::new()),
            walkers: Arc::new(RwLock::new(Vec::new())),
            environment,
        }
    }

    pub fn registry(&self) -> &Arc<BeanRegistry> {
        &self.registry
    }

    pub fn graph(&self) -> &Arc<DependencyGraph> {
        &self.graph
    }

    pub fn chains(&self) -> &Arc<FilterChains> {
        &self.chains
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    // ========== 注册表委托 ==========

    /// 注册 single bean
    pub fn add_single<T: Any + Send + Sync>(&self, bean: T) -> ContainerResult<()> {
        self.registry.add_single(bean)
    }

    /// 注册命名的 multi bean
    pub fn add_multi<T: Any + Send + Sync>(&self, name: &str, bean: T) -> ContainerResult<bool> {
        self.registry.add_multi(name, bean)
    }

    /// 通过名称或类型获取 bean
    pub fn get_bean(&self, name_or_type: &str) -> ContainerResult<BeanHandle> {
        self.registry.get_bean(name_or_type)
    }

    /// 获取 single bean 并下转到具体类型
    pub fn get_single<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        self.registry.get_single::<T>()
    }

    pub fn has_bean(&self, name_or_type: &str) -> bool {
        self.registry.has_bean(name_or_type)
    }

    pub fn has_bean_type(&self, type_name: &str) -> bool {
        self.registry.has_bean_type(type_name)
    }

    pub fn is_single_bean(&self, name_or_type: &str) -> bool {
        self.registry.is_single_bean(name_or_type)
    }

    pub fn is_multi_bean(&self, name: &str) -> bool {
        self.registry.is_multi_bean(name)
    }

    pub fn multi_bean_names(&self, type_name: &str) -> Vec<String> {
        self.registry.multi_bean_names(type_name)
    }

    pub fn type_of(&self, name: &str) -> Option<String> {
        self.registry.type_of(name)
    }

    pub fn all_bean_names(&self) -> Vec<String> {
        self.registry.all_bean_names()
    }

    pub fn bean_count(&self) -> usize {
        self.registry.bean_count()
    }

    /// 以类型擦除后的句柄注册 single bean
    pub fn add_single_handle(&self, type_name: &str, handle: BeanHandle) -> ContainerResult<()> {
        self.registry.add_single_handle(type_name, handle)
    }

    /// 以类型擦除后的句柄注册命名的 multi bean
    pub fn add_multi_handle(
        &self,
        name: &str,
        type_name: &str,
        handle: BeanHandle,
    ) -> ContainerResult<bool> {
        self.registry.add_multi_handle(name, type_name, handle)
    }

    pub fn update_single_with<F>(&self, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(&BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        self.registry.update_single_with(type_name, f)
    }

    pub fn update_multi_with<F>(&self, name: &str, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(&BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        self.registry.update_multi_with(name, type_name, f)
    }

    pub fn update_any_with<F>(&self, name: &str, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(bool, &BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        self.registry.update_any_with(name, type_name, f)
    }

    pub fn update_single(&self, type_name: &str, handle: BeanHandle) -> ContainerResult<bool> {
        self.registry.update_single(type_name, handle)
    }

    pub fn update_multi(
        &self,
        name: &str,
        type_name: &str,
        handle: BeanHandle,
    ) -> ContainerResult<bool> {
        self.registry.update_multi(name, type_name, handle)
    }

    pub fn remove_single(&self, type_name: &str) -> ContainerResult<bool> {
        self.registry.remove_single(type_name)
    }

    pub fn remove_multi(&self, name: &str, type_name: &str) -> ContainerResult<bool> {
        self.registry.remove_multi(name, type_name)
    }

    // ========== 装配 ==========

    /// 应用一份 bean 贡献，multi 条目先入册
    pub fn apply_bean_config(&self, config: BeanConfig) -> ContainerResult<()> {
        let (multis, singles) = config.into_entries();
        for (name, ty, handle) in multis {
            self.registry.add_multi_handle(&name, &ty, handle)?;
        }
        for (ty, handle) in singles {
            self.registry.add_single_handle(&ty, handle)?;
        }
        Ok(())
    }

    /// 声明 owner 依赖 dependency，multi 类型按名称展开
    pub fn declare_dependency(&self, owner: &str, dependency: &str) {
        declare_dependency_on(&self.registry, &self.graph, owner, dependency);
    }

    /// 注册过滤器
    pub fn add_filter<F>(
        &self,
        phase: FilterPhase,
        mode: FilterMode,
        name: impl Into<String>,
        func: F,
    ) where
        F: Fn(&BeanHandle, &str) -> anyhow::Result<Option<BeanHandle>> + Send + Sync + 'static,
    {
        self.chains.add(phase, mode, name, func);
    }

    /// 注册字段遍历器
    pub fn register_walker(&self, walker: Arc<dyn FieldWalker>) {
        debug!("Registered field walker: {}", walker.name());
        self.walkers.write().push(walker);
    }

    pub(crate) fn walker_list(&self) -> WalkerList {
        Arc::clone(&self.walkers)
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
