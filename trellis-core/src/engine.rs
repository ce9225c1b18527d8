//! 生命周期引擎
//!
//! 按 Create、TagInitialized、BeanInjected、Main 的顺序推进，
//! 每个阶段应用对应的过滤器链并回调参与者。Destroy 不是引擎
//! 统一推进的阶段，只按参与者 Main 指令逐个触发。阶段失败时
//! 已生效的变更保持原样，错误原文上抛。

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::context::{declare_dependency_on, AppContext};
use crate::error::{ContainerError, ContainerResult};
use crate::filter::{FilterMode, FilterPhase};
use crate::lifecycle::{Continuation, Lifecycle, Stage};
use crate::registry::BeanHandle;
use crate::walker::WiringSink;

/// 生命周期引擎
pub struct LifecycleEngine {
    ctx: Arc<AppContext>,
    participants: Vec<Arc<dyn Lifecycle>>,
    auto_config: bool,
    /// 最近完成的阶段
    cursor: Option<Stage>,
}

impl LifecycleEngine {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            participants: Vec::new(),
            auto_config: true,
            cursor: None,
        }
    }

    /// 创建引擎并一次性登记一组参与者
    pub fn with_participants(
        ctx: Arc<AppContext>,
        participants: Vec<Arc<dyn Lifecycle>>,
    ) -> Self {
        let mut engine = Self::new(ctx);
        for participant in participants {
            engine.add_participant(participant);
        }
        engine
    }

    /// 注册一个参与者，各阶段按注册顺序回调
    pub fn add_participant(&mut self, participant: Arc<dyn Lifecycle>) {
        debug!("Lifecycle participant registered: {}", participant.name());
        self.participants.push(participant);
    }

    /// 开关自动装配过滤器，默认开启
    pub fn set_auto_config(&mut self, enabled: bool) {
        self.auto_config = enabled;
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// 依序推进全部阶段
    pub fn run(&mut self) -> ContainerResult<()> {
        self.advance(Stage::Create)?;
        self.advance(Stage::TagInitialized)?;
        self.advance(Stage::BeanInjected)?;
        self.advance(Stage::Main)?;
        Ok(())
    }

    /// 进入指定阶段，阶段必须按声明顺序依次进入且各至多一次
    pub fn advance(&mut self, stage: Stage) -> ContainerResult<()> {
        if stage == Stage::Destroy {
            return Err(ContainerError::Lifecycle(
                "destroy runs per participant directive, not as an engine stage".to_string(),
            ));
        }
        let expected = match self.cursor {
            None => Stage::Create,
            Some(Stage::Create) => Stage::TagInitialized,
            Some(Stage::TagInitialized) => Stage::BeanInjected,
            Some(Stage::BeanInjected) => Stage::Main,
            Some(Stage::Main) | Some(Stage::Destroy) => {
                return Err(ContainerError::Lifecycle(format!(
                    "lifecycle already completed, cannot enter stage '{}'",
                    stage
                )));
            }
        };
        if stage != expected {
            return Err(ContainerError::Lifecycle(format!(
                "stage '{}' entered out of order, expected '{}'",
                stage, expected
            )));
        }
        info!("Entering lifecycle stage: {}", stage);
        match stage {
            Stage::Create => {
                if self.auto_config {
                    self.install_walker_filters();
                }
                self.create_stage()?;
            }
            Stage::TagInitialized => self.tag_initialized_stage()?,
            Stage::BeanInjected => self.bean_injected_stage()?,
            Stage::Main => self.main_stage()?,
            Stage::Destroy => {}
        }
        self.cursor = Some(stage);
        Ok(())
    }

    /// Create 阶段：参与者贡献 bean，随后应用 Created 链
    fn create_stage(&self) -> ContainerResult<()> {
        for participant in &self.participants {
            if let Some(config) = participant.create() {
                trace!("Applying bean config from participant '{}'", participant.name());
                self.ctx.apply_bean_config(config)?;
            }
        }
        let names = self.ctx.all_bean_names();
        self.apply_chain(FilterPhase::Created, &names)
    }

    /// TagInitialized 阶段：先应用过滤器链，再回调参与者
    fn tag_initialized_stage(&self) -> ContainerResult<()> {
        let names = self.ctx.all_bean_names();
        self.apply_chain(FilterPhase::TagInitialized, &names)?;
        for participant in &self.participants {
            participant.after_instantiation(&self.ctx)?;
        }
        Ok(())
    }

    /// BeanInjected 阶段：按依赖序的逆序应用注入链，再回调参与者
    ///
    /// 排序输出是依赖优先的，注入链按其逆序访问。被注入方先于其
    /// 依赖完成替换，注入时捕获的是依赖替换前的句柄；需要依赖的
    /// 最终值时从容器重新读取。未出现在依赖图里的 bean 不经过
    /// 注入链。
    fn bean_injected_stage(&self) -> ContainerResult<()> {
        let mut order = self.ctx.graph().sort()?;
        order.reverse();
        if !order.is_empty() {
            debug!("Injection order: {:?}", order);
        }
        self.apply_chain(FilterPhase::BeanInjected, &order)?;
        for participant in &self.participants {
            participant.after_initialization(&self.ctx)?;
        }
        Ok(())
    }

    /// Main 阶段：逐个询问参与者，派发后台任务并按指令执行 destroy
    fn main_stage(&self) -> ContainerResult<()> {
        for participant in &self.participants {
            let directive = participant.on_main(&self.ctx)?;
            if let Some(continuation) = directive.continuation {
                debug!("Dispatching continuation for participant '{}'", participant.name());
                dispatch_continuation(continuation);
            }
            if directive.run_destroy {
                info!("Running destroy for participant '{}'", participant.name());
                participant.destroy(&self.ctx)?;
            }
        }
        Ok(())
    }

    /// 链应用循环：过滤器在外层，bean 在内层
    ///
    /// 作用范围在每个 bean 上按其命名空间裁决。名称已不在注册表
    /// 的跳过，比如为图里声明过却从未注册的节点。
    fn apply_chain(&self, phase: FilterPhase, names: &[String]) -> ContainerResult<()> {
        let chain = self.ctx.chains().chain(phase);
        if chain.is_empty() || names.is_empty() {
            return Ok(());
        }
        debug!(
            "Applying {} filter(s) at phase {} over {} bean(s)",
            chain.len(),
            phase,
            names.len()
        );
        for filter in &chain {
            for name in names {
                let Some(ty) = self.ctx.type_of(name) else {
                    trace!("Skipping '{}' at phase {}: not a registered bean", name, phase);
                    continue;
                };
                self.ctx.update_any_with(name, &ty, |is_single, bean| {
                    if filter.mode.accepts(is_single) {
                        trace!("Filter '{}' visiting bean '{}'", filter.name, name);
                        (filter.func)(bean, name)
                    } else {
                        Ok(None)
                    }
                })?;
            }
        }
        Ok(())
    }

    /// 安装自动装配过滤器
    ///
    /// TagInitialized 链末尾追加遍历器实例化过滤器，BeanInjected
    /// 链末尾追加注入过滤器。没有注册遍历器时两者都是空转。
    fn install_walker_filters(&self) {
        let registry = Arc::clone(self.ctx.registry());
        let graph = Arc::clone(self.ctx.graph());
        let walkers = self.ctx.walker_list();
        self.ctx.add_filter(
            FilterPhase::TagInitialized,
            FilterMode::All,
            "walker-instantiate",
            move |bean, name| {
                let mut sink = WiringSink::new();
                let mut replaced: Option<BeanHandle> = None;
                for walker in walkers.read().iter() {
                    let current = replaced.as_ref().unwrap_or(bean);
                    if let Some(next) = walker.instantiate(current, name, &mut sink)? {
                        replaced = Some(next);
                    }
                }
                for (owner, dependency) in sink.drain() {
                    declare_dependency_on(&registry, &graph, &owner, &dependency);
                }
                Ok(replaced)
            },
        );

        let registry = Arc::clone(self.ctx.registry());
        let walkers = self.ctx.walker_list();
        self.ctx.add_filter(
            FilterPhase::BeanInjected,
            FilterMode::All,
            "walker-inject",
            move |bean, name| {
                let mut replaced: Option<BeanHandle> = None;
                for walker in walkers.read().iter() {
                    let current = replaced.as_ref().unwrap_or(bean);
                    if let Some(next) = walker.inject(current, name, registry.as_ref())? {
                        replaced = Some(next);
                    }
                }
                Ok(replaced)
            },
        );
        debug!("Auto wiring filters installed");
    }
}

/// 后台派发 Main 阶段的 continuation
///
/// 处于 tokio 运行时内时交给运行时执行，否则退化为独立线程。
fn dispatch_continuation(continuation: Continuation) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                continuation();
            });
        }
        Err(_) => {
            warn!("No tokio runtime available, running continuation on a plain thread");
            std::thread::spawn(move || {
                continuation();
            });
        }
    }
}
