//! Bean 注册表
//!
//! 双命名空间存储：single bean 以规范类型名为键，multi bean 以
//! 用户命名为键。一个类型同一时刻只能属于一个命名空间，冲突
//! 以结构化错误报告，绝不静默覆盖。

use std::any::Any;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{ContainerError, ContainerResult};

/// 类型擦除的 bean 句柄
pub type BeanHandle = Arc<dyn Any + Send + Sync>;

/// bean 所属命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanKind {
    Single,
    Multi,
}

/// 规范化 bean 名称或类型名
///
/// 去除首尾空白，剥掉最外层引用符号（`&` 以及紧随的 `mut `），
/// 使 `&MyType` 与 `MyType` 指向同一个 bean。
pub fn canonical_name(raw: &str) -> String {
    let mut name = raw.trim();
    if let Some(stripped) = name.strip_prefix('&') {
        name = stripped.strip_prefix("mut ").unwrap_or(stripped).trim();
    }
    name.to_string()
}

/// 取 Rust 类型的规范类型名
pub fn canonical_type_of<T: ?Sized>() -> String {
    canonical_name(std::any::type_name::<T>())
}

/// 只读查询接口
///
/// 注入阶段交给协作者（FieldWalker 等）的容器视图，
/// 只暴露查询，不含任何可变操作。
pub trait BeanLookup: Send + Sync {
    /// 是否存在指定名称或类型的 bean
    fn has_bean(&self, name_or_type: &str) -> bool;

    /// 指定类型是否已被任一命名空间占用
    fn has_bean_type(&self, type_name: &str) -> bool;

    /// 是否为 single bean
    fn is_single_bean(&self, name_or_type: &str) -> bool;

    /// 是否为 multi bean
    fn is_multi_bean(&self, name: &str) -> bool;

    /// 指定类型下全部 multi bean 名称，按注册顺序
    fn multi_bean_names(&self, type_name: &str) -> Vec<String>;

    /// 查询 bean 名称对应的类型名
    fn type_of(&self, name: &str) -> Option<String>;

    /// 通过名称或类型获取 bean，先查 single 再查 multi
    fn get_bean(&self, name_or_type: &str) -> ContainerResult<BeanHandle>;
}

/// 注册表内部状态
///
/// 所有映射放在同一把锁下，保证命名空间互斥检查与写入的原子性。
#[derive(Default)]
struct RegistryState {
    /// 规范类型名 -> single bean
    singles: IndexMap<String, BeanHandle>,
    /// bean 名称 -> multi bean
    multis: IndexMap<String, BeanHandle>,
    /// bean 名称 -> 规范类型名，覆盖两个命名空间
    names: IndexMap<String, String>,
    /// 规范类型名 -> 该类型下的 multi bean 名称（反向索引）
    by_type: IndexMap<String, IndexSet<String>>,
    /// 规范类型名 -> 所属命名空间
    kinds: IndexMap<String, BeanKind>,
}

fn is_single_key(st: &RegistryState, key: &str) -> bool {
    matches!(st.kinds.get(key), Some(BeanKind::Single))
}

/// key 被 single 命名空间占用时返回描述信息
fn single_claim(st: &RegistryState, key: &str) -> Option<String> {
    is_single_key(st, key).then(|| format!("'{}' is already a single bean type", key))
}

/// key 被 multi 命名空间占用时返回描述信息
fn multi_claim(st: &RegistryState, key: &str) -> Option<String> {
    if st.multis.contains_key(key) {
        return Some(format!("'{}' is already a multi bean name", key));
    }
    if matches!(st.kinds.get(key), Some(BeanKind::Multi)) {
        return Some(format!("'{}' is already a multi bean type", key));
    }
    None
}

/// Bean 注册表
pub struct BeanRegistry {
    state: RwLock<RegistryState>,
}

impl BeanRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// 注册一个 single bean，类型名取自值本身
    ///
    /// 同类型重复注册返回 [`ContainerError::DuplicateType`]；
    /// 类型名已被 multi 命名空间占用返回 [`ContainerError::NamespaceConflict`]。
    pub fn add_single<T: Any + Send + Sync>(&self, bean: T) -> ContainerResult<()> {
        self.add_single_handle(&canonical_type_of::<T>(), Arc::new(bean))
    }

    /// 注册一个已擦除类型的 single bean
    pub fn add_single_handle(&self, type_name: &str, handle: BeanHandle) -> ContainerResult<()> {
        let ty = canonical_name(type_name);
        if ty.is_empty() {
            return Err(anyhow::anyhow!("single bean type name must not be empty").into());
        }
        let mut st = self.state.write();
        if st.singles.contains_key(&ty) {
            return Err(ContainerError::DuplicateType(ty));
        }
        if let Some(conflict) = multi_claim(&st, &ty) {
            return Err(ContainerError::NamespaceConflict(conflict));
        }
        st.names.insert(ty.clone(), ty.clone());
        st.kinds.insert(ty.clone(), BeanKind::Single);
        st.singles.insert(ty.clone(), handle);
        debug!("Registered single bean: {}", ty);
        Ok(())
    }

    /// 注册一个命名的 multi bean
    ///
    /// 名称或类型与 single 命名空间冲突时报错；名称已存在时
    /// 保留首个值并返回 `Ok(false)`，空名称同样返回 `Ok(false)`。
    pub fn add_multi<T: Any + Send + Sync>(
        &self,
        name: &str,
        bean: T,
    ) -> ContainerResult<bool> {
        self.add_multi_handle(name, &canonical_type_of::<T>(), Arc::new(bean))
    }

    /// 注册一个已擦除类型的 multi bean
    pub fn add_multi_handle(
        &self,
        name: &str,
        type_name: &str,
        handle: BeanHandle,
    ) -> ContainerResult<bool> {
        let name = canonical_name(name);
        if name.is_empty() {
            return Ok(false);
        }
        let ty = canonical_name(type_name);
        let mut st = self.state.write();
        if let Some(conflict) = single_claim(&st, &name).or_else(|| single_claim(&st, &ty)) {
            return Err(ContainerError::NamespaceConflict(conflict));
        }
        if st.multis.contains_key(&name) {
            trace!("Multi bean '{}' already registered, keeping first value", name);
            return Ok(false);
        }
        st.names.insert(name.clone(), ty.clone());
        st.kinds.insert(ty.clone(), BeanKind::Multi);
        st.by_type.entry(ty.clone()).or_default().insert(name.clone());
        st.multis.insert(name.clone(), handle);
        debug!("Registered multi bean '{}' of type {}", name, ty);
        Ok(true)
    }

    /// 获取 single bean 并下转到具体类型
    pub fn get_single<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        let ty = canonical_type_of::<T>();
        let handle = {
            let st = self.state.read();
            match st.singles.get(&ty) {
                Some(handle) => Arc::clone(handle),
                None => return Err(ContainerError::NotFound(ty)),
            }
        };
        handle.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            name: ty.clone(),
            expected: ty,
        })
    }

    /// 用过滤器更新 single bean
    ///
    /// 目标不存在时返回 `Ok(false)` 且不调用过滤器。过滤器返回
    /// `None` 保持原值，`Some` 替换，出错时原值保留并包装为
    /// [`ContainerError::FilterFailure`]。过滤器在锁外执行，
    /// 允许其通过 [`BeanLookup`] 回查容器。
    pub fn update_single_with<F>(&self, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(&BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        let ty = canonical_name(type_name);
        let current = {
            let st = self.state.read();
            if let Some(conflict) = multi_claim(&st, &ty) {
                return Err(ContainerError::NamespaceConflict(conflict));
            }
            match st.singles.get(&ty) {
                Some(handle) => Arc::clone(handle),
                None => return Ok(false),
            }
        };
        match f(&current) {
            Ok(Some(next)) => {
                let mut st = self.state.write();
                if let Some(slot) = st.singles.get_mut(&ty) {
                    *slot = next;
                    trace!("Single bean replaced: {}", ty);
                }
                Ok(true)
            }
            Ok(None) => Ok(true),
            Err(e) => Err(ContainerError::FilterFailure { bean: ty, source: e }),
        }
    }

    /// 用过滤器更新 multi bean，语义与 [`Self::update_single_with`] 对称
    pub fn update_multi_with<F>(&self, name: &str, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(&BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        let name = canonical_name(name);
        let ty = canonical_name(type_name);
        let current = {
            let st = self.state.read();
            if let Some(conflict) = single_claim(&st, &name).or_else(|| single_claim(&st, &ty)) {
                return Err(ContainerError::NamespaceConflict(conflict));
            }
            match st.multis.get(&name) {
                Some(handle) => Arc::clone(handle),
                None => return Ok(false),
            }
        };
        match f(&current) {
            Ok(Some(next)) => {
                let mut st = self.state.write();
                if let Some(slot) = st.multis.get_mut(&name) {
                    *slot = next;
                    trace!("Multi bean replaced: {}", name);
                }
                Ok(true)
            }
            Ok(None) => Ok(true),
            Err(e) => Err(ContainerError::FilterFailure { bean: name, source: e }),
        }
    }

    /// 按名称与类型更新任意命名空间的 bean
    ///
    /// 先尝试 single 路径（回调收到 `is_single = true`），否则走
    /// multi 路径；两个命名空间都没有时返回 `Ok(false)`。
    pub fn update_any_with<F>(&self, name: &str, type_name: &str, f: F) -> ContainerResult<bool>
    where
        F: FnOnce(bool, &BeanHandle) -> anyhow::Result<Option<BeanHandle>>,
    {
        let name = canonical_name(name);
        let ty = canonical_name(type_name);
        let single = {
            let st = self.state.read();
            is_single_key(&st, &ty) || is_single_key(&st, &name)
        };
        if single {
            self.update_single_with(&ty, |bean| f(true, bean))
        } else {
            self.update_multi_with(&name, &ty, |bean| f(false, bean))
        }
    }

    /// 直接替换 single bean 的值
    pub fn update_single(&self, type_name: &str, handle: BeanHandle) -> ContainerResult<bool> {
        self.update_single_with(type_name, move |_| Ok(Some(handle)))
    }

    /// 直接替换 multi bean 的值
    pub fn update_multi(
        &self,
        name: &str,
        type_name: &str,
        handle: BeanHandle,
    ) -> ContainerResult<bool> {
        self.update_multi_with(name, type_name, move |_| Ok(Some(handle)))
    }

    /// 移除 single bean，同时释放类型占用，允许重新注册
    pub fn remove_single(&self, type_name: &str) -> ContainerResult<bool> {
        let ty = canonical_name(type_name);
        let mut st = self.state.write();
        if st.singles.shift_remove(&ty).is_some() {
            st.names.shift_remove(&ty);
            st.kinds.shift_remove(&ty);
            debug!("Removed single bean: {}", ty);
            return Ok(true);
        }
        if multi_claim(&st, &ty).is_some() {
            return Err(ContainerError::NamespaceConflict(format!(
                "'{}' is not a single bean, it belongs to the multi namespace",
                ty
            )));
        }
        Ok(false)
    }

    /// 移除命名的 multi bean 并维护反向索引
    ///
    /// 该类型最后一个名称被移除时释放类型占用。
    pub fn remove_multi(&self, name: &str, type_name: &str) -> ContainerResult<bool> {
        let name = canonical_name(name);
        if name.is_empty() {
            return Ok(false);
        }
        let ty = canonical_name(type_name);
        let mut st = self.state.write();
        if st.multis.contains_key(&name) && matches!(st.kinds.get(&ty), Some(BeanKind::Multi)) {
            st.multis.shift_remove(&name);
            st.names.shift_remove(&name);
            let emptied = match st.by_type.get_mut(&ty) {
                Some(names) => {
                    names.shift_remove(&name);
                    names.is_empty()
                }
                None => false,
            };
            if emptied {
                st.by_type.shift_remove(&ty);
                st.kinds.shift_remove(&ty);
            }
            debug!("Removed multi bean '{}' of type {}", name, ty);
            return Ok(true);
        }
        if is_single_key(&st, &ty) || is_single_key(&st, &name) {
            return Err(ContainerError::NamespaceConflict(format!(
                "'{}' is not a multi bean, it belongs to the single namespace",
                name
            )));
        }
        Ok(false)
    }

    /// 全部 bean 名称，按注册顺序，覆盖两个命名空间
    pub fn all_bean_names(&self) -> Vec<String> {
        self.state.read().names.keys().cloned().collect()
    }

    /// 已注册 bean 总数
    pub fn bean_count(&self) -> usize {
        self.state.read().names.len()
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanLookup for BeanRegistry {
    fn has_bean(&self, name_or_type: &str) -> bool {
        let key = canonical_name(name_or_type);
        let st = self.state.read();
        st.singles.contains_key(&key) || st.multis.contains_key(&key)
    }

    fn has_bean_type(&self, type_name: &str) -> bool {
        let ty = canonical_name(type_name);
        self.state.read().kinds.contains_key(&ty)
    }

    fn is_single_bean(&self, name_or_type: &str) -> bool {
        let key = canonical_name(name_or_type);
        is_single_key(&self.state.read(), &key)
    }

    fn is_multi_bean(&self, name: &str) -> bool {
        let key = canonical_name(name);
        self.state.read().multis.contains_key(&key)
    }

    fn multi_bean_names(&self, type_name: &str) -> Vec<String> {
        let ty = canonical_name(type_name);
        let st = self.state.read();
        st.by_type
            .get(&ty)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn type_of(&self, name: &str) -> Option<String> {
        let key = canonical_name(name);
        self.state.read().names.get(&key).cloned()
    }

    fn get_bean(&self, name_or_type: &str) -> ContainerResult<BeanHandle> {
        let key = canonical_name(name_or_type);
        let st = self.state.read();
        if let Some(handle) = st.singles.get(&key) {
            return Ok(Arc::clone(handle));
        }
        if let Some(handle) = st.multis.get(&key) {
            return Ok(Arc::clone(handle));
        }
        Err(ContainerError::NotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct UserRepo {
        dsn: String,
    }

    #[derive(Debug)]
    struct OrderService;

    fn repo(dsn: &str) -> UserRepo {
        UserRepo { dsn: dsn.to_string() }
    }

    #[test]
    fn test_canonical_name_strips_reference() {
        assert_eq!(canonical_name("  MyType "), "MyType");
        assert_eq!(canonical_name("&core::Db"), "core::Db");
        assert_eq!(canonical_name("&mut core::Db"), "core::Db");
        assert_eq!(canonical_name("&&core::Db"), "&core::Db");
        assert_eq!(canonical_name("   "), "");
    }

    #[test]
    fn test_add_single_and_get() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("pg://main")).unwrap();

        let fetched = registry.get_single::<UserRepo>().unwrap();
        assert_eq!(fetched.dsn, "pg://main");

        let ty = canonical_type_of::<UserRepo>();
        assert!(registry.has_bean(&ty));
        assert!(registry.is_single_bean(&ty));
        assert!(registry.has_bean_type(&ty));
        assert_eq!(registry.type_of(&ty), Some(ty.clone()));
    }

    #[test]
    fn test_duplicate_single_rejected() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();

        let err = registry.add_single(repo("b")).unwrap_err();
        assert!(matches!(err, ContainerError::DuplicateType(_)));

        // 原值保留
        assert_eq!(registry.get_single::<UserRepo>().unwrap().dsn, "a");
    }

    #[test]
    fn test_single_then_multi_conflict() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();

        let err = registry.add_multi("primary", repo("b")).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));
    }

    #[test]
    fn test_multi_then_single_conflict() {
        let registry = BeanRegistry::new();
        registry.add_multi("primary", repo("a")).unwrap();

        let err = registry.add_single(repo("b")).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));
    }

    #[test]
    fn test_multi_name_colliding_with_single_type() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        let err = registry.add_multi(&ty, OrderService).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));
    }

    #[test]
    fn test_add_multi_idempotent() {
        let registry = BeanRegistry::new();
        assert!(registry.add_multi("primary", repo("first")).unwrap());
        assert!(!registry.add_multi("primary", repo("second")).unwrap());

        let handle = registry.get_bean("primary").unwrap();
        let bean = handle.downcast::<UserRepo>().unwrap();
        assert_eq!(bean.dsn, "first");
    }

    #[test]
    fn test_add_multi_empty_name_is_noop() {
        let registry = BeanRegistry::new();
        assert!(!registry.add_multi("   ", repo("a")).unwrap());
        assert_eq!(registry.bean_count(), 0);
    }

    #[test]
    fn test_get_bean_resolves_single_then_multi() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("single")).unwrap();
        registry.add_multi("named", OrderService).unwrap();

        assert!(registry.get_bean(&canonical_type_of::<UserRepo>()).is_ok());
        assert!(registry.get_bean("named").is_ok());
        assert!(matches!(
            registry.get_bean("missing"),
            Err(ContainerError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_single_missing_returns_false() {
        let registry = BeanRegistry::new();
        let mut invoked = false;
        let updated = registry
            .update_single_with("TypeNotRegistered", |_| {
                invoked = true;
                Ok(None)
            })
            .unwrap();
        assert!(!updated);
        assert!(!invoked);
    }

    #[test]
    fn test_update_filter_replaces_value() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("old")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        let updated = registry
            .update_single_with(&ty, |_| Ok(Some(Arc::new(repo("new")))))
            .unwrap();
        assert!(updated);
        assert_eq!(registry.get_single::<UserRepo>().unwrap().dsn, "new");
    }

    #[test]
    fn test_update_filter_none_keeps_value() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("keep")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        assert!(registry.update_single_with(&ty, |_| Ok(None)).unwrap());
        assert_eq!(registry.get_single::<UserRepo>().unwrap().dsn, "keep");
    }

    #[test]
    fn test_update_filter_error_keeps_old_value() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("stable")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        let err = registry
            .update_single_with(&ty, |_| Err(anyhow::anyhow!("broken pipe")))
            .unwrap_err();
        assert!(matches!(err, ContainerError::FilterFailure { .. }));
        assert_eq!(registry.get_single::<UserRepo>().unwrap().dsn, "stable");
    }

    #[test]
    fn test_update_single_on_multi_type_is_conflict() {
        let registry = BeanRegistry::new();
        registry.add_multi("primary", repo("a")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        let err = registry.update_single_with(&ty, |_| Ok(None)).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));
    }

    #[test]
    fn test_update_any_routes_both_namespaces() {
        let registry = BeanRegistry::new();
        registry.add_single(OrderService).unwrap();
        registry.add_multi("primary", repo("a")).unwrap();

        let single_ty = canonical_type_of::<OrderService>();
        let mut seen_single = None;
        registry
            .update_any_with(&single_ty, &single_ty, |is_single, _| {
                seen_single = Some(is_single);
                Ok(None)
            })
            .unwrap();
        assert_eq!(seen_single, Some(true));

        let multi_ty = canonical_type_of::<UserRepo>();
        let mut seen_multi = None;
        registry
            .update_any_with("primary", &multi_ty, |is_single, _| {
                seen_multi = Some(is_single);
                Ok(None)
            })
            .unwrap();
        assert_eq!(seen_multi, Some(false));

        assert!(!registry
            .update_any_with("ghost", "GhostType", |_, _| Ok(None))
            .unwrap());
    }

    #[test]
    fn test_remove_single_releases_type() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        assert!(registry.remove_single(&ty).unwrap());
        assert!(!registry.has_bean(&ty));
        assert!(!registry.has_bean_type(&ty));

        // 类型占用已释放，可重新注册
        registry.add_single(repo("b")).unwrap();
        assert_eq!(registry.get_single::<UserRepo>().unwrap().dsn, "b");
    }

    #[test]
    fn test_remove_multi_maintains_reverse_index() {
        let registry = BeanRegistry::new();
        registry.add_multi("first", repo("1")).unwrap();
        registry.add_multi("second", repo("2")).unwrap();
        registry.add_multi("third", repo("3")).unwrap();

        let ty = canonical_type_of::<UserRepo>();
        assert_eq!(registry.multi_bean_names(&ty), vec!["first", "second", "third"]);

        assert!(registry.remove_multi("second", &ty).unwrap());
        assert_eq!(registry.multi_bean_names(&ty), vec!["first", "third"]);
        assert!(!registry.has_bean("second"));

        assert!(registry.remove_multi("first", &ty).unwrap());
        assert!(registry.remove_multi("third", &ty).unwrap());
        // 最后一个名称移除后释放类型占用
        assert!(!registry.has_bean_type(&ty));
        registry.add_single(repo("again")).unwrap();
    }

    #[test]
    fn test_remove_wrong_namespace_errors() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();
        registry.add_multi("named", OrderService).unwrap();

        let single_ty = canonical_type_of::<UserRepo>();
        let multi_ty = canonical_type_of::<OrderService>();

        let err = registry.remove_multi("named", &single_ty).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));

        let err = registry.remove_single(&multi_ty).unwrap_err();
        assert!(matches!(err, ContainerError::NamespaceConflict(_)));

        assert!(!registry.remove_single("UnknownType").unwrap());
        assert!(!registry.remove_multi("unknown", "UnknownType").unwrap());
    }

    #[test]
    fn test_all_bean_names_in_registration_order() {
        let registry = BeanRegistry::new();
        registry.add_multi("zebra", repo("1")).unwrap();
        registry.add_single(OrderService).unwrap();
        registry.add_multi("ant", repo("2")).unwrap();

        let names = registry.all_bean_names();
        assert_eq!(names[0], "zebra");
        assert_eq!(names[1], canonical_type_of::<OrderService>());
        assert_eq!(names[2], "ant");
        assert_eq!(registry.bean_count(), 3);
    }

    #[test]
    fn test_get_single_type_mismatch() {
        let registry = BeanRegistry::new();
        let ty = canonical_type_of::<UserRepo>();
        registry
            .add_single_handle(&ty, Arc::new(OrderService))
            .unwrap();

        let err = registry.get_single::<UserRepo>().unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_lookup_by_reference_form() {
        let registry = BeanRegistry::new();
        registry.add_single(repo("a")).unwrap();

        let referenced = format!("&{}", canonical_type_of::<UserRepo>());
        assert!(registry.has_bean(&referenced));
        assert!(registry.get_bean(&referenced).is_ok());
    }
}
