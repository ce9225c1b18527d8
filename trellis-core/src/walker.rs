//! 字段遍历协作接口
//!
//! 核心不做任何反射或标签解析。字段元数据由外部协作者通过
//! 本接口交付：实例化遍历上报依赖声明并补全默认值，注入遍历
//! 从容器读取依赖、产出完成装配的 bean 值。手写的遍历器即可
//! 工作，派生宏层（不在本 crate 范围内）只是它的一种生成方式。

use crate::registry::{BeanHandle, BeanLookup};

/// 实例化遍历收集到的依赖声明
#[derive(Debug, Default)]
pub struct WiringSink {
    pairs: Vec<(String, String)>,
}

impl WiringSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明 owner_type 依赖 dependency
    ///
    /// owner_type 为 multi bean 类型时，上下文会为该类型下的
    /// 每个名称各展开一条边。
    pub fn depends_on(&mut self, owner_type: impl Into<String>, dependency: impl Into<String>) {
        self.pairs.push((owner_type.into(), dependency.into()));
    }

    /// 取走全部依赖声明
    pub fn drain(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.pairs)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// 字段遍历器
///
/// 不认识某个 bean 类型时返回 `Ok(None)` 且不上报任何内容，
/// 引擎会继续询问下一个遍历器。
pub trait FieldWalker: Send + Sync {
    /// 遍历器名称，用于日志
    fn name(&self) -> &str;

    /// 实例化遍历：补全声明的默认值，上报依赖对
    fn instantiate(
        &self,
        _bean: &BeanHandle,
        _bean_name: &str,
        _sink: &mut WiringSink,
    ) -> anyhow::Result<Option<BeanHandle>> {
        Ok(None)
    }

    /// 注入遍历：从容器读取依赖，产出完成装配的值
    fn inject(
        &self,
        _bean: &BeanHandle,
        _bean_name: &str,
        _beans: &dyn BeanLookup,
    ) -> anyhow::Result<Option<BeanHandle>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_collects_and_drains() {
        let mut sink = WiringSink::new();
        assert!(sink.is_empty());

        sink.depends_on("OrderService", "OrderRepo");
        sink.depends_on("OrderService", "Clock");
        assert_eq!(sink.len(), 2);

        let pairs = sink.drain();
        assert_eq!(
            pairs,
            vec![
                ("OrderService".to_string(), "OrderRepo".to_string()),
                ("OrderService".to_string(), "Clock".to_string()),
            ]
        );
        assert!(sink.is_empty());
    }
}
