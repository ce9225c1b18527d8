//! 依赖图
//!
//! 记录 bean 之间的依赖边并给出依赖优先的拓扑序。邻接表用
//! 前向星存储（被依赖方头指针 + 链式下标），避免为每个节点
//! 维护一个独立的边列表。节点在加边时即登记入度表，只出现
//! 在边一端的节点同样参与排序输出。

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{ContainerError, ContainerResult};

/// 依赖边：src 依赖 to
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct DependencyEdge {
    pub src: String,
    pub to: String,
}

/// 前向星单元
#[derive(Debug, Clone)]
struct EdgeCell {
    /// 依赖方节点，即边的 src 端
    dependent: String,
    /// 同一被依赖方的下一条边下标，0 为空
    next: usize,
}

#[derive(Default)]
struct GraphState {
    /// 去重后的边集，插入序
    edges: IndexSet<DependencyEdge>,
    /// 节点 -> 入度，加边时两端都登记
    degrees: IndexMap<String, usize>,
    /// 前向星单元，下标 0 为哨兵
    cells: Vec<EdgeCell>,
    /// 被依赖方 -> 首个单元下标
    heads: IndexMap<String, usize>,
    /// 邻接表是否与边集同步
    built: bool,
}

/// 由边集重建前向星邻接表与入度表
fn materialize(st: &mut GraphState) {
    let GraphState {
        edges,
        degrees,
        cells,
        heads,
        built,
    } = st;
    for degree in degrees.values_mut() {
        *degree = 0;
    }
    cells.clear();
    cells.push(EdgeCell {
        dependent: String::new(),
        next: 0,
    });
    heads.clear();
    for edge in edges.iter() {
        if let Some(degree) = degrees.get_mut(&edge.src) {
            *degree += 1;
        }
        let next = heads.get(&edge.to).copied().unwrap_or(0);
        cells.push(EdgeCell {
            dependent: edge.src.clone(),
            next,
        });
        heads.insert(edge.to.clone(), cells.len() - 1);
    }
    *built = true;
}

/// 依赖图
pub struct DependencyGraph {
    state: RwLock<GraphState>,
}

impl DependencyGraph {
    /// 创建空图
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
        }
    }

    /// 记录一条依赖边
    ///
    /// 相同的 (src, to) 只记录一次；加边会使已构建的邻接表失效，
    /// 下次排序时重建。
    pub fn add_edge(&self, src: impl Into<String>, to: impl Into<String>) {
        let src = src.into().trim().to_string();
        let to = to.into().trim().to_string();
        if src.is_empty() || to.is_empty() {
            return;
        }
        let mut st = self.state.write();
        let edge = DependencyEdge { src, to };
        if st.edges.contains(&edge) {
            return;
        }
        trace!("Dependency edge recorded: {} -> {}", edge.src, edge.to);
        st.degrees.entry(edge.src.clone()).or_insert(0);
        st.degrees.entry(edge.to.clone()).or_insert(0);
        st.edges.insert(edge);
        st.built = false;
    }

    /// 依赖优先的拓扑排序
    ///
    /// Kahn 算法，FIFO 队列。边 (A, B) 表示 A 依赖 B，输出中 B
    /// 先于 A。同时就绪节点之间按入队先后出队，该顺序对固定的
    /// 加边序列是确定的，但不构成接口契约。入度在副本上递减，
    /// 重复调用返回相同结果。
    ///
    /// 空图返回空序列；存在环时报 [`ContainerError::CyclicDependency`]。
    pub fn sort(&self) -> ContainerResult<Vec<String>> {
        let mut st = self.state.write();
        if !st.built {
            materialize(&mut st);
        }
        if st.degrees.is_empty() {
            return Ok(Vec::new());
        }

        let mut pending: IndexMap<String, usize> = st.degrees.clone();
        let mut queue: VecDeque<String> = pending
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| node.clone())
            .collect();
        if queue.is_empty() {
            return Err(ContainerError::CyclicDependency(format!(
                "no dependency-free bean among {} nodes",
                pending.len()
            )));
        }

        let mut order = Vec::with_capacity(pending.len());
        while let Some(node) = queue.pop_front() {
            let mut idx = st.heads.get(&node).copied().unwrap_or(0);
            order.push(node);
            while idx != 0 {
                let cell = &st.cells[idx];
                let dependent = cell.dependent.clone();
                idx = cell.next;
                if let Some(degree) = pending.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() != pending.len() {
            return Err(ContainerError::CyclicDependency(format!(
                "sorted {} of {} beans, the remainder forms a cycle",
                order.len(),
                pending.len()
            )));
        }
        debug!("Dependency order resolved for {} beans", order.len());
        Ok(order)
    }

    /// 去重后的边数
    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }

    /// 参与排序的节点数
    pub fn node_count(&self) -> usize {
        self.state.read().degrees.len()
    }

    /// 当前边集快照，插入序
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.state.read().edges.iter().cloned().collect()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_single_edge() {
        let graph = DependencyGraph::new();
        graph.add_edge("repo", "db");

        assert_eq!(graph.sort().unwrap(), vec!["db", "repo"]);
    }

    #[test]
    fn test_sort_chain() {
        let graph = DependencyGraph::new();
        graph.add_edge("handler", "service");
        graph.add_edge("service", "repo");

        assert_eq!(graph.sort().unwrap(), vec!["repo", "service", "handler"]);
    }

    #[test]
    fn test_duplicate_edge_ignored() {
        let graph = DependencyGraph::new();
        graph.add_edge("repo", "db");
        graph.add_edge("repo", "db");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.sort().unwrap(), vec!["db", "repo"]);

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].src, "repo");
        assert_eq!(edges[0].to, "db");
    }

    #[test]
    fn test_sort_empty_graph() {
        let graph = DependencyGraph::new();
        assert!(graph.sort().unwrap().is_empty());
    }

    #[test]
    fn test_sort_repeatable() {
        let graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");

        let first = graph.sort().unwrap();
        let second = graph.sort().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_detected() {
        let graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        let err = graph.sort().unwrap_err();
        assert!(matches!(err, ContainerError::CyclicDependency(_)));
    }

    #[test]
    fn test_self_cycle_detected() {
        let graph = DependencyGraph::new();
        graph.add_edge("a", "a");

        assert!(matches!(
            graph.sort(),
            Err(ContainerError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_chain_into_cycle_detected() {
        // 环外的 leaf 可排出，环内节点排不出来
        let graph = DependencyGraph::new();
        graph.add_edge("a", "leaf");
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");

        let err = graph.sort().unwrap_err();
        match err {
            ContainerError::CyclicDependency(msg) => {
                assert!(msg.contains("cycle"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_add_edge_after_sort_rebuilds() {
        let graph = DependencyGraph::new();
        graph.add_edge("b", "c");
        assert_eq!(graph.sort().unwrap(), vec!["c", "b"]);

        graph.add_edge("a", "b");
        assert_eq!(graph.sort().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_shared_dependency_deterministic() {
        let graph = DependencyGraph::new();
        graph.add_edge("metrics", "conf");
        graph.add_edge("server", "conf");

        let order = graph.sort().unwrap();
        assert_eq!(order[0], "conf");
        assert_eq!(order.len(), 3);
        assert!(order.contains(&"metrics".to_string()));
        assert!(order.contains(&"server".to_string()));
        assert_eq!(order, graph.sort().unwrap());
    }

    #[test]
    fn test_fan_out_and_fan_in() {
        // app 依赖 cache 与 db，两者都依赖 conf
        let graph = DependencyGraph::new();
        graph.add_edge("app", "cache");
        graph.add_edge("app", "db");
        graph.add_edge("cache", "conf");
        graph.add_edge("db", "conf");

        let order = graph.sort().unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert_eq!(order[0], "conf");
        assert!(pos("cache") < pos("app"));
        assert!(pos("db") < pos("app"));
        assert_eq!(order.len(), 4);
    }
}
