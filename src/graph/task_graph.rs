use crate::task::{Task, TaskId};
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use std::collections::HashMap;

/// Predecessor links as a directed graph with edges `predecessor -> task`.
pub struct TaskGraph {
    pub graph: DiGraph<TaskId, ()>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<TaskId, ()> = DiGraph::new();
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::new();

        // Add nodes first
        for task in tasks {
            let node_ix = graph.add_node(task.id.clone());
            id_to_index.insert(task.id.clone(), node_ix);
        }

        // Predecessors that are not in the list are ignored
        for task in tasks {
            let Some(&v) = id_to_index.get(&task.id) else {
                continue;
            };
            for pred_id in &task.predecessors {
                if let Some(&u) = id_to_index.get(pred_id) {
                    graph.add_edge(u, v, ());
                }
            }
        }

        Self { graph, id_to_index }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Whether `ancestor` is reachable from `task` by following predecessor
    /// links backwards. Each node is visited at most once.
    pub fn depends_on(&self, task: &str, ancestor: &str) -> bool {
        let (Some(&start), Some(&target)) =
            (self.id_to_index.get(task), self.id_to_index.get(ancestor))
        else {
            return false;
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        while let Some(node_ix) = dfs.next(reversed) {
            if node_ix == target && node_ix != start {
                return true;
            }
        }
        false
    }

    pub fn successors(&self, id: &str) -> Vec<TaskId> {
        let Some(&node_ix) = self.id_to_index.get(id) else {
            return Vec::new();
        };
        let mut successors: Vec<TaskId> = self
            .graph
            .neighbors_directed(node_ix, Direction::Outgoing)
            .map(|succ_ix| self.graph[succ_ix].clone())
            .collect();
        successors.sort();
        successors.dedup();
        successors
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, preds: &[&str]) -> Task {
        let mut task = Task::new(id, id.to_uppercase());
        task.predecessors = preds.iter().map(|p| p.to_string()).collect();
        task
    }

    #[test]
    fn follows_predecessor_chain_through_diamond() {
        // a -> {b, c} -> d
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["b", "c"]),
        ];
        let graph = TaskGraph::build(&tasks);
        assert!(graph.depends_on("d", "a"));
        assert!(graph.depends_on("d", "c"));
        assert!(!graph.depends_on("a", "d"));
        assert!(!graph.depends_on("b", "c"));
        assert!(!graph.has_cycle());
        assert_eq!(graph.successors("a"), vec!["b", "c"]);
    }

    #[test]
    fn unknown_ids_and_dangling_predecessors_are_ignored() {
        let tasks = vec![task("a", &["ghost"])];
        let graph = TaskGraph::build(&tasks);
        assert!(!graph.depends_on("a", "ghost"));
        assert!(!graph.depends_on("ghost", "a"));
        assert!(graph.contains("a"));
        assert!(!graph.contains("ghost"));
    }

    #[test]
    fn detects_existing_cycles() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];
        assert!(TaskGraph::build(&tasks).has_cycle());
    }
}
