//! Explicit summary-task tree.
//!
//! A task's parent is its `parent_id` when that names another task in the
//! list. Otherwise the parent is the nearest preceding task with a lower
//! `level`, which reproduces the classic outline layout where a summary is
//! followed by its subtree. Parent links that would form a loop are dropped
//! and the task becomes a root.

use crate::task::{Task, TaskId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TaskTree {
    index: HashMap<TaskId, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskTree {
    pub fn build(tasks: &[Task]) -> Self {
        let mut index = HashMap::with_capacity(tasks.len());
        for (idx, task) in tasks.iter().enumerate() {
            index.entry(task.id.clone()).or_insert(idx);
        }

        let mut parents: Vec<Option<usize>> = Vec::with_capacity(tasks.len());
        let mut outline: Vec<usize> = Vec::new();
        for (idx, task) in tasks.iter().enumerate() {
            while outline
                .last()
                .is_some_and(|&top| tasks[top].level >= task.level)
            {
                outline.pop();
            }
            let explicit = task
                .parent_id
                .as_ref()
                .and_then(|id| index.get(id).copied())
                .filter(|&parent| parent != idx);
            parents.push(explicit.or_else(|| outline.last().copied()));
            outline.push(idx);
        }

        for idx in 0..parents.len() {
            if Self::loops_back(&parents, idx) {
                parents[idx] = None;
            }
        }

        let mut children = vec![Vec::new(); tasks.len()];
        let mut roots = Vec::new();
        for (idx, parent) in parents.iter().enumerate() {
            match parent {
                Some(parent) => children[*parent].push(idx),
                None => roots.push(idx),
            }
        }

        Self {
            index,
            parents,
            children,
            roots,
        }
    }

    fn loops_back(parents: &[Option<usize>], idx: usize) -> bool {
        let mut current = parents[idx];
        let mut steps = 0;
        while let Some(node) = current {
            if node == idx {
                return true;
            }
            steps += 1;
            if steps > parents.len() {
                // a loop further up that does not include idx
                return false;
            }
            current = parents[node];
        }
        false
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Every task below `idx`, in depth-first order.
    pub fn descendants(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children(idx).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Children before parents. Tasks whose parent chain loops are never
    /// reached from a root, so their loop members are skipped.
    pub fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut visited = HashSet::with_capacity(self.len());
        for &root in &self.roots {
            let mut stack = vec![(root, false)];
            while let Some((node, expanded)) = stack.pop() {
                if expanded {
                    order.push(node);
                    continue;
                }
                if !visited.insert(node) {
                    continue;
                }
                stack.push((node, true));
                for &child in self.children(node).iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        order
    }
}
