//! Task dependency graph
//!
//! Holds the task set for one execution run together with its `dependsOn`
//! and `finalizedBy` edges. Registration is closed once a plan is built:
//! the graph is handed to the runner by value and never mutated during
//! execution.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::task::Task;
use crate::types::{GantryError, GantryResult};

/// How a `dependsOn` edge gates its dependent.
///
/// A `Failed` prerequisite always skips the dependent. The kinds differ
/// only in how a `Skipped` prerequisite is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// The prerequisite must reach a terminal status first; a skipped
    /// prerequisite still satisfies the edge.
    Ordered,
    /// The prerequisite must have succeeded; skipped counts as unsatisfied
    /// and the dependent is skipped with an upstream-failure reason.
    RequiresSuccess,
}

/// A `dependsOn` edge: the owning task waits for `prerequisite`.
#[derive(Debug, Clone, Copy)]
pub struct DependencyEdge {
    pub prerequisite: usize,
    pub kind: DependencyKind,
}

/// The dependency graph for one execution run.
///
/// Tasks are kept in declaration order; that order is the deterministic
/// tie-break for planning. Finalizer edges are deliberately kept out of
/// the `dependsOn` relation: they are not blocking precedence and are
/// excluded from cycle detection.
pub struct TaskGraph {
    tasks: Vec<Task>,
    name_to_index: HashMap<String, usize>,
    depends_on: Vec<Vec<DependencyEdge>>,
    finalized_by: Vec<Vec<usize>>,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            name_to_index: HashMap::new(),
            depends_on: Vec::new(),
            finalized_by: Vec::new(),
        }
    }

    /// Register a task.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::DuplicateTask`] if a task with the same name
    /// was already registered.
    pub fn add_task(&mut self, task: Task) -> GantryResult<usize> {
        if self.name_to_index.contains_key(&task.name) {
            return Err(GantryError::DuplicateTask(task.name.clone()));
        }
        let index = self.tasks.len();
        self.name_to_index.insert(task.name.clone(), index);
        self.tasks.push(task);
        self.depends_on.push(Vec::new());
        self.finalized_by.push(Vec::new());
        Ok(index)
    }

    /// Declare that `from` depends on `to` with the default ordering-only
    /// gating.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::UnknownTask`] if either endpoint is absent.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> GantryResult<()> {
        self.add_dependency_with(from, to, DependencyKind::Ordered)
    }

    /// Declare that `from` depends on `to` with an explicit edge kind.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::UnknownTask`] if either endpoint is absent.
    pub fn add_dependency_with(
        &mut self,
        from: &str,
        to: &str,
        kind: DependencyKind,
    ) -> GantryResult<()> {
        let from_index = self.resolve(from, from)?;
        let to_index = self.resolve(to, from)?;
        self.depends_on[from_index].push(DependencyEdge {
            prerequisite: to_index,
            kind,
        });
        Ok(())
    }

    /// Declare that `finalizer` runs after `trigger` finishes, success or
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::UnknownTask`] if either endpoint is absent.
    pub fn add_finalizer(&mut self, trigger: &str, finalizer: &str) -> GantryResult<()> {
        let trigger_index = self.resolve(trigger, trigger)?;
        let finalizer_index = self.resolve(finalizer, trigger)?;
        self.finalized_by[trigger_index].push(finalizer_index);
        Ok(())
    }

    /// Request that a task be skipped. Only meaningful before the run
    /// starts; the runner reports it as `Skipped` with the given reason.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::UnknownTask`] if the task is absent.
    pub fn skip(&mut self, name: &str, reason: impl Into<String>) -> GantryResult<()> {
        let index = self.resolve(name, name)?;
        self.tasks[index].skip_requested = Some(reason.into());
        Ok(())
    }

    /// Validate the `dependsOn` relation is acyclic.
    ///
    /// Finalizer edges are excluded: they order execution relative to a
    /// trigger but are not blocking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::CycleDetected`] naming the cycle's task
    /// sequence when one exists.
    pub fn validate(&self) -> GantryResult<()> {
        match self.find_cycles().into_iter().next() {
            Some(cycle) => Err(GantryError::CycleDetected(cycle)),
            None => Ok(()),
        }
    }

    /// All cycles in the `dependsOn` relation, each as a sorted task-name
    /// sequence, sorted overall for stable reporting.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut graph = DiGraph::<usize, ()>::new();
        let node_indices: Vec<NodeIndex> =
            (0..self.tasks.len()).map(|i| graph.add_node(i)).collect();

        for (dependent, edges) in self.depends_on.iter().enumerate() {
            for edge in edges {
                graph.add_edge(node_indices[dependent], node_indices[edge.prerequisite], ());
            }
        }

        // Strongly connected components of size > 1 are cycles; a
        // self-edge is a cycle of one.
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
            .into_iter()
            .filter_map(|component| {
                let is_cycle =
                    component.len() > 1 || graph.contains_edge(component[0], component[0]);
                if is_cycle {
                    let mut cycle: Vec<String> = component
                        .iter()
                        .map(|node| self.tasks[graph[*node]].name.clone())
                        .collect();
                    cycle.sort();
                    Some(cycle)
                } else {
                    None
                }
            })
            .collect();

        cycles.sort();
        cycles
    }

    /// Look up a task index by name.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::UnknownTask`] if the name is not registered,
    /// attributing the reference to `referenced_by`.
    pub fn index_of(&self, name: &str, referenced_by: &str) -> GantryResult<usize> {
        self.resolve(name, referenced_by)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn dependencies(&self, index: usize) -> &[DependencyEdge] {
        &self.depends_on[index]
    }

    /// Finalizers of a task, in declaration order.
    pub fn finalizers(&self, index: usize) -> &[usize] {
        &self.finalized_by[index]
    }

    /// Indices of tasks that appear as a finalizer of at least one trigger.
    pub fn finalizer_set(&self) -> Vec<usize> {
        let mut seen = vec![false; self.tasks.len()];
        for finalizers in &self.finalized_by {
            for &f in finalizers {
                seen[f] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter_map(|(i, &is_finalizer)| is_finalizer.then_some(i))
            .collect()
    }

    fn resolve(&self, name: &str, referenced_by: &str) -> GantryResult<usize> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| GantryError::UnknownTask {
                task: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }
}
