//! Execution planning
//!
//! Turns a validated [`TaskGraph`] and a requested target set into a
//! deterministic, topologically sorted execution order. Only tasks in the
//! transitive `dependsOn` closure of the targets are planned; unrequested
//! tasks are never run as a side effect. Finalizers are pulled in by the
//! runner at execution time, not here.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet, VecDeque};

use crate::graph::TaskGraph;
use crate::types::GantryResult;

/// A concrete execution order for a requested target set.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub targets: Vec<String>,
    /// Task indices in execution order: every task appears strictly after
    /// all of its `dependsOn` prerequisites.
    pub order: Vec<usize>,
}

impl ExecutionPlan {
    /// Task names in execution order.
    pub fn task_names(&self, graph: &TaskGraph) -> Vec<String> {
        self.order
            .iter()
            .map(|&i| graph.task(i).name.clone())
            .collect()
    }
}

/// Build the execution plan for `targets`.
///
/// Validates the graph first, so a cycle or an unknown target aborts
/// before anything is scheduled.
///
/// # Errors
///
/// Returns [`crate::types::GantryError::CycleDetected`] for cyclic graphs
/// and [`crate::types::GantryError::UnknownTask`] for unresolvable target
/// names.
pub fn build_plan(graph: &TaskGraph, targets: &[String]) -> GantryResult<ExecutionPlan> {
    graph.validate()?;

    let mut start = Vec::new();
    for target in targets {
        start.push(graph.index_of(target, "requested targets")?);
    }

    // Transitive dependsOn closure of the targets.
    let mut closure = HashSet::new();
    let mut queue: VecDeque<usize> = start.iter().copied().collect();
    while let Some(index) = queue.pop_front() {
        if !closure.insert(index) {
            continue;
        }
        for edge in graph.dependencies(index) {
            queue.push_back(edge.prerequisite);
        }
    }

    let order = topo_order(graph, &closure);

    // validate() already ruled out cycles, so the sort always drains.
    debug_assert_eq!(order.len(), closure.len());

    Ok(ExecutionPlan {
        targets: targets.to_vec(),
        order,
    })
}

/// Topologically sort a set of task indices by their `dependsOn` edges.
///
/// Kahn's algorithm; the ready set is a min-heap on declaration index,
/// which makes the tie-break among unordered tasks deterministic:
/// declaration order wins. Edges leaving the set are ignored. Assumes the
/// set is cycle-free (callers validate first).
pub(crate) fn topo_order(graph: &TaskGraph, closure: &HashSet<usize>) -> Vec<usize> {
    let mut indegree = vec![0usize; graph.len()];
    for &index in closure {
        for edge in graph.dependencies(index) {
            if closure.contains(&edge.prerequisite) {
                indegree[index] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = closure
        .iter()
        .filter(|&&index| indegree[index] == 0)
        .map(|&index| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(closure.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        // Unblock dependents inside the closure.
        for &candidate in closure {
            for edge in graph.dependencies(candidate) {
                if edge.prerequisite == index {
                    indegree[candidate] -= 1;
                    if indegree[candidate] == 0 {
                        ready.push(Reverse(candidate));
                    }
                }
            }
        }
    }

    order
}
