//! Dependency levels
//!
//! Groups a planned execution order into levels for bounded parallel
//! execution: tasks within a level have no ordering relationship to each
//! other, and every task's prerequisites live in strictly earlier levels.

use std::collections::{HashMap, HashSet};

use crate::graph::TaskGraph;

/// Group a topologically ordered task list into dependency levels.
///
/// A task's level is one past the deepest level of its prerequisites
/// within the list; tasks with no in-list prerequisites form level zero.
/// Plan order is preserved within a level, so the grouping is as
/// deterministic as the plan itself.
pub fn group_into_levels(graph: &TaskGraph, order: &[usize]) -> Vec<Vec<usize>> {
    let in_plan: HashSet<usize> = order.iter().copied().collect();
    let mut level_of: HashMap<usize, usize> = HashMap::new();
    let mut levels: Vec<Vec<usize>> = Vec::new();

    // `order` is topological, so prerequisites are assigned before their
    // dependents.
    for &index in order {
        let level = graph
            .dependencies(index)
            .iter()
            .filter(|edge| in_plan.contains(&edge.prerequisite))
            .filter_map(|edge| level_of.get(&edge.prerequisite))
            .max()
            .map_or(0, |deepest| deepest + 1);

        level_of.insert(index, level);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(index);
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::build_plan;
    use crate::task::{noop_action, Task};

    fn graph_with(names: &[&str]) -> TaskGraph {
        let mut graph = TaskGraph::new();
        for name in names {
            graph
                .add_task(Task::new(*name, noop_action()))
                .expect("unique names");
        }
        graph
    }

    #[test]
    fn independent_tasks_share_a_level() {
        let mut graph = graph_with(&["lint", "compile", "test"]);
        graph.add_dependency("test", "compile").unwrap();

        let plan = build_plan(
            &graph,
            &["lint".to_string(), "test".to_string()],
        )
        .expect("plan should build");
        let levels = group_into_levels(&graph, &plan.order);

        assert_eq!(levels.len(), 2);
        // lint and compile have no ordering between them.
        let level_names: Vec<String> = levels[0]
            .iter()
            .map(|&i| graph.task(i).name.clone())
            .collect();
        assert_eq!(level_names, vec!["lint", "compile"]);
        assert_eq!(graph.task(levels[1][0]).name, "test");
    }

    #[test]
    fn chains_produce_one_task_per_level() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_dependency("b", "a").unwrap();
        graph.add_dependency("c", "b").unwrap();

        let plan = build_plan(&graph, &["c".to_string()]).expect("plan should build");
        let levels = group_into_levels(&graph, &plan.order);

        assert_eq!(levels.len(), 3);
        assert!(levels.iter().all(|level| level.len() == 1));
    }
}
