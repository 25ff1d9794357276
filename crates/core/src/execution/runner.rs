//! High-level task runner
//!
//! This module provides the main execution logic: it drives a planned task
//! order to completion, schedules finalizers immediately after their
//! triggers, propagates upstream failures as skips, and supports fail-fast,
//! per-task timeouts, cancellation, and bounded parallel execution.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use colored::*;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::console::{format_status, get_task_color};
use crate::graph::{DependencyKind, TaskGraph};
use crate::plan::{build_plan, topo_order, ExecutionPlan};
use crate::results::{RunResult, TaskResult};
use crate::task::{ActionError, FailureCause, SkipReason, TaskAction, TaskStatus};
use crate::types::GantryResult;

/// Options for one execution run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Mark every not-yet-started task skipped as soon as a failure is
    /// recorded, instead of running the remaining plan.
    pub fail_fast: bool,
    /// Time limit applied to each task action individually.
    pub timeout_per_task: Option<Duration>,
    /// Upper bound on concurrently running actions. `1` is the sequential
    /// baseline.
    pub max_parallel: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            timeout_per_task: None,
            max_parallel: 1,
        }
    }
}

/// Per-run mutable state. Only the driver loop touches it, so status
/// transitions need no synchronization even in parallel mode.
struct RunState {
    statuses: Vec<TaskStatus>,
    durations: Vec<u64>,
    /// Every task that reached a terminal status, in the order it did so.
    executed: Vec<usize>,
    /// Set once a failure is recorded with `fail_fast` enabled.
    aborted: bool,
    first_failure: Option<String>,
}

impl RunState {
    fn new(task_count: usize) -> Self {
        Self {
            statuses: vec![TaskStatus::Pending; task_count],
            durations: vec![0; task_count],
            executed: Vec::new(),
            aborted: false,
            first_failure: None,
        }
    }
}

/// Drives one execution run over a task graph.
///
/// The runner takes ownership of the graph: statuses are created fresh for
/// the run and the graph is never reused afterwards.
pub struct TaskRunner {
    graph: TaskGraph,
    options: RunOptions,
    cancel: CancellationToken,
}

impl TaskRunner {
    pub fn new(graph: TaskGraph, options: RunOptions) -> Self {
        Self {
            graph,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Handle for cancelling the run from elsewhere. Once cancelled,
    /// not-yet-started tasks are skipped; an in-flight action is awaited
    /// to its terminal status, never interrupted.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute the requested targets and their transitive prerequisites.
    ///
    /// # Errors
    ///
    /// Planning problems (cycles, unknown targets) abort before any action
    /// runs. Action failures never surface here; they are statuses in the
    /// returned [`RunResult`].
    pub async fn run(self, targets: &[String]) -> GantryResult<RunResult> {
        let plan = build_plan(&self.graph, targets)?;
        let started = Instant::now();
        let mut state = RunState::new(self.graph.len());

        if self.options.max_parallel > 1 {
            self.run_parallel(&plan, &mut state).await;
        } else {
            self.run_sequential(&plan, &mut state).await;
        }

        Ok(self.build_result(&plan, state, started))
    }

    async fn run_sequential(&self, plan: &ExecutionPlan, state: &mut RunState) {
        for &index in &plan.order {
            // Already terminal when an earlier entry pulled it in as a
            // finalizer (or a finalizer's prerequisite).
            if !state.statuses[index].is_terminal() {
                self.execute_entry(index, false, state).await;
            }
        }
    }

    async fn run_parallel(&self, plan: &ExecutionPlan, state: &mut RunState) {
        let levels = super::levels::group_into_levels(&self.graph, &plan.order);
        for level in levels {
            let mut waiting: VecDeque<usize> = level.into_iter().collect();
            let mut in_flight: JoinSet<(usize, Result<(), FailureCause>, u64)> = JoinSet::new();

            loop {
                while in_flight.len() < self.options.max_parallel {
                    let Some(index) = waiting.pop_front() else { break };
                    if state.statuses[index].is_terminal() {
                        continue;
                    }
                    if let Some(reason) = self.check_skip(index, state) {
                        self.record_skip(index, reason, state);
                        continue;
                    }
                    self.print_header(index);
                    state.statuses[index] = TaskStatus::Running;
                    let action = self.graph.task(index).action();
                    let timeout_per_task = self.options.timeout_per_task;
                    in_flight.spawn(async move {
                        let (outcome, duration_ms) =
                            invoke_action(action, timeout_per_task).await;
                        (index, outcome, duration_ms)
                    });
                }

                let Some(joined) = in_flight.join_next().await else { break };
                let Ok((index, outcome, duration_ms)) = joined else {
                    continue;
                };
                self.record_outcome(index, outcome, duration_ms, state);

                // Finalizers are serialized relative to their trigger's
                // completion; they run on the driver.
                let ran = matches!(
                    state.statuses[index],
                    TaskStatus::Succeeded | TaskStatus::Failed(_)
                );
                if ran {
                    for &finalizer in self.graph.finalizers(index) {
                        if !state.statuses[finalizer].is_terminal() {
                            self.execute_entry(finalizer, true, state).await;
                        }
                    }
                }
            }
        }
    }

    /// Execute `root` preceded by its still-pending prerequisites, firing
    /// finalizers immediately after each task that actually ran.
    ///
    /// Finalizer chains (and `root` itself when it is one) are exempt from
    /// the fail-fast abort: a task that ran gets its finalizers even when
    /// its own failure triggered the abort.
    async fn execute_entry(&self, root: usize, root_is_finalizer: bool, state: &mut RunState) {
        let chain = self.pending_chain(root, state);
        let mut exempt: HashSet<usize> = HashSet::new();
        if root_is_finalizer {
            exempt.extend(chain.iter().copied());
        }
        let mut queue: VecDeque<usize> = chain.into();
        while let Some(index) = queue.pop_front() {
            if state.statuses[index].is_terminal() {
                continue;
            }
            self.execute_task(index, exempt.contains(&index), state).await;

            let ran = matches!(
                state.statuses[index],
                TaskStatus::Succeeded | TaskStatus::Failed(_)
            );
            if !ran {
                continue;
            }

            // Finalizers run immediately after their trigger, ahead of
            // whatever else is queued. A finalizer already terminal (shared
            // trigger, or requested directly and run earlier) stays done.
            let mut chain: Vec<usize> = Vec::new();
            for &finalizer in self.graph.finalizers(index) {
                for entry in self.pending_chain(finalizer, state) {
                    if !chain.contains(&entry) {
                        chain.push(entry);
                    }
                }
            }
            for &entry in chain.iter().rev() {
                queue.push_front(entry);
                exempt.insert(entry);
            }
        }
    }

    async fn execute_task(&self, index: usize, exempt_from_abort: bool, state: &mut RunState) {
        if let Some(reason) = self.check_skip_with(index, exempt_from_abort, state) {
            self.record_skip(index, reason, state);
            return;
        }

        self.print_header(index);
        state.statuses[index] = TaskStatus::Running;
        let action = self.graph.task(index).action();
        let (outcome, duration_ms) = invoke_action(action, self.options.timeout_per_task).await;
        self.record_outcome(index, outcome, duration_ms, state);
    }

    /// Decide, before invoking the action, whether the task must be
    /// skipped. Ordered by precedence: cancellation, fail-fast abort,
    /// explicit skip request, disabled flag, upstream gating.
    fn check_skip(&self, index: usize, state: &RunState) -> Option<SkipReason> {
        self.check_skip_with(index, false, state)
    }

    fn check_skip_with(
        &self,
        index: usize,
        exempt_from_abort: bool,
        state: &RunState,
    ) -> Option<SkipReason> {
        if self.cancel.is_cancelled() {
            return Some(SkipReason::RunCancelled);
        }
        if state.aborted && !exempt_from_abort {
            return Some(SkipReason::FailFastAbort);
        }
        let task = self.graph.task(index);
        if let Some(reason) = &task.skip_requested {
            return Some(SkipReason::Requested(reason.clone()));
        }
        if !task.enabled {
            return Some(SkipReason::Disabled);
        }
        for edge in self.graph.dependencies(index) {
            let prerequisite = &state.statuses[edge.prerequisite];
            // A failure blocks on any edge kind, and so does a skip that
            // was itself caused by a failure further upstream. Other skip
            // kinds only block strict edges.
            let blocked = prerequisite.is_failed()
                || *prerequisite == TaskStatus::Skipped(SkipReason::UpstreamFailure)
                || (edge.kind == DependencyKind::RequiresSuccess
                    && *prerequisite != TaskStatus::Succeeded);
            if blocked {
                return Some(SkipReason::UpstreamFailure);
            }
        }
        None
    }

    /// The still-pending `dependsOn` closure of `root`, topologically
    /// ordered. Empty when `root` is already terminal.
    fn pending_chain(&self, root: usize, state: &RunState) -> Vec<usize> {
        let mut closure = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(index) = queue.pop_front() {
            if state.statuses[index].is_terminal() || !closure.insert(index) {
                continue;
            }
            for edge in self.graph.dependencies(index) {
                queue.push_back(edge.prerequisite);
            }
        }
        topo_order(&self.graph, &closure)
    }

    fn record_skip(&self, index: usize, reason: SkipReason, state: &mut RunState) {
        let status = TaskStatus::Skipped(reason);
        self.print_result(index, &status, None);
        state.statuses[index] = status;
        state.executed.push(index);
    }

    fn record_outcome(
        &self,
        index: usize,
        outcome: Result<(), FailureCause>,
        duration_ms: u64,
        state: &mut RunState,
    ) {
        let status = match outcome {
            Ok(()) => TaskStatus::Succeeded,
            Err(cause) => {
                if state.first_failure.is_none() {
                    state.first_failure =
                        Some(format!("{}: {cause}", self.graph.task(index).name));
                }
                if self.options.fail_fast {
                    state.aborted = true;
                }
                TaskStatus::Failed(cause)
            }
        };
        self.print_result(index, &status, Some(duration_ms));
        state.statuses[index] = status;
        state.durations[index] = duration_ms;
        state.executed.push(index);
    }

    fn build_result(
        &self,
        plan: &ExecutionPlan,
        state: RunState,
        started: Instant,
    ) -> RunResult {
        let closure: HashSet<usize> = plan.order.iter().copied().collect();

        let mut task_results: Vec<TaskResult> = plan
            .order
            .iter()
            .map(|&index| self.task_result(index, &state))
            .collect();
        // Finalizer-only tasks follow the requested closure, in the order
        // they actually executed.
        for &index in &state.executed {
            if !closure.contains(&index) {
                task_results.push(self.task_result(index, &state));
            }
        }

        // Only the requested closure gates the overall outcome; a failing
        // finalizer outside it is reported but does not flip success.
        let success = plan
            .order
            .iter()
            .all(|&index| !state.statuses[index].is_failed());

        RunResult {
            task_results,
            success,
            total_duration_ms: started.elapsed().as_millis() as u64,
            first_failure: state.first_failure,
        }
    }

    fn task_result(&self, index: usize, state: &RunState) -> TaskResult {
        TaskResult {
            name: self.graph.task(index).name.clone(),
            status: state.statuses[index].clone(),
            duration_ms: state.durations[index],
        }
    }

    fn print_header(&self, index: usize) {
        let task = self.graph.task(index);
        let color = get_task_color(&task.name);
        println!();
        println!(
            "┌─ {} {}",
            "Running task".bold(),
            task.name.color(color).bold()
        );
        if let Some(group) = &task.group {
            println!("└─ {} {}", "Group:".bright_black(), group.bright_black());
        }
    }

    fn print_result(&self, index: usize, status: &TaskStatus, duration_ms: Option<u64>) {
        let task = self.graph.task(index);
        let color = get_task_color(&task.name);
        match duration_ms {
            Some(ms) => println!(
                "{} {}",
                format_status(status),
                format!("{} ({ms}ms)", task.name).color(color)
            ),
            None => println!("{} {}", format_status(status), task.name.color(color)),
        }
    }
}

/// Invoke an action on a blocking worker, optionally bounded by a timeout.
/// Returns the outcome and the wall-clock duration in milliseconds.
async fn invoke_action(
    action: TaskAction,
    timeout_per_task: Option<Duration>,
) -> (Result<(), FailureCause>, u64) {
    let started = Instant::now();
    let handle = tokio::task::spawn_blocking(move || action());
    let outcome = match timeout_per_task {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => flatten_join(joined),
            // The blocking thread is left to finish on its own; the task
            // is recorded as timed out now.
            Err(_) => Err(FailureCause::Timeout(limit)),
        },
        None => flatten_join(handle.await),
    };
    (outcome, started.elapsed().as_millis() as u64)
}

fn flatten_join(
    joined: Result<Result<(), ActionError>, JoinError>,
) -> Result<(), FailureCause> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(FailureCause::Action(err)),
        Err(join_err) => Err(FailureCause::Action(ActionError::new(format!(
            "task action panicked: {join_err}"
        )))),
    }
}
