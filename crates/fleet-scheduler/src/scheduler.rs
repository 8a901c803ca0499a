//! The scheduler's ready-queue, registry, and tick loop: the
//! single-threaded scheduling-decision actor around which worker threads
//! execute step bodies concurrently.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use fleet_cache::ArtefactCache;
use fleet_events::{Event, EventBus, QueueEntry};
use fleet_runtime::{CancelToken, HostMap, Options};
use fleet_step::{validate_dag, Constraint, Step};
use fleet_types::{FailurePolicy, Status, StepId};
use parking_lot::{Mutex, RwLock};

use crate::error::SchedulerError;
use crate::gate::{self, GateDecision};
use crate::solver;

/// Interval between ready-queue admission scans. The loop also wakes
/// early whenever a worker finishes (see [`Scheduler::spawn_worker`]), so
/// this bounds worst-case latency rather than driving every transition.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Poll interval used by a parent worker waiting on its children's
/// terminal status. Kept short relative to `TICK_INTERVAL` since it only
/// gates one worker's own completion, not the whole run.
const CHILD_WAIT_INTERVAL: Duration = Duration::from_millis(50);

pub struct Scheduler {
    registry: RwLock<HashMap<StepId, Step>>,
    statuses: RwLock<HashMap<StepId, Status>>,
    retry_counts: RwLock<HashMap<StepId, u32>>,
    ready_queue: Mutex<VecDeque<StepId>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    active_workers: AtomicUsize,
    fatal: Mutex<Option<SchedulerError>>,

    events: Arc<EventBus>,
    cache: Arc<ArtefactCache>,
    constraints: Vec<Constraint>,
    options: Arc<Options>,
    hosts: Arc<HostMap>,
    cancel: CancelToken,
}

impl Scheduler {
    pub fn new(
        events: Arc<EventBus>,
        cache: Arc<ArtefactCache>,
        constraints: Vec<Constraint>,
        options: Arc<Options>,
        hosts: Arc<HostMap>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry: RwLock::new(HashMap::new()),
            statuses: RwLock::new(HashMap::new()),
            retry_counts: RwLock::new(HashMap::new()),
            ready_queue: Mutex::new(VecDeque::new()),
            workers: Mutex::new(Vec::new()),
            active_workers: AtomicUsize::new(0),
            fatal: Mutex::new(None),
            events,
            cache,
            constraints,
            options,
            hosts,
            cancel: CancelToken::new(),
        })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current retry count for a step, observable by UIs via the
    /// registry without waiting for a terminal status.
    pub fn retry_count(&self, id: &str) -> u32 {
        self.retry_counts.read().get(id).copied().unwrap_or(0)
    }

    pub fn status_of(&self, id: &str) -> Option<Status> {
        self.statuses.read().get(id).cloned()
    }

    /// Register `step`, publish `RegisterStep`, set it `Queued`, and append
    /// it to the ready-queue. Idempotent by ID: re-registering an already
    /// known step is a no-op on the registry (its status and queue
    /// position are left alone).
    fn queue_step(&self, step: Step) {
        let id = step.id.clone();
        let already_known = {
            let mut registry = self.registry.write();
            let known = registry.contains_key(&id);
            registry.entry(id.clone()).or_insert_with(|| step.clone());
            known
        };
        if already_known {
            return;
        }
        self.events.publish(Event::RegisterStep { step });
        tracing::debug!(step = %id, status = "queued", "status transition");
        self.statuses.write().insert(id.clone(), Status::Queued);
        self.ready_queue.lock().push_back(id);
    }

    fn queue_steps(&self, steps: impl IntoIterator<Item = Step>) {
        for step in steps {
            self.queue_step(step);
        }
    }

    /// Run the plan rooted at `root` to quiescence: the ready-queue empty
    /// and every registered step `Done` or `Failed`. Returns the first
    /// fatal (`propagate`) failure or dependency-failure observed, if any.
    pub fn run(self: &Arc<Self>, root: Step) -> Result<(), SchedulerError> {
        validate_dag(&root).map_err(|err| match err {
            fleet_step::DagError::UnknownDependency { step, dependency } => {
                SchedulerError::UnknownDependency { step, dependency }
            }
            fleet_step::DagError::Cycle { cycle } => SchedulerError::PlanCycle { cycle },
        })?;

        self.events.publish(Event::RegisterPlan { step: root.clone() });
        self.queue_step(root);

        while !self.is_quiescent() {
            self.tick();
            if self.cancel.is_cancelled() && self.active_workers.load(Ordering::SeqCst) == 0 {
                break;
            }
            thread::sleep(TICK_INTERVAL);
        }

        self.drain_workers();

        match self.fatal.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_quiescent(&self) -> bool {
        self.ready_queue.lock().is_empty()
            && self.active_workers.load(Ordering::SeqCst) == 0
            && self.statuses.read().values().all(Status::is_terminal)
    }

    /// One admission scan: for every queued step, ask the gate then the
    /// solver; admit, re-queue with a block reason, or fail on a dead
    /// dependency. The ready-queue lock spans the whole scan so the
    /// solver sees a coherent status snapshot.
    fn tick(self: &Arc<Self>) {
        let mut to_start: Vec<Step> = Vec::new();
        let mut to_fail: Vec<(StepId, StepId)> = Vec::new();
        let mut blocked: Vec<QueueEntry> = Vec::new();

        let queue_len = self.ready_queue.lock().len();
        let _span = tracing::info_span!("scheduler_tick", ready_queue_len = queue_len).entered();

        {
            let mut queue = self.ready_queue.lock();
            let registry = self.registry.read();
            let mut statuses = self.statuses.write();

            let pending: Vec<StepId> = queue.drain(..).collect();
            for id in pending {
                let Some(step) = registry.get(&id) else { continue };

                match gate::evaluate(step, &statuses) {
                    GateDecision::DependencyFailed { dependency } => {
                        to_fail.push((id.clone(), dependency));
                    }
                    GateDecision::Waiting { blocked_by } => {
                        queue.push_back(id.clone());
                        blocked.push(QueueEntry { step: step.clone(), blocked_by });
                    }
                    GateDecision::Clear => {
                        if solver::admits(step, &self.constraints, &registry, &statuses) {
                            statuses.insert(id.clone(), Status::Running);
                            to_start.push(step.clone());
                        } else {
                            queue.push_back(id.clone());
                            blocked.push(QueueEntry {
                                step: step.clone(),
                                blocked_by: vec!["constraint".to_string()],
                            });
                        }
                    }
                }
            }
        }

        for (id, dependency) in to_fail {
            tracing::debug!(step = %id, status = "failed", reason = "dependency_failed", %dependency, "status transition");
            self.statuses.write().insert(id.clone(), Status::Failed);
            self.events.publish(Event::StepUpdate { step_id: id.clone(), status: Status::Failed });
            self.record_fatal(SchedulerError::DependencyFailed { step: id, dependency });
        }

        for step in to_start {
            tracing::debug!(step = %step.id, status = "running", "status transition");
            self.events.publish(Event::StepUpdate { step_id: step.id.clone(), status: Status::Running });
            self.spawn_worker(step);
        }

        self.events.publish(Event::QueueStatus { entries: blocked });
    }

    fn spawn_worker(self: &Arc<Self>, step: Step) {
        let scheduler = Arc::clone(self);
        self.active_workers.fetch_add(1, Ordering::SeqCst);
        let handle = thread::spawn(move || {
            scheduler.run_step(step);
            scheduler.active_workers.fetch_sub(1, Ordering::SeqCst);
        });
        self.workers.lock().push(handle);
    }

    fn run_step(self: &Arc<Self>, step: Step) {
        let result = step.action.run(&self.cancel, &self.options, &self.hosts, &self.cache);
        match result {
            Ok(()) => self.on_step_success(step),
            Err(err) => self.on_step_failure(step, err),
        }
    }

    /// Queue the step's children (if any), block until every one of them
    /// reaches a terminal status, and only then mark the parent `Done` —
    /// a parent is never `Done` before its whole subtree is.
    fn on_step_success(self: &Arc<Self>, step: Step) {
        if !step.children.is_empty() {
            let child_ids: Vec<StepId> = step.children.iter().map(|child| child.id.clone()).collect();
            let children = if step.parallel {
                step.children.clone()
            } else {
                // Builders install predecessor edges for serially-appended
                // children, but a step loaded from a plan file carries only
                // `parallel: false` with no implicit `dependencies`, so the
                // ordering has to be re-derived here too, at queue time.
                let mut previous_id: Option<StepId> = None;
                step.children
                    .iter()
                    .cloned()
                    .map(|mut child| {
                        if let Some(prev) = &previous_id {
                            child.depends_on.insert(prev.clone());
                        }
                        previous_id = Some(child.id.clone());
                        child
                    })
                    .collect()
            };
            self.queue_steps(children);

            loop {
                let all_settled = {
                    let statuses = self.statuses.read();
                    child_ids.iter().all(|id| statuses.get(id).is_some_and(Status::is_terminal))
                };
                if all_settled || self.cancel.is_cancelled() {
                    break;
                }
                thread::sleep(CHILD_WAIT_INTERVAL);
            }
        }

        tracing::debug!(step = %step.id, status = "done", "status transition");
        self.statuses.write().insert(step.id.clone(), Status::Done);
        self.events.publish(Event::StepUpdate { step_id: step.id.clone(), status: Status::Done });
    }

    fn on_step_failure(&self, step: Step, err: anyhow::Error) {
        self.events.publish(Event::StepLog { step_id: step.id.clone(), data: format!("{err:#}") });

        match step.on_failure {
            FailurePolicy::Retry => {
                let attempt = self.increment_retry_count(&step.id);
                tracing::debug!(step = %step.id, attempt, "retrying after failure");
                if step.retry_interval > 0 {
                    thread::sleep(Duration::from_secs(step.retry_interval));
                }
                tracing::debug!(step = %step.id, status = "queued", reason = "retry", "status transition");
                self.statuses.write().insert(step.id.clone(), Status::Queued);
                self.events.publish(Event::StepUpdate { step_id: step.id.clone(), status: Status::Queued });
                self.ready_queue.lock().push_back(step.id);
            }
            FailurePolicy::Ignore => {
                tracing::debug!(step = %step.id, status = "failed", reason = "ignore", "status transition");
                self.statuses.write().insert(step.id.clone(), Status::Failed);
                self.events.publish(Event::StepUpdate { step_id: step.id.clone(), status: Status::Failed });
            }
            FailurePolicy::Propagate => {
                tracing::debug!(step = %step.id, status = "failed", reason = "propagate", "status transition");
                self.statuses.write().insert(step.id.clone(), Status::Failed);
                self.events.publish(Event::StepUpdate { step_id: step.id.clone(), status: Status::Failed });
                self.record_fatal(SchedulerError::ActionFailed { step: step.id, source: err });
            }
        }
    }

    fn increment_retry_count(&self, id: &StepId) -> u32 {
        let mut counts = self.retry_counts.write();
        let count = counts.entry(id.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Only the first fatal error of a run is kept; later ones are still
    /// published as `StepLog`/`StepUpdate` but don't overwrite it.
    fn record_fatal(&self, err: SchedulerError) {
        let mut fatal = self.fatal.lock();
        if fatal.is_none() {
            *fatal = Some(err);
        }
    }

    fn drain_workers(&self) {
        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }
}
