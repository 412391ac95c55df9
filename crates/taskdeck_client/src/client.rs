//! Typed client facade over cache + dispatcher.
//!
//! # Responsibility
//! - Expose watch/mutate entry points for the rendering layer.
//! - Run the optimistic-mutation protocol for task toggling.
//! - Drive the fetch/refetch loop one pump (scheduling tick) at a time.
//!
//! # Invariants
//! - The toggle sequence is strictly ordered per key: supersede in-flight
//!   fetch, snapshot, apply optimistic data, enqueue the mutation.
//! - A second toggle on the same key before the first settles snapshots the
//!   already-optimistic state, so rollbacks chain.
//! - Mutation failures surface on their own handle only; the cache keeps
//!   whatever the protocol dictates (restored snapshot or last-known-good).

use crate::cache::{CacheSnapshot, EntryStatus, FetchTicket, QueryCache, QueryKey};
use crate::dispatcher::{BatchDispatcher, Transport, TransportError};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use taskdeck_core::{
    ErrorCode, ProjectId, ProjectReport, ProjectSummary, ProjectWithTasks, RequestContext, Task,
    TaskId, PROJECT_CREATE, PROJECT_DELETE, PROJECT_GET_ALL, PROJECT_GET_BY_ID, PROJECT_REPORT,
    TASK_CREATE, TASK_DELETE, TASK_TOGGLE,
};
use uuid::Uuid;

/// Identifies one mutation issued through this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationHandle(usize);

/// Per-handle mutation outcome, surfaced only to the initiating action.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationStatus {
    Pending,
    Succeeded(Value),
    Failed { code: ErrorCode, message: String },
}

enum SettleAction {
    /// Plain mutation: on success, invalidate (and optionally evict) keys.
    Invalidate {
        invalidate: Vec<QueryKey>,
        evict: Vec<QueryKey>,
    },
    /// Optimistic mutation: reconcile on success, restore on failure.
    Rollback {
        key: QueryKey,
        snapshot: CacheSnapshot,
    },
}

enum PendingOp {
    Fetch(FetchTicket),
    Mutation {
        handle: MutationHandle,
        settle: SettleAction,
    },
}

/// Client-side engine: one identity, one cache, one batching queue.
pub struct Client<T: Transport> {
    transport: T,
    ctx: RequestContext,
    cache: QueryCache,
    dispatcher: BatchDispatcher,
    in_flight: Vec<PendingOp>,
    mutations: Vec<MutationStatus>,
    watched: BTreeSet<QueryKey>,
}

/// Key of the caller-owned project list query.
pub fn all_projects_key() -> QueryKey {
    QueryKey::new(PROJECT_GET_ALL, &Value::Null)
}

/// Key of one project detail query.
pub fn project_detail_key(project_id: ProjectId) -> QueryKey {
    QueryKey::new(
        PROJECT_GET_BY_ID,
        &json!({ "projectId": project_id.to_string() }),
    )
}

/// Key of the public cross-user report query.
pub fn report_key() -> QueryKey {
    QueryKey::new(PROJECT_REPORT, &Value::Null)
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, ctx: RequestContext) -> Self {
        Self {
            transport,
            ctx,
            cache: QueryCache::new(),
            dispatcher: BatchDispatcher::new(),
            in_flight: Vec::new(),
            mutations: Vec::new(),
            watched: BTreeSet::new(),
        }
    }

    /// Read-only view of the cache for assertions and rendering.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Registers interest in a key and schedules the initial fetch.
    ///
    /// Seeded or already-loaded keys are not refetched.
    pub fn watch(&mut self, key: QueryKey) {
        self.watched.insert(key.clone());
        if self.cache.status(&key) == EntryStatus::Idle {
            self.schedule_fetch(key);
        }
    }

    /// Drops interest in a key and evicts its entry.
    pub fn unwatch(&mut self, key: &QueryKey) {
        self.watched.remove(key);
        self.cache.evict(key);
    }

    /// Installs server-rendered data for a key without fetching.
    pub fn seed(&mut self, key: QueryKey, data: Value) {
        self.cache.seed(key, data);
    }

    pub fn watch_projects(&mut self) {
        self.watch(all_projects_key());
    }

    pub fn watch_project(&mut self, project_id: ProjectId) {
        self.watch(project_detail_key(project_id));
    }

    pub fn watch_report(&mut self) {
        self.watch(report_key());
    }

    /// Runs one scheduling tick: refetch stale watched keys, flush the
    /// queued calls as a single batch, and settle every outcome.
    pub fn pump(&mut self) -> Result<(), TransportError> {
        for key in self.cache.stale_keys() {
            if self.watched.contains(&key) {
                self.schedule_fetch(key);
            }
        }

        if self.dispatcher.pending() == 0 {
            return Ok(());
        }

        let ops = std::mem::take(&mut self.in_flight);
        let outcomes = match self.dispatcher.flush(&self.transport, &self.ctx) {
            Ok(outcomes) => outcomes,
            Err(err) => {
                self.fail_all(ops, &err);
                return Err(err);
            }
        };

        for (op, outcome) in ops.into_iter().zip(outcomes) {
            self.settle(op, outcome.into_result());
        }
        Ok(())
    }

    /// Optimistically toggles a task's completion flag.
    ///
    /// Applies the expected effect to the cached project detail before the
    /// server responds; `pump()` later reconciles or rolls back.
    pub fn toggle_task(
        &mut self,
        project_id: ProjectId,
        task_id: TaskId,
        completed: bool,
    ) -> MutationHandle {
        let key = project_detail_key(project_id);

        // Order matters: supersede any in-flight fetch first, then snapshot,
        // then write the optimistic value.
        self.cache.cancel_fetch(&key);
        let snapshot = self.cache.snapshot(&key);
        if let Some(mut data) = self.cache.data(&key) {
            apply_toggle(&mut data, task_id, completed);
            self.cache.set_data(key.clone(), data);
        }

        self.enqueue_mutation(
            TASK_TOGGLE,
            json!({ "taskId": task_id.to_string(), "completed": completed }),
            SettleAction::Rollback { key, snapshot },
        )
    }

    /// Creates a project, then refetches the list instead of guessing the
    /// server-assigned row.
    pub fn create_project(&mut self, name: &str) -> MutationHandle {
        self.enqueue_mutation(
            PROJECT_CREATE,
            json!({ "name": name }),
            SettleAction::Invalidate {
                invalidate: vec![all_projects_key(), report_key()],
                evict: Vec::new(),
            },
        )
    }

    pub fn delete_project(&mut self, project_id: ProjectId) -> MutationHandle {
        self.enqueue_mutation(
            PROJECT_DELETE,
            json!({ "projectId": project_id.to_string() }),
            SettleAction::Invalidate {
                invalidate: vec![all_projects_key(), report_key()],
                evict: vec![project_detail_key(project_id)],
            },
        )
    }

    pub fn create_task(&mut self, project_id: ProjectId, title: &str) -> MutationHandle {
        self.enqueue_mutation(
            TASK_CREATE,
            json!({ "projectId": project_id.to_string(), "title": title }),
            SettleAction::Invalidate {
                invalidate: vec![project_detail_key(project_id)],
                evict: Vec::new(),
            },
        )
    }

    pub fn delete_task(&mut self, project_id: ProjectId, task_id: TaskId) -> MutationHandle {
        self.enqueue_mutation(
            TASK_DELETE,
            json!({ "taskId": task_id.to_string() }),
            SettleAction::Invalidate {
                invalidate: vec![project_detail_key(project_id)],
                evict: Vec::new(),
            },
        )
    }

    /// Outcome of one mutation, for the initiating UI action.
    pub fn mutation_status(&self, handle: MutationHandle) -> &MutationStatus {
        &self.mutations[handle.0]
    }

    /// Decoded caller-owned project list, if cached.
    pub fn projects(&self) -> Option<Vec<ProjectSummary>> {
        self.decoded(&all_projects_key())
    }

    /// Decoded project detail, if cached.
    pub fn project(&self, project_id: ProjectId) -> Option<ProjectWithTasks> {
        self.decoded(&project_detail_key(project_id))
    }

    /// Decoded public report, if cached.
    pub fn report(&self) -> Option<ProjectReport> {
        self.decoded(&report_key())
    }

    /// Convenience view into the cached detail's task rows.
    pub fn task(&self, project_id: ProjectId, task_id: TaskId) -> Option<Task> {
        self.project(project_id)?
            .tasks
            .into_iter()
            .find(|task| task.uuid == task_id)
    }

    fn decoded<D: DeserializeOwned>(&self, key: &QueryKey) -> Option<D> {
        let data = self.cache.data(key)?;
        serde_json::from_value(data).ok()
    }

    fn schedule_fetch(&mut self, key: QueryKey) {
        let input = key.input();
        let path = key.path().to_string();
        let ticket = self.cache.begin_fetch(key);
        self.dispatcher.enqueue(&path, input);
        self.in_flight.push(PendingOp::Fetch(ticket));
    }

    fn enqueue_mutation(
        &mut self,
        path: &str,
        input: Value,
        settle: SettleAction,
    ) -> MutationHandle {
        let handle = MutationHandle(self.mutations.len());
        self.mutations.push(MutationStatus::Pending);
        self.dispatcher.enqueue(path, input);
        self.in_flight.push(PendingOp::Mutation { handle, settle });
        debug!(
            "event=mutation_enqueued module=client path={path} handle={}",
            handle.0
        );
        handle
    }

    fn settle(&mut self, op: PendingOp, outcome: Result<Value, (ErrorCode, String)>) {
        match op {
            PendingOp::Fetch(ticket) => {
                let applied = self
                    .cache
                    .complete_fetch(&ticket, outcome.map_err(|(_, message)| message));
                if !applied {
                    debug!(
                        "event=fetch_result_dropped module=client path={}",
                        ticket.key().path()
                    );
                }
            }
            PendingOp::Mutation { handle, settle } => match outcome {
                Ok(data) => {
                    self.mutations[handle.0] = MutationStatus::Succeeded(data);
                    match settle {
                        SettleAction::Invalidate { invalidate, evict } => {
                            for key in &evict {
                                self.cache.evict(key);
                                self.watched.remove(key);
                            }
                            for key in &invalidate {
                                self.cache.invalidate(key);
                            }
                        }
                        SettleAction::Rollback { key, .. } => {
                            // Reconcile with server truth via refetch.
                            self.cache.invalidate(&key);
                        }
                    }
                }
                Err((code, message)) => {
                    self.mutations[handle.0] = MutationStatus::Failed { code, message };
                    if let SettleAction::Rollback { snapshot, .. } = settle {
                        self.cache.restore(snapshot);
                    }
                }
            },
        }
    }

    fn fail_all(&mut self, ops: Vec<PendingOp>, err: &TransportError) {
        for op in ops {
            self.settle(
                op,
                Err((ErrorCode::Internal, err.to_string())),
            );
        }
    }
}

/// Flips the matching task's `completed` flag inside a cached project
/// detail payload. Unknown ids leave the payload untouched.
fn apply_toggle(data: &mut Value, task_id: TaskId, completed: bool) {
    let Some(tasks) = data.get_mut("tasks").and_then(Value::as_array_mut) else {
        return;
    };
    for task in tasks {
        let matches = task
            .get("uuid")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            == Some(task_id);
        if matches {
            if let Some(object) = task.as_object_mut() {
                object.insert("completed".to_string(), Value::Bool(completed));
            }
        }
    }
}
