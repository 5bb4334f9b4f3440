//! Optimistic mutation engine.
//!
//! Coordinates a user-initiated change that must appear instantly in the UI
//! while its durability is confirmed or denied by one network request.
//! The coordinator itself performs no IO: `submit` applies the optimistic
//! state and hands back a [`Dispatch`] describing the request to perform;
//! the async driver reports the outcome through [`Coordinator::commit`] or
//! [`Coordinator::reject`], which settle the store and hand back any
//! follow-up dispatch (a queued mutation on the same entity, or the
//! deferred delete of an entity created and deleted in one breath).
//!
//! Rules enforced here:
//! - one request per user action, no automatic retry
//! - per-entity serialization; mutations on different entities are
//!   independent
//! - failure reverts to the exact pre-mutation snapshot, value and position
//! - delete dominance: a delete issued while an update is in flight removes
//!   the entity now, and the update's eventual commit or rollback cannot
//!   resurrect it

use crate::error::{LeadMateError, Result};
use crate::store::{Collection, Entity};
use crate::types::EntityId;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

pub type TicketId = u64;

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

/// A user-initiated change. `Update` carries the full replacement entity;
/// status transitions are updates that replace the status field atomically.
#[derive(Debug, Clone)]
pub enum Mutation<T> {
    Create(T),
    Update(T),
    Delete(EntityId),
}

/// The single network request representing a mutation.
#[derive(Debug, Clone)]
pub enum Request<T> {
    Create(T),
    Update(T),
    Delete(EntityId),
}

/// A request the driver must perform, tagged with the ticket to settle.
#[derive(Debug, Clone)]
pub struct Dispatch<T> {
    pub ticket: TicketId,
    pub request: Request<T>,
}

/// What `submit` did with the mutation.
#[derive(Debug)]
pub enum Submission<T> {
    /// Optimistic state applied; perform this request.
    Dispatch(Dispatch<T>),
    /// The entity already has a mutation in flight; this one runs after it
    /// settles (its optimistic state applies at activation).
    Queued,
    /// Resolved locally with no network request (delete of a missing id, or
    /// delete of a not-yet-confirmed placeholder).
    Settled,
}

/// Successful server outcome for a dispatched request.
#[derive(Debug, Clone)]
pub enum Confirmation<T> {
    /// The server-assigned entity; replaces the optimistic placeholder.
    Created(T),
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Optimistic state is now durable.
    Committed,
    /// Store restored to the pre-mutation snapshot.
    Reverted,
    /// A later delete superseded this mutation; the store was not touched.
    Superseded,
}

/// Result of settling a ticket.
#[derive(Debug)]
pub struct Completion<T> {
    pub resolution: Resolution,
    /// Next dispatch for the same entity, if one was waiting.
    pub follow_up: Option<Dispatch<T>>,
}

// ---------------------------------------------------------------------------
// Internal bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightKind {
    Create,
    Update,
    Delete,
}

/// Pre-mutation state of the entity: value and insertion position, or None
/// when the entity did not exist (creates).
#[derive(Debug, Clone)]
struct Snapshot<T> {
    prior: Option<(T, usize)>,
}

#[derive(Debug)]
struct InFlight<T> {
    kind: FlightKind,
    snapshot: Snapshot<T>,
    /// Set when a later delete supersedes this flight; its settle must not
    /// touch the store.
    cancelled: bool,
    /// Create superseded by a delete: once the server id is known, dispatch
    /// the delete so no stale record survives server-side.
    deferred_delete: bool,
    /// Delete issued while this flight was active; dispatches on settle.
    pending_delete: Option<Snapshot<T>>,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Coordinator<T> {
    inflight: HashMap<EntityId, InFlight<T>>,
    tickets: HashMap<TicketId, EntityId>,
    queued: HashMap<EntityId, VecDeque<Mutation<T>>>,
    next_ticket: TicketId,
    placeholder_seq: u64,
}

impl<T: Entity + Clone> Coordinator<T> {
    pub fn new() -> Self {
        Self {
            inflight: HashMap::new(),
            tickets: HashMap::new(),
            queued: HashMap::new(),
            next_ticket: 0,
            placeholder_seq: 0,
        }
    }

    /// Client-generated id for an optimistic create.
    pub fn placeholder_id(&mut self) -> EntityId {
        self.placeholder_seq += 1;
        EntityId::placeholder(self.placeholder_seq)
    }

    pub fn has_inflight(&self, id: &EntityId) -> bool {
        self.inflight.contains_key(id)
    }

    /// True when no request is outstanding and nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty() && self.queued.is_empty()
    }

    // ---------------------------------------------------------------------------
    // Submit
    // ---------------------------------------------------------------------------

    pub fn submit(&mut self, col: &mut Collection<T>, mutation: Mutation<T>) -> Result<Submission<T>> {
        match mutation {
            Mutation::Create(entity) => {
                let id = entity.id().clone();
                if col.contains(&id) || self.inflight.contains_key(&id) {
                    return Err(LeadMateError::EntityExists(id.to_string()));
                }
                col.upsert(entity.clone());
                let dispatch = self.open_flight(
                    id,
                    FlightKind::Create,
                    Snapshot { prior: None },
                    Request::Create(entity),
                );
                Ok(Submission::Dispatch(dispatch))
            }

            Mutation::Update(entity) => {
                let id = entity.id().clone();
                if let Some(flight) = self.inflight.get(&id) {
                    if flight.cancelled || flight.kind == FlightKind::Delete {
                        // a delete already won; the entity is gone
                        return Err(LeadMateError::EntityNotFound(id.to_string()));
                    }
                    self.queued
                        .entry(id)
                        .or_default()
                        .push_back(Mutation::Update(entity));
                    return Ok(Submission::Queued);
                }
                if !col.contains(&id) {
                    return Err(LeadMateError::EntityNotFound(id.to_string()));
                }
                let snapshot = Self::snapshot_of(col, &id);
                col.upsert(entity.clone());
                let dispatch =
                    self.open_flight(id, FlightKind::Update, snapshot, Request::Update(entity));
                Ok(Submission::Dispatch(dispatch))
            }

            Mutation::Delete(id) => {
                if let Some(flight) = self.inflight.get_mut(&id) {
                    match flight.kind {
                        // Placeholder never confirmed: cancel locally, send
                        // nothing now. If the create succeeds anyway, settle
                        // emits a deferred delete for the server id.
                        FlightKind::Create if !flight.cancelled => {
                            col.remove(&id);
                            flight.cancelled = true;
                            flight.deferred_delete = true;
                            self.queued.remove(&id);
                            Ok(Submission::Settled)
                        }
                        // Delete wins over the in-flight update: remove now,
                        // request dispatches once the update settles.
                        FlightKind::Update if !flight.cancelled => {
                            let snapshot = Self::snapshot_of(col, &id);
                            col.remove(&id);
                            flight.cancelled = true;
                            flight.pending_delete = Some(snapshot);
                            self.queued.remove(&id);
                            Ok(Submission::Queued)
                        }
                        // Already deleting or already superseded.
                        _ => Ok(Submission::Settled),
                    }
                } else if col.contains(&id) {
                    let snapshot = Self::snapshot_of(col, &id);
                    col.remove(&id);
                    let dispatch = self.open_flight(
                        id.clone(),
                        FlightKind::Delete,
                        snapshot,
                        Request::Delete(id),
                    );
                    Ok(Submission::Dispatch(dispatch))
                } else {
                    // missing id: deletions may race with reloads
                    Ok(Submission::Settled)
                }
            }
        }
    }

    // ---------------------------------------------------------------------------
    // Settle
    // ---------------------------------------------------------------------------

    /// Server confirmed the dispatched request.
    pub fn commit(
        &mut self,
        col: &mut Collection<T>,
        ticket: TicketId,
        confirmation: Confirmation<T>,
    ) -> Result<Completion<T>> {
        self.settle(col, ticket, Some(confirmation))
    }

    /// The dispatched request failed (network error or rejection).
    pub fn reject(&mut self, col: &mut Collection<T>, ticket: TicketId) -> Result<Completion<T>> {
        self.settle(col, ticket, None)
    }

    fn settle(
        &mut self,
        col: &mut Collection<T>,
        ticket: TicketId,
        confirmation: Option<Confirmation<T>>,
    ) -> Result<Completion<T>> {
        let key = self
            .tickets
            .remove(&ticket)
            .ok_or(LeadMateError::UnknownTicket(ticket))?;
        let flight = self
            .inflight
            .remove(&key)
            .ok_or(LeadMateError::UnknownTicket(ticket))?;

        let resolution = if flight.cancelled {
            Resolution::Superseded
        } else if let Some(confirmation) = &confirmation {
            if let (FlightKind::Create, Confirmation::Created(server)) =
                (flight.kind, confirmation)
            {
                let server = server.clone();
                if col.rekey(&key, server.id().clone()) {
                    // server value is authoritative for the created entity
                    col.upsert(server);
                } else {
                    warn!(placeholder = %key, "created entity missing from store at commit");
                }
            }
            Resolution::Committed
        } else {
            match flight.kind {
                FlightKind::Create => {
                    col.remove(&key);
                }
                FlightKind::Update => {
                    if let Some((prior, _)) = flight.snapshot.prior.clone() {
                        col.upsert(prior);
                    }
                }
                FlightKind::Delete => {
                    if let Some((prior, pos)) = flight.snapshot.prior.clone() {
                        col.insert_at(pos, prior);
                    }
                }
            }
            Resolution::Reverted
        };

        let follow_up = if let Some(snapshot) = flight.pending_delete {
            // delete dominance: the superseding delete goes out now
            Some(self.open_flight(
                key.clone(),
                FlightKind::Delete,
                snapshot,
                Request::Delete(key),
            ))
        } else if flight.deferred_delete {
            match confirmation {
                Some(Confirmation::Created(server)) => {
                    let server_id = server.id().clone();
                    Some(self.open_flight(
                        server_id.clone(),
                        FlightKind::Delete,
                        Snapshot { prior: None },
                        Request::Delete(server_id),
                    ))
                }
                // create failed or was a non-create: nothing exists server-side
                _ => None,
            }
        } else {
            self.activate_queued(col, &key)
        };

        Ok(Completion {
            resolution,
            follow_up,
        })
    }

    // ---------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------

    /// Start the next queued mutation for `key`, applying its optimistic
    /// state now that the prior flight has settled.
    fn activate_queued(&mut self, col: &mut Collection<T>, key: &EntityId) -> Option<Dispatch<T>> {
        loop {
            let next = self.queued.get_mut(key)?.pop_front();
            let Some(mutation) = next else {
                self.queued.remove(key);
                return None;
            };
            match mutation {
                Mutation::Update(entity) => {
                    if !col.contains(entity.id()) {
                        warn!(id = %entity.id(), "dropping queued update for missing entity");
                        continue;
                    }
                    let snapshot = Self::snapshot_of(col, entity.id());
                    col.upsert(entity.clone());
                    let dispatch = self.open_flight(
                        entity.id().clone(),
                        FlightKind::Update,
                        snapshot,
                        Request::Update(entity),
                    );
                    if self.queued.get(key).map(|q| q.is_empty()).unwrap_or(true) {
                        self.queued.remove(key);
                    }
                    return Some(dispatch);
                }
                // only updates queue; creates and deletes settle at submit
                _ => continue,
            }
        }
    }

    fn open_flight(
        &mut self,
        key: EntityId,
        kind: FlightKind,
        snapshot: Snapshot<T>,
        request: Request<T>,
    ) -> Dispatch<T> {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.tickets.insert(ticket, key.clone());
        self.inflight.insert(
            key,
            InFlight {
                kind,
                snapshot,
                cancelled: false,
                deferred_delete: false,
                pending_delete: None,
            },
        );
        Dispatch { ticket, request }
    }

    fn snapshot_of(col: &Collection<T>, id: &EntityId) -> Snapshot<T> {
        Snapshot {
            prior: col.get(id).cloned().zip(col.position(id)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use crate::types::TaskStatus;

    fn setup() -> (Coordinator<Task>, Collection<Task>) {
        (Coordinator::new(), Collection::new())
    }

    fn dispatch<T: std::fmt::Debug>(s: Submission<T>) -> Dispatch<T> {
        match s {
            Submission::Dispatch(d) => d,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    fn seed(col: &mut Collection<Task>, ids: &[&str]) {
        for id in ids {
            col.upsert(Task::new(*id, format!("Task {id}")));
        }
    }

    #[test]
    fn update_commit_keeps_optimistic_state() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);

        let moved = col.get(&"t1".into()).unwrap().clone().with_status(TaskStatus::InProgress);
        let d = dispatch(eng.submit(&mut col, Mutation::Update(moved)).unwrap());
        // optimistic: visible before the request resolves
        assert_eq!(col.get(&"t1".into()).unwrap().status, TaskStatus::InProgress);

        let c = eng.commit(&mut col, d.ticket, Confirmation::Updated).unwrap();
        assert_eq!(c.resolution, Resolution::Committed);
        assert_eq!(col.get(&"t1".into()).unwrap().status, TaskStatus::InProgress);
        assert!(eng.is_idle());
    }

    #[test]
    fn failed_transition_restores_exact_prior_column() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        let moved = t1.clone().with_status(TaskStatus::InProgress);
        let d = dispatch(eng.submit(&mut col, Mutation::Update(moved)).unwrap());
        let c = eng.reject(&mut col, d.ticket).unwrap();

        assert_eq!(c.resolution, Resolution::Reverted);
        // back to todo, never "some" other column
        assert_eq!(col.get(&"t1".into()).unwrap().status, TaskStatus::Todo);
    }

    #[test]
    fn failed_delete_restores_exact_position() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1", "t2", "t3"]);

        let d = dispatch(eng.submit(&mut col, Mutation::Delete("t2".into())).unwrap());
        assert!(!col.contains(&"t2".into()));

        eng.reject(&mut col, d.ticket).unwrap();
        let ids: Vec<_> = col.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn create_commit_rebinds_placeholder_to_server_id() {
        let (mut eng, mut col) = setup();
        let placeholder = eng.placeholder_id();
        let draft = Task::new(placeholder.clone(), "New card");

        let d = dispatch(eng.submit(&mut col, Mutation::Create(draft)).unwrap());
        assert!(col.contains(&placeholder));

        let server = Task::new("t99", "New card");
        eng.commit(&mut col, d.ticket, Confirmation::Created(server)).unwrap();
        assert!(!col.contains(&placeholder));
        assert_eq!(col.get(&"t99".into()).unwrap().title, "New card");
        // position unchanged: still the only, first entry
        assert_eq!(col.position(&"t99".into()), Some(0));
    }

    #[test]
    fn create_reject_removes_placeholder() {
        let (mut eng, mut col) = setup();
        let placeholder = eng.placeholder_id();
        let d = dispatch(
            eng.submit(&mut col, Mutation::Create(Task::new(placeholder.clone(), "New")))
                .unwrap(),
        );
        eng.reject(&mut col, d.ticket).unwrap();
        assert!(col.is_empty());
        assert!(eng.is_idle());
    }

    #[test]
    fn second_mutation_on_same_entity_queues() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Update(t1.clone().with_status(TaskStatus::InProgress)))
                .unwrap(),
        );
        let s2 = eng
            .submit(&mut col, Mutation::Update(t1.clone().with_status(TaskStatus::Completed)))
            .unwrap();
        assert!(matches!(s2, Submission::Queued));
        // queued mutation has not applied yet
        assert_eq!(col.get(&"t1".into()).unwrap().status, TaskStatus::InProgress);

        let c1 = eng.commit(&mut col, d1.ticket, Confirmation::Updated).unwrap();
        let d2 = c1.follow_up.expect("queued update should activate");
        assert_eq!(col.get(&"t1".into()).unwrap().status, TaskStatus::Completed);

        eng.commit(&mut col, d2.ticket, Confirmation::Updated).unwrap();
        assert!(eng.is_idle());
    }

    #[test]
    fn mutations_on_different_entities_run_concurrently() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1", "t2"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();
        let t2 = col.get(&"t2".into()).unwrap().clone();

        let s1 = eng
            .submit(&mut col, Mutation::Update(t1.with_status(TaskStatus::InProgress)))
            .unwrap();
        let s2 = eng
            .submit(&mut col, Mutation::Update(t2.with_status(TaskStatus::Completed)))
            .unwrap();
        assert!(matches!(s1, Submission::Dispatch(_)));
        assert!(matches!(s2, Submission::Dispatch(_)));
    }

    #[test]
    fn delete_dominates_inflight_update_on_success() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Update(t1.with_status(TaskStatus::InProgress)))
                .unwrap(),
        );
        let s2 = eng.submit(&mut col, Mutation::Delete("t1".into())).unwrap();
        assert!(matches!(s2, Submission::Queued));
        assert!(!col.contains(&"t1".into()));

        // update succeeds, but must not resurrect the entity
        let c1 = eng.commit(&mut col, d1.ticket, Confirmation::Updated).unwrap();
        assert_eq!(c1.resolution, Resolution::Superseded);
        assert!(!col.contains(&"t1".into()));

        // the superseding delete now goes out
        let d2 = c1.follow_up.expect("delete should dispatch after update settles");
        assert!(matches!(d2.request, Request::Delete(ref id) if id.as_str() == "t1"));
        eng.commit(&mut col, d2.ticket, Confirmation::Deleted).unwrap();
        assert!(!col.contains(&"t1".into()));
        assert!(eng.is_idle());
    }

    #[test]
    fn delete_dominates_inflight_update_on_failure() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Update(t1.with_status(TaskStatus::InProgress)))
                .unwrap(),
        );
        eng.submit(&mut col, Mutation::Delete("t1".into())).unwrap();

        // update fails; its rollback must not resurrect the entity either
        let c1 = eng.reject(&mut col, d1.ticket).unwrap();
        assert_eq!(c1.resolution, Resolution::Superseded);
        assert!(!col.contains(&"t1".into()));
        assert!(c1.follow_up.is_some());
    }

    #[test]
    fn update_after_delete_is_rejected() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        eng.submit(&mut col, Mutation::Delete("t1".into())).unwrap();
        let result = eng.submit(&mut col, Mutation::Update(t1));
        assert!(matches!(result, Err(LeadMateError::EntityNotFound(_))));
    }

    #[test]
    fn create_then_immediate_delete_settles_locally() {
        let (mut eng, mut col) = setup();
        let placeholder = eng.placeholder_id();
        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Create(Task::new(placeholder.clone(), "Ephemeral")))
                .unwrap(),
        );

        let s2 = eng.submit(&mut col, Mutation::Delete(placeholder.clone())).unwrap();
        assert!(matches!(s2, Submission::Settled));
        assert!(col.is_empty());

        // create nonetheless succeeds server-side: a deferred delete goes out
        // carrying the server id, never the placeholder
        let c1 = eng
            .commit(&mut col, d1.ticket, Confirmation::Created(Task::new("t7", "Ephemeral")))
            .unwrap();
        assert_eq!(c1.resolution, Resolution::Superseded);
        assert!(col.is_empty());
        let d2 = c1.follow_up.expect("deferred delete expected");
        assert!(matches!(d2.request, Request::Delete(ref id) if id.as_str() == "t7"));

        eng.commit(&mut col, d2.ticket, Confirmation::Deleted).unwrap();
        assert!(col.is_empty());
        assert!(eng.is_idle());
    }

    #[test]
    fn create_then_delete_with_failed_create_needs_no_follow_up() {
        let (mut eng, mut col) = setup();
        let placeholder = eng.placeholder_id();
        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Create(Task::new(placeholder.clone(), "Ephemeral")))
                .unwrap(),
        );
        eng.submit(&mut col, Mutation::Delete(placeholder)).unwrap();

        let c1 = eng.reject(&mut col, d1.ticket).unwrap();
        assert_eq!(c1.resolution, Resolution::Superseded);
        assert!(c1.follow_up.is_none());
        assert!(col.is_empty());
        assert!(eng.is_idle());
    }

    #[test]
    fn delete_of_missing_id_settles() {
        let (mut eng, mut col) = setup();
        let s = eng.submit(&mut col, Mutation::Delete("ghost".into())).unwrap();
        assert!(matches!(s, Submission::Settled));
    }

    #[test]
    fn delete_supersedes_queued_updates() {
        let (mut eng, mut col) = setup();
        seed(&mut col, &["t1"]);
        let t1 = col.get(&"t1".into()).unwrap().clone();

        let d1 = dispatch(
            eng.submit(&mut col, Mutation::Update(t1.clone().with_status(TaskStatus::InProgress)))
                .unwrap(),
        );
        eng.submit(&mut col, Mutation::Update(t1.clone().with_status(TaskStatus::Completed)))
            .unwrap();
        eng.submit(&mut col, Mutation::Delete("t1".into())).unwrap();

        let c1 = eng.commit(&mut col, d1.ticket, Confirmation::Updated).unwrap();
        // the follow-up is the delete, not the queued (now superseded) update
        let d2 = c1.follow_up.unwrap();
        assert!(matches!(d2.request, Request::Delete(_)));
        let c2 = eng.commit(&mut col, d2.ticket, Confirmation::Deleted).unwrap();
        assert!(c2.follow_up.is_none());
        assert!(!col.contains(&"t1".into()));
        assert!(eng.is_idle());
    }

    #[test]
    fn unknown_ticket_errors() {
        let (mut eng, mut col) = setup();
        assert!(matches!(
            eng.commit(&mut col, 404, Confirmation::Updated),
            Err(LeadMateError::UnknownTicket(404))
        ));
    }

    #[test]
    fn update_of_unknown_entity_errors() {
        let (mut eng, mut col) = setup();
        let result = eng.submit(&mut col, Mutation::Update(Task::new("ghost", "?")));
        assert!(matches!(result, Err(LeadMateError::EntityNotFound(_))));
    }
}
