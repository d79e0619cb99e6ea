//! Arena of lock-guarded bodies addressed by stable id.

use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::body::RigidBody;
use crate::types::{BodyId, BodyType};

/// One slot of a [`BodySet`].
///
/// The sleep flag sits outside the mutex so solver passes can decide to skip
/// a pair without taking either lock.
#[derive(Debug)]
pub struct BodyCell {
    id: BodyId,
    body_type: BodyType,
    asleep: AtomicBool,
    state: Mutex<RigidBody>,
}

impl BodyCell {
    fn new(id: BodyId, body: RigidBody) -> Self {
        Self {
            id,
            body_type: body.body_type(),
            asleep: AtomicBool::new(false),
            state: Mutex::new(body),
        }
    }

    #[must_use]
    pub const fn id(&self) -> BodyId {
        self.id
    }

    #[must_use]
    pub const fn body_type(&self) -> BodyType {
        self.body_type
    }

    #[must_use]
    pub fn is_asleep(&self) -> bool {
        self.asleep.load(Ordering::Acquire)
    }

    /// Asleep, or static. Either way the solver has nothing to move.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.body_type == BodyType::Static || self.is_asleep()
    }

    /// Force the sleep flag. The sleep policy may change it again on the next
    /// substep.
    pub fn set_asleep(&self, asleep: bool) {
        self.asleep.store(asleep, Ordering::Release);
    }

    /// Block until this body's lock is available.
    pub fn lock(&self) -> MutexGuard<'_, RigidBody> {
        self.state.lock()
    }

    /// Lock-free access when the caller already holds the cell exclusively.
    pub(crate) fn parts_mut(&mut self) -> (&mut RigidBody, &mut bool) {
        (self.state.get_mut(), self.asleep.get_mut())
    }

    fn into_inner(self) -> RigidBody {
        self.state.into_inner()
    }
}

/// Bodies in insertion order.
///
/// Ids increase monotonically and removal keeps the survivors' relative
/// order, so the cells stay sorted by id and lookups are a binary search.
#[derive(Debug, Default)]
pub struct BodySet {
    cells: Vec<BodyCell>,
    next_id: u64,
}

impl BodySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.cells.push(BodyCell::new(id, body));
        id
    }

    /// Remove a body, preserving the order of the remaining ones.
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        let slot = self.slot_of(id)?;
        Some(self.cells.remove(slot).into_inner())
    }

    /// Current slot of `id`. Slots shift when earlier bodies are removed.
    #[must_use]
    pub fn slot_of(&self, id: BodyId) -> Option<usize> {
        self.cells.binary_search_by_key(&id, BodyCell::id).ok()
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&BodyCell> {
        self.cells.get(slot)
    }

    #[must_use]
    pub fn cell(&self, id: BodyId) -> Option<&BodyCell> {
        self.slot_of(id).map(|slot| &self.cells[slot])
    }

    #[must_use]
    pub fn cells(&self) -> &[BodyCell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [BodyCell] {
        &mut self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyCell> {
        self.cells.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Lock the bodies in slots `a` and `b`, returning the guards in that
    /// order.
    ///
    /// The lower [`BodyId`] is always locked first, whatever its role in the
    /// pair, so two workers handling (A, B) and (B, A) cannot deadlock.
    /// Returns `None` for an out-of-range slot or when `a == b`.
    pub fn lock_pair(
        &self,
        a: usize,
        b: usize,
    ) -> Option<(MutexGuard<'_, RigidBody>, MutexGuard<'_, RigidBody>)> {
        if a == b {
            return None;
        }
        let (cell_a, cell_b) = (self.cells.get(a)?, self.cells.get(b)?);
        if cell_a.id < cell_b.id {
            let guard_a = cell_a.lock();
            let guard_b = cell_b.lock();
            Some((guard_a, guard_b))
        } else {
            let guard_b = cell_b.lock();
            let guard_a = cell_a.lock();
            Some((guard_a, guard_b))
        }
    }
}
