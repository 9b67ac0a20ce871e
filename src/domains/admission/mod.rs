//! Counting admission gate for capacity-limited locations.
//!
//! Acquisition never blocks: a full gate refuses immediately and the caller
//! picks another target on its next decision tick.

use crate::domains::agent::AgentId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct ResourceAdmission {
    capacity: usize,
    occupants: Mutex<HashSet<AgentId>>,
}

impl ResourceAdmission {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            occupants: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }

    fn occupants(&self) -> MutexGuard<'_, HashSet<AgentId>> {
        self.occupants.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take a slot for `agent` if one is free.
    ///
    /// An agent that already holds a slot keeps it and gets `true` without
    /// consuming a second one.
    pub fn try_acquire(&self, agent: AgentId) -> bool {
        let mut occupants = self.occupants();
        if occupants.contains(&agent) {
            return true;
        }
        if occupants.len() >= self.capacity {
            return false;
        }
        occupants.insert(agent)
    }

    /// Give back `agent`'s slot. Releasing a non-occupant is a no-op.
    pub fn release(&self, agent: AgentId) -> bool {
        self.occupants().remove(&agent)
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants().len()
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.occupant_count())
    }

    /// Acquire a slot wrapped in a guard that releases it when dropped.
    pub fn try_reserve(self: &Arc<Self>, agent: AgentId) -> Option<Reservation> {
        if self.try_acquire(agent) {
            Some(Reservation {
                admission: Arc::clone(self),
                agent,
            })
        } else {
            None
        }
    }
}

/// A held admission slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct Reservation {
    admission: Arc<ResourceAdmission>,
    agent: AgentId,
}

impl Reservation {
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.admission.release(self.agent);
    }
}
