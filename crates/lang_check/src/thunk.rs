// ==============================================================================
// Deferred values
// ==============================================================================
//
// Each binding of a `let` or `rec { }` group gets a slot that is computed on
// first use and memoized for the rest of the run. A slot moves
// Deferred -> Forcing -> Forced exactly once; asking for a slot that is
// currently being forced is a cycle and reported as `ThunkError::Loop`.

use derive_more::Debug;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[debug("Thunk({_0})")]
pub struct ThunkId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThunkError {
    #[error("deferred value {0:?} depends on itself")]
    Loop(ThunkId),

    #[error("unknown deferred value {0:?}")]
    Unknown(ThunkId),

    #[error("deferred value {0:?} was finished without being started")]
    NotForcing(ThunkId),

    #[error("deferred value {0:?} was filled twice")]
    AlreadyFilled(ThunkId),
}

enum Slot<P, T> {
    /// Allocated, payload not known yet.
    Reserved,
    Deferred(P),
    Forcing,
    Forced(T),
}

/// What `start` found in a slot.
pub enum Force<P, T> {
    /// Already computed.
    Ready(T),
    /// Not computed yet. The caller computes the value from the pending
    /// payload and hands it back with `finish`.
    Start(P),
}

pub struct Thunks<P, T> {
    slots: Vec<Slot<P, T>>,
}

impl<P, T> Default for Thunks<P, T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<P, T: Clone> Thunks<P, T> {
    /// Allocate a slot whose payload is supplied later with `fill`. Lets a
    /// group of slots refer to each other's ids.
    pub fn reserve(&mut self) -> ThunkId {
        let id = ThunkId(self.slots.len() as u32);
        self.slots.push(Slot::Reserved);
        id
    }

    pub fn fill(&mut self, id: ThunkId, pending: P) -> Result<(), ThunkError> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(ThunkError::Unknown(id))?;

        match slot {
            Slot::Reserved => {
                *slot = Slot::Deferred(pending);
                Ok(())
            }
            _ => Err(ThunkError::AlreadyFilled(id)),
        }
    }

    pub fn start(&mut self, id: ThunkId) -> Result<Force<P, T>, ThunkError> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(ThunkError::Unknown(id))?;

        match std::mem::replace(slot, Slot::Forcing) {
            Slot::Reserved => {
                *slot = Slot::Reserved;
                Err(ThunkError::Unknown(id))
            }
            Slot::Deferred(pending) => Ok(Force::Start(pending)),
            Slot::Forcing => Err(ThunkError::Loop(id)),
            Slot::Forced(value) => {
                let ready = value.clone();
                *slot = Slot::Forced(value);
                Ok(Force::Ready(ready))
            }
        }
    }

    pub fn finish(&mut self, id: ThunkId, value: T) -> Result<(), ThunkError> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(ThunkError::Unknown(id))?;

        match slot {
            Slot::Forcing => {
                *slot = Slot::Forced(value);
                Ok(())
            }
            Slot::Reserved | Slot::Deferred(_) | Slot::Forced(_) => {
                Err(ThunkError::NotForcing(id))
            }
        }
    }
}
