//! Storage slot allocation.
//!
//! Every scope hands out integer slots from its own counter. Slots of nested
//! scopes are frame relative and count up from 1 (slot 0 holds the return
//! value). Slots of the global scope count down from [`MAX_GLOBAL_VAR`].
//! Anything above [`MAX_GLOBAL_VAR`] encodes a compile-time constant.
//!
//! Temporaries allocated as reusable are tracked in the scope's pool; once
//! released, the smallest free slot is handed out again before the counter
//! advances.

use std::fmt;

use tracing::trace;

use crate::error::{Result, SymtabError};
use crate::scope::Scope;

/// Ceiling of the global slot range.
pub const MAX_GLOBAL_VAR: u32 = 0x00FF_FFFF;

/// First value of the constant range.
pub const CONSTANT_BASE: u32 = MAX_GLOBAL_VAR + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(pub u32);

impl Location {
    pub const RETURN_VALUE: Location = Location(0);

    /// Location of the `index`-th entry in the constant table.
    pub fn constant(index: u32) -> Location {
        Location(CONSTANT_BASE.saturating_add(index))
    }

    pub fn is_constant(self) -> bool {
        self.0 > MAX_GLOBAL_VAR
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            write!(f, "const#{}", self.0 - CONSTANT_BASE)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A slot that was handed out as reusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReusableLocation {
    pub location: Location,
    pub in_use: bool,
}

impl Scope {
    /// Hand out the next slot of this scope.
    ///
    /// A released slot is recycled first, whether or not `reusable` is set.
    /// Fresh slots requested as `reusable` are registered in the pool so a
    /// later [`Scope::release`] can recycle them.
    pub fn make_location(&mut self, reusable: bool) -> Result<Location> {
        if self.free_count > 0 {
            let (idx, slot) = self
                .pool
                .iter()
                .enumerate()
                .filter(|(_, slot)| !slot.in_use)
                .min_by_key(|(_, slot)| slot.location)
                .map(|(idx, slot)| (idx, *slot))
                .ok_or(SymtabError::InvalidState("free count out of sync with pool"))?;

            self.free_count -= 1;
            self.pool.remove(idx);
            trace!(location = %slot.location, "reusing location");
            return Ok(slot.location);
        }

        if self.next_storage >= MAX_GLOBAL_VAR {
            return Err(SymtabError::Allocation("storage slot range"));
        }

        let next = self.next_storage;
        self.next_storage += 1;

        let location = if self.is_root() {
            Location(MAX_GLOBAL_VAR - next)
        } else {
            Location(next)
        };

        if reusable {
            self.pool
                .try_reserve(1)
                .map_err(|_| SymtabError::Allocation("reuse pool"))?;
            self.pool.push(ReusableLocation {
                location,
                in_use: true,
            });
        }

        trace!(%location, reusable, "new location");
        Ok(location)
    }

    /// Return a reusable slot to the pool.
    pub fn release(&mut self, location: Location) -> Result<()> {
        if location.is_constant() {
            return Err(SymtabError::NotReusable(location));
        }

        let slot = self
            .pool
            .iter_mut()
            .find(|slot| slot.in_use && slot.location == location)
            .ok_or(SymtabError::LocationNotFound(location))?;

        slot.in_use = false;
        self.free_count += 1;
        trace!(%location, free = self.free_count, "released location");
        Ok(())
    }

    /// Whether `location` lies in the frame-relative range, judged against
    /// this (global) scope's counter.
    pub fn is_on_stack(&self, location: Location) -> bool {
        location.0 < MAX_GLOBAL_VAR.saturating_sub(self.next_storage)
    }

    /// Number of released slots waiting to be recycled.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    pub fn next_storage(&self) -> u32 {
        self.next_storage
    }

    pub fn pool(&self) -> &[ReusableLocation] {
        &self.pool
    }
}
