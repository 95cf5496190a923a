//! Size-routed buffer acquisition with per-parse budget accounting.
//!
//! Every byte buffer the tree builder needs passes through [`take_bytes`]:
//! the request is debited against an [`AllocBudget`] first, then satisfied
//! either from the recycling pool (requests at or below
//! [`LARGE_ALLOC_THRESHOLD`]) or by a fresh, fallible allocation. A budget
//! breach or allocator refusal fails the request without side effect; the
//! budget is only charged for buffers actually handed out.
//!
//! Operations outside a parse (constructors, deep copy, path set) run
//! against an unlimited budget; acquisition stays fallible either way.

use crate::error::{Error, JsonkResult};
use crate::limits::LARGE_ALLOC_THRESHOLD;
use crate::pool;

/// Running debit counter against a byte cap.
#[derive(Debug, Clone, Copy)]
pub struct AllocBudget {
    used: usize,
    cap: usize,
}

impl AllocBudget {
    /// Budget capped at `cap` bytes.
    pub const fn limited(cap: usize) -> Self {
        Self { used: 0, cap }
    }

    /// Budget that never refuses a debit.
    pub const fn unlimited() -> Self {
        Self {
            used: 0,
            cap: usize::MAX,
        }
    }

    /// Debit `size` bytes, failing without side effect on breach.
    pub fn charge(&mut self, size: usize) -> JsonkResult<()> {
        if self.used.saturating_add(size) > self.cap {
            tracing::warn!(
                used = self.used,
                requested = size,
                cap = self.cap,
                "memory budget exhausted"
            );
            return Err(Error::MemoryLimit {
                used: self.used,
                requested: size,
                cap: self.cap,
            });
        }
        self.used += size;
        Ok(())
    }

    /// Undo a debit for a request that could not be satisfied.
    pub fn credit(&mut self, size: usize) {
        self.used = self.used.saturating_sub(size);
    }

    /// Bytes debited so far.
    pub fn used(&self) -> usize {
        self.used
    }
}

/// Acquire an empty byte buffer with capacity for at least `cap` bytes.
pub fn take_bytes(budget: &mut AllocBudget, cap: usize) -> JsonkResult<Vec<u8>> {
    budget.charge(cap)?;
    let result = if cap <= LARGE_ALLOC_THRESHOLD {
        recycled_or_fresh(cap)
    } else {
        fresh(cap)
    };
    match result {
        Ok(buf) => Ok(buf),
        Err(e) => {
            budget.credit(cap);
            Err(e)
        }
    }
}

fn recycled_or_fresh(cap: usize) -> JsonkResult<Vec<u8>> {
    match pool::take_bytes() {
        Some(mut buf) => {
            if buf.capacity() < cap {
                let additional = cap - buf.capacity();
                if buf.try_reserve_exact(additional).is_err() {
                    return Err(Error::AllocFailed(cap));
                }
            }
            Ok(buf)
        }
        None => fresh(cap),
    }
}

fn fresh(cap: usize) -> JsonkResult<Vec<u8>> {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(cap).is_err() {
        return Err(Error::AllocFailed(cap));
    }
    Ok(buf)
}
