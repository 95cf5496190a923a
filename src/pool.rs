//! Process-wide recycling pools for node storage.
//!
//! Three storage kinds dominate allocation traffic: string/key byte
//! buffers, object member vectors, and array element vectors. Each kind
//! has a bounded freelist so a parse can reuse the capacity released by a
//! previous tree instead of round-tripping through the allocator.
//!
//! The pools hold capacity only: every vector is cleared before it is
//! returned. Buffers above [`LARGE_ALLOC_THRESHOLD`] are never pooled and
//! go back to the allocator immediately.
//!
//! Pool access is internally synchronized; everything else in this
//! library is caller-serialized.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::limits::LARGE_ALLOC_THRESHOLD;
use crate::value::{JsonValue, Member};

/// Upper bound on retained entries per freelist.
const MAX_POOLED_PER_KIND: usize = 64;

/// Reuse/return counters across all three pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Byte buffers handed out from the freelist.
    pub buffers_reused: u64,
    /// Byte buffers accepted back into the freelist.
    pub buffers_returned: u64,
    /// Member vectors handed out from the freelist.
    pub member_vecs_reused: u64,
    /// Member vectors accepted back into the freelist.
    pub member_vecs_returned: u64,
    /// Element vectors handed out from the freelist.
    pub element_vecs_reused: u64,
    /// Element vectors accepted back into the freelist.
    pub element_vecs_returned: u64,
}

struct Pools {
    bytes: Mutex<Vec<Vec<u8>>>,
    members: Mutex<Vec<Vec<Member>>>,
    elements: Mutex<Vec<Vec<JsonValue>>>,
    buffers_reused: AtomicU64,
    buffers_returned: AtomicU64,
    member_vecs_reused: AtomicU64,
    member_vecs_returned: AtomicU64,
    element_vecs_reused: AtomicU64,
    element_vecs_returned: AtomicU64,
}

static POOLS: OnceLock<Pools> = OnceLock::new();

fn pools() -> &'static Pools {
    POOLS.get_or_init(|| {
        tracing::debug!("node storage pools initialized");
        Pools {
            bytes: Mutex::new(Vec::new()),
            members: Mutex::new(Vec::new()),
            elements: Mutex::new(Vec::new()),
            buffers_reused: AtomicU64::new(0),
            buffers_returned: AtomicU64::new(0),
            member_vecs_reused: AtomicU64::new(0),
            member_vecs_returned: AtomicU64::new(0),
            element_vecs_reused: AtomicU64::new(0),
            element_vecs_returned: AtomicU64::new(0),
        }
    })
}

/// Pop a recycled byte buffer, if one is available.
pub(crate) fn take_bytes() -> Option<Vec<u8>> {
    let p = pools();
    let buf = match p.bytes.lock() {
        Ok(mut list) => list.pop(),
        Err(_) => None,
    };
    if buf.is_some() {
        p.buffers_reused.fetch_add(1, Ordering::Relaxed);
    }
    buf
}

/// Return a byte buffer's capacity to the pool.
pub(crate) fn give_bytes(mut buf: Vec<u8>) {
    buf.clear();
    if buf.capacity() == 0 || buf.capacity() > LARGE_ALLOC_THRESHOLD {
        return;
    }
    let p = pools();
    if let Ok(mut list) = p.bytes.lock() {
        if list.len() < MAX_POOLED_PER_KIND {
            list.push(buf);
            p.buffers_returned.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Take a member vector, recycled if possible.
pub(crate) fn take_members() -> Vec<Member> {
    let p = pools();
    let recycled = match p.members.lock() {
        Ok(mut list) => list.pop(),
        Err(_) => None,
    };
    match recycled {
        Some(v) => {
            p.member_vecs_reused.fetch_add(1, Ordering::Relaxed);
            v
        }
        None => Vec::new(),
    }
}

/// Return a member vector's capacity to the pool.
///
/// The vector is cleared (dropping its contents) before the pool lock is
/// taken, so nested drops that re-enter the pools cannot deadlock.
pub(crate) fn give_members(mut v: Vec<Member>) {
    v.clear();
    if v.capacity() == 0 {
        return;
    }
    let p = pools();
    if let Ok(mut list) = p.members.lock() {
        if list.len() < MAX_POOLED_PER_KIND {
            list.push(v);
            p.member_vecs_returned.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Take an element vector, recycled if possible.
pub(crate) fn take_elements() -> Vec<JsonValue> {
    let p = pools();
    let recycled = match p.elements.lock() {
        Ok(mut list) => list.pop(),
        Err(_) => None,
    };
    match recycled {
        Some(v) => {
            p.element_vecs_reused.fetch_add(1, Ordering::Relaxed);
            v
        }
        None => Vec::new(),
    }
}

/// Return an element vector's capacity to the pool.
pub(crate) fn give_elements(mut v: Vec<JsonValue>) {
    v.clear();
    if v.capacity() == 0 {
        return;
    }
    let p = pools();
    if let Ok(mut list) = p.elements.lock() {
        if list.len() < MAX_POOLED_PER_KIND {
            list.push(v);
            p.element_vecs_returned.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Snapshot of the pool counters.
pub fn stats() -> PoolStats {
    let p = pools();
    PoolStats {
        buffers_reused: p.buffers_reused.load(Ordering::Relaxed),
        buffers_returned: p.buffers_returned.load(Ordering::Relaxed),
        member_vecs_reused: p.member_vecs_reused.load(Ordering::Relaxed),
        member_vecs_returned: p.member_vecs_returned.load(Ordering::Relaxed),
        element_vecs_reused: p.element_vecs_reused.load(Ordering::Relaxed),
        element_vecs_returned: p.element_vecs_returned.load(Ordering::Relaxed),
    }
}
