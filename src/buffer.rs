//! Reusable byte buffers for rendering.
//!
//! Every borrow owns its `Vec<u8>` exclusively until the guard drops, so
//! nested and concurrent borrows never share storage. Acquiring never
//! blocks: an empty pool hands out a fresh buffer and a full pool lets the
//! returned one go.

use crossbeam::queue::ArrayQueue;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;

/// Capacity of freshly allocated buffers.
pub const INITIAL_CAPACITY: usize = 1024;

/// Buffers that grew beyond this are dropped instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 16 << 10;

const GLOBAL_SLOTS: usize = 256;

static GLOBAL: LazyLock<BufferPool> = LazyLock::new(|| BufferPool::new(GLOBAL_SLOTS));

/// Lock-free pool of byte buffers.
pub struct BufferPool {
    free: ArrayQueue<Vec<u8>>,
}

impl BufferPool {
    /// Pool holding at most `slots` idle buffers.
    pub fn new(slots: usize) -> Self {
        BufferPool {
            free: ArrayQueue::new(slots.max(1)),
        }
    }

    /// The process-wide pool used by the handlers.
    pub fn global() -> &'static BufferPool {
        &GLOBAL
    }

    pub fn get(&self) -> PooledBuf<'_> {
        let buf = self
            .free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_CAPACITY));
        PooledBuf { buf, pool: self }
    }

    /// Number of idle buffers waiting for reuse.
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            tracing::trace!(capacity = buf.capacity(), "discarding oversized buffer");
            return;
        }
        buf.clear();
        // Full pool: the buffer is simply freed.
        let _ = self.free.push(buf);
    }
}

/// Borrow a buffer from the process-wide pool.
pub fn get() -> PooledBuf<'static> {
    BufferPool::global().get()
}

/// Exclusive borrow of a pooled buffer, returned to its pool on drop.
pub struct PooledBuf<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuf<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        self.pool.put(mem::take(&mut self.buf));
    }
}
