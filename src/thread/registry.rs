//! Thread registry
//!
//! Owns every live thread record, indexed by ID. IDs are allocated
//! smallest-unused-first; slot 0 is reserved for the main thread.

use crate::error::{ThreadError, ThreadResult};
use crate::thread::Thread;
use crate::{Tid, MAX_THREAD_NUM};

/// Slot table of live threads.
pub struct Registry {
    slots: Vec<Option<Box<Thread>>>,
}

impl Registry {
    /// A registry holding only the synthetic main thread.
    pub fn new() -> Self {
        let mut slots: Vec<Option<Box<Thread>>> = (0..MAX_THREAD_NUM).map(|_| None).collect();
        slots[0] = Some(Box::new(Thread::main()));
        Self { slots }
    }

    /// Construct a worker record in the smallest free slot and return its ID.
    pub fn create(&mut self, entry: fn()) -> ThreadResult<Tid> {
        let tid = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(ThreadError::ThreadLimitReached { max: MAX_THREAD_NUM })?;

        let record = match Thread::worker(entry) {
            Some(record) => record,
            None => crate::runtime::fatal("thread stack allocation failed"),
        };

        self.slots[tid] = Some(Box::new(record));
        log::debug!("thread {} created", tid);
        Ok(tid)
    }

    /// Remove a record, handing it back to the caller. The caller decides
    /// whether the record may be dropped immediately or must outlive the
    /// switch away from it (self-termination).
    pub fn kill(&mut self, tid: Tid) -> ThreadResult<Box<Thread>> {
        self.slot_mut(tid)?;
        log::debug!("thread {} killed", tid);
        Ok(self.slots[tid].take().expect("slot checked above"))
    }

    /// Set the blocked flag. Blocking an already-blocked thread is a no-op.
    pub fn block(&mut self, tid: Tid) -> ThreadResult<()> {
        self.slot_mut(tid)?.set_blocked(true);
        Ok(())
    }

    /// Clear the blocked flag. Unblocking a non-blocked thread is a no-op.
    pub fn unblock(&mut self, tid: Tid) -> ThreadResult<()> {
        self.slot_mut(tid)?.set_blocked(false);
        Ok(())
    }

    /// Mark the thread as sleeping.
    pub fn sleep(&mut self, tid: Tid) -> ThreadResult<()> {
        self.slot_mut(tid)?.set_sleeping(true);
        Ok(())
    }

    /// Clear the sleeping flag. Waking a thread that is not sleeping is a
    /// no-op, but the Ok still tells the wake handler the thread exists.
    pub fn wake(&mut self, tid: Tid) -> ThreadResult<()> {
        self.slot_mut(tid)?.set_sleeping(false);
        Ok(())
    }

    pub fn quants(&self, tid: Tid) -> ThreadResult<u64> {
        Ok(self.slot(tid)?.quants())
    }

    pub fn is_blocked(&self, tid: Tid) -> ThreadResult<bool> {
        Ok(self.slot(tid)?.is_blocked())
    }

    pub fn is_sleeping(&self, tid: Tid) -> ThreadResult<bool> {
        Ok(self.slot(tid)?.is_sleeping())
    }

    pub fn exists(&self, tid: Tid) -> bool {
        tid < MAX_THREAD_NUM && self.slots[tid].is_some()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Mutable record access for the dispatcher (environment pointer,
    /// quantum bookkeeping).
    pub fn record_mut(&mut self, tid: Tid) -> ThreadResult<&mut Thread> {
        self.slot_mut(tid)
    }

    /// Drain every record except `keep`, whose stack is leaked because the
    /// caller is still executing on it. Used by full teardown.
    pub fn drain_for_exit(&mut self, keep: Tid) {
        for (tid, slot) in self.slots.iter_mut().enumerate() {
            if tid == keep {
                if let Some(record) = slot.as_mut() {
                    record.leak_stack();
                }
            }
            *slot = None;
        }
    }

    fn slot(&self, tid: Tid) -> ThreadResult<&Thread> {
        self.slots
            .get(tid)
            .and_then(|slot| slot.as_deref())
            .ok_or(ThreadError::NoSuchThread { tid })
    }

    fn slot_mut(&mut self, tid: Tid) -> ThreadResult<&mut Thread> {
        self.slots
            .get_mut(tid)
            .and_then(|slot| slot.as_deref_mut())
            .ok_or(ThreadError::NoSuchThread { tid })
    }
}
