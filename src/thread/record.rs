//! Thread record
//!
//! One record per live thread: the stack buffer, the saved execution
//! environment, the block/sleep flags and the per-thread quantum count.

use crate::switch::JmpEnv;
use crate::thread::Stack;
use crate::STACK_SIZE;

/// A schedulable thread.
pub struct Thread {
    /// Owned stack buffer. The main thread runs on the process stack and
    /// carries no buffer.
    stack: Option<Stack>,

    /// Saved machine state; restored by the dispatcher.
    env: JmpEnv,

    /// Set by an explicit block request.
    blocked: bool,

    /// Set while the thread sits in the sleep queue.
    sleeping: bool,

    /// Number of quanta in which this thread was the running thread.
    quants: u64,
}

impl Thread {
    /// The synthetic main thread: no stack allocation, immediately running,
    /// so its quantum count starts at 1.
    pub fn main() -> Self {
        Self {
            stack: None,
            env: JmpEnv::empty(),
            blocked: false,
            sleeping: false,
            quants: 1,
        }
    }

    /// A spawned worker whose first run begins at `entry`. Returns `None`
    /// when the stack allocation fails; the caller escalates that to a
    /// system error.
    pub fn worker(entry: fn()) -> Option<Self> {
        let stack = Stack::new(STACK_SIZE)?;
        let mut env = JmpEnv::empty();
        unsafe {
            env.fabricate(stack.top(), entry as usize as u64);
        }

        Some(Self {
            stack: Some(stack),
            env,
            blocked: false,
            sleeping: false,
            quants: 0,
        })
    }

    /// Pointer to the saved environment, for the dispatcher. Records are
    /// boxed in the registry, so the address is stable.
    pub fn env_ptr(&mut self) -> *mut JmpEnv {
        &mut self.env
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn set_sleeping(&mut self, sleeping: bool) {
        self.sleeping = sleeping;
    }

    pub fn quants(&self) -> u64 {
        self.quants
    }

    /// Called by the dispatcher each time this thread becomes the running
    /// thread.
    pub fn bump_quants(&mut self) {
        self.quants += 1;
    }

    /// Detach the stack buffer, leaking it for the remainder of the process.
    /// Used when tearing the library down from a worker: the caller is still
    /// executing on this buffer and control never returns to it.
    pub fn leak_stack(&mut self) {
        if let Some(stack) = self.stack.take() {
            core::mem::forget(stack);
        }
    }
}
