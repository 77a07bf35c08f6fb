//! # timeslice
//!
//! Preemptive user-space threads multiplexed onto a single OS thread.
//!
//! The library time-slices logical threads with a virtual-time quantum timer
//! (`SIGVTALRM`) and wakes sleepers with a one-shot real-time timer
//! (`SIGALRM`). Scheduling is strict round-robin; a context switch saves and
//! restores the machine state with `sigsetjmp`/`siglongjmp`, which also
//! carries the signal mask across the hand-off.
//!
//! All mutable scheduler state is process-wide and shared with the two signal
//! handlers. Safety comes from one discipline: every public operation masks
//! both managed signals before touching that state, and the handlers are
//! installed with both signals in their `sa_mask`. At any instant exactly one
//! of {application code, quantum handler, wake handler} runs.
//!
//! # Example
//!
//! ```no_run
//! fn worker() {
//!     // ... do work ...
//!     timeslice::terminate(timeslice::get_tid());
//! }
//!
//! fn main() {
//!     timeslice::init(100_000);
//!     let tid = timeslice::spawn(worker);
//!     assert!(tid > 0);
//!     // main keeps running; workers are preempted every quantum
//! }
//! ```

pub mod api;
pub mod error;
pub mod sched;
pub mod signals;
pub mod switch;
pub mod thread;
pub mod time;
pub mod timer;

mod runtime;

pub use api::{
    block, get_quantums, get_tid, get_total_quantums, init, resume, sleep, spawn, terminate,
};
pub use error::{ThreadError, ThreadResult};

/// Maximum number of concurrently live threads, the main thread included.
pub const MAX_THREAD_NUM: usize = 100;

/// Stack size of a spawned thread, in bytes. Signal handlers run on the
/// interrupted thread's stack, so this must hold a kernel signal frame plus
/// the dispatch path on top of user frames.
pub const STACK_SIZE: usize = 16 * 1024;

/// Thread identifier. `0` is the main thread.
pub type Tid = usize;
