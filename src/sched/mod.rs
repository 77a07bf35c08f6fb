//! Scheduling subsystem
//!
//! Round-robin ready queue, wake-time-ordered sleep queue, and the
//! selection policies the dispatcher applies on preemption, termination,
//! block and sleep.

pub mod ready;
pub mod scheduler;
pub mod sleep;

pub use ready::ReadyQueue;
pub use scheduler::Scheduler;
pub use sleep::{SleepQueue, Sleeper};
