//! Library error types
//!
//! Validation, not-found and capacity errors are surfaced to the caller;
//! system-call failures never reach this type (they abort the process, see
//! `runtime::fatal`).

use core::fmt;

use crate::Tid;

/// Errors reported by the public thread operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    /// `init` was called with a non-positive quantum length.
    InvalidQuantum { usecs: i32 },

    /// `sleep` was called with a non-positive duration.
    InvalidSleep { usecs: i32 },

    /// No live thread carries this ID.
    NoSuchThread { tid: Tid },

    /// The live-thread table is full.
    ThreadLimitReached { max: usize },

    /// The main thread cannot be blocked.
    MainThreadBlock,

    /// The main thread cannot be put to sleep.
    MainThreadSleep,

    /// An operation was called before `init`.
    NotInitialized,

    /// `init` was called a second time.
    AlreadyInitialized,
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidQuantum { usecs } => {
                write!(f, "quantum length must be positive, got {}", usecs)
            }
            Self::InvalidSleep { usecs } => {
                write!(f, "sleep duration must be positive, got {}", usecs)
            }
            Self::NoSuchThread { tid } => write!(f, "no thread with id {}", tid),
            Self::ThreadLimitReached { max } => {
                write!(f, "thread limit reached ({} live threads)", max)
            }
            Self::MainThreadBlock => write!(f, "the main thread cannot be blocked"),
            Self::MainThreadSleep => write!(f, "the main thread cannot sleep"),
            Self::NotInitialized => write!(f, "the thread library is not initialized"),
            Self::AlreadyInitialized => write!(f, "the thread library is already initialized"),
        }
    }
}

/// Result type for thread operations.
pub type ThreadResult<T> = Result<T, ThreadError>;
