//! Public thread operations
//!
//! C-style contract: `0` (or a new thread ID) on success, `-1` on a library
//! error with a message on the diagnostic channel. System-call failures do
//! not return at all: the runtime releases its resources, prints
//! `system error: <message>` and exits(1).

use crate::error::ThreadError;
use crate::{runtime, Tid, MAX_THREAD_NUM};

/// Initialize the library with the quantum length in microseconds and start
/// time-slicing. Must be called exactly once, before any other operation.
/// Returns 0, or -1 for a non-positive quantum.
pub fn init(quantum_usecs: i32) -> i32 {
    if quantum_usecs <= 0 {
        return report(ThreadError::InvalidQuantum {
            usecs: quantum_usecs,
        });
    }
    match runtime::init(quantum_usecs as u64) {
        Ok(()) => 0,
        Err(err) => report(err),
    }
}

/// Spawn a thread running `entry` and append it to the ready queue. The
/// entry function must call `terminate` on itself instead of returning.
/// Returns the new ID (>= 1), or -1 when the thread limit is reached.
pub fn spawn(entry: fn()) -> i32 {
    match runtime::spawn(entry) {
        Ok(tid) => tid as i32,
        Err(err) => report(err),
    }
}

/// Terminate a thread and release its resources. Terminating the main
/// thread (`tid == 0`) tears the whole library down and exits(0);
/// self-termination hands the CPU to the next ready thread and does not
/// return. Returns 0, or -1 for an unknown ID.
pub fn terminate(tid: i32) -> i32 {
    let Some(tid) = to_tid(tid) else {
        return report_unknown(tid);
    };
    match runtime::terminate(tid) {
        Ok(()) => 0,
        Err(err) => report(err),
    }
}

/// Block a thread until `resume`. Blocking the main thread is an error;
/// blocking an already-blocked thread is a no-op. A self-block hands the
/// CPU over and returns 0 once the thread is resumed and scheduled again.
pub fn block(tid: i32) -> i32 {
    let Some(tid) = to_tid(tid) else {
        return report_unknown(tid);
    };
    match runtime::block(tid) {
        Ok(()) => 0,
        Err(err) => report(err),
    }
}

/// Move a blocked thread back to ready. Resuming a running, ready or
/// sleeping thread is a successful no-op. Returns 0, or -1 for an unknown
/// ID.
pub fn resume(tid: i32) -> i32 {
    let Some(tid) = to_tid(tid) else {
        return report_unknown(tid);
    };
    match runtime::resume(tid) {
        Ok(()) => 0,
        Err(err) => report(err),
    }
}

/// Put the calling thread to sleep for `usecs` microseconds of real time
/// and hand the CPU over. The main thread cannot sleep. Returns 0 once the
/// thread has woken and been scheduled again.
pub fn sleep(usecs: i32) -> i32 {
    if usecs <= 0 {
        return report(ThreadError::InvalidSleep { usecs });
    }
    match runtime::sleep(usecs as u64) {
        Ok(()) => 0,
        Err(err) => report(err),
    }
}

/// ID of the calling thread; 0 is the main thread.
pub fn get_tid() -> i32 {
    runtime::current_tid().map(|tid| tid as i32).unwrap_or(0)
}

/// Total number of quanta since `init`, the current one included. Exactly 1
/// right after `init`; +1 on every quantum expiry and every context switch.
pub fn get_total_quantums() -> i32 {
    runtime::total_quantums() as i32
}

/// Number of quanta in which the thread was running, the current one
/// included (so at least 1 for any thread that ever ran). Returns -1 for an
/// unknown ID.
pub fn get_quantums(tid: i32) -> i32 {
    let Some(tid) = to_tid(tid) else {
        return report_unknown(tid);
    };
    match runtime::quantums(tid) {
        Ok(quants) => quants as i32,
        Err(err) => report(err),
    }
}

fn to_tid(tid: i32) -> Option<Tid> {
    if (0..MAX_THREAD_NUM as i32).contains(&tid) {
        Some(tid as Tid)
    } else {
        None
    }
}

fn report(err: ThreadError) -> i32 {
    eprintln!("thread library error: {}", err);
    -1
}

fn report_unknown(tid: i32) -> i32 {
    eprintln!("thread library error: no thread with id {}", tid);
    -1
}
