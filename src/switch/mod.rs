//! Context switch primitive
//!
//! Saves the outgoing thread's machine state and restores the incoming one
//! with `sigsetjmp`/`siglongjmp`. Environments are saved with the signal
//! mask, so restoring a context also restores the mask that was in force
//! when it was saved: fresh threads carry an empty saved mask and start with
//! both managed signals deliverable, while threads suspended inside a
//! library call resume masked and unmask on that call's exit path. Handler
//! re-entry during a switch is therefore impossible.
//!
//! The primitive is callable from inside a signal handler. A thread
//! preempted by the quantum signal is saved inside the handler frame; when
//! it is later restored it finishes the handler normally and the kernel's
//! signal return re-establishes the interrupted mask.

pub mod env;

pub use env::JmpEnv;

use env::{siglongjmp, sigsetjmp};

#[cfg(not(all(target_arch = "x86_64", target_os = "linux", target_env = "gnu")))]
compile_error!("timeslice requires x86_64 Linux with glibc (sigsetjmp pointer mangling)");

/// Outcome of a scheduling decision, produced under the signal mask with all
/// bookkeeping (running ID, quantum counts, timer re-arm) already done.
pub enum Handoff {
    /// The running thread keeps the CPU.
    None,

    /// Save the outgoing environment, then restore the incoming one.
    Switch {
        save: *mut JmpEnv,
        resume: *mut JmpEnv,
    },

    /// Restore only; the outgoing thread is dead and must never resume.
    Jump { resume: *mut JmpEnv },
}

/// Execute a hand-off. For `Switch`, the first return of the save point jumps
/// to the target and this frame stays frozen on the outgoing stack; when the
/// thread is eventually restored, control returns from this function.
///
/// # Safety
/// The environment pointers must refer to live thread records, and the
/// caller must hold no locks: the jump abandons this stack until the thread
/// is scheduled again (or forever, for `Jump`).
#[inline(never)]
pub unsafe fn perform(handoff: Handoff) {
    match handoff {
        Handoff::None => {}
        Handoff::Switch { save, resume } => {
            // sigsetjmp returns twice: 0 when saving, nonzero when the
            // thread is restored by a later siglongjmp.
            if sigsetjmp(save, 1) == 0 {
                siglongjmp(resume, 1);
            }
        }
        Handoff::Jump { resume } => {
            siglongjmp(resume, 1);
        }
    }
}
