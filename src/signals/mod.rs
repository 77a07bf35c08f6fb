//! Signal core
//!
//! The library reserves two signals: `SIGVTALRM` (quantum expiry, virtual
//! time) and `SIGALRM` (sleep expiry, real time). Both handlers are
//! installed with both signals in `sa_mask`, and every public operation
//! masks both around its critical section, so at any instant exactly one of
//! {application code, quantum handler, wake handler} touches scheduler
//! state. That discipline is the only thing that makes the non-signal-safe
//! mutation inside the handlers sound; nothing here may run with either
//! signal deliverable.

use core::mem;
use core::ptr;

use crate::runtime;

/// Virtual-timer expiry: time to preempt the running thread.
pub const QUANTUM_SIGNAL: libc::c_int = libc::SIGVTALRM;

/// Real-timer expiry: the earliest sleeper is due.
pub const WAKE_SIGNAL: libc::c_int = libc::SIGALRM;

/// The set of both managed signals.
fn managed_set() -> libc::sigset_t {
    unsafe {
        let mut set: libc::sigset_t = mem::zeroed();
        if libc::sigemptyset(&mut set) < 0
            || libc::sigaddset(&mut set, QUANTUM_SIGNAL) < 0
            || libc::sigaddset(&mut set, WAKE_SIGNAL) < 0
        {
            runtime::fatal("failed to build the managed signal set");
        }
        set
    }
}

/// RAII guard masking both managed signals for the scope of a library
/// operation. A context switch hands the unmasking duty to the restored
/// thread: the guard of a suspended call simply stays on its frozen stack
/// until the thread is scheduled again and the call returns.
pub struct Masked {
    _not_send: core::marker::PhantomData<*const ()>,
}

impl Masked {
    pub fn new() -> Self {
        change_mask(libc::SIG_BLOCK);
        Self {
            _not_send: core::marker::PhantomData,
        }
    }
}

impl Drop for Masked {
    fn drop(&mut self) {
        change_mask(libc::SIG_UNBLOCK);
    }
}

fn change_mask(how: libc::c_int) {
    let set = managed_set();
    let rc = unsafe { libc::sigprocmask(how, &set, ptr::null_mut()) };
    if rc < 0 {
        runtime::fatal("failed to change the signal mask");
    }
}

/// Install both handlers. Must run after the runtime singleton is in place:
/// a handler that fires finds the scheduler state ready (or, after
/// teardown, finds nothing and returns).
pub fn install_handlers() {
    install(QUANTUM_SIGNAL, handle_quantum as usize);
    install(WAKE_SIGNAL, handle_wake as usize);
}

fn install(sig: libc::c_int, handler: libc::sighandler_t) {
    unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_mask = managed_set();
        action.sa_flags = 0;
        if libc::sigaction(sig, &action, ptr::null_mut()) < 0 {
            runtime::fatal("sigaction failed");
        }
    }
}

extern "C" fn handle_quantum(sig: libc::c_int) {
    if sig == QUANTUM_SIGNAL {
        runtime::on_quantum_signal();
    }
}

extern "C" fn handle_wake(sig: libc::c_int) {
    if sig == WAKE_SIGNAL {
        runtime::on_wake_signal();
    }
}
