//! Interval timer services
//!
//! Two process timers drive the scheduler: a virtual-time timer whose expiry
//! delivers the quantum signal, and a one-shot real-time timer whose expiry
//! delivers the wake signal. Arming a timer that is already running
//! overwrites it, which is exactly the "reset to a full quantum" / "replace
//! the deadline" semantics the dispatcher needs.

use core::ptr;
use std::io;

use crate::time;

/// Periodic virtual-time timer with a fixed quantum.
pub struct VirtualTimer {
    quantum_usecs: u64,
}

impl VirtualTimer {
    pub fn new(quantum_usecs: u64) -> Self {
        Self { quantum_usecs }
    }

    /// (Re-)arm the timer for a full quantum. The interval is set as well,
    /// so the kernel re-arms even if a restart is ever missed.
    pub fn start(&self) -> io::Result<()> {
        let slice = time::to_timeval(self.quantum_usecs);
        arm(libc::ITIMER_VIRTUAL, slice, slice)
    }

    pub fn stop(&self) -> io::Result<()> {
        disarm(libc::ITIMER_VIRTUAL)
    }
}

/// One-shot real-time timer for sleep expiry.
pub struct RealTimer;

impl RealTimer {
    pub fn new() -> Self {
        Self
    }

    /// Arm (or replace) the wake-up deadline, `delay_usecs` from now. A zero
    /// `it_value` would disarm the timer, so the delay is clamped to 1 µs.
    pub fn start(&self, delay_usecs: u64) -> io::Result<()> {
        let zero = time::to_timeval(0);
        let value = time::to_timeval(delay_usecs.max(1));
        arm(libc::ITIMER_REAL, value, zero)
    }

    pub fn stop(&self) -> io::Result<()> {
        disarm(libc::ITIMER_REAL)
    }
}

impl Default for RealTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Disarm both timers, ignoring failures. Used on the fatal-error path
/// where no further signal must reach the (possibly dismantled) scheduler.
pub fn disarm_all() {
    let _ = disarm(libc::ITIMER_VIRTUAL);
    let _ = disarm(libc::ITIMER_REAL);
}

fn arm(which: libc::c_int, value: libc::timeval, interval: libc::timeval) -> io::Result<()> {
    let spec = libc::itimerval {
        it_interval: interval,
        it_value: value,
    };
    let rc = unsafe { libc::setitimer(which, &spec, ptr::null_mut()) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn disarm(which: libc::c_int) -> io::Result<()> {
    arm(which, time::to_timeval(0), time::to_timeval(0))
}
