//! Wall-clock helpers
//!
//! Sleep deadlines are absolute microsecond timestamps so the wake handler
//! can compare the queue head against "now" directly.

use core::ptr;

/// Current wall-clock time in microseconds since the epoch.
pub fn now_micros() -> u64 {
    let mut tv = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    // gettimeofday only fails for bad pointers; ignore the return value the
    // way the rest of the ecosystem does.
    unsafe {
        libc::gettimeofday(&mut tv, ptr::null_mut());
    }
    tv.tv_sec as u64 * 1_000_000 + tv.tv_usec as u64
}

/// Absolute wake-up time for a sleep of `usecs` starting now.
pub fn wake_at(usecs: u64) -> u64 {
    now_micros() + usecs
}

/// Split a microsecond count into the `timeval` the timer syscalls expect.
/// The kernel rejects `tv_usec >= 1_000_000`.
pub fn to_timeval(usecs: u64) -> libc::timeval {
    libc::timeval {
        tv_sec: (usecs / 1_000_000) as libc::time_t,
        tv_usec: (usecs % 1_000_000) as libc::suseconds_t,
    }
}
