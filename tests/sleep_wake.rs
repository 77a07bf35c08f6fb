//! Sleepers are readied in ascending wake-time order regardless of the
//! order in which they went to sleep.

use std::hint;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

static SEQ: AtomicI32 = AtomicI32::new(0);
static WOKE_1: AtomicI32 = AtomicI32::new(-1);
static WOKE_2: AtomicI32 = AtomicI32::new(-1);
static WOKE_3: AtomicI32 = AtomicI32::new(-1);

fn sleeper_long() {
    timeslice::sleep(300_000);
    WOKE_1.store(SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
    timeslice::terminate(timeslice::get_tid());
    loop {
        hint::spin_loop();
    }
}

fn sleeper_short() {
    timeslice::sleep(100_000);
    WOKE_2.store(SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
    timeslice::terminate(timeslice::get_tid());
    loop {
        hint::spin_loop();
    }
}

fn sleeper_mid() {
    timeslice::sleep(200_000);
    WOKE_3.store(SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
    timeslice::terminate(timeslice::get_tid());
    loop {
        hint::spin_loop();
    }
}

fn main() {
    assert_eq!(timeslice::init(10_000), 0);
    assert_eq!(timeslice::spawn(sleeper_long), 1);
    assert_eq!(timeslice::spawn(sleeper_short), 2);
    assert_eq!(timeslice::spawn(sleeper_mid), 3);

    // The wake deadlines are hundreds of milliseconds apart while the
    // threads reach their sleep calls within a few 10 ms quanta, so the
    // wake order is determined by the requested durations alone.
    let start = Instant::now();
    while WOKE_1.load(Ordering::SeqCst) < 0
        || WOKE_2.load(Ordering::SeqCst) < 0
        || WOKE_3.load(Ordering::SeqCst) < 0
    {
        if start.elapsed() > Duration::from_secs(10) {
            eprintln!("sleepers never woke");
            std::process::exit(1);
        }
        hint::spin_loop();
    }

    assert_eq!(WOKE_2.load(Ordering::SeqCst), 0, "100 ms sleeper not first");
    assert_eq!(WOKE_3.load(Ordering::SeqCst), 1, "200 ms sleeper not second");
    assert_eq!(WOKE_1.load(Ordering::SeqCst), 2, "300 ms sleeper not last");

    timeslice::terminate(0);
    unreachable!("terminate(0) exits the process");
}
