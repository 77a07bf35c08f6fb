//! Round-robin rotation and quantum accounting with busy threads.
//!
//! Built without the libtest harness: the scenario owns the process's main
//! thread, its timers and its signal handlers.

use std::hint;

fn spinner() {
    loop {
        hint::spin_loop();
    }
}

/// Burn user time until the global counter reaches `target`.
fn spin_until_total(target: i32) {
    while timeslice::get_total_quantums() < target {
        for _ in 0..1_000 {
            hint::spin_loop();
        }
    }
}

fn main() {
    assert_eq!(timeslice::init(20_000), 0);

    // Immediately after init: one quantum, attributed to main.
    assert_eq!(timeslice::get_total_quantums(), 1);
    assert_eq!(timeslice::get_tid(), 0);
    assert_eq!(timeslice::get_quantums(0), 1);

    assert_eq!(timeslice::spawn(spinner), 1);
    assert_eq!(timeslice::spawn(spinner), 2);

    spin_until_total(10);

    // Snapshot while all three are live; a quantum boundary may land
    // between the reads, so the sum check carries one quantum of slack.
    let q0 = timeslice::get_quantums(0);
    let q1 = timeslice::get_quantums(1);
    let q2 = timeslice::get_quantums(2);
    let total = timeslice::get_total_quantums();

    // Park the busy workers before asserting: a panic must not hand the
    // CPU to a spinner that never gives it back.
    assert_eq!(timeslice::terminate(1), 0);
    assert_eq!(timeslice::terminate(2), 0);

    // Strict rotation: every thread keeps receiving quanta.
    assert!(q0 >= 2, "main starved: {} quanta", q0);
    assert!(q1 >= 2, "thread 1 starved: {} quanta", q1);
    assert!(q2 >= 2, "thread 2 starved: {} quanta", q2);

    // Fairness: round-robin counts differ by at most the snapshot skew.
    let max = q0.max(q1).max(q2);
    let min = q0.min(q1).min(q2);
    assert!(max - min <= 2, "unfair rotation: {} {} {}", q0, q1, q2);

    // Attribution: live threads account for every quantum.
    let sum = q0 + q1 + q2;
    assert!(
        (total - 1..=total + 2).contains(&sum),
        "attribution off: {} + {} + {} vs total {}",
        q0,
        q1,
        q2,
        total
    );

    timeslice::terminate(0);
    unreachable!("terminate(0) exits the process");
}
