//! Terminating the main thread tears everything down and exits 0, however
//! many workers are live, blocked or mid-spin.

use std::hint;

fn spinner() {
    loop {
        hint::spin_loop();
    }
}

fn parked() {
    timeslice::block(timeslice::get_tid());
    loop {
        hint::spin_loop();
    }
}

fn main() {
    assert_eq!(timeslice::init(20_000), 0);
    assert_eq!(timeslice::spawn(spinner), 1);
    assert_eq!(timeslice::spawn(spinner), 2);
    assert_eq!(timeslice::spawn(parked), 3);

    // Let the workers actually run before tearing down.
    while timeslice::get_total_quantums() < 5 {
        for _ in 0..1_000 {
            hint::spin_loop();
        }
    }

    timeslice::terminate(0);
    unreachable!("terminate(0) exits the process");
}
