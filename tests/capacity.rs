//! Thread-table capacity, smallest-unused ID allocation, and argument
//! validation.

use std::hint;

/// Workers that immediately take themselves out of the rotation.
fn parked() {
    timeslice::block(timeslice::get_tid());
    loop {
        hint::spin_loop();
    }
}

fn main() {
    assert_eq!(timeslice::init(50_000), 0);

    // Fill the table: IDs come out in ascending order.
    for expected in 1..timeslice::MAX_THREAD_NUM as i32 {
        assert_eq!(timeslice::spawn(parked), expected);
    }

    // One over the limit fails.
    assert_eq!(timeslice::spawn(parked), -1);

    // Validation errors, all without state change.
    assert_eq!(timeslice::block(0), -1);
    assert_eq!(timeslice::block(-3), -1);
    assert_eq!(timeslice::resume(timeslice::MAX_THREAD_NUM as i32), -1);
    assert_eq!(timeslice::get_quantums(150), -1);
    assert_eq!(timeslice::terminate(-1), -1);
    assert_eq!(timeslice::sleep(10_000), -1); // main cannot sleep
    assert_eq!(timeslice::sleep(0), -1);

    // Freed IDs are reused smallest-first.
    assert_eq!(timeslice::terminate(42), 0);
    assert_eq!(timeslice::spawn(parked), 42);

    assert_eq!(timeslice::terminate(7), 0);
    assert_eq!(timeslice::terminate(3), 0);
    assert_eq!(timeslice::spawn(parked), 3);
    assert_eq!(timeslice::spawn(parked), 7);

    // A terminated ID is gone.
    assert_eq!(timeslice::terminate(99), 0);
    assert_eq!(timeslice::terminate(99), -1);
    assert_eq!(timeslice::get_quantums(99), -1);

    timeslice::terminate(0);
    unreachable!("terminate(0) exits the process");
}
