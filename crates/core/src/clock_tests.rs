use super::*;

#[test]
fn new_clock_stamps_zero() {
    let clock = LamportClock::new();
    assert_eq!(clock.stamp(), LamportTs(0));
}

#[test]
fn tick_advances_by_one() {
    let mut clock = LamportClock::new();
    clock.tick();
    clock.tick();
    assert_eq!(clock.stamp(), LamportTs(2));
}

#[test]
fn observe_jumps_past_a_later_timestamp() {
    let mut clock = LamportClock::new();
    clock.observe(LamportTs(10));
    assert_eq!(clock.stamp(), LamportTs(11));
}

#[test]
fn observe_of_an_older_timestamp_still_advances() {
    let mut clock = LamportClock::new();
    for _ in 0..5 {
        clock.tick();
    }
    clock.observe(LamportTs(2));
    assert_eq!(clock.stamp(), LamportTs(6));
}

#[test]
fn observe_of_an_equal_timestamp_advances_past_it() {
    let mut clock = LamportClock::new();
    for _ in 0..4 {
        clock.tick();
    }
    clock.observe(LamportTs(4));
    assert_eq!(clock.stamp(), LamportTs(5));
}
