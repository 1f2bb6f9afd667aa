use super::*;
use lockstep_core::{LamportTs, ProcessId};
use yare::parameterized;

fn granted(process: u32) -> Event {
    Event::AccessGranted {
        process: ProcessId(process),
        timestamp: LamportTs(0),
    }
}

#[parameterized(
    exact = { "access:granted", true },
    category_wildcard = { "access:*", true },
    match_all = { "**", true },
    single_star = { "*", true },
    other_category = { "request:*", false },
    other_action = { "access:released", false },
    empty = { "", false },
)]
fn pattern_matching(pattern: &str, expected: bool) {
    assert_eq!(
        EventPattern::new(pattern).matches("access:granted"),
        expected
    );
}

#[tokio::test]
async fn events_route_to_matching_subscribers_only() {
    let bus = EventBus::new();
    let mut grants = bus.subscribe("grants", &["access:*"]);
    let mut requests = bus.subscribe("requests", &["request:*"]);

    bus.publish(&granted(1));

    assert_eq!(grants.recv().await, Some(granted(1)));
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn resubscribing_a_name_replaces_the_tap() {
    let bus = EventBus::new();
    let mut stale = bus.subscribe("cli", &["access:*"]);
    let mut fresh = bus.subscribe("cli", &["access:*"]);

    bus.publish(&granted(2));

    assert_eq!(bus.subscriber_count(), 1);
    assert_eq!(fresh.recv().await, Some(granted(2)));
    assert_eq!(stale.recv().await, None);
}

#[tokio::test]
async fn dropped_receivers_do_not_block_publishing() {
    let bus = EventBus::new();
    drop(bus.subscribe("gone", &["**"]));

    bus.publish(&granted(3));

    let mut alive = bus.subscribe("alive", &["**"]);
    bus.publish(&granted(4));
    assert_eq!(alive.recv().await, Some(granted(4)));
}

#[test]
fn unsubscribe_removes_the_tap() {
    let bus = EventBus::new();
    let _rx = bus.subscribe("tap", &["**"]);
    assert_eq!(bus.subscriber_count(), 1);

    bus.unsubscribe("tap");
    assert_eq!(bus.subscriber_count(), 0);
}
