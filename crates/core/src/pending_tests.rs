use super::*;
use yare::parameterized;

fn claim(timestamp: u64, holder: u32) -> Claim {
    Claim::new(LamportTs(timestamp), ProcessId(holder))
}

#[parameterized(
    earlier_timestamp_wins = { claim(3, 9), claim(7, 1) },
    tie_breaks_by_lower_id = { claim(5, 2), claim(5, 5) },
    id_only_decides_on_tie = { claim(4, 0), claim(4, 1) },
)]
fn claim_order(first: Claim, second: Claim) {
    assert!(first < second);

    let mut queue = RequestQueue::new();
    queue.insert(second);
    queue.insert(first);
    assert_eq!(queue.first(), Some(&first));
}

#[test]
fn one_claim_per_holder() {
    let mut queue = RequestQueue::new();
    assert!(queue.insert(claim(3, 1)));
    assert!(!queue.insert(claim(8, 1)));

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.first(), Some(&claim(3, 1)));
}

#[test]
fn release_removes_the_oldest_matching_claim_only() {
    let mut queue = RequestQueue::new();
    queue.insert(claim(3, 1));
    queue.insert(claim(5, 2));

    let removed = queue.release(ProcessId(1), LamportTs(10));
    assert_eq!(removed, Some(claim(3, 1)));
    assert_eq!(queue.len(), 1);

    // a second release for the same holder finds nothing
    assert_eq!(queue.release(ProcessId(1), LamportTs(10)), None);
    assert_eq!(queue.first(), Some(&claim(5, 2)));
}

#[test]
fn release_ignores_claims_newer_than_its_timestamp() {
    let mut queue = RequestQueue::new();
    queue.insert(claim(9, 1));

    assert_eq!(queue.release(ProcessId(1), LamportTs(4)), None);
    assert!(queue.contains_holder(ProcessId(1)));
}

#[test]
fn remove_retires_an_exact_claim() {
    let mut queue = RequestQueue::new();
    queue.insert(claim(2, 0));

    assert!(queue.remove(&claim(2, 0)));
    assert!(!queue.remove(&claim(2, 0)));
    assert!(queue.is_empty());
}
