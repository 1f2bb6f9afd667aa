use super::*;
use crate::message::{LamportTs, MessageKind};

fn msg(from: u32, sequence: u64) -> Message {
    Message::new(
        ProcessId(from),
        Sequence(sequence),
        LamportTs(sequence),
        MessageKind::Ack,
    )
}

#[test]
fn in_order_arrivals_deliver_immediately() {
    let mut inbox = CausalInbox::new();
    for sequence in 1..=3 {
        let ready = inbox.accept(msg(1, sequence)).unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].sequence, Sequence(sequence));
    }
    assert_eq!(inbox.delivered_count(ProcessId(1)), 3);
    assert!(inbox.is_drained());
}

#[test]
fn early_arrival_is_held_until_the_gap_closes() {
    let mut inbox = CausalInbox::new();

    assert!(inbox.accept(msg(1, 3)).unwrap().is_empty());
    assert!(inbox.accept(msg(1, 2)).unwrap().is_empty());
    assert_eq!(inbox.held(), 2);
    assert!(!inbox.is_drained());

    // seq 1 releases the whole run
    let ready = inbox.accept(msg(1, 1)).unwrap();
    let sequences: Vec<u64> = ready.iter().map(|m| m.sequence.0).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert!(inbox.is_drained());
}

#[test]
fn cascade_releases_only_the_contiguous_run() {
    let mut inbox = CausalInbox::new();

    assert!(inbox.accept(msg(1, 2)).unwrap().is_empty());
    assert!(inbox.accept(msg(1, 5)).unwrap().is_empty());

    let ready = inbox.accept(msg(1, 1)).unwrap();
    let sequences: Vec<u64> = ready.iter().map(|m| m.sequence.0).collect();
    assert_eq!(sequences, vec![1, 2]);

    // 5 still waits on 3 and 4
    assert_eq!(inbox.held(), 1);
    assert!(!inbox.is_drained());
}

#[test]
fn senders_are_independent() {
    let mut inbox = CausalInbox::new();

    assert!(inbox.accept(msg(2, 2)).unwrap().is_empty());
    let ready = inbox.accept(msg(7, 1)).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].from, ProcessId(7));

    // process 2's gap is unaffected by process 7's traffic
    assert_eq!(inbox.delivered_count(ProcessId(2)), 0);
    assert_eq!(inbox.delivered_count(ProcessId(7)), 1);
}

#[test]
fn sequence_regression_is_an_error() {
    let mut inbox = CausalInbox::new();
    inbox.accept(msg(1, 1)).unwrap();
    inbox.accept(msg(1, 2)).unwrap();

    let err = inbox.accept(msg(1, 1)).unwrap_err();
    assert_eq!(
        err,
        OrderingError {
            from: ProcessId(1),
            expected: Sequence(3),
            got: Sequence(1),
        }
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_arrival_order(len: usize) -> impl Strategy<Value = Vec<u64>> {
        Just((1..=len as u64).collect::<Vec<u64>>()).prop_shuffle()
    }

    proptest! {
        #[test]
        fn any_arrival_permutation_delivers_in_order(order in arb_arrival_order(12)) {
            let mut inbox = CausalInbox::new();
            let mut delivered = Vec::new();

            for sequence in order {
                delivered.extend(inbox.accept(msg(1, sequence)).unwrap());
            }

            // everything arrives exactly once, in sequence order
            let sequences: Vec<u64> = delivered.iter().map(|m| m.sequence.0).collect();
            prop_assert_eq!(sequences, (1..=12).collect::<Vec<u64>>());
            prop_assert!(inbox.is_drained());
        }

        #[test]
        fn delivered_prefix_is_always_gapless(order in arb_arrival_order(9), cut in 0usize..9) {
            let mut inbox = CausalInbox::new();
            let mut delivered = Vec::new();

            for sequence in order.into_iter().take(cut) {
                delivered.extend(inbox.accept(msg(1, sequence)).unwrap());
            }

            let sequences: Vec<u64> = delivered.iter().map(|m| m.sequence.0).collect();
            let expected: Vec<u64> = (1..=sequences.len() as u64).collect();
            prop_assert_eq!(sequences, expected);
        }
    }
}
