// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_checkpoint_starts_at_zero() {
    let checkpoint = Checkpoint::new("node-a");
    assert_eq!(checkpoint.node_name, "node-a");
    assert_eq!(checkpoint.sequence, 0);
}

#[test]
fn advance_is_monotonic() {
    let mut checkpoint = Checkpoint::new("node-a");
    checkpoint.advance_to(12);
    checkpoint.advance_to(7);
    assert_eq!(checkpoint.sequence, 12);
}

proptest::proptest! {
    #[test]
    fn lands_on_the_largest_sequence_seen(steps in proptest::collection::vec(0u64..10_000, 0..50)) {
        let mut checkpoint = Checkpoint::new("node-a");
        let mut previous = 0;
        for step in &steps {
            checkpoint.advance_to(*step);
            proptest::prop_assert!(checkpoint.sequence >= previous);
            previous = checkpoint.sequence;
        }
        proptest::prop_assert_eq!(checkpoint.sequence, steps.iter().copied().max().unwrap_or(0));
    }
}
