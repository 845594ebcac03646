use std::{sync::Arc, thread};

use plcreator::results::ResultSet;

#[test]
fn test_add_keeps_slot_order_regardless_of_call_order() {
    let forward = ResultSet::new(2);
    assert_eq!(forward.add(0, "A"), (true, None));
    assert_eq!(forward.add(1, "B"), (true, None));

    let reversed = ResultSet::new(2);
    assert_eq!(reversed.add(1, "B"), (true, None));
    assert_eq!(reversed.add(0, "A"), (true, None));

    assert_eq!(forward.slice(), vec!["A", "B"]);
    assert_eq!(reversed.slice(), vec!["A", "B"]);
}

#[test]
fn test_same_slot_different_ids_keeps_last() {
    let set = ResultSet::new(1);

    assert!(set.add(0, "_A").0);
    assert!(set.add(0, "_B").0);
    assert!(set.add(0, "_C").0);

    assert_eq!(set.slice(), vec!["_C"]);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_same_id_in_other_slot_is_rejected_with_owner() {
    let set = ResultSet::new(3);

    assert_eq!(set.add(0, "_A"), (true, None));
    assert_eq!(set.add(1, "_A"), (false, Some(0)));
    assert_eq!(set.add(2, "_A"), (false, Some(0)));

    assert_eq!(set.slice(), vec!["_A"]);
}

#[test]
fn test_different_slots_different_ids() {
    let set = ResultSet::new(3);

    assert!(set.add(0, "_A").0);
    assert!(set.add(1, "_B").0);
    assert!(set.add(2, "_C").0);

    assert_eq!(set.slice(), vec!["_A", "_B", "_C"]);
}

#[test]
fn test_missing_middle_slot_is_skipped() {
    let set = ResultSet::new(4);

    assert!(set.add(0, "_A").0);
    assert!(set.add(2, "_C").0);

    assert_eq!(set.slice(), vec!["_A", "_C"]);
    assert_eq!(set.capacity(), 4);
}

#[test]
fn test_overwrite_purges_old_values() {
    let set = ResultSet::new(4);

    assert!(set.add(0, "_A").0);
    assert!(set.add(0, "_B").0);
    assert!(set.add(0, "_A").0);

    assert_eq!(set.slice(), vec!["_A"]);

    // "_B" was released by the last overwrite and can be claimed again
    assert_eq!(set.add(1, "_B"), (true, None));
    // "_A" is still held by slot 0
    assert_eq!(set.add(1, "_A"), (false, Some(0)));
    assert_eq!(set.slice(), vec!["_A", "_B"]);
}

#[test]
fn test_readding_same_id_to_same_slot_is_a_noop() {
    let set = ResultSet::new(2);

    assert_eq!(set.add(1, "_A"), (true, None));
    assert_eq!(set.add(1, "_A"), (true, None));

    assert_eq!(set.slice(), vec!["_A"]);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_empty_id_is_rejected() {
    let set = ResultSet::new(2);

    assert_eq!(set.add(0, ""), (false, None));
    assert!(set.slice().is_empty());
    assert!(set.is_empty());

    // an empty id never clears a committed slot either
    assert!(set.add(0, "_A").0);
    assert_eq!(set.add(0, ""), (false, None));
    assert_eq!(set.slice(), vec!["_A"]);
}

#[test]
fn test_is_empty_follows_commits() {
    let set = ResultSet::new(2);
    assert!(set.is_empty());

    set.add(0, "_A");
    assert!(!set.is_empty());

    set.add(0, "_B");
    assert!(!set.is_empty());
    assert_eq!(set.len(), 1);
}

#[test]
fn test_zero_sized_set() {
    let set = ResultSet::new(0);

    assert!(set.is_empty());
    assert!(set.slice().is_empty());
    assert_eq!(set.capacity(), 0);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_out_of_range_slot_panics() {
    let set = ResultSet::new(2);
    set.add(2, "_A");
}

#[test]
fn test_concurrent_adds_to_disjoint_slots_are_not_lost() {
    const WORKERS: usize = 64;

    let set = Arc::new(ResultSet::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|slot| {
            let set = Arc::clone(&set);
            thread::spawn(move || set.add(slot, &format!("id-{slot:03}")))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (true, None));
    }

    let expected: Vec<String> = (0..WORKERS).map(|slot| format!("id-{slot:03}")).collect();
    assert_eq!(set.slice(), expected);
    assert_eq!(set.len(), WORKERS);
}

#[test]
fn test_concurrent_claims_of_one_id_have_a_single_winner() {
    const WORKERS: usize = 32;

    let set = Arc::new(ResultSet::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|slot| {
            let set = Arc::clone(&set);
            thread::spawn(move || (slot, set.add(slot, "shared")))
        })
        .collect();

    let outcomes: Vec<(usize, (bool, Option<usize>))> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<usize> = outcomes
        .iter()
        .filter(|(_, (accepted, _))| *accepted)
        .map(|(slot, _)| *slot)
        .collect();
    assert_eq!(winners.len(), 1);

    // every loser points at the winner
    for (_, (accepted, conflict)) in &outcomes {
        if !accepted {
            assert_eq!(*conflict, Some(winners[0]));
        }
    }

    assert_eq!(set.slice(), vec!["shared"]);
}
