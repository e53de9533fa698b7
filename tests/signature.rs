use std::collections::HashMap;

use entity_pool::{build_signature, Signature};

#[test]
fn set_test_and_clear_round_trip() {
    let mut signature = Signature::default();

    signature.set(3);
    signature.set(64);
    signature.set(1023);

    assert!(signature.has(3));
    assert!(signature.has(64));
    assert!(signature.has(1023));
    assert!(!signature.has(4));

    signature.clear(64);
    assert!(!signature.has(64));
    assert!(signature.has(3));
}

#[test]
fn set_to_dispatches_on_value() {
    let mut signature = Signature::default();

    signature.set_to(7, true);
    assert!(signature.has(7));

    signature.set_to(7, false);
    assert!(!signature.has(7));
}

#[test]
fn subset_of_is_containment() {
    let narrow = build_signature(&[1, 65]);
    let wide = build_signature(&[1, 65, 200]);

    assert!(narrow.subset_of(&wide));
    assert!(!wide.subset_of(&narrow));
    assert!(narrow.subset_of(&narrow));
    assert!(Signature::default().subset_of(&narrow));
}

#[test]
fn intersects_detects_shared_bits() {
    let left = build_signature(&[2, 130]);
    let right = build_signature(&[130]);
    let other = build_signature(&[3]);

    assert!(left.intersects(&right));
    assert!(!left.intersects(&other));
    assert!(!left.intersects(&Signature::default()));
}

#[test]
fn any_and_merge() {
    let mut signature = Signature::default();
    assert!(!signature.any());

    signature.merge(&build_signature(&[5, 700]));
    assert!(signature.any());
    assert!(signature.has(5));
    assert!(signature.has(700));

    signature.merge(&build_signature(&[5, 6]));
    assert!(signature.has(6));
    assert!(signature.has(700));
}

#[test]
fn iter_components_crosses_word_boundaries() {
    let signature = build_signature(&[3, 64, 130, 1023]);
    let ids: Vec<_> = signature.iter_components().collect();
    assert_eq!(ids, vec![3, 64, 130, 1023]);
}

#[test]
fn fold_distinguishes_word_positions() {
    // Same word contents in different positions must not fold identically.
    let low = build_signature(&[0]);
    let high = build_signature(&[64]);
    assert_ne!(low.fold(), high.fold());
}

#[test]
fn equal_signatures_fold_identically() {
    let first = build_signature(&[9, 200, 511]);
    let second = build_signature(&[511, 9, 200]);
    assert_eq!(first, second);
    assert_eq!(first.fold(), second.fold());
}

#[test]
fn signatures_key_a_map() {
    let mut map: HashMap<Signature, &str> = HashMap::new();
    map.insert(build_signature(&[1]), "one");
    map.insert(build_signature(&[1, 2]), "both");

    assert_eq!(map.get(&build_signature(&[1])), Some(&"one"));
    assert_eq!(map.get(&build_signature(&[1, 2])), Some(&"both"));
    assert_eq!(map.get(&build_signature(&[2])), None);
}
