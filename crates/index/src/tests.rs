use super::*;

#[test]
fn set_then_get() {
    let mut idx = Index::new();
    idx.set(b"alpha".to_vec(), b"1".to_vec());
    assert_eq!(idx.get(b"alpha"), Some(&b"1".to_vec()));
}

#[test]
fn delete_removes_key() {
    let mut idx = Index::new();
    idx.set(b"k".to_vec(), b"v".to_vec());
    assert!(idx.delete(b"k"));
    assert!(idx.get(b"k").is_none());
    assert!(!idx.contains_key(b"k"));
    assert_eq!(idx.len(), 0);
}

#[test]
fn delete_missing_key_returns_false() {
    let mut idx = Index::new();
    assert!(!idx.delete(b"missing"));
}

#[test]
fn reassignment_moves_key_to_most_recent_position() {
    // mirrors S3: set(a,1); set(b,2); set(a,3) -> iteration [(b,2), (a,3)]
    let mut idx = Index::new();
    idx.set(b"a".to_vec(), b"1".to_vec());
    idx.set(b"b".to_vec(), b"2".to_vec());
    idx.set(b"a".to_vec(), b"3".to_vec());

    let entries: Vec<_> = idx
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    assert_eq!(
        entries,
        vec![(b"b".to_vec(), b"2".to_vec()), (b"a".to_vec(), b"3".to_vec())]
    );
}

#[test]
fn delete_then_reset_moves_key_to_end() {
    let mut idx = Index::new();
    idx.set(b"a".to_vec(), b"1".to_vec());
    idx.set(b"b".to_vec(), b"2".to_vec());
    idx.delete(b"a");
    idx.set(b"a".to_vec(), b"9".to_vec());

    let keys: Vec<_> = idx.keys().cloned().collect();
    assert_eq!(keys, vec![b"b".to_vec(), b"a".to_vec()]);
}

#[test]
fn clear_empties_index() {
    let mut idx = Index::new();
    idx.set(b"a".to_vec(), b"1".to_vec());
    idx.set(b"b".to_vec(), b"2".to_vec());
    idx.clear();
    assert!(idx.is_empty());
    assert_eq!(idx.len(), 0);
}

#[test]
fn is_empty_on_fresh_index() {
    let idx = Index::new();
    assert!(idx.is_empty());
}
