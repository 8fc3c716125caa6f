use super::*;

#[test]
fn string_roundtrips() {
    let s: BincodeSerializer<String> = BincodeSerializer::new();
    let encoded = s.encode(&"hello".to_string()).unwrap();
    let decoded = s.decode(&encoded).unwrap();
    assert_eq!(decoded, "hello");
}

#[test]
fn integer_roundtrips() {
    let s: BincodeSerializer<i64> = BincodeSerializer::new();
    let encoded = s.encode(&-42i64).unwrap();
    let decoded = s.decode(&encoded).unwrap();
    assert_eq!(decoded, -42);
}

#[test]
fn format_name_is_stable() {
    let s: BincodeSerializer<String> = BincodeSerializer::new();
    assert_eq!(s.format_name(), "bincode/1");
}

#[test]
fn key_for_stringifies() {
    let s: BincodeSerializer<String> = BincodeSerializer::new();
    assert_eq!(s.key_for("alpha").unwrap(), b"alpha".to_vec());
    assert_eq!(s.key_for(&42).unwrap(), b"42".to_vec());
}

#[test]
fn key_for_rejects_empty_string() {
    let s: BincodeSerializer<String> = BincodeSerializer::new();
    let result = s.key_for("");
    assert!(matches!(result, Err(SerializerError::EmptyKey)));
}

#[test]
fn decode_of_malformed_bytes_errors() {
    let s: BincodeSerializer<String> = BincodeSerializer::new();
    let result = s.decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert!(result.is_err());
}
