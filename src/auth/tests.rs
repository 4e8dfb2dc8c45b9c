#![allow(clippy::unwrap_used)]

use super::*;

const TEST_COST: u32 = 4;

#[test]
fn test_hash_and_verify() {
    let hash = PasscodeHash::from_raw("1234", TEST_COST).unwrap();
    assert!(hash.verify("1234"));
    assert!(!hash.verify("4321"));
    assert_ne!(hash.as_str(), "1234");
}

#[test]
fn test_hashes_are_salted() {
    let a = PasscodeHash::from_raw("123456", TEST_COST).unwrap();
    let b = PasscodeHash::from_raw("123456", TEST_COST).unwrap();
    assert_ne!(a, b);
    assert!(a.verify("123456") && b.verify("123456"));
}

#[test]
fn test_invalid_passcode_rejected_before_hashing() {
    assert_eq!(
        PasscodeHash::from_raw("12", TEST_COST),
        Err(AuthError::Validation(ValidationError::InvalidPasscode))
    );
    assert!(PasscodeHash::from_raw("abcd", TEST_COST).is_err());
}

#[test]
fn test_stored_hash_roundtrip() {
    let hash = PasscodeHash::from_raw("9999", TEST_COST).unwrap();
    let stored = PasscodeHash::from_stored(&hash.to_string());
    assert!(stored.verify("9999"));
}

#[test]
fn test_malformed_stored_hash_never_matches() {
    let stored = PasscodeHash::from_stored("not-a-bcrypt-hash");
    assert!(!stored.verify("1234"));
}

// ── register / authenticate ──────────────────────────────────

fn db() -> Database {
    Database::open_in_memory().unwrap()
}

#[test]
fn test_register_then_authenticate() {
    let mut db = db();
    let user = register(&mut db, "jane", "2468", "php", TEST_COST).unwrap();
    assert!(user.id.is_some());
    assert_eq!(user.currency, "PHP");
    assert_ne!(user.passcode_hash, "2468");

    let signed_in = authenticate(&db, "JANE", "2468").unwrap();
    assert_eq!(signed_in.id, user.id);
    assert_eq!(
        authenticate(&db, "jane", "0000").unwrap_err(),
        AuthError::InvalidCredentials
    );
    assert_eq!(
        authenticate(&db, "nobody", "2468").unwrap_err(),
        AuthError::InvalidCredentials
    );
}

#[test]
fn test_first_user_is_admin() {
    let mut db = db();
    let first = register(&mut db, "admin", "1111", "USD", TEST_COST).unwrap();
    let second = register(&mut db, "jane", "2222", "USD", TEST_COST).unwrap();
    assert!(first.is_admin);
    assert!(!second.is_admin);
}

#[test]
fn test_register_rejects_duplicates_and_bad_input() {
    let mut db = db();
    register(&mut db, "jane", "1234", "USD", TEST_COST).unwrap();
    assert_eq!(
        register(&mut db, "Jane", "1234", "USD", TEST_COST).unwrap_err(),
        AuthError::UsernameTaken("Jane".into())
    );
    assert_eq!(
        register(&mut db, "  ", "1234", "USD", TEST_COST).unwrap_err(),
        AuthError::Validation(ValidationError::Required("Username"))
    );
    assert_eq!(
        register(&mut db, "joe", "1234", "ZZZ", TEST_COST).unwrap_err(),
        AuthError::Validation(ValidationError::UnknownCurrency("ZZZ".into()))
    );
    assert_eq!(
        register(&mut db, "joe", "12", "USD", TEST_COST).unwrap_err(),
        AuthError::Validation(ValidationError::InvalidPasscode)
    );
}
