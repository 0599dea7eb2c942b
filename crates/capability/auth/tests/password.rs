use minemon_auth::{hash_password, verify_password_and_maybe_upgrade};

#[test]
fn argon2_hash_verifies() {
    let hash = hash_password("miner-pass").expect("hash");
    assert!(hash.starts_with("$argon2"));
    let check = verify_password_and_maybe_upgrade(&hash, "miner-pass").expect("verify");
    assert!(check.verified);
    assert!(check.upgrade_hash.is_none());
}

#[test]
fn wrong_password_fails() {
    let hash = hash_password("miner-pass").expect("hash");
    let check = verify_password_and_maybe_upgrade(&hash, "other").expect("verify");
    assert!(!check.verified);
}

#[test]
fn plaintext_seed_is_upgraded_on_success() {
    let check = verify_password_and_maybe_upgrade("admin123", "admin123").expect("verify");
    assert!(check.verified);
    let upgraded = check.upgrade_hash.expect("upgrade");
    assert!(upgraded.starts_with("$argon2"));
}

#[test]
fn plaintext_seed_mismatch_does_not_upgrade() {
    let check = verify_password_and_maybe_upgrade("admin123", "nope").expect("verify");
    assert!(!check.verified);
    assert!(check.upgrade_hash.is_none());
}
