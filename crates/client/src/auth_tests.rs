// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn change(current: &str, new: &str, confirm: &str) -> PasswordChange {
    PasswordChange { current: current.into(), new: new.into(), confirm: confirm.into() }
}

#[test]
fn login_fields_trim_email() -> anyhow::Result<()> {
    let (email, password) = login_fields("  a@b.com ", "secret1")?;
    assert_eq!(email, "a@b.com");
    assert_eq!(password, "secret1");
    Ok(())
}

#[yare::parameterized(
    empty_email    = { "", "secret1" },
    blank_email    = { "   ", "secret1" },
    empty_password = { "a@b.com", "" },
)]
fn login_fields_required(email: &str, password: &str) {
    let result = login_fields(email, password);
    assert!(matches!(result, Err(ClientError::Validation(ref m)) if m.contains("email and password")));
}

#[yare::parameterized(
    no_at_sign     = { "ab.com", "secret1", "valid email" },
    short_password = { "a@b.com", "12345", "at least 6" },
    missing        = { "", "", "email and password" },
)]
fn signup_fields_rejected(email: &str, password: &str, expected: &str) {
    match signup_fields(email, password) {
        Err(ClientError::Validation(msg)) => assert!(msg.contains(expected), "got: {msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn signup_counts_characters_not_bytes() {
    assert!(signup_fields("a@b.com", "ééééé").is_err());
    assert!(signup_fields("a@b.com", "éééééé").is_ok());
}

#[yare::parameterized(
    missing_field = { change("", "secret2", "secret2"), "fill in all fields" },
    mismatch      = { change("secret1", "secret2", "secret3"), "do not match" },
    too_short     = { change("secret1", "abc", "abc"), "at least 6" },
)]
fn password_change_rejected(input: PasswordChange, expected: &str) {
    match input.validate() {
        Err(ClientError::Validation(msg)) => assert!(msg.contains(expected), "got: {msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn password_change_accepted() {
    assert!(change("secret1", "secret2", "secret2").validate().is_ok());
}
