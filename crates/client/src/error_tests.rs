// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;

#[yare::parameterized(
    html_doc      = { "<!DOCTYPE html><html></html>", FormatHint::Html },
    padded_html   = { "\n   <html>", FormatHint::Html },
    bare_tag      = { "<", FormatHint::Html },
    truncated     = { "{\"token\":", FormatHint::InvalidJson },
    plain_text    = { "Bad Gateway", FormatHint::InvalidJson },
    angle_inside  = { "oops <b>", FormatHint::InvalidJson },
)]
fn classifies_unparsable_body(body: &str, expected: FormatHint) {
    assert_eq!(FormatHint::for_body(body), expected);
}

#[test]
fn html_hint_mentions_backend_url() {
    let msg = ClientError::ResponseFormat(FormatHint::Html).to_string();
    assert!(msg.contains("HTML"), "got: {msg}");
    assert!(msg.contains("backend URL"), "got: {msg}");
}

#[test]
fn generic_hint_does_not_mention_html() {
    let msg = ClientError::ResponseFormat(FormatHint::InvalidJson).to_string();
    assert_eq!(msg, "invalid JSON response from server");
}

#[test]
fn api_error_displays_backend_message() {
    let err = ClientError::Api { status: 409, message: "Email already registered".into() };
    assert_eq!(err.to_string(), "Email already registered");
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[test]
fn exit_codes_are_distinct() {
    let kinds = [
        ErrorKind::ResponseFormat,
        ErrorKind::Api,
        ErrorKind::AuthenticationRequired,
        ErrorKind::InvalidCode,
        ErrorKind::Validation,
        ErrorKind::Network,
        ErrorKind::Store,
    ];
    let mut codes: Vec<i32> = kinds.iter().map(ErrorKind::exit_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), kinds.len());
    assert!(!codes.contains(&0));
}

proptest! {
    #[test]
    fn leading_angle_bracket_is_always_html(ws in "[ \t\r\n]{0,8}", rest in ".*") {
        let body = format!("{ws}<{rest}");
        prop_assert_eq!(FormatHint::for_body(&body), FormatHint::Html);
    }

    #[test]
    fn other_leading_chars_are_generic(first in "[^<\\s]", rest in ".*") {
        let body = format!("{first}{rest}");
        prop_assert_eq!(FormatHint::for_body(&body), FormatHint::InvalidJson);
    }
}
