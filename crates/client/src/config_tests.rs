// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::*;

fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        vars.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
    move |name: &str| map.get(name).cloned()
}

fn config(backend_url: Option<&str>, site_host: Option<&str>) -> ClientConfig {
    ClientConfig {
        backend_url: backend_url.map(str::to_owned),
        site_host: site_host.map(str::to_owned),
        ..ClientConfig::default()
    }
}

#[yare::parameterized(
    explicit_wins         = { Some("http://env:1"), Some("http://saved:2"), None, "http://env:1" },
    persisted_next        = { None, Some("http://saved:2"), None, "http://saved:2" },
    blank_explicit_skipped = { Some("  "), Some("http://saved:2"), None, "http://saved:2" },
    localhost_default     = { None, None, Some("localhost"), "http://localhost:3000" },
    loopback_default      = { None, None, Some("127.0.0.1"), "http://localhost:3000" },
    public_default        = { None, None, Some("foolder.tv"), "https://api.foolder.tv" },
    no_host_default       = { None, None, None, "https://api.foolder.tv" },
    trailing_slash        = { Some("http://env:1/"), None, None, "http://env:1" },
)]
fn backend_url_precedence(
    explicit: Option<&str>,
    persisted: Option<&str>,
    site_host: Option<&str>,
    expected: &str,
) {
    let cfg = config(explicit, site_host);
    assert_eq!(cfg.resolve_backend_url(persisted), expected);
}

#[test]
fn state_dir_explicit_wins() {
    let explicit = PathBuf::from("/srv/foolder");
    let dir = state_dir_with(Some(&explicit), env_from(&[("XDG_STATE_HOME", "/xdg")]));
    assert_eq!(dir, explicit);
}

#[test]
fn state_dir_prefers_xdg() {
    let dir = state_dir_with(None, env_from(&[("XDG_STATE_HOME", "/xdg"), ("HOME", "/home/u")]));
    assert_eq!(dir, Path::new("/xdg/foolder"));
}

#[test]
fn state_dir_falls_back_to_home() {
    let dir = state_dir_with(None, env_from(&[("HOME", "/home/u")]));
    assert_eq!(dir, Path::new("/home/u/.local/state/foolder"));
}

#[test]
fn state_dir_last_resort_is_relative() {
    assert_eq!(state_dir_with(None, env_from(&[])), Path::new(".foolder"));
}

#[test]
fn storage_path_lives_in_state_dir() {
    let cfg = ClientConfig { state_dir: Some("/tmp/f".into()), ..ClientConfig::default() };
    assert_eq!(cfg.storage_path(), Path::new("/tmp/f/storage.json"));
}
