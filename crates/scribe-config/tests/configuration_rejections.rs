//! A malformed value in any layer stops the daemon from loading its
//! configuration.

use std::path::Path;

use camino::Utf8Path;
use ortho_config::OrthoError;
use rstest::rstest;

use scribe_config::SocketEndpoint;

mod support;

use support::Layers;

fn names_file(error: &OrthoError, expected: &Path) -> bool {
    match error {
        OrthoError::File { path, .. } => path == expected,
        OrthoError::Aggregate(errors) => errors.iter().any(|inner| names_file(inner, expected)),
        _ => false,
    }
}

#[rstest]
#[case::token_is_a_number("access_token = 42\n")]
#[case::theme_root_is_a_list("theme_root = [\"a\", \"b\"]\n")]
#[case::socket_is_a_table("daemon_socket = { port = 9781 }\n")]
fn wrongly_typed_file_values_are_rejected(#[case] toml: &str) {
    let mut layers = Layers::new();
    layers.file(toml);
    assert!(layers.load().is_err(), "{toml:?} should not load");
}

#[test]
fn unparseable_file_is_reported_by_path() {
    let mut layers = Layers::new();
    layers.file("access_token = \"unterminated\n");
    let error = layers.load().expect_err("syntax error must fail");
    assert!(
        names_file(&error, &layers.config_path()),
        "expected the file to be named, got {error:?}"
    );
}

#[test]
fn unsupported_socket_scheme_in_environment_is_rejected() {
    let mut layers = Layers::new();
    layers.env("SCRIBE_DAEMON_SOCKET", "ftp://example.com:21");
    let error = layers.load().expect_err("ftp is not a socket transport");
    assert!(error.to_string().contains("ftp"), "unexpected error: {error}");
}

#[test]
fn socket_flag_without_port_is_rejected() {
    let mut layers = Layers::new();
    layers.flag("--daemon-socket", "tcp://127.0.0.1");
    assert!(layers.load().is_err());
}

#[test]
fn well_formed_layers_combine() {
    let mut layers = Layers::new();
    layers
        .file("theme_root = \"/srv/theme\"\naccess_token = \"file-token\"\n")
        .env("SCRIBE_ACCESS_TOKEN", "env-token")
        .flag("--daemon-socket", "tcp://127.0.0.1:9300");

    let config = layers.load().expect("configuration loads");

    assert_eq!(config.theme_root(), Utf8Path::new("/srv/theme"));
    assert_eq!(config.access_token(), "env-token");
    assert_eq!(config.daemon_socket(), &SocketEndpoint::tcp("127.0.0.1", 9300));
}
