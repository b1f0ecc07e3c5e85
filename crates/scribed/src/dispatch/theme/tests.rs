//! Unit tests for the theme operation handlers.

use std::fs;
use std::sync::Arc;

use rstest::{fixture, rstest};
use scribe_core::{ContentDigest, EditCapability, ThemeFiles};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::{ThemeHandler, ThemeOperation};
use crate::dispatch::request::CommandRequest;
use crate::dispatch::response::ResponseWriter;

struct ThemeFixture {
    dir: TempDir,
    handler: ThemeHandler,
}

impl ThemeFixture {
    fn run(&self, operation: ThemeOperation, arguments: Value) -> (i32, Vec<Value>) {
        let line = json!({
            "command": {"domain": "theme", "operation": operation.as_str()},
            "arguments": arguments,
        })
        .to_string();
        let request = CommandRequest::decode(line.as_bytes()).expect("request");
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        let status = self
            .handler
            .handle(
                operation,
                &EditCapability::granted_to("tests"),
                &request,
                &mut writer,
            )
            .expect("handled");
        (status, decode_streams(&output))
    }

    fn file(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join("theme").join(name)).expect("read theme file")
    }
}

fn decode_streams(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).expect("message"))
        .map(|message| {
            let data = message["data"].as_str().expect("stream data");
            serde_json::from_str(data).expect("payload")
        })
        .collect()
}

#[fixture]
fn theme() -> ThemeFixture {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path().join("theme");
    fs::create_dir_all(&root).expect("create theme");
    fs::write(root.join("style.css"), "body{}").expect("seed style.css");
    fs::write(dir.path().join("wp-config.php"), "secret").expect("seed secret");
    let handler = ThemeHandler::new(Arc::new(ThemeFiles::new(root.as_path())));
    ThemeFixture { dir, handler }
}

#[rstest]
fn read_file_returns_wire_payload(theme: ThemeFixture) {
    let (status, payloads) = theme.run(ThemeOperation::ReadFile, json!({"file": "/style.css"}));
    assert_eq!(status, 0);
    assert_eq!(
        payloads[0],
        json!({
            "file": "style.css",
            "code": "body{}",
            "hash": ContentDigest::of("body{}").to_hex(),
            "success": true,
        })
    );
}

#[rstest]
fn edit_file_returns_new_hash(theme: ThemeFixture) {
    let previous = ContentDigest::of("body{}").to_hex();
    let (status, payloads) = theme.run(
        ThemeOperation::EditFile,
        json!({"file": "style.css", "code": "body{color:red}", "previous_hash": previous}),
    );
    assert_eq!(status, 0);
    assert_eq!(
        payloads[0],
        json!({
            "success": true,
            "file": "style.css",
            "hash": ContentDigest::of("body{color:red}").to_hex(),
        })
    );
    assert_eq!(theme.file("style.css"), "body{color:red}");
}

#[rstest]
fn stale_edit_is_a_conflict(theme: ThemeFixture) {
    let stale = ContentDigest::of("body{margin:0}").to_hex();
    let (status, payloads) = theme.run(
        ThemeOperation::EditFile,
        json!({"file": "style.css", "code": "x", "previous_hash": stale}),
    );
    assert_eq!(status, 1);
    assert_eq!(payloads[0]["status"], "error");
    assert_eq!(payloads[0]["code"], "hash_mismatch");
    assert_eq!(payloads[0]["data"]["status"], 409);
    assert_eq!(theme.file("style.css"), "body{}");
}

#[rstest]
#[case::absent_code(json!({"file": "style.css", "previous_hash": "abc"}), "missing_code")]
#[case::absent_file(json!({"code": "x", "previous_hash": "abc"}), "missing_file")]
#[case::empty_hash(json!({"file": "style.css", "code": "x", "previous_hash": ""}), "missing_previous_hash")]
fn edit_reports_missing_parameters(
    theme: ThemeFixture,
    #[case] arguments: Value,
    #[case] code: &str,
) {
    let (status, payloads) = theme.run(ThemeOperation::EditFile, arguments);
    assert_eq!(status, 1);
    assert_eq!(payloads[0]["code"], code);
    assert_eq!(payloads[0]["data"]["status"], 400);
}

#[rstest]
fn empty_code_is_a_valid_edit(theme: ThemeFixture) {
    let previous = ContentDigest::of("body{}").to_hex();
    let (status, _) = theme.run(
        ThemeOperation::EditFile,
        json!({"file": "style.css", "code": "", "previous_hash": previous}),
    );
    assert_eq!(status, 0);
    assert_eq!(theme.file("style.css"), "");
}

#[rstest]
fn escaping_read_is_forbidden(theme: ThemeFixture) {
    let (status, payloads) = theme.run(
        ThemeOperation::ReadFile,
        json!({"file": "../wp-config.php"}),
    );
    assert_eq!(status, 1);
    assert_eq!(payloads[0]["code"], "path_outside_theme");
    assert_eq!(payloads[0]["data"]["status"], 403);
    assert_eq!(
        payloads[0]["message"],
        "File must be within the active theme directory."
    );
}

#[rstest]
fn nonexistent_file_is_an_invalid_path(theme: ThemeFixture) {
    let (status, payloads) = theme.run(ThemeOperation::ReadFile, json!({"file": "nope.css"}));
    assert_eq!(status, 1);
    assert_eq!(payloads[0]["code"], "invalid_path");
}

#[cfg(unix)]
#[rstest]
fn server_side_failures_exit_with_two(theme: ThemeFixture) {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root(&theme) {
        return;
    }
    let path = theme.dir.path().join("theme/style.css");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).expect("chmod");
    let (status, payloads) = theme.run(ThemeOperation::ReadFile, json!({"file": "style.css"}));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("restore");
    assert_eq!(status, 2);
    assert_eq!(payloads[0]["code"], "file_not_readable");
    assert_eq!(payloads[0]["data"]["status"], 500);
}

/// Root ignores permission bits, so permission tests have nothing to check.
#[cfg(unix)]
fn running_as_root(theme: &ThemeFixture) -> bool {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(theme.dir.path()).is_ok_and(|meta| meta.uid() == 0)
}
