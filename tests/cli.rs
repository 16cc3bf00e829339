use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_altconv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_altconv"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap_or_else(|err| panic!("failed to run altconv: {err}"))
}

fn read_json(path: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse JSON output: {err}\n{raw}"))
}

#[test]
fn convert_without_paths_prints_usage_and_succeeds() {
    let out = run_altconv(&["convert"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Single file:"));
    assert!(stdout.contains("Batch mode:"));

    let out = run_altconv(&["convert", "only-input.json"]);
    assert!(out.status.success());
}

#[test]
fn convert_single_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("cypwn.json");
    let output = dir.path().join("altstore.json");
    fs::write(
        &input,
        r#"{"apps":[{"name":"Foo","bundleIdentifier":"com.x.foo","version":"2.0","downloadURL":"https://h/f.ipa"},{"name":"Half"}]}"#,
    )
    .expect("write input");

    let out = run_altconv(&[
        "convert",
        input.to_str().expect("utf8"),
        output.to_str().expect("utf8"),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[*] successfully converted: 1 apps"));
    assert!(stdout.contains("[*] skipped: 1 apps"));

    let written = read_json(&output);
    assert_eq!(written["identifier"], "com.converted.source");
    assert_eq!(written["sourceURL"], "https://example.com/altstore.json");
    let apps = written["apps"].as_array().expect("apps");
    assert_eq!(apps.len(), 1);
    let version = &apps[0]["versions"][0];
    assert_eq!(version["version"], "2.0");
    assert_eq!(version["downloadURL"], "https://h/f.ipa");
    assert_eq!(version["minOSVersion"], "13.0");
    assert_eq!(version["size"], 0);
    assert_eq!(version["localizedDescription"], "");
    assert!(version["date"].as_str().expect("date").ends_with("-08:00"));
    assert!(apps[0].get("appPermissions").is_none());
}

#[test]
fn convert_directory_writes_prefixed_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input_dir = dir.path().join("sources");
    let output_dir = dir.path().join("converted");
    fs::create_dir_all(&input_dir).expect("mkdir");
    fs::write(
        input_dir.join("one.json"),
        r#"{"apps":[{"name":"One","bundleIdentifier":"one"}]}"#,
    )
    .expect("write");
    fs::write(input_dir.join("two.json"), r#"{"apps":[]}"#).expect("write");

    let out = run_altconv(&[
        "convert",
        input_dir.to_str().expect("utf8"),
        output_dir.to_str().expect("utf8"),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(
        read_json(&output_dir.join("converted_one.json"))["apps"][0]["name"],
        "One"
    );
    assert!(output_dir.join("converted_two.json").is_file());
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = run_altconv(&[
        "convert",
        dir.path().join("absent.json").to_str().expect("utf8"),
        dir.path().join("out.json").to_str().expect("utf8"),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("[!] File not found"));
}

#[test]
fn inspect_prints_permissions_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ipa = dir.path().join("plain.ipa");
    let mut zip = zip::ZipWriter::new(fs::File::create(&ipa).expect("create"));
    zip.start_file("README", zip::write::SimpleFileOptions::default())
        .expect("start");
    zip.finish().expect("finish");

    let out = run_altconv(&["inspect", ipa.to_str().expect("utf8")]);
    assert!(out.status.success());
    let printed: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is JSON");
    assert_eq!(printed, serde_json::json!({"entitlements": [], "privacy": {}}));
}
