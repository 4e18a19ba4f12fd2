//! End-to-end tests for the imgtag binary.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn imgtag(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("imgtag").unwrap();
    cmd.env("HOME", home)
        .env("IMGTAG_CONFIG", home.join("config.json"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn images(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"img").unwrap();
    }
    dir
}

#[test]
fn version_prints_package_version() {
    let home = TempDir::new().unwrap();
    let output = imgtag(home.path()).arg("version").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with(&format!("imgtag version {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn scan_lists_images_in_order() {
    let home = TempDir::new().unwrap();
    let dir = images(&["b.jpg", "a.png", "readme.txt"]);

    let output = imgtag(home.path())
        .args(["--json", "scan", "--folder"])
        .arg(dir.path())
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["items"][0], "a.png");
    assert_eq!(json["items"][1], "b.jpg");
}

#[test]
fn scan_empty_folder_fails_with_exit_code() {
    let home = TempDir::new().unwrap();
    let dir = images(&["readme.txt"]);

    imgtag(home.path())
        .args(["scan", "--folder"])
        .arg(dir.path())
        .assert()
        .code(5);
}

#[test]
fn new_session_exports_when_input_ends() {
    let home = TempDir::new().unwrap();
    let dir = images(&["a.jpg", "b.jpg"]);

    imgtag(home.path())
        .args(["new", "--labels", "cat,dog", "--mode", "copy", "--folder"])
        .arg(dir.path())
        .write_stdin("2\nn\n1\n2\n")
        .assert()
        .success();

    let table = dir
        .path()
        .join("output")
        .join("assigned_classes_automatically_generated.csv");
    assert_eq!(
        fs::read_to_string(table).unwrap(),
        "item,cat,dog\na.jpg,0,1\nb.jpg,1,1\n"
    );
    assert!(dir.path().join("dog").join("a.jpg").is_file());
    assert!(dir.path().join("cat").join("b.jpg").is_file());
    assert!(dir.path().join("dog").join("b.jpg").is_file());
}

#[test]
fn new_rejects_unknown_mode() {
    let home = TempDir::new().unwrap();
    let dir = images(&["a.jpg"]);

    let output = imgtag(home.path())
        .args(["new", "--labels", "cat", "--mode", "mvoe", "--folder"])
        .arg(dir.path())
        .assert()
        .code(5);
    let stderr = String::from_utf8(output.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("did you mean 'move'?"));
}

#[test]
fn open_resumes_from_table_and_show_summarizes() {
    let home = TempDir::new().unwrap();
    let dir = images(&["a.jpg", "b.jpg"]);
    let table = dir.path().join("prior.csv");
    fs::write(&table, "item,cat,dog\na.jpg,1,0\nb.jpg,1,x\ngone.jpg,0,1\n").unwrap();

    let output = imgtag(home.path())
        .args(["--json", "show", "--table"])
        .arg(&table)
        .assert()
        .success();
    let summary: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(summary["labels"], serde_json::json!(["cat", "dog"]));
    assert_eq!(summary["malformed"].as_array().unwrap().len(), 1);

    imgtag(home.path())
        .args(["open", "--folder"])
        .arg(dir.path())
        .arg("--table")
        .arg(&table)
        .write_stdin("g 2\n2\ne\nq\n")
        .assert()
        .success();

    let exported = dir.path().join("output").join("assigned_classes.csv");
    assert_eq!(
        fs::read_to_string(exported).unwrap(),
        "item,cat,dog\na.jpg,1,0\nb.jpg,0,1\n"
    );
}
