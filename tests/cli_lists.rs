// Drives the list-management commands of the compiled binary. These run
// without a terminal and exit, so no PTY is needed.

use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

fn spelldrill(data_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("spelldrill").unwrap();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn list_prints_sample_words_when_nothing_saved() {
    let dir = tempdir().unwrap();
    let listed = stdout_of(spelldrill(dir.path()).arg("--list"));
    let words: Vec<&str> = listed.lines().collect();
    assert_eq!(words.len(), 20);
    assert_eq!(words[0], "because");
    assert!(words.contains(&"Wednesday"));
}

#[test]
fn import_then_export_csv() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("week3.txt");
    fs::write(
        &source,
        "laugh | Don't make me laugh.\nthrough\n\nLaugh\nenough | Enough is enough.\n",
    )
    .unwrap();

    let out = stdout_of(spelldrill(dir.path()).arg("--import").arg(&source));
    assert!(out.contains("Imported 3 words."));

    let listed = stdout_of(spelldrill(dir.path()).arg("--list"));
    assert_eq!(
        listed.trim_end(),
        "laugh | Don't make me laugh.\nthrough\nenough | Enough is enough."
    );

    let csv_path = dir.path().join("week3.csv");
    stdout_of(spelldrill(dir.path()).arg("--export").arg(&csv_path));
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("word,sentence\n"));
    assert!(csv.contains("through,\n"));
}

#[test]
fn empty_import_fails_and_keeps_list() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("blank.txt");
    fs::write(&source, "\n   \n").unwrap();

    spelldrill(dir.path())
        .arg("--import")
        .arg(&source)
        .assert()
        .failure();

    let listed = stdout_of(spelldrill(dir.path()).arg("--list"));
    assert_eq!(listed.lines().count(), 20);
}

#[test]
fn lock_gates_teacher_commands() {
    let dir = tempdir().unwrap();

    spelldrill(dir.path())
        .arg("--lock")
        .arg("--pin")
        .arg("2468")
        .write_stdin("2468\n")
        .assert()
        .success();

    spelldrill(dir.path()).arg("--list").assert().failure();
    spelldrill(dir.path())
        .args(["--list", "--pin", "1111"])
        .assert()
        .failure();
    let listed = stdout_of(spelldrill(dir.path()).args(["--list", "--pin", "2468"]));
    assert_eq!(listed.lines().count(), 20);

    spelldrill(dir.path())
        .args(["--unlock", "--pin", "2468"])
        .assert()
        .success();
    spelldrill(dir.path()).arg("--list").assert().success();
}

#[test]
fn lock_rejects_short_pin() {
    let dir = tempdir().unwrap();
    spelldrill(dir.path())
        .arg("--lock")
        .write_stdin("123\n123\n")
        .assert()
        .failure();
    assert!(!dir.path().join("lock.json").exists());
}

#[test]
fn save_settings_persists_overrides() {
    let dir = tempdir().unwrap();
    spelldrill(dir.path())
        .args(["--save-settings", "--repeat-at-end", "--speak-sentences"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("settings.json")).unwrap())
            .unwrap();
    assert_eq!(saved["repeat_misses_sooner"], false);
    assert_eq!(saved["auto_speak_sentence"], true);
    assert_eq!(saved["case_insensitive"], true);
}
