//! Integration tests for the `saga` CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/lantern.json")
}

fn saga() -> Command {
    Command::cargo_bin("saga").unwrap()
}

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("script.json");
    fs::write(&path, body).unwrap();
    path
}

const WALKTHROUGH: &str = "\
path quest
reveal
step
reveal
step
next
answer 1
answer 2
next
forward
forward
reveal
serve
pick 1
next
end 2
quit
";

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_the_demo() {
    saga()
        .args(["check"])
        .arg(demo())
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"))
        .stdout(predicate::str::contains("2 chapters, 7 slides"));
}

#[test]
fn check_rejects_a_quiz_with_two_answers() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        r#"{
  "first_chapter": "ch1",
  "chapters": [{
    "id": "ch1",
    "slides": [{
      "kind": "quiz",
      "options": [
        { "label": "a", "correct": true },
        { "label": "b", "correct": true }
      ]
    }]
  }]
}"#,
    );

    saga()
        .arg("check")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one correct option"))
        .stderr(predicate::str::contains("error: validation failed with 1 error"));
}

#[test]
fn check_warns_about_unknown_hooks() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        r#"{
  "first_chapter": "ch1",
  "chapters": [{
    "id": "ch1",
    "slides": [{ "kind": "solo", "on_enter": "mystery" }]
  }]
}"#,
    );

    saga()
        .arg("check")
        .arg(&script)
        .assert()
        .success()
        .stderr(predicate::str::contains("hook 'mystery'"));
}

#[test]
fn check_reports_unreadable_scripts() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "{ not json");

    saga()
        .arg("check")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load"));
}

// ---------------------------------------------------------------------------
// chapters
// ---------------------------------------------------------------------------

#[test]
fn chapters_starts_with_only_the_first_unlocked() {
    let saves = TempDir::new().unwrap();

    saga()
        .arg("chapters")
        .arg(demo())
        .arg("--save-dir")
        .arg(saves.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("The Night Market"))
        .stdout(predicate::str::contains("locked"))
        .stdout(predicate::str::contains("1 of 2 chapters unlocked"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_walkthrough_crafts_and_completes() {
    let saves = TempDir::new().unwrap();

    saga()
        .arg("play")
        .arg(demo())
        .arg("--save-dir")
        .arg(saves.path())
        .write_stdin(WALKTHROUGH)
        .assert()
        .success()
        .stdout(predicate::str::contains("quest complete"))
        .stdout(predicate::str::contains("not quite."))
        .stdout(predicate::str::contains("correct!"))
        .stdout(predicate::str::contains("crafted lantern"))
        .stdout(predicate::str::contains("chapter market complete"));

    saga()
        .arg("inventory")
        .arg("--save-dir")
        .arg(saves.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("lantern"))
        .stdout(predicate::str::contains("wick").not())
        .stdout(predicate::str::contains("Wallet: 9"));
}

#[test]
fn play_portal_unlocks_the_next_chapter() {
    let saves = TempDir::new().unwrap();
    let input = "\
path quest
reveal
step
reveal
step
next
answer 2
next
forward
forward
reveal
serve
pick 2
next
quit
";

    saga()
        .arg("play")
        .arg(demo())
        .arg("--save-dir")
        .arg(saves.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("chapter river unlocked"))
        .stdout(predicate::str::contains("Down the River"));

    saga()
        .arg("chapters")
        .arg(demo())
        .arg("--save-dir")
        .arg(saves.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 chapters unlocked"));

    saga()
        .arg("play")
        .arg(demo())
        .args(["--chapter", "river"])
        .arg("--save-dir")
        .arg(saves.path())
        .write_stdin("next\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ oar"));
}

#[test]
fn play_refuses_locked_chapters() {
    let saves = TempDir::new().unwrap();

    saga()
        .arg("play")
        .arg(demo())
        .args(["--chapter", "river"])
        .arg("--save-dir")
        .arg(saves.path())
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chapter 'river' is locked"));
}

#[test]
fn play_gates_advance_until_the_quest_is_visited() {
    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .write_stdin("next\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cannot continue: visit first: quest"));
}

#[test]
fn play_look_redraws_and_keeps_the_chapter() {
    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .write_stdin("look\nnext\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lanterns sway").count(2))
        .stdout(predicate::str::contains("Cannot continue: visit first: quest"));
}

#[test]
fn no_save_leaves_the_save_dir_alone() {
    let dir = TempDir::new().unwrap();
    let saves = dir.path().join("saves");

    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .arg("--save-dir")
        .arg(&saves)
        .write_stdin(WALKTHROUGH)
        .assert()
        .success();

    assert!(!saves.exists());
}

#[test]
fn play_writes_a_journal() {
    let dir = TempDir::new().unwrap();
    let journal = dir.path().join("journal.md");

    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .arg("--journal")
        .arg(&journal)
        .write_stdin(WALKTHROUGH)
        .assert()
        .success()
        .stdout(predicate::str::contains("Journal written"));

    let text = fs::read_to_string(&journal).unwrap();
    assert!(text.starts_with("# Saga Session Journal"));
    assert!(text.contains("## Chapter market"));
    assert!(text.contains("received **wick**"));
    assert!(text.contains("crafted **lantern** from wick, glass"));
    assert!(text.contains("finished chapter market"));
}

#[test]
fn celebration_policy_controls_the_early_announcement() {
    let input = "\
path quest
reveal
step
reveal
step
next
answer 2
next
quit
";

    saga()
        .arg("play")
        .arg(demo())
        .args(["--no-save", "--celebrate", "every-visit"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("everything needed for lantern is at hand!"));

    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("at hand").not());
}

#[test]
fn unknown_commands_are_reported_and_play_continues() {
    saga()
        .arg("play")
        .arg(demo())
        .arg("--no-save")
        .write_stdin("dance\nhelp\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command 'dance'"))
        .stdout(predicate::str::contains("path <slot>"));
}

// ---------------------------------------------------------------------------
// inventory
// ---------------------------------------------------------------------------

#[test]
fn inventory_of_a_fresh_save_is_empty() {
    let saves = TempDir::new().unwrap();

    saga()
        .arg("inventory")
        .arg("--save-dir")
        .arg(saves.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Inventory is empty."))
        .stdout(predicate::str::contains("Wallet: 0"));
}
