use assert_cmd::Command;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

struct World {
    _root: tempfile::TempDir,
    env_file: PathBuf,
    local: PathBuf,
    alice: PathBuf,
    production: PathBuf,
}

fn world() -> World {
    let root = tempfile::tempdir().unwrap();
    let local = root.path().join("local");
    let alice = root.path().join("alice");
    let production = root.path().join("www");
    for dir in [&local, &alice, &production] {
        fs::create_dir_all(dir).unwrap();
    }

    let env_file = root.path().join(".env");
    fs::write(
        &env_file,
        format!(
            "LOCAL_PATH={}\n\
             DEV_ALICE={}\n\
             PROD_PATH={}\n\
             SYNC_USER=roger\n\
             BACKUP_DIR={}\n\
             HISTORY_FILE={}\n\
             LOG_FILE={}\n",
            local.display(),
            alice.display(),
            production.display(),
            root.path().join("backups").display(),
            root.path().join("history.json").display(),
            root.path().join("sync.log").display(),
        ),
    )
    .unwrap();

    World {
        _root: root,
        env_file,
        local,
        alice,
        production,
    }
}

fn cmd(world: &World) -> Command {
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.arg("--env-file").arg(&world.env_file);
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn push_copies_files_and_records_history() {
    let world = world();
    write(&world.local, "index.php", "<?php echo 'hi';");
    write(&world.local, "css/site.css", "body {}");

    cmd(&world)
        .args(["push", "index.php", "css/site.css", "-t", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s) pushed to alice"));

    assert_eq!(
        fs::read_to_string(world.alice.join("index.php")).unwrap(),
        "<?php echo 'hi';"
    );
    assert!(world.alice.join("css/site.css").is_file());

    cmd(&world)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("roger"));
}

#[test]
fn conflicting_push_fails_unless_forced() {
    let world = world();
    write(&world.local, "app.php", "local edit");
    write(&world.production, "app.php", "hotfixed in production");
    set_file_mtime(
        world.local.join("app.php"),
        FileTime::from_unix_time(1_000_000, 0),
    )
    .unwrap();
    set_file_mtime(
        world.production.join("app.php"),
        FileTime::from_unix_time(2_000_000, 0),
    )
    .unwrap();

    cmd(&world)
        .args(["push", "app.php", "-t", "production", "--no-backup"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("blocked by conflicts"));
    assert_eq!(
        fs::read_to_string(world.production.join("app.php")).unwrap(),
        "hotfixed in production"
    );

    cmd(&world)
        .args(["push", "app.php", "-t", "production", "--force"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(world.production.join("app.php")).unwrap(),
        "local edit"
    );

    // The forced push backed up the production copy first.
    cmd(&world)
        .arg("backups")
        .assert()
        .success()
        .stdout(predicate::str::contains("roger_backup_"))
        .stdout(predicate::str::contains("_production.tar.gz"));
}

#[test]
fn pull_brings_remote_files_into_local() {
    let world = world();
    write(&world.production, "config.php", "live config");

    cmd(&world)
        .args(["pull", "config.php", "--from", "production", "--no-backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 file(s) pulled from production into local",
        ));
    assert_eq!(
        fs::read_to_string(world.local.join("config.php")).unwrap(),
        "live config"
    );
}

#[test]
fn unknown_environment_is_a_hard_error_for_pull() {
    let world = world();
    write(&world.local, "a.txt", "x");

    cmd(&world)
        .args(["pull", "a.txt", "--from", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn compare_reports_per_file_status() {
    let world = world();
    write(&world.local, "same.txt", "identical bytes");
    write(&world.alice, "same.txt", "identical bytes");
    write(&world.local, "only_local.txt", "x");

    cmd(&world)
        .args(["compare", "same.txt", "only_local.txt", "--to", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[identical] same.txt"))
        .stdout(predicate::str::contains("[new] only_local.txt"));
}

#[test]
fn envs_lists_configured_environments_in_order() {
    let world = world();

    cmd(&world)
        .arg("envs")
        .assert()
        .success()
        .stdout(predicate::str::diff("local\nalice\nproduction\n"));
}

#[test]
fn missing_env_file_is_reported() {
    let world = world();
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.arg("--env-file")
        .arg(world.env_file.with_extension("missing"))
        .arg("envs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("settings file not found"));
}
