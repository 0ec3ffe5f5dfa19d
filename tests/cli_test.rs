// End-to-end checks of the offline subcommands
// None of these reach a repository service

use assert_cmd::Command;
use predicates::prelude::*;

fn dor_admin() -> Command {
    let mut cmd = Command::cargo_bin("dor-admin").unwrap();
    cmd.env_remove("DOR_ADMIN_ENVIRONMENT")
        .env_remove("ROBOT_ENVIRONMENT")
        .env_remove("RAILS_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    dor_admin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("staging-path"))
        .stdout(predicate::str::contains("reset-workflows"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_staging_path_shards_druid() {
    dor_admin()
        .args(["staging-path", "aa000aa0001"])
        .assert()
        .success()
        .stdout("aa/000/aa/0001\n");
}

#[test]
fn test_staging_path_accepts_prefix_and_base() {
    dor_admin()
        .args(["staging-path", "druid:aa000aa0001", "--base", "/tmp"])
        .assert()
        .success()
        .stdout("/tmp/aa/000/aa/0001\n");
}

#[test]
fn test_staging_path_rejects_malformed_druid() {
    dor_admin()
        .args(["staging-path", "not-a-druid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-druid"));
}

#[test]
fn test_progress_log_lists_completed_druids() {
    dor_admin()
        .args(["progress-log", "tests/fixtures/test_log.yaml"])
        .assert()
        .success()
        .stdout("druid:bc006dj2846\ndruid:bg598tg6338\n");
}

#[test]
fn test_progress_log_lists_failed_druids() {
    dor_admin()
        .args(["progress-log", "tests/fixtures/test_log.yaml", "--failed"])
        .assert()
        .success()
        .stdout("druid:bh634sp8073\n");
}

#[test]
fn test_progress_log_missing_file_is_empty() {
    dor_admin()
        .args(["progress-log", "tests/fixtures/no_such_log.yaml"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_read_config_single_key() {
    dor_admin()
        .args(["read-config", "tests/fixtures/local_dev_revs.yaml", "--key", "progress_log_file"])
        .assert()
        .success()
        .stdout("tmp/progress_revs.yaml\n");
}

#[test]
fn test_read_config_unknown_key_fails() {
    dor_admin()
        .args(["read-config", "tests/fixtures/local_dev_revs.yaml", "--key", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing not found"));
}

#[test]
fn test_cleanup_rejects_unknown_steps_before_prompting() {
    dor_admin()
        .args(["cleanup", "--druids", "aa000aa0001", "--steps", "bogus"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid steps specified for cleanup"));
}

#[test]
fn test_batch_commands_require_druids() {
    dor_admin()
        .args(["reset-workflows", "--step", "assemblyWF:jp2-create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no druids provided"));
}

#[test]
fn test_unparseable_id_is_reported_as_failed_item() {
    dor_admin()
        .args(["set-error", "--druids", "bad-id", "--step", "jp2-create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad-id"))
        .stderr(predicate::str::contains("1 of 1 items failed"));
}
