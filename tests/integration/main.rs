//! Integration tests for larder

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn larder() -> Command {
        cargo_bin_cmd!("larder")
    }

    fn root_arg(temp: &TempDir) -> String {
        temp.path().join("cache").display().to_string()
    }

    #[test]
    fn help_displays() {
        larder()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("TTL key/value cache"));
    }

    #[test]
    fn version_displays() {
        larder()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("larder"));
    }

    #[test]
    fn set_then_get_round_trips() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "set", "greeting", "hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Stored"));

        larder()
            .args(["--root", &root, "get", "greeting"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hello"));
    }

    #[test]
    fn json_values_survive_the_round_trip() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "set", "nums", "[1,2,3]"])
            .assert()
            .success();

        larder()
            .args(["--root", &root, "get", "nums"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[1,2,3]"));
    }

    #[test]
    fn get_missing_key_fails() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "get", "nonexistent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Key not found"));
    }

    #[test]
    fn get_missing_key_with_default_succeeds() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "get", "nonexistent", "--default", "fallback"])
            .assert()
            .success()
            .stdout(predicate::str::contains("fallback"));
    }

    #[test]
    fn expired_entry_reads_as_missing() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        // Well past the default stampede window
        larder()
            .args(["--root", &root, "set", "old", "v", "--ttl", "-3600"])
            .assert()
            .success();

        larder()
            .args(["--root", &root, "get", "old"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Key not found"));
    }

    #[test]
    fn delete_missing_key_fails() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "delete", "nonexistent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("delete failed"));
    }

    #[test]
    fn delete_removes_entry() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder().args(["--root", &root, "set", "k", "v"]).assert().success();
        larder()
            .args(["--root", &root, "delete", "k"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted"));
        larder().args(["--root", &root, "get", "k"]).assert().failure();
    }

    #[test]
    fn has_reports_presence() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "has", "k"])
            .assert()
            .success()
            .stdout(predicate::str::contains("false"));

        larder().args(["--root", &root, "set", "k", "v"]).assert().success();

        larder()
            .args(["--root", &root, "has", "k"])
            .assert()
            .success()
            .stdout(predicate::str::contains("true"));
    }

    #[test]
    fn path_shows_sharded_layout() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "--depth", "2", "path", "bingo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("b/i/bingo"));

        // Short keys are padded with '0'
        larder()
            .args(["--root", &root, "--depth", "2", "path", "x"])
            .assert()
            .success()
            .stdout(predicate::str::contains("x/0/x"));
    }

    #[test]
    fn invalid_key_is_reported() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "set", "a/b", "v"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key"));
    }

    #[test]
    fn clear_forgets_entries() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder().args(["--root", &root, "set", "k", "v"]).assert().success();

        larder()
            .args(["--root", &root, "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache cleared"));

        larder().args(["--root", &root, "get", "k"]).assert().failure();

        // Root stays usable
        larder().args(["--root", &root, "set", "k", "w"]).assert().success();
    }

    #[test]
    fn gc_reports_sweep_counters() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "set", "old", "v", "--ttl", "-3600"])
            .assert()
            .success();
        larder()
            .args(["--root", &root, "clear", "--yes"])
            .assert()
            .success();

        larder()
            .args(["--root", &root, "gc"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Retired generations").and(predicate::str::contains("1")));
    }

    #[test]
    fn gc_json_output() {
        let temp = TempDir::new().unwrap();
        let root = root_arg(&temp);

        larder()
            .args(["--root", &root, "gc", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"expired_files\""));
    }

    #[test]
    fn completions_generate() {
        larder()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("larder"));
    }
}
