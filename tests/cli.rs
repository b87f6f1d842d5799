use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const FIXTURE: &str = "tests/fixtures/response.txt";

/// `detlog` with an empty config dir and no inherited log filter.
fn detlog(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("detlog").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR");
    cmd
}

#[test]
fn no_arguments_prints_help() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .assert()
        .failure()
        .stderr(contains("Usage"));
}

#[test]
fn frames_lists_surviving_detections() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["frames", FIXTURE])
        .assert()
        .success()
        .stdout(contains("Frames:"))
        .stdout(contains("0001.png @ 0.412 cat[3] 0.95"))
        .stdout(contains("0002.png @ 0.857 dog[7] 0.88, person[1] 0.81"))
        .stdout(contains("0003.png @ 1.296 (none)"))
        .stdout(contains("0005.png").not());
}

#[test]
fn frames_threshold_flag_overrides_default() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["frames", FIXTURE, "--threshold", "0.9"])
        .assert()
        .success()
        .stdout(contains("0002.png @ 0.857 (none)"))
        .stdout(contains("0004.png @ 1.734 person[1] 0.99"));
}

#[test]
fn chart_prints_both_charts() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["chart", FIXTURE])
        .assert()
        .success()
        .stdout(contains("Inference time per frame (s):"))
        .stdout(contains("Detections per frame:"))
        .stdout(contains("cat    #..#"))
        .stdout(contains("dog    .#.."))
        .stdout(contains("person .#.#"));
}

#[test]
fn chart_raw_is_flat() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["chart", FIXTURE, "--raw", "--fields", "latency,counts"])
        .assert()
        .success()
        .stdout(contains("timestamp.0 = 0.412"))
        .stdout(contains("count.1 = 2"))
        .stdout(contains("presence.").not())
        .stdout(contains("Inference").not());
}

#[test]
fn reads_from_stdin() {
    let home = TempDir::new().unwrap();
    let input = "0001.png\n1.234\nprobability=0.95, class=3 cat\nprobability=0.40, class=7 dog\n\n\n\n";
    detlog(&home)
        .args(["frames", "-", "--raw"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("frame.0.image_id = 0001.png"))
        .stdout(contains("frame.0.detection.0 = 3 cat 0.95"))
        .stdout(contains("dog").not());
}

#[test]
fn stdin_frame_ending_in_blank_slots_without_newline() {
    let home = TempDir::new().unwrap();
    let input = "0001.png\n1.234\nprobability=0.95, class=3 cat\nprobability=0.40, class=7 dog\n\n\n";
    detlog(&home)
        .args(["frames", "-", "--raw"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("frame.0.detection.0 = 3 cat 0.95"));
}

#[test]
fn threshold_from_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(&config, "[analysis]\nthreshold = 0.9\n").unwrap();

    detlog(&home)
        .args(["frames", FIXTURE, "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("0002.png @ 0.857 (none)"));
}

#[test]
fn threshold_flag_beats_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(&config, "[analysis]\nthreshold = 0.9\n").unwrap();

    detlog(&home)
        .args(["frames", FIXTURE, "-t", "0.8", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("0002.png @ 0.857 dog[7] 0.88"));
}

#[test]
fn chart_options_from_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(
        &config,
        "[output]\npresent_char = \"X\"\nabsent_char = \"-\"\n",
    )
    .unwrap();

    detlog(&home)
        .args(["chart", FIXTURE, "--fields", "presence", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("cat    X--X"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["-vv", "frames", FIXTURE, "--json"])
        .assert()
        .success()
        .stderr(contains("skipping chunk 4 (5 lines, expected 7)"))
        .stdout(contains("skipping").not());
}

#[test]
fn malformed_chunks_are_silent_by_default() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .args(["frames", FIXTURE])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn schema_describes_report() {
    let home = TempDir::new().unwrap();
    detlog(&home)
        .arg("schema")
        .assert()
        .success()
        .stdout(contains("\"imageID\""))
        .stdout(contains("\"threshold\""))
        .stdout(contains("\"presence\""));
}
