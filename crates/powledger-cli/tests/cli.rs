use assert_cmd::Command;
use predicates::prelude::*;

fn powledger() -> Command {
    Command::cargo_bin("powledger").expect("binary built")
}

#[test]
fn hash_prints_digest() {
    powledger()
        .args(["hash", "abc"])
        .assert()
        .success()
        .stdout("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n");
}

#[test]
fn simulate_narrates_each_block() {
    powledger()
        .args(["simulate", "--difficulty", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Simulating Difficulty 2 ==="))
        .stdout(predicate::str::contains("Mining block 0..."))
        .stdout(predicate::str::contains("Block 1 mined! Hash: 00"))
        .stdout(predicate::str::contains("Time taken with difficulty 2:"));
}

#[test]
fn simulate_json_summary() {
    let output = powledger()
        .args(["simulate", "-d", "1", "-d", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1]["difficulty"], 2);
    let blocks = summaries[1]["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0]["hash"].as_str().unwrap().starts_with("00"));
}

#[test]
fn mine_prints_linked_chain() {
    let output = powledger()
        .args(["mine", "--tx", "first", "--tx", "second", "-d", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let chain: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let blocks = chain.as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["previous_hash"], "0");
    assert_eq!(blocks[1]["previous_hash"], blocks[0]["hash"]);
}

#[test]
fn attempt_cap_fails_cleanly() {
    powledger()
        .args(["mine", "--tx", "never", "-d", "64", "--max-attempts", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("within 10 attempts"));
}

#[test]
fn verify_demo_succeeds() {
    powledger()
        .args(["verify-demo", "-d", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chain of 2 blocks verified"));
}
