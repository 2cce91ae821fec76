use std::{
    fs,
    path::PathBuf,
};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ABC_ROOT: &str = "0xc3b537cc8a2c6dcb3657718e1f3505ff751ff8c2eba2a70460df2cbee2b1413a";
const A_PROOF: [&str; 2] = [
    "0x0b42b6393c1f53060fe3ddbfcd7aadcca894465a5a438f69c87d790b2299b9b2",
    "0xb5553de315e0edf504d9150af82dafa5c4667fa618ed0a6f19c69b41166c5510",
];

const ADDRESSES: [&str; 3] = [
    "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4",
    "0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2",
    "0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02db",
];
const ADDRESSES_ROOT: &str = "0x2e95d9b220e054ce1ffa9e0698bcf436f445e88fc75ef6e9126b547e21356c6e";

fn write_whitelist(dir: &TempDir, items: &[&str]) -> PathBuf {
    let path = dir.path().join("whitelist.json");
    fs::write(&path, serde_json::to_string(items).unwrap()).unwrap();
    path
}

/// A command with all config variables cleared so that the host
/// environment cannot leak into the tests.
fn whitelist_merkle() -> Command {
    let mut cmd = Command::cargo_bin("whitelist-merkle").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("WHITELIST_MERKLE_LOG")
        .env_remove("WHITELIST_MERKLE_HASHER")
        .env_remove("WHITELIST_MERKLE_SORT_LEAVES")
        .env_remove("WHITELIST_MERKLE_SORT_PAIRS");
    cmd
}

#[test]
fn build_prints_root_and_proof_of_indexed_item() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .arg("build")
        .arg("--whitelist")
        .arg(&whitelist)
        .args(["--index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("root: {ABC_ROOT}")))
        .stdout(predicate::str::contains("leaf before hash: a"))
        .stdout(predicate::str::contains(format!(
            r#"proof: ["{}","{}"]"#,
            A_PROOF[0], A_PROOF[1]
        )));
}

#[test]
fn build_without_item_only_prints_root() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("root: {ABC_ROOT}\n")));
}

#[test]
fn build_reads_hasher_from_environment() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .env("WHITELIST_MERKLE_HASHER", "sha256")
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0x8fee4b5ecf296a85922864113a5b1f05df4a3cc7ff94921309b68f285dfa1cef",
        ));
}

#[test]
fn build_flags_override_environment() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .env("WHITELIST_MERKLE_HASHER", "keccak256")
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--hasher", "sha256", "--sort-leaves", "false", "--sort-pairs", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0x7075152d03a5cd92104887b476862778ec0c87be5c2fa1c0a90f87c49fad6eff",
        ));
}

#[test]
fn build_proves_addresses_as_raw_bytes() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &ADDRESSES);
    let output = whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--item", ADDRESSES[2], "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(ADDRESSES_ROOT, report["root"]);
    assert_eq!(
        serde_json::json!([
            "0x5931b4ed56ace4c46b68524cb5bcbf4195f1bbaacbe5228fbd090546c88dd229",
            "0x999bf57501565dbd2fdcea36efa2b9aef8340a8901e3459f4a4c926275d36cdb",
        ]),
        report["proof"]
    );
}

#[test]
fn build_fails_for_out_of_range_index() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--index", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn build_fails_for_unknown_item() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--item", "d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not in the merkle tree"));
}

#[test]
fn build_fails_for_empty_whitelist() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &[]);
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .assert()
        .failure();
}

#[test]
fn unknown_config_variable_is_rejected() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a"]);
    whitelist_merkle()
        .env("WHITELIST_MERKLE_DEPTH", "3")
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .assert()
        .failure();
}

#[test]
fn verify_accepts_valid_proof() {
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ABC_ROOT, "--item", "a"])
        .args(["--proof", A_PROOF[0], "--proof", A_PROOF[1]])
        .assert()
        .success()
        .stdout("valid\n");
}

#[test]
fn verify_accepts_addresses_proof() {
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ADDRESSES_ROOT, "--item", ADDRESSES[2]])
        .args([
            "--proof",
            "0x5931b4ed56ace4c46b68524cb5bcbf4195f1bbaacbe5228fbd090546c88dd229",
            "--proof",
            "0x999bf57501565dbd2fdcea36efa2b9aef8340a8901e3459f4a4c926275d36cdb",
        ])
        .assert()
        .success();
}

#[test]
fn verify_rejects_tampered_proof() {
    let mut tampered = A_PROOF[1].to_string();
    tampered.replace_range(tampered.len() - 1.., "1");
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ABC_ROOT, "--item", "a"])
        .args(["--proof", A_PROOF[0], "--proof", tampered.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("proof does not link leaf"));
}

#[test]
fn verify_rejects_item_outside_whitelist() {
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ABC_ROOT, "--item", "d"])
        .args(["--proof", A_PROOF[0], "--proof", A_PROOF[1]])
        .assert()
        .failure();
}

/// Returns the value of the `key: value` line printed by `build`.
fn field<'a>(stdout: &'a str, key: &str) -> &'a str {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix(": "))
        .unwrap_or_else(|| panic!("`{key}` missing from output:\n{stdout}"))
}

#[test]
fn unsorted_proof_printed_by_build_verifies() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    let output = whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--sort-leaves", "false", "--sort-pairs", "false", "--index", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let root = field(&stdout, "root");
    let siblings: Vec<String> = serde_json::from_str(field(&stdout, "proof")).unwrap();
    assert_eq!(1, siblings.len());
    assert!(siblings[0].starts_with("left:0x"));

    let mut verify = whitelist_merkle();
    verify
        .arg("verify")
        .args(["--root", root, "--item", "c", "--sort-pairs", "false"]);
    for sibling in &siblings {
        verify.args(["--proof", sibling.as_str()]);
    }
    verify.assert().success().stdout("valid\n");

    let mut flipped = whitelist_merkle();
    flipped
        .arg("verify")
        .args(["--root", root, "--item", "c", "--sort-pairs", "false"]);
    for sibling in &siblings {
        flipped.args(["--proof", sibling.replace("left:", "right:").as_str()]);
    }
    flipped.assert().failure();
}

#[test]
fn verify_accepts_leaf_digest() {
    whitelist_merkle()
        .arg("verify")
        .args([
            "--root",
            ABC_ROOT,
            "--leaf",
            "0x3ac225168df54212a25c1c01fd35bebfea408fdac2e31ddd6f80a4bbf9a5f1cb",
        ])
        .args(["--proof", A_PROOF[0], "--proof", A_PROOF[1]])
        .assert()
        .success()
        .stdout("valid\n");
}

#[test]
fn verify_rejects_wrong_leaf_digest() {
    whitelist_merkle()
        .arg("verify")
        .args([
            "--root",
            ABC_ROOT,
            "--leaf",
            "0x3ac225168df54212a25c1c01fd35bebfea408fdac2e31ddd6f80a4bbf9a5f1cc",
        ])
        .args(["--proof", A_PROOF[0], "--proof", A_PROOF[1]])
        .assert()
        .failure()
        .stderr(predicate::str::contains("proof does not link leaf"));
}

#[test]
fn verify_rejects_leaf_and_item_together() {
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ABC_ROOT, "--leaf", A_PROOF[0], "--item", "a"])
        .assert()
        .failure();
}

#[test]
fn failures_do_not_warn_about_span_traces() {
    let dir = TempDir::new().unwrap();
    let whitelist = write_whitelist(&dir, &["a", "b", "c"]);
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&whitelist)
        .args(["--item", "d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not in the merkle tree"))
        .stderr(predicate::str::contains("SpanTrace").not());
}

#[test]
fn verify_requires_leaf_or_item() {
    whitelist_merkle()
        .arg("verify")
        .args(["--root", ABC_ROOT, "--proof", A_PROOF[0]])
        .assert()
        .failure();
}

#[test]
fn generate_writes_requested_number_of_hashes() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("hashes.json");
    whitelist_merkle()
        .arg("generate")
        .args(["-n", "10"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("filled with 10 random hashes"));
    let hashes: Vec<String> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(10, hashes.len());
}

#[test]
fn generated_whitelist_can_be_built() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("hashes.json");
    whitelist_merkle()
        .arg("generate")
        .args(["-n", "33", "--max", "1000"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    whitelist_merkle()
        .arg("build")
        .arg("-w")
        .arg(&output)
        .args(["--index", "32"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("root: 0x"));
}
