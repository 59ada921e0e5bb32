//! End-to-end test for acrux-node.
//!
//! Drives the binary through generate-genesis → validate-genesis → init →
//! run → status → export against a throwaway data directory.
//!
//! Run with:
//!   cargo test -p acrux-node --test lifecycle

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use acrux_core::constants::{TOTAL_SUPPLY, VALIDATOR_INITIAL_CREDIT};
use acrux_genesis::{GenesisConfig, GenesisDoc};
use acrux_mint::GenesisState;

const RESERVE: &str = "0x17608f3f5eab3bc88ba6bc48824127fa218151fd";

// ── Helpers ───────────────────────────────────────────────────────────────────

struct TempDir(PathBuf);

impl TempDir {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("acrux_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn node(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acrux-node"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("failed to spawn acrux-node")
}

fn node_ok(data_dir: &Path, args: &[&str]) -> String {
    let out = node(data_dir, args);
    assert!(
        out.status.success(),
        "acrux-node {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

fn write_config(dir: &Path, validators: usize) -> PathBuf {
    let validators = (1..=validators).map(|i| format!("0x{i:040x}")).collect();
    let path = dir.join("genesis-config.json");
    std::fs::write(&path, serde_json::to_string(&GenesisConfig::new(RESERVE, validators)).unwrap())
        .unwrap();
    path
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn genesis_then_emission() {
    let tmp = TempDir::new("lifecycle");
    let data_dir = tmp.0.join("state");
    let config = write_config(&tmp.0, 4);
    let genesis = tmp.0.join("genesis.json");

    // ── 1. Allocate ───────────────────────────────────────────────────────────
    node_ok(
        &data_dir,
        &[
            "generate-genesis",
            "--config", config.to_str().unwrap(),
            "--output", genesis.to_str().unwrap(),
        ],
    );
    let doc = GenesisDoc::from_json(&std::fs::read(&genesis).unwrap()).unwrap();
    assert_eq!(doc.app_state.bank.balances.len(), 5);
    assert_eq!(
        doc.app_state.bank.balances.last().unwrap().coins.amount,
        TOTAL_SUPPLY - 4 * VALIDATOR_INITIAL_CREDIT
    );

    node_ok(&data_dir, &["validate-genesis", genesis.to_str().unwrap()]);

    // ── 2. Init, then refuse a second init ────────────────────────────────────
    node_ok(&data_dir, &["init", "--genesis", genesis.to_str().unwrap()]);
    assert!(!node(&data_dir, &["init", "--genesis", genesis.to_str().unwrap()]).status.success());

    // ── 3. Replay past the distribution start ─────────────────────────────────
    let start = doc.app_state.mint.params.minting_rewards_distribution_start_time;
    node_ok(
        &data_dir,
        &["run", "--blocks", "20", "--block-interval", "6", "--from-time", &start.to_string()],
    );

    let status: serde_json::Value = serde_json::from_str(&node_ok(&data_dir, &["status"])).unwrap();
    assert_eq!(status["chain_id"], "acrux_9052-1");
    assert_eq!(status["last_block"]["height"], 20);
    assert_eq!(status["minter"]["last_mint_time"], start + 19 * 6);

    let supply: u128 = status["supply"].as_str().unwrap().parse().unwrap();
    let staking: u128 = status["staking_rewards"].as_str().unwrap().parse().unwrap();
    let community: u128 = status["community_pool"].as_str().unwrap().parse().unwrap();
    assert!(staking > 0 && community > staking);
    assert_eq!(supply, TOTAL_SUPPLY + staking + community);

    // ── 4. Export carries params only ─────────────────────────────────────────
    let exported: GenesisState = serde_json::from_str(&node_ok(&data_dir, &["export"])).unwrap();
    assert_eq!(exported, doc.app_state.mint);
}

#[test]
fn malformed_validator_address_aborts_generation() {
    let tmp = TempDir::new("bad_address");
    let path = tmp.0.join("genesis-config.json");
    let config = GenesisConfig::new(RESERVE, vec!["not-an-address".into()]);
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    let output = tmp.0.join("genesis.json");

    let out = node(
        &tmp.0.join("state"),
        &["generate-genesis", "--config", path.to_str().unwrap(), "--output", output.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(!output.exists());
}

#[test]
fn run_without_genesis_fails() {
    let tmp = TempDir::new("no_genesis");
    let out = node(&tmp.0.join("state"), &["run", "--blocks", "1"]);
    assert!(!out.status.success());
}
