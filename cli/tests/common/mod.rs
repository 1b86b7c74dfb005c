//! Common test utilities for ethcali CLI tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Store address used in test deployments
pub const TEST_STORE: &str = "0x1111111111111111111111111111111111111111";

/// Builder for a temporary home directory with an ethcali config
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    content: String,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            content: String::new(),
        }
    }

    pub fn with_default_chain(mut self, chain_id: u64) -> Self {
        self.content
            .insert_str(0, &format!("default_chain_id = {chain_id}\n"));
        self
    }

    /// Append raw TOML
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.content.push_str(toml);
        self.content.push('\n');
        self
    }

    /// Add a store deployment on `chain_id`
    pub fn with_store(self, chain_id: u64) -> Self {
        self.with_toml(&format!(
            "[[deployments]]\nchain_id = {chain_id}\nstore = \"{TEST_STORE}\"\n"
        ))
    }

    /// Add a local dev chain with id 31337
    pub fn with_local_chain(self) -> Self {
        self.with_toml(
            "[[chains]]\n\
             id = 31337\n\
             label = \"local\"\n\
             name = \"Local Anvil\"\n\
             rpc_url = \"http://127.0.0.1:8545\"\n",
        )
    }

    pub fn build(self) -> TempDir {
        let dir = self.temp_dir.path().join(".ethcali");
        fs::create_dir_all(&dir).expect("Failed to create ethcali directory");
        fs::write(dir.join("config.toml"), self.content).expect("Failed to write config");
        self.temp_dir
    }
}

/// Path of the config file inside a test home directory
pub fn config_file(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join(".ethcali").join("config.toml")
}

/// Create a test command with proper environment variables set
///
/// HOME points at the temp directory so ethcali uses `~/.ethcali/` inside it.
pub fn test_command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ethcali"));

    cmd.env("HOME", temp_dir.path())
        .env_remove("ETHCALI_CONFIG")
        .env_remove("ETHCALI_DEFAULT_CHAIN_ID")
        .env_remove("ETHCALI_WALLET_RPC")
        .env_remove("ETHCALI_FROM")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");

    cmd
}

/// A home directory with no config file at all
pub fn empty_home() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}
