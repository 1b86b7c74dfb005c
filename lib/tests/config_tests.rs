//! Integration tests for configuration management

use alloy::primitives::address;
use ethcali_lib::constants::DEFAULT_CHAIN_ENV;
use ethcali_lib::{
    AdminCacheConfig, ChainRegistry, Config, ContractKind, CustomChain, CustomToken, Deployment,
    EthcaliError, PurchaseConfig, Stablecoin,
};
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

fn base_deployment() -> Deployment {
    Deployment {
        chain_id: 8453,
        store: Some(address!("0x1111111111111111111111111111111111111111")),
        faucet_manager: Some(address!("0x2222222222222222222222222222222222222222")),
        identity_registry: None,
    }
}

#[test]
#[serial]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config::builder()
        .with_default_chain_id(10)
        .with_rpc_override("base", "http://localhost:8545")
        .with_deployment(base_deployment())
        .build()
        .unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(Some(&path)).unwrap();
    assert_eq!(loaded.default_chain_id, Some(10));
    assert_eq!(loaded.deployments, vec![base_deployment()]);
    assert_eq!(loaded.rpc.get("base").map(String::as_str), Some("http://localhost:8545"));
}

#[test]
#[serial]
fn test_load_from_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from(Some(dir.path().join("absent.toml")));
    assert!(matches!(result, Err(EthcaliError::ConfigMissing(_))));
}

#[test]
#[serial]
fn test_load_or_default_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(Some(dir.path().join("absent.toml"))).unwrap();
    assert!(config.deployments.is_empty());
    assert_eq!(config.admin_cache.stale_after(), Duration::from_secs(120));
    assert_eq!(config.admin_cache.evict_after(), Duration::from_secs(300));
}

#[test]
#[serial]
fn test_load_reports_invalid_file() {
    struct TestCase {
        content: &'static str,
        description: &'static str,
    }

    let test_cases = vec![
        TestCase {
            content: "default_chain_id = \"base\"",
            description: "wrong type",
        },
        TestCase {
            content: "default_chain_id = 84532",
            description: "unsupported default chain",
        },
        TestCase {
            content: "[[deployments]]\nchain_id = 8453\nstore = \"0x1234\"",
            description: "short address",
        },
        TestCase {
            content: "[admin_cache]\nstale_secs = 600\nevict_secs = 300",
            description: "inverted cache windows",
        },
        TestCase {
            content: "[rpc]\nsepolia = \"http://localhost:8545\"",
            description: "rpc override for unknown chain",
        },
    ];

    for test_case in test_cases {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, test_case.content).unwrap();
        let result = Config::load_or_default(Some(&path));
        assert!(
            matches!(result, Err(EthcaliError::InvalidConfig(_))),
            "{} should be rejected, got {result:?}",
            test_case.description
        );
    }
}

#[test]
#[serial]
fn test_registry_from_config() {
    let local_store = address!("0x3333333333333333333333333333333333333333");
    let local_usdc = address!("0x5555555555555555555555555555555555555555");
    let toml = r#"
        default_chain_id = 31337

        [[chains]]
        id = 31337
        label = "Anvil"
        name = "Anvil Local"
        rpc_url = "http://127.0.0.1:8545"

        [[deployments]]
        chain_id = 31337
        store = "0x3333333333333333333333333333333333333333"

        [[tokens]]
        chain_id = 31337
        symbol = "USDC"
        address = "0x5555555555555555555555555555555555555555"
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    config.validate().unwrap();

    let registry = ChainRegistry::from_config(&config).unwrap();
    assert_eq!(registry.default_chain_id(), 31337);
    assert_eq!(registry.len(), 5);

    let local = registry.lookup("anvil").unwrap();
    assert_eq!(local.contract(ContractKind::Store), Some(local_store));
    assert_eq!(local.stablecoin(Stablecoin::Usdc), Some(local_usdc));
    assert!(local.explorer_url.is_empty());
    assert!(local.add_chain_params().get("blockExplorerUrls").is_none());

    // Unsupported ids fall back to the configured default
    assert_eq!(registry.descriptor_for(999).id, 31337);
}

#[test]
#[serial]
fn test_default_chain_env_override() {
    let config = Config::builder()
        .with_chain(CustomChain {
            id: 31337,
            label: "anvil".to_string(),
            name: "Anvil".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            explorer_url: String::new(),
            preregister: true,
        })
        .build_unchecked();

    std::env::set_var(DEFAULT_CHAIN_ENV, "31337");
    let registry = ChainRegistry::from_config(&config);
    std::env::remove_var(DEFAULT_CHAIN_ENV);

    assert_eq!(registry.unwrap().default_chain_id(), 31337);
    assert_eq!(ChainRegistry::from_config(&config).unwrap().default_chain_id(), 8453);
}

#[test]
#[serial]
fn test_builder_rejects_zero_cache_window() {
    let result = Config::builder()
        .with_admin_cache(AdminCacheConfig {
            stale_secs: 0,
            evict_secs: 300,
        })
        .build();
    assert!(matches!(result, Err(EthcaliError::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_builder_token_and_purchase_overrides() {
    let eurc = address!("0x6666666666666666666666666666666666666666");
    let config = Config::builder()
        .with_token(CustomToken {
            chain_id: 10,
            symbol: Stablecoin::Eurc,
            address: eurc,
        })
        .with_purchase(PurchaseConfig {
            allowance_recheck_delay_ms: 0,
            confirmation_poll_interval_ms: 250,
            confirmation_timeout_secs: 30,
        })
        .build()
        .unwrap();
    assert_eq!(config.purchase.confirmation_timeout_secs, 30);

    let registry = ChainRegistry::from_config(&config).unwrap();
    assert_eq!(registry.token_addresses(10).get(&Stablecoin::Eurc), Some(&eurc));

    let result = Config::builder()
        .with_purchase(PurchaseConfig {
            confirmation_poll_interval_ms: 0,
            ..PurchaseConfig::default()
        })
        .build();
    assert!(matches!(result, Err(EthcaliError::InvalidConfig(_))));
}
