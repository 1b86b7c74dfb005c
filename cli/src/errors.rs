//! Error display helpers with actionable suggestions.
//!
//! Provides user-friendly error messages that include suggestions
//! for how to fix common problems.

use crate::colors::Colors;
use ethcali_lib::wallet::{DISCONNECTED, USER_REJECTED};
use ethcali_lib::{EthcaliError, ReadError};

/// Get a suggestion for how to fix an error, if available.
pub fn get_suggestion(err: &anyhow::Error) -> Option<String> {
    if let Some(ethcali_err) = err.downcast_ref::<EthcaliError>() {
        return get_ethcali_error_suggestion(ethcali_err);
    }

    // Check error message for common patterns
    let msg = format!("{err:#}").to_lowercase();

    if msg.contains("unknown chain") {
        return Some("Chains are matched by label, numeric id, or CAIP-2 id (eip155:<id>).".into());
    }

    if msg.contains("already exists") {
        return Some("Pass --force to overwrite the existing file.".into());
    }

    if msg.contains("permission denied") {
        return Some("Check file permissions or run with appropriate privileges.".into());
    }

    if msg.contains("connection refused") || msg.contains("connect error") {
        return Some("Check that the RPC or wallet endpoint is running and reachable.".into());
    }

    None
}

/// Get suggestion for a specific EthcaliError variant.
fn get_ethcali_error_suggestion(err: &EthcaliError) -> Option<String> {
    match err {
        EthcaliError::ConfigMissing(_) => {
            Some("Run 'ethcali config init' to create a config file.".into())
        }

        EthcaliError::NoConfigDir => {
            Some("Could not determine home directory. Set the HOME environment variable.".into())
        }

        EthcaliError::InvalidConfig(_) | EthcaliError::TomlParse(_) => Some(
            "Run 'ethcali config validate' for details, or 'ethcali config init --force' to start over."
                .into(),
        ),

        EthcaliError::MissingContract { chain, .. } => Some(format!(
            "Add the deployment for {chain} to ~/.ethcali/config.toml under [[deployments]]."
        )),

        EthcaliError::MissingToken { chain, .. } => Some(format!(
            "Add the token address for {chain} to ~/.ethcali/config.toml under [[tokens]]."
        )),

        EthcaliError::UnsupportedChain(id) => Some(format!(
            "Chain {id} is not configured.\n\
             Run 'ethcali chains list' to see available chains.\n\
             Or add a custom chain in ~/.ethcali/config.toml under [[chains]]."
        )),

        EthcaliError::WalletNotConnected => Some(
            "Pass --from <ADDRESS> or use a wallet endpoint that exposes accounts via eth_accounts."
                .into(),
        ),

        EthcaliError::Provider(e) if e.code == USER_REJECTED => {
            Some("The request was rejected in the wallet. Approve it to continue.".into())
        }

        EthcaliError::Provider(e) if e.code == DISCONNECTED => Some(
            "Could not reach the wallet. Check --wallet-rpc (or ETHCALI_WALLET_RPC) and try again."
                .into(),
        ),

        EthcaliError::InsufficientAllowance {
            required,
            allowance,
        } => Some(format!(
            "The store needs an allowance of {required} base units but has {allowance}.\n\
             Retry the purchase; the approval may still be pending."
        )),

        EthcaliError::ConfirmationTimeout(_) => Some(
            "The approval may still confirm. Check it on the explorer, then retry the purchase."
                .into(),
        ),

        EthcaliError::Read(ReadError::Transport(_)) => Some(
            "Could not reach the chain's RPC endpoint. Override it under [rpc] in ~/.ethcali/config.toml."
                .into(),
        ),

        EthcaliError::Read(ReadError::UnknownChain(_)) => {
            Some("Run 'ethcali chains list' to see configured chains.".into())
        }

        EthcaliError::InvalidTokenId(_) => Some(
            "Token ids are decimal or 0x-prefixed hex numbers: base id times ten plus the size digit."
                .into(),
        ),

        EthcaliError::InvalidAddress(_) => {
            Some("Addresses are 40 hex characters, with or without the 0x prefix.".into())
        }

        _ => None,
    }
}

/// Format an error with its suggestion for display.
pub fn format_error_with_suggestion(err: &anyhow::Error) -> String {
    let mut output = format!("{} {err:#}", Colors::error("Error:"));

    if let Some(suggestion) = get_suggestion(err) {
        output.push_str(&format!("\n\n{}:\n", Colors::info("Suggestion")));
        output.push_str(&suggestion);
    }

    // Add related commands if available
    if let Some(related) = get_related_commands(err) {
        output.push_str(&format!("\n\n{}:\n", Colors::info("Related commands")));
        for cmd in related {
            output.push_str(&format!("  {}\n", cmd));
        }
    }

    output
}

/// Get related commands that might help fix an error.
fn get_related_commands(err: &anyhow::Error) -> Option<Vec<&'static str>> {
    if let Some(ethcali_err) = err.downcast_ref::<EthcaliError>() {
        match ethcali_err {
            EthcaliError::ConfigMissing(_)
            | EthcaliError::InvalidConfig(_)
            | EthcaliError::TomlParse(_) => Some(vec![
                "ethcali config init       # Write a starter config",
                "ethcali config validate   # Check the config file",
                "ethcali config            # View current configuration",
            ]),
            EthcaliError::UnsupportedChain(_) | EthcaliError::MissingContract { .. } => Some(vec![
                "ethcali chains list       # See configured chains",
                "ethcali chains info <id>  # Show a chain's contracts",
            ]),
            EthcaliError::InsufficientAllowance { .. } => Some(vec![
                "ethcali store variant <id> # Check the variant price",
                "ethcali price to-units <p> # Compute the required spend",
            ]),
            _ => None,
        }
    } else {
        let msg = format!("{err:#}").to_lowercase();

        if msg.contains("unknown chain") {
            return Some(vec!["ethcali chains list       # See available chains"]);
        }

        if msg.contains("config") {
            return Some(vec![
                "ethcali config init       # Write a starter config",
                "ethcali config            # View configuration",
            ]);
        }

        None
    }
}
