//! Commands that act through a connected wallet: chain switching and purchases.

use crate::cli::{OutputFormat, WalletArgs};
use crate::colors::Colors;
use crate::config_utils::select_chain;
use crate::hyperlink::{address_link, tx_link};
use crate::output::{print_field, render};
use anyhow::{Context, Result};
use ethcali_lib::currency::currencies;
use ethcali_lib::utils::{parse_address, parse_u256, short_address};
use ethcali_lib::{
    ChainDescriptor, ChainRegistry, ChainSwitchOrchestrator, Config, EthcaliError, JsonRpcWallet,
    ProviderError, PurchaseOptions, PurchaseOrchestrator, RpcReader, StoreReader, SubmittedTx,
    SwitchOutcome, WalletHandle,
};
use serde::Serialize;
use std::sync::Arc;

/// Connect to the wallet endpoint, resolving the account if `--from` was not given
async fn connect_wallet(args: &WalletArgs) -> Result<WalletHandle> {
    let from = args.from.as_deref().map(parse_address).transpose()?;
    let wallet = JsonRpcWallet::new(&args.wallet_rpc, from)
        .connect()
        .await
        .with_context(|| format!("Failed to connect to wallet at {}", args.wallet_rpc))?;
    let handle = WalletHandle::from_provider(wallet);
    let address = handle.require_address()?;
    tracing::info!(%address, endpoint = %args.wallet_rpc, "wallet connected");
    Ok(handle)
}

#[derive(Debug, Serialize)]
struct SwitchReport {
    from_chain_id: u64,
    target_chain_id: u64,
    #[serde(flatten)]
    outcome: SwitchOutcome,
}

pub async fn switch_command(
    registry: Arc<ChainRegistry>,
    chain: &str,
    wallet: &WalletArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let target = select_chain(&registry, Some(chain))?.clone();
    let wallet = connect_wallet(wallet).await?;

    let orchestrator = ChainSwitchOrchestrator::new(wallet, registry);
    let from_chain_id = orchestrator
        .refresh()
        .await
        .context("Failed to read the wallet's chain")?;
    let outcome = orchestrator.switch_to(target.id).await?;

    match &outcome {
        SwitchOutcome::Rejected => {
            return Err(EthcaliError::Provider(ProviderError::user_rejected()).into())
        }
        SwitchOutcome::Failed { message } => anyhow::bail!("{message}"),
        _ => {}
    }

    let report = SwitchReport {
        from_chain_id,
        target_chain_id: target.id,
        outcome,
    };
    render(output_format, &report, |report| {
        let name = Colors::chain(&target.name);
        match report.outcome {
            SwitchOutcome::AlreadyOnChain => {
                println!("Wallet is already on {name}.");
            }
            SwitchOutcome::Switched => {
                println!("{} Switched to {name}.", Colors::success("✓"));
            }
            SwitchOutcome::AddedAndSwitched => {
                println!("{} Added {name} to the wallet and switched.", Colors::success("✓"));
            }
            SwitchOutcome::AddedPendingManualSwitch => {
                println!(
                    "{} Added {name} to the wallet. Switch to it manually to continue.",
                    Colors::warning("!")
                );
            }
            SwitchOutcome::InProgress => {
                println!("{}", Colors::warning("A chain switch is already in progress."));
            }
            SwitchOutcome::Rejected | SwitchOutcome::Failed { .. } => {}
        }
    })
}

#[derive(Debug, Serialize)]
struct BuyReport {
    chain_id: u64,
    chain: String,
    token_id: String,
    quantity: u64,
    unit_price: f64,
    total_base_units: String,
    approval: Option<SubmittedTx>,
    buy: SubmittedTx,
}

fn print_tx(label: &str, chain: &ChainDescriptor, tx: &SubmittedTx) {
    match tx.hash {
        Some(hash) => print_field(label, tx_link(chain, &hash.to_string())),
        None => print_field(label, Colors::dim("submitted (no hash returned)")),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn buy_command(
    config: &Config,
    registry: Arc<ChainRegistry>,
    token_id: &str,
    quantity: u64,
    price: Option<f64>,
    no_sponsor: bool,
    wallet: &WalletArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let token_id = parse_u256(token_id)?;
    let wallet = connect_wallet(wallet).await?;
    let reader = Arc::new(RpcReader::new(registry.clone()));

    let unit_price = match price {
        Some(price) => price,
        None => {
            let chain = wallet.active_descriptor(&registry).await?;
            let variant = StoreReader::new(registry.clone(), reader.clone())
                .variant(chain.id, token_id)
                .await
                .with_context(|| format!("Failed to read the price of variant {token_id}"))?;
            if !variant.active {
                tracing::warn!(%token_id, "variant is not active, the purchase may revert");
            } else if variant.is_sold_out() {
                tracing::warn!(%token_id, "variant is sold out, the purchase may revert");
            }
            variant.display_price()
        }
    };

    let options = PurchaseOptions {
        sponsored: !no_sponsor,
        ..PurchaseOptions::from(&config.purchase)
    };
    let buyer = wallet.require_address()?;
    let receipt = PurchaseOrchestrator::new(wallet, registry.clone(), reader)
        .with_options(options)
        .purchase(token_id, quantity, unit_price)
        .await
        .context("Purchase failed")?;

    let chain = registry.descriptor_for(receipt.chain_id);
    let report = BuyReport {
        chain_id: receipt.chain_id,
        chain: chain.label.clone(),
        token_id: token_id.to_string(),
        quantity,
        unit_price,
        total_base_units: receipt.purchase.required.to_string(),
        approval: receipt.approval,
        buy: receipt.buy,
    };

    render(output_format, &report, |report| {
        println!(
            "{} Bought {} x token {} on {}",
            Colors::success("✓"),
            report.quantity,
            report.token_id,
            Colors::chain(&chain.name)
        );
        print_field(
            "Buyer",
            address_link(chain, &buyer.to_string(), &short_address(&buyer)),
        );
        print_field(
            "Total",
            Colors::amount(&currencies::USDC.format_trimmed(receipt.purchase.required)),
        );
        if let Some(approval) = &report.approval {
            print_tx("Approval", chain, approval);
        }
        print_tx("Purchase", chain, &report.buy);
    })
}
