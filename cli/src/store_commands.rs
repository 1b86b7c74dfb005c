//! Store read commands: variants, settings and redemption status.

use crate::cli::{OutputFormat, StoreCommands};
use crate::colors::Colors;
use crate::config_utils::select_chain;
use crate::hyperlink::address_link;
use crate::output::{print_field, render};
use crate::table::Table;
use anyhow::{Context, Result};
use ethcali_lib::currency::currencies;
use ethcali_lib::product::parse_token_id;
use ethcali_lib::store::{RedemptionStatus, VariantListing, VariantState};
use ethcali_lib::utils::{parse_address, parse_u256, short_address};
use ethcali_lib::{ChainDescriptor, ChainRegistry, Config, IpfsMetadataClient, RpcReader, StoreReader};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct StatusReport {
    token_id: String,
    owner: String,
    status: RedemptionStatus,
}

fn store_reader(config: &Config, registry: Arc<ChainRegistry>) -> StoreReader {
    let reader = Arc::new(RpcReader::new(registry.clone()));
    StoreReader::new(registry, reader)
        .with_metadata(Arc::new(IpfsMetadataClient::new(config.metadata.clone())))
}

pub async fn store_command(
    config: &Config,
    registry: Arc<ChainRegistry>,
    command: &StoreCommands,
    output_format: OutputFormat,
) -> Result<()> {
    let store = store_reader(config, registry.clone());

    match command {
        StoreCommands::Variants { chain } => {
            let chain = select_chain(&registry, chain.as_deref())?;
            let listings = store
                .all_variants(chain.id)
                .await
                .with_context(|| format!("Failed to list variants on {}", chain.label))?;
            render(output_format, &listings, |listings| print_listings(listings))
        }
        StoreCommands::Variant { token_id, chain } => {
            let chain = select_chain(&registry, chain.as_deref())?;
            let token_id = parse_u256(token_id)?;
            let listing = store
                .listing(chain.id, token_id)
                .await
                .with_context(|| format!("Failed to read variant {token_id}"))?;
            render(output_format, &listing, print_listing)
        }
        StoreCommands::Settings { chain } => {
            let chain = select_chain(&registry, chain.as_deref())?;
            let settings = store
                .settings(chain.id)
                .await
                .context("Failed to read store settings")?;
            render(output_format, &settings, |settings| {
                print_field("Chain", Colors::chain(&chain.label));
                print_field("Payment token", linked_address(chain, &settings.payment_token));
                print_field("Treasury", linked_address(chain, &settings.treasury));
            })
        }
        StoreCommands::Status {
            token_id,
            owner,
            chain,
        } => {
            let chain = select_chain(&registry, chain.as_deref())?;
            let token_id = parse_u256(token_id)?;
            let owner = parse_address(owner)?;
            let status = store
                .redemption_status(chain.id, token_id, owner)
                .await
                .context("Failed to read redemption status")?;
            let report = StatusReport {
                token_id: token_id.to_string(),
                owner: owner.to_string(),
                status,
            };
            render(output_format, &report, |report| {
                print_field("Token", &report.token_id);
                print_field("Owner", linked_address(chain, &owner));
                print_field("Status", status_color(report.status));
            })
        }
    }
}

fn linked_address(chain: &ChainDescriptor, address: &alloy::primitives::Address) -> String {
    let short = short_address(address);
    address_link(chain, &address.to_string(), &Colors::address(&short).to_string())
}

fn status_color(status: RedemptionStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        RedemptionStatus::NotRedeemed => Colors::dim(&text),
        RedemptionStatus::PendingFulfillment => Colors::warning(&text),
        RedemptionStatus::Fulfilled => Colors::success(&text),
    }
}

fn format_price(state: &VariantState) -> String {
    let units = u128::try_from(state.price).unwrap_or(u128::MAX);
    currencies::USDC.format_trimmed(units)
}

fn size_label(state: &VariantState) -> String {
    parse_token_id(state.token_id)
        .map(|(_, size)| size.as_str().to_string())
        .unwrap_or_else(|_| "-".to_string())
}

fn print_listings(listings: &[VariantListing]) {
    if listings.is_empty() {
        println!("{}", Colors::dim("No variants listed."));
        return;
    }

    let mut table = Table::new(&["Token", "Name", "Size", "Price", "Minted", "Active"]);
    for listing in listings {
        let state = &listing.state;
        let name = listing
            .metadata
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "-".to_string());
        let active = if state.is_sold_out() {
            "sold out".to_string()
        } else if state.active {
            "yes".to_string()
        } else {
            "no".to_string()
        };
        table.row(vec![
            state.token_id.to_string(),
            name,
            size_label(state),
            format_price(state),
            format!("{}/{}", state.minted, state.max_supply),
            active,
        ]);
    }
    table.print();
}

fn print_listing(listing: &VariantListing) {
    let state = &listing.state;
    print_field("Token", state.token_id);
    if let Some(metadata) = &listing.metadata {
        print_field("Name", &metadata.name);
        if !metadata.description.is_empty() {
            print_field("Description", &metadata.description);
        }
    }
    print_field("Size", size_label(state));
    print_field("Price", Colors::amount(&format_price(state)));
    print_field("Minted", format!("{} of {}", state.minted, state.max_supply));
    print_field("Available", state.available());
    print_field("Active", Colors::flag(state.active));
    if let Some(uri) = &listing.uri {
        print_field("URI", Colors::dim(uri));
    }
}
