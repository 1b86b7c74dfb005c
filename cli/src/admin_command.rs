//! Admin role lookup

use crate::cli::OutputFormat;
use crate::colors::Colors;
use crate::config_utils::select_chain;
use crate::hyperlink::address_link;
use crate::output::{print_field, render};
use anyhow::Result;
use ethcali_lib::utils::{parse_address, short_address};
use ethcali_lib::{AdminStatus, AdminStatusAggregator, ChainRegistry, Config, RpcReader};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct AdminReport {
    address: String,
    chain_id: u64,
    chain: String,
    #[serde(flatten)]
    status: AdminStatus,
}

pub async fn admin_command(
    config: &Config,
    registry: Arc<ChainRegistry>,
    address: &str,
    chain: Option<&str>,
    output_format: OutputFormat,
) -> Result<()> {
    let address = parse_address(address)?;
    let descriptor = select_chain(&registry, chain)?.clone();

    let reader = Arc::new(RpcReader::new(registry.clone()));
    let aggregator = AdminStatusAggregator::with_cache_config(registry, reader, config.admin_cache);
    let status = aggregator.check(address, descriptor.id).await;

    let report = AdminReport {
        address: address.to_string(),
        chain_id: descriptor.id,
        chain: descriptor.label.clone(),
        status,
    };

    render(output_format, &report, |report| {
        let short = short_address(&address);
        print_field("Address", address_link(&descriptor, &report.address, &short));
        print_field("Chain", Colors::chain(&report.chain));
        print_field("Store admin", Colors::flag(report.status.store_admin()));
        print_field("Faucet admin", Colors::flag(report.status.faucet_admin()));
        print_field("Faucet super", Colors::flag(report.status.faucet_super_admin()));
        print_field("Identity owner", Colors::flag(report.status.identity_owner()));
        print_field("Any admin", Colors::flag(report.status.has_any_admin()));
    })
}
