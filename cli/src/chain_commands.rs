//! Chain command handlers for listing, inspecting and resolving chains.

use crate::cli::OutputFormat;
use crate::colors::Colors;
use crate::config_utils::select_chain;
use crate::output::{print_field, render};
use crate::table::Table;
use anyhow::Result;
use ethcali_lib::{ChainDescriptor, ChainRegistry, ChainResolver, ContractKind, WalletChainTag};
use serde::Serialize;

/// Display data for a chain in list output
#[derive(Debug, Serialize)]
struct ChainListItem {
    label: String,
    name: String,
    chain_id: u64,
    default: bool,
    contracts: Vec<&'static str>,
}

impl ChainListItem {
    fn new(chain: &ChainDescriptor, default_chain_id: u64) -> Self {
        ChainListItem {
            label: chain.label.clone(),
            name: chain.name.clone(),
            chain_id: chain.id,
            default: chain.id == default_chain_id,
            contracts: ContractKind::all()
                .into_iter()
                .filter(|kind| chain.contract(*kind).is_some())
                .map(|kind| kind.as_str())
                .collect(),
        }
    }
}

/// Result of resolving a wallet chain tag
#[derive(Debug, Serialize)]
struct Resolution {
    tag: String,
    parsed: Option<u64>,
    chain_id: u64,
    label: String,
    supported: bool,
}

/// List all supported chains
pub fn list_chains(registry: &ChainRegistry, output_format: OutputFormat) -> Result<()> {
    let default_id = registry.default_chain_id();
    let chains: Vec<ChainListItem> = registry
        .all_descriptors()
        .iter()
        .map(|chain| ChainListItem::new(chain, default_id))
        .collect();

    render(output_format, &chains, |chains| {
        let mut table = Table::new(&["Label", "Name", "Chain ID", "Contracts", ""]);
        for chain in chains {
            let contracts = if chain.contracts.is_empty() {
                "-".to_string()
            } else {
                chain.contracts.join(", ")
            };
            table.row(vec![
                chain.label.clone(),
                chain.name.clone(),
                chain.chain_id.to_string(),
                contracts,
                if chain.default { "(default)".to_string() } else { String::new() },
            ]);
        }
        table.print();
    })
}

/// Show detailed information about a specific chain
pub fn show_chain_info(
    registry: &ChainRegistry,
    chain_name: &str,
    output_format: OutputFormat,
) -> Result<()> {
    let chain = select_chain(registry, Some(chain_name))?;

    render(output_format, chain, |chain| {
        print_field("Label", Colors::chain(&chain.label));
        print_field("Name", &chain.name);
        print_field("Chain ID", format!("{} ({})", chain.id, chain.hex_chain_id()));
        print_field("RPC", &chain.rpc_url);
        if !chain.explorer_url.is_empty() {
            print_field("Explorer", Colors::info(&chain.explorer_url));
        }
        print_field("Default", Colors::flag(chain.id == registry.default_chain_id()));
        print_field("Preregister", Colors::flag(chain.preregister));

        for kind in ContractKind::all() {
            let value = match chain.contract(kind) {
                Some(addr) => Colors::address(&addr.to_string()).to_string(),
                None => Colors::dim("not deployed").to_string(),
            };
            print_field(&title_case(kind.as_str()), value);
        }
        for (coin, addr) in &chain.stablecoins {
            print_field(coin.symbol(), Colors::address(&addr.to_string()));
        }
    })
}

/// Resolve a wallet chain tag the way the dashboard does, falling back to
/// the default chain
pub fn resolve_tag(registry: &ChainRegistry, tag: &str, output_format: OutputFormat) -> Result<()> {
    let tag: WalletChainTag = match tag.parse() {
        Ok(tag) => tag,
        Err(never) => match never {},
    };
    let resolver = ChainResolver::new(registry.default_chain_id());
    let chain_id = resolver.resolve(Some(&tag));
    let descriptor = registry.descriptor_for(chain_id);

    let resolution = Resolution {
        tag: tag.to_string(),
        parsed: tag.chain_id(),
        chain_id: descriptor.id,
        label: descriptor.label.clone(),
        supported: registry.is_supported(chain_id),
    };

    render(output_format, &resolution, |r| {
        print_field("Tag", &r.tag);
        print_field(
            "Parsed",
            r.parsed
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        print_field("Chain", format!("{} ({})", Colors::chain(&r.label), r.chain_id));
        print_field("Supported", Colors::flag(r.supported));
    })
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_chains_formats() {
        let registry = ChainRegistry::builtin();
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
            assert!(list_chains(&registry, format).is_ok());
        }
    }

    #[test]
    fn test_show_chain_info_unknown() {
        let registry = ChainRegistry::builtin();
        let result = show_chain_info(&registry, "unknown-chain", OutputFormat::Text);
        assert!(result.unwrap_err().to_string().contains("Unknown chain"));
    }

    #[test]
    fn test_chain_list_item() {
        let registry = ChainRegistry::builtin();
        let item = ChainListItem::new(registry.descriptor_for(8453), 8453);
        assert_eq!(item.label, "base");
        assert_eq!(item.chain_id, 8453);
        assert!(item.default);
        assert!(item.contracts.is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("faucet manager"), "Faucet Manager");
        assert_eq!(title_case("store"), "Store");
    }
}
