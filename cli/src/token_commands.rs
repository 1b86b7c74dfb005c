//! Offline helpers: token id encoding and price conversion.

use crate::cli::{OutputFormat, PriceCommands, TokenIdCommands};
use crate::output::{print_field, render};
use anyhow::Result;
use ethcali_lib::currency::{base_units_to_price, currencies, price_to_base_units};
use ethcali_lib::product::{generate_token_id, parse_token_id};
use ethcali_lib::utils::parse_u256;
use ethcali_lib::SizeOption;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TokenIdInfo {
    token_id: String,
    base_id: u64,
    size: SizeOption,
    size_label: &'static str,
}

impl TokenIdInfo {
    fn new(base_id: u64, size: SizeOption) -> Self {
        Self {
            token_id: generate_token_id(base_id, size).to_string(),
            base_id,
            size,
            size_label: size.label(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PriceInfo {
    price: f64,
    base_units: String,
    formatted: String,
}

impl PriceInfo {
    fn new(price: f64, base_units: u128) -> Self {
        Self {
            price,
            base_units: base_units.to_string(),
            formatted: currencies::USDC.format_trimmed(base_units),
        }
    }
}

pub fn token_id_command(command: &TokenIdCommands, output_format: OutputFormat) -> Result<()> {
    let info = match command {
        TokenIdCommands::Generate { base_id, size } => TokenIdInfo::new(*base_id, *size),
        TokenIdCommands::Parse { token_id } => {
            let (base_id, size) = parse_token_id(parse_u256(token_id)?)?;
            TokenIdInfo::new(base_id, size)
        }
    };

    render(output_format, &info, |info| {
        print_field("Token ID", &info.token_id);
        print_field("Base ID", info.base_id);
        print_field("Size", info.size_label);
    })
}

pub fn price_command(command: &PriceCommands, output_format: OutputFormat) -> Result<()> {
    let info = match command {
        PriceCommands::ToUnits { price } => PriceInfo::new(*price, price_to_base_units(*price)?),
        PriceCommands::FromUnits { units } => PriceInfo::new(base_units_to_price(*units), *units),
    };

    render(output_format, &info, |info| {
        print_field("Price", &info.formatted);
        print_field("Base units", &info.base_units);
    })
}
