//! Product variants: token-id scheme, sizes, and ERC-1155 metadata.
//!
//! A variant's token id is `base_id * 10 + size_offset`, so every product
//! occupies one decade of the id space with one slot per size.

use crate::error::{EthcaliError, Result};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Apparel sizes. `NA` marks one-size products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeOption {
    S,
    M,
    L,
    XL,
    NA,
}

impl SizeOption {
    pub const ALL: [SizeOption; 5] = [
        SizeOption::S,
        SizeOption::M,
        SizeOption::L,
        SizeOption::XL,
        SizeOption::NA,
    ];

    /// Last decimal digit of the token id
    pub const fn offset(&self) -> u64 {
        match self {
            SizeOption::S => 1,
            SizeOption::M => 2,
            SizeOption::L => 3,
            SizeOption::XL => 4,
            SizeOption::NA => 5,
        }
    }

    /// Size for a token id digit. Unknown digits map to `NA`.
    pub const fn from_offset(offset: u64) -> Self {
        match offset {
            1 => SizeOption::S,
            2 => SizeOption::M,
            3 => SizeOption::L,
            4 => SizeOption::XL,
            _ => SizeOption::NA,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SizeOption::S => "S",
            SizeOption::M => "M",
            SizeOption::L => "L",
            SizeOption::XL => "XL",
            SizeOption::NA => "NA",
        }
    }

    /// Label used in metadata names and attributes
    pub const fn label(&self) -> &'static str {
        match self {
            SizeOption::NA => "One Size",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SizeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SizeOption {
    type Err = EthcaliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(SizeOption::S),
            "M" => Ok(SizeOption::M),
            "L" => Ok(SizeOption::L),
            "XL" => Ok(SizeOption::XL),
            "NA" | "ONE SIZE" => Ok(SizeOption::NA),
            _ => Err(EthcaliError::InvalidProduct(format!(
                "Unknown size '{s}'. Expected one of S, M, L, XL, NA."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unisex,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unisex => "Unisex",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductTraits {
    pub gender: Gender,
    pub color: String,
    pub style: String,
}

/// Input for creating a product with one variant per size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub image_uri: String,
    /// Unit price in display units (e.g. 25.5 USDC)
    pub price: f64,
    /// Supply split evenly across sizes
    pub total_supply: u64,
    pub traits: ProductTraits,
    pub sizes: Vec<SizeOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

/// ERC-1155 token metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<MetadataAttribute>,
}

impl ProductMetadata {
    pub fn attribute(&self, trait_type: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| a.value.as_str())
    }
}

/// Token id for a product's size variant.
///
/// # Examples
///
/// ```
/// use alloy::primitives::U256;
/// use ethcali_lib::product::{generate_token_id, parse_token_id, SizeOption};
///
/// let id = generate_token_id(42, SizeOption::M);
/// assert_eq!(id, U256::from(422u64));
/// assert_eq!(parse_token_id(id).unwrap(), (42, SizeOption::M));
/// ```
pub fn generate_token_id(base_id: u64, size: SizeOption) -> U256 {
    U256::from(base_id) * U256::from(10u64) + U256::from(size.offset())
}

/// Split a token id into `(base_id, size)`.
///
/// Fails only when the base id does not fit in a `u64`.
pub fn parse_token_id(token_id: U256) -> Result<(u64, SizeOption)> {
    let ten = U256::from(10u64);
    let base = token_id / ten;
    let offset = (token_id % ten).to::<u64>();
    let base_id = u64::try_from(base).map_err(|_| EthcaliError::InvalidTokenId(token_id.to_string()))?;
    Ok((base_id, SizeOption::from_offset(offset)))
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

/// Metadata document for one size variant of `product`
pub fn generate_metadata(product: &ProductDraft, size: SizeOption) -> ProductMetadata {
    let size_label = size.label();
    let attribute = |trait_type: &str, value: String| MetadataAttribute {
        trait_type: trait_type.to_string(),
        value,
    };

    ProductMetadata {
        name: format!(
            "{} - {} - {}",
            product.name, product.traits.color, size_label
        ),
        description: product.description.clone(),
        image: product.image_uri.clone(),
        attributes: vec![
            attribute("Product", product.name.clone()),
            attribute("Color", or_na(&product.traits.color)),
            attribute("Gender", product.traits.gender.to_string()),
            attribute("Style", or_na(&product.traits.style)),
            attribute("Size", size_label.to_string()),
        ],
    }
}

/// Supply of each size variant; zero when there are no sizes
pub fn supply_per_size(total_supply: u64, size_count: usize) -> u64 {
    if size_count == 0 {
        return 0;
    }
    total_supply / size_count as u64
}

/// Base id derived from the wall clock, unique per millisecond within a
/// million-id window
pub fn fresh_base_id() -> u64 {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    (millis % 1_000_000) as u64
}
