//! Address helpers shared by the library and CLI

use crate::error::{EthcaliError, Result};
use alloy::primitives::{Address, U256};

/// Strip 0x prefix from hex string if present
pub fn strip_0x_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a 20-byte hex address, with or without the 0x prefix
pub fn parse_address(input: &str) -> Result<Address> {
    let hex = strip_0x_prefix(input);
    if hex.len() != 40 {
        return Err(EthcaliError::invalid_address(format!(
            "Invalid address '{}': expected 40 hex characters, got {}",
            input.trim(),
            hex.len()
        )));
    }
    format!("0x{hex}")
        .parse::<Address>()
        .map_err(|e| EthcaliError::invalid_address(format!("Invalid address '{}': {e}", input.trim())))
}

/// `0x1234...abcd` form for tables and log lines
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Parse a decimal or `0x`-prefixed hex token id
pub fn parse_u256(input: &str) -> Result<U256> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EthcaliError::InvalidTokenId(input.to_string()));
    }
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(input, 10),
    };
    parsed.map_err(|_| EthcaliError::InvalidTokenId(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_strip_0x_prefix() {
        assert_eq!(strip_0x_prefix("0xabc123"), "abc123");
        assert_eq!(strip_0x_prefix("0Xabc123"), "abc123");
        assert_eq!(strip_0x_prefix("abc123"), "abc123");
        assert_eq!(strip_0x_prefix(" 0xabc123 "), "abc123");
    }

    #[test]
    fn test_parse_address() {
        let expected = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
        assert_eq!(
            parse_address("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913").unwrap(),
            expected
        );
        assert_eq!(
            parse_address("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").unwrap(),
            expected
        );

        for bad in ["", "0x1234", "0xzz3589fCD6eDb6E08f4c7C32D4f71b54bdA02913"] {
            assert!(
                matches!(parse_address(bad), Err(EthcaliError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_short_address() {
        let addr = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
        assert_eq!(short_address(&addr), "0x8335...2913");
    }

    #[test]
    fn test_parse_u256() {
        assert_eq!(parse_u256("422").unwrap(), U256::from(422u64));
        assert_eq!(parse_u256("0x1a6").unwrap(), U256::from(422u64));
        assert!(matches!(parse_u256("abc"), Err(EthcaliError::InvalidTokenId(_))));
        assert!(parse_u256("").is_err());
    }
}
