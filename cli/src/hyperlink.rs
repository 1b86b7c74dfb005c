//! Terminal hyperlink utilities using OSC 8 escape sequences.
//!
//! Modern terminals support clickable hyperlinks via the OSC 8 standard.
//! Terminals that don't support it will simply show the visible text.

use ethcali_lib::ChainDescriptor;

/// Format a clickable hyperlink for terminals that support OSC 8.
///
/// The format is: `\x1B]8;;URL\x07TEXT\x1B]8;;\x07`
/// Using BEL (\x07) as terminator for broader terminal compatibility.
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1B]8;;{}\x07{}\x1B]8;;\x07", url, text)
}

/// Link a transaction hash to the chain's explorer.
///
/// Returns plain text when the chain has no explorer configured.
pub fn tx_link(chain: &ChainDescriptor, tx_hash: &str) -> String {
    if chain.explorer_url.is_empty() {
        return tx_hash.to_string();
    }
    hyperlink(&chain.tx_url(tx_hash), tx_hash)
}

/// Link an address to the chain's explorer, showing `text`.
pub fn address_link(chain: &ChainDescriptor, address: &str, text: &str) -> String {
    if chain.explorer_url.is_empty() {
        return text.to_string();
    }
    hyperlink(&chain.address_url(address), text)
}
