//! Explorer links for vote hashes that were anchored on chain.
//!
//! Submission happens elsewhere; this only turns a stored transaction
//! reference into a URL a reader can open.

use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_EXPLORER_URL: &str = "https://testnet.snowtrace.io";

lazy_static! {
    static ref TX_HASH: Regex = Regex::new(r"^0x[0-9a-fA-F]{64}$").unwrap();
}

pub fn is_tx_hash(candidate: &str) -> bool {
    TX_HASH.is_match(candidate)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    base_url: String,
}

impl Explorer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Link to a transaction, or `None` if the stored reference is not a tx hash.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        let tx_hash = tx_hash.trim();
        if !is_tx_hash(tx_hash) {
            return None;
        }
        Some(format!("{}/tx/{}", self.base_url, tx_hash))
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLORER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x8f2a0c6d5e4b3a29181716151413121110090807060504030201000f0e0d0c0b";

    #[test]
    fn builds_tx_url_for_valid_hash() {
        let explorer = Explorer::new("https://snowtrace.io/");
        assert_eq!(
            explorer.tx_url(HASH).as_deref(),
            Some(format!("https://snowtrace.io/tx/{}", HASH).as_str())
        );
    }

    #[test]
    fn rejects_malformed_references() {
        let explorer = Explorer::default();
        assert_eq!(explorer.tx_url(""), None);
        assert_eq!(explorer.tx_url("0x1234"), None);
        assert_eq!(explorer.tx_url(&HASH[2..]), None);
        assert_eq!(explorer.tx_url("https://example.com/tx/abc"), None);
    }
}
