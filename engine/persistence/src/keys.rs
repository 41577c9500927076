//! Centralized storage keys

/// Keys used for persisted values
pub struct StorageKeys;

impl StorageKeys {
    /// Ordered list of selected coin ids
    pub const SELECTED_COIN_IDS: &'static str = "selectedCoinIds";

    /// Prefix for per-coin "more info" cache entries
    pub const MORE_INFO_PREFIX: &'static str = "moreInfo_";

    /// Key of the "more info" cache entry for a coin
    pub fn more_info(coin_id: &str) -> String {
        format!("{}{}", Self::MORE_INFO_PREFIX, coin_id)
    }
}

/// Check that a key can be used as a file stem
pub fn validate_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_info_key() {
        assert_eq!(StorageKeys::more_info("bitcoin"), "moreInfo_bitcoin");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key(StorageKeys::SELECTED_COIN_IDS));
        assert!(validate_key("moreInfo_usd-coin"));
        assert!(!validate_key(""));
        assert!(!validate_key(".."));
        assert!(!validate_key("a/b"));
        assert!(!validate_key("a b"));
    }
}
