use chrono::{DateTime, Local};
use market_data::PriceMap;
use serde::Serialize;

/// Label format of a sample: local wall-clock time, 24-hour
pub const TIME_LABEL_FORMAT: &str = "%H:%M:%S";

/// One chart row: a time label and the USD price of each symbol that had one
///
/// Serializes flat, e.g. `{"time":"14:03:07","BTC":64000.5,"ETH":3100.2}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSample {
    pub time: String,

    #[serde(skip)]
    pub captured_at: DateTime<Local>,

    #[serde(flatten)]
    pub prices: PriceMap,
}

impl PriceSample {
    pub fn new(captured_at: DateTime<Local>, prices: PriceMap) -> Self {
        Self {
            time: captured_at.format(TIME_LABEL_FORMAT).to_string(),
            captured_at,
            prices,
        }
    }

    /// Build a sample from a fetch result, keeping only the requested symbols
    ///
    /// Symbols missing from `fetched` or priced with a non-finite number are left out.
    pub fn from_fetch(symbols: &[String], fetched: &PriceMap, captured_at: DateTime<Local>) -> Self {
        let prices = symbols
            .iter()
            .filter_map(|symbol| {
                fetched
                    .get(symbol)
                    .filter(|price| price.is_finite())
                    .map(|price| (symbol.clone(), *price))
            })
            .collect();
        Self::new(captured_at, prices)
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }
}
