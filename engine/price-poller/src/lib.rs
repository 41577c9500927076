//! # Price Poller
//!
//! Recurring sampler that drives the live price chart.
//!
//! On every tick the poller asks its [`SymbolSource`] for the current ticker
//! symbols, fetches their USD prices through a [`market_data::PriceFetch`] and
//! appends one [`PriceSample`] to a bounded [`TimeSeriesBuffer`]. The first tick
//! runs immediately. An empty symbol set clears the buffer without fetching, and a
//! failed fetch only costs that tick its sample.
//!
//! ```no_run
//! use std::sync::Arc;
//! use market_data::{CryptoComparePrices, MarketDataConfig};
//! use price_poller::{PollerConfig, PricePoller};
//!
//! # async fn run() -> price_poller::Result<()> {
//! let prices = CryptoComparePrices::new(MarketDataConfig::default())?;
//! let source = || -> price_poller::Result<Vec<String>> { Ok(vec!["BTC".into(), "ETH".into()]) };
//!
//! let handle = PricePoller::start(Arc::new(source), Arc::new(prices), PollerConfig::default())?;
//! tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//! println!("{:?}", handle.latest());
//! handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod sample;
pub mod source;


pub use buffer::TimeSeriesBuffer;
pub use config::{OverlapPolicy, PollerConfig};
pub use error::{PollerError, Result};
pub use metrics::{MetricsCollector, PollerMetrics};
pub use poller::{PollEvent, PollerHandle, PollerStatus, PricePoller};
pub use sample::PriceSample;
pub use source::SymbolSource;

/// Default polling interval
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default number of samples kept for the chart
pub const DEFAULT_BUFFER_CAPACITY: usize = 60;

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 128;
