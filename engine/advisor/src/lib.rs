//! # Advisor
//!
//! Produces a short HTML buy/avoid recommendation for one selected coin. Market
//! data comes from [`market_data::CoinDetails`]; the text comes from a
//! chat-completions model behind [`CompletionClient`].

pub mod advisor;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod verdict;


pub use advisor::{Advisor, Recommendation};
pub use client::{ChatCompletionClient, CompletionClient};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use prompt::{build_prompt, Prompt};
pub use verdict::{parse_verdict, Verdict};
