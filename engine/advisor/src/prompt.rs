//! Recommendation prompt construction

use crate::error::Result;
use market_data::AiCoinData;
use serde::Serialize;

/// Tags the model may use in its answer
pub const ALLOWED_TAGS: &[&str] =
    &["h2", "h3", "p", "ul", "li", "table", "tr", "th", "td", "strong", "em", "br"];

/// A system and user message pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn system_message() -> String {
    format!(
        "You are a crypto recommendation assistant. Return HTML only (no Markdown). \
         Use only these tags: {}. \
         Do not write code blocks or backticks.",
        ALLOWED_TAGS.join(",")
    )
}

const USER_INSTRUCTIONS: &str = "The user requested a recommendation about buying the coin. \
Base your answer ONLY on the provided data.\n\n\
Return HTML that contains exactly:\n\
1) <h2> coin name\n\
2) <p><strong>Recommendation:</strong> exactly one word: Buy / Avoid</p>\n\
3) <p>One explanation paragraph based on price/market cap/volume and 30/60/200 day changes</p>\n\
4) <table> with columns: Pros | Cons | Risk Level</table>\n\
5) <p><strong>Note:</strong> Not financial advice</p>\n\n\
Coin data (JSON):\n";

/// Build the prompt for one coin, embedding its data as indented JSON
pub fn build_prompt(data: &AiCoinData) -> Result<Prompt> {
    let payload = serde_json::to_string_pretty(data)?;
    Ok(Prompt { system: system_message(), user: format!("{USER_INSTRUCTIONS}{payload}") })
}
