use crate::client::CompletionClient;
use crate::error::{AdvisorError, Result};
use crate::prompt::build_prompt;
use crate::verdict::{parse_verdict, Verdict};
use market_data::CoinDetails;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Model answer for one coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub coin_id: String,
    pub html: String,
    pub verdict: Verdict,
}

/// Asks the model about coins the user has selected
pub struct Advisor {
    details: Arc<dyn CoinDetails>,
    completions: Arc<dyn CompletionClient>,
}

impl Advisor {
    pub fn new(details: Arc<dyn CoinDetails>, completions: Arc<dyn CompletionClient>) -> Self {
        Self { details, completions }
    }

    /// Recommend buying or avoiding `coin_id`, which must be in `selected`
    pub async fn recommend(&self, coin_id: &str, selected: &[String]) -> Result<Recommendation> {
        if !selected.iter().any(|id| id == coin_id) {
            return Err(AdvisorError::NotSelected { id: coin_id.to_string() });
        }

        let data = self.details.get_ai_coin_data(coin_id).await?;
        let prompt = build_prompt(&data)?;
        let html = self.completions.complete(&prompt).await?;
        let verdict = parse_verdict(&html);

        info!(coin_id, %verdict, "Recommendation ready");
        Ok(Recommendation { coin_id: coin_id.to_string(), html, verdict })
    }
}
