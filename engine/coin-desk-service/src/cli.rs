//! Command line interface

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::service::ServiceState;
use crate::signals::shutdown_signal;
use market_data::{CoinCard, CoinMoreInfo};
use price_poller::{PollEvent, PollerMetrics, PriceSample};
use selection_manager::{ReplaceOption, SelectionChange, SelectionManager};

/// Coin Desk: pin up to five coins, watch their prices, ask for a recommendation
#[derive(Parser, Debug)]
#[command(name = "coin-desk")]
#[command(about = "Pin up to five coins, watch their live prices and ask for a recommendation")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML); defaults to $COIN_DESK_CONFIG
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the persisted selection and caches
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the coin catalog, marking selected coins
    Coins {
        /// Case-insensitive name or symbol filter
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of rows
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Select a coin
    Select {
        /// Coin id, e.g. "bitcoin"
        id: String,

        /// Coin to swap out when the selection is full
        #[arg(short, long)]
        replace: Option<String>,
    },
    /// Remove a coin from the selection
    Unselect { id: String },
    /// Show the selected coins
    Selected,
    /// Show USD, EUR and ILS prices for a coin
    Info { id: String },
    /// Stream live prices of the selected coins until Ctrl+C
    Report {
        /// Stop after this many ticks
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        ticks: Option<u64>,
    },
    /// Ask for a buy/avoid recommendation on a selected coin
    Recommend { id: String },
    /// Print the effective configuration
    Config,
}

fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{price:.2}")
    } else {
        format!("{price:.6}")
    }
}

/// Catalog rows with a selection mark
pub fn render_catalog(cards: &[&CoinCard], selection: &[String]) -> String {
    let mut out = String::new();
    for card in cards {
        let mark = if selection.contains(&card.id) { "[x]" } else { "[ ]" };
        let price = card.current_price.map(format_price).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{mark} {:<8} {:<24} {:>14}  {}", card.ticker(), card.name, price, card.id);
    }
    out
}

/// Selected ids with their symbol and name when the catalog knows them
pub fn render_selection(manager: &SelectionManager) -> String {
    if manager.is_empty() {
        return "No coins selected.\n".to_string();
    }

    let mut out = format!("Selected coins ({}/{}):\n", manager.len(), manager.config().max_size);
    for (position, id) in manager.selection().iter().enumerate() {
        match manager.catalog().get(id) {
            Some(card) => {
                let _ = writeln!(out, "{}. {:<8} {} ({})", position + 1, card.ticker(), card.name, id);
            }
            None => {
                let _ = writeln!(out, "{}. {}", position + 1, id);
            }
        }
    }
    out
}

/// Overflow decision text shown when no victim was given
pub fn render_replace_prompt(pending_symbol: &str, options: &[ReplaceOption], max_size: usize) -> String {
    let mut out = format!(
        "You can select up to {max_size} coins. Choose a coin to replace with {pending_symbol}:\n"
    );
    for option in options {
        let _ = writeln!(out, "  --replace {:<20} {}", option.id, option.symbol.to_uppercase());
    }
    out
}

pub fn render_more_info(coin_id: &str, info: &CoinMoreInfo) -> String {
    format!(
        "{coin_id}\n  USD: ${}\n  EUR: \u{20ac}{}\n  ILS: \u{20aa}{}\n",
        format_price(info.usd),
        format_price(info.eur),
        format_price(info.ils)
    )
}

pub fn render_report_header(symbols: &[String]) -> String {
    let mut out = format!("{:<10}", "TIME");
    for symbol in symbols {
        let _ = write!(out, " {:>14}", symbol);
    }
    out
}

/// One report row; symbols without a price show `-`
pub fn render_sample_row(sample: &PriceSample, symbols: &[String]) -> String {
    let mut out = format!("{:<10}", sample.time);
    for symbol in symbols {
        let price = sample.price(symbol).map(format_price).unwrap_or_else(|| "-".to_string());
        let _ = write!(out, " {:>14}", price);
    }
    out
}

pub fn render_report_summary(metrics: &PollerMetrics) -> String {
    format!(
        "{} ticks, {} samples, {} failed fetches, {} skipped deadlines",
        metrics.ticks_started, metrics.samples_appended, metrics.fetch_failures, metrics.ticks_skipped
    )
}

/// Ticker symbols to stream for the current selection
///
/// An empty selection yields no symbols. Selected coins that cannot be mapped to
/// tickers are an error, since the report would otherwise look like an empty selection.
pub fn report_symbols(manager: &SelectionManager) -> Result<Vec<String>> {
    let symbols = manager.symbols();
    if symbols.is_empty() && !manager.is_empty() {
        if manager.catalog().is_empty() {
            return Err(anyhow!("Coin catalog unavailable, cannot look up tickers for the selected coins"));
        }
        return Err(anyhow!("None of the selected coins are listed in the coin catalog"));
    }
    Ok(symbols)
}

/// Run the select flow, returning the lines to show
///
/// On overflow the pending addition is confirmed against `replace` when given,
/// otherwise the replace options are listed and the addition is cancelled.
pub fn select_coin(manager: &mut SelectionManager, id: &str, replace: Option<&str>) -> Result<Vec<String>> {
    let change = manager.request_add(id)?;
    let mut lines = Vec::new();

    match change {
        SelectionChange::Applied(event) => {
            lines.extend(event.notices().into_iter().map(String::from));
        }
        SelectionChange::Unchanged => lines.push(format!("{id} is already selected")),
        SelectionChange::AwaitingReplacement { options, .. } => {
            let pending_symbol = manager.pending_symbol().unwrap_or_else(|| id.to_uppercase());
            match replace {
                Some(victim) => match manager.confirm_replacement(victim) {
                    Ok(event) => lines.extend(event.notices().into_iter().map(String::from)),
                    Err(e) => {
                        manager.cancel_replacement()?;
                        return Err(e).with_context(|| format!("Cannot replace {victim} with {id}"));
                    }
                },
                None => {
                    manager.cancel_replacement()?;
                    lines.push(render_replace_prompt(&pending_symbol, &options, manager.config().max_size));
                }
            }
        }
    }

    Ok(lines)
}

/// Executes parsed commands against the service state
pub struct CommandHandler {
    state: ServiceState,
}

impl CommandHandler {
    pub fn new(state: ServiceState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Coins { search, limit } => self.show_coins(search.as_deref(), limit).await,
            Commands::Select { id, replace } => self.select(&id, replace.as_deref()).await,
            Commands::Unselect { id } => self.unselect(&id),
            Commands::Selected => self.show_selected().await,
            Commands::Info { id } => self.show_info(&id).await,
            Commands::Report { ticks } => self.report(ticks).await,
            Commands::Recommend { id } => self.recommend(&id).await,
            Commands::Config => self.show_config(),
        }
    }

    async fn show_coins(&self, search: Option<&str>, limit: usize) -> Result<()> {
        let index = self.state.refresh_catalog().await?;
        let cards: Vec<&CoinCard> = index.search(search.unwrap_or_default()).into_iter().take(limit).collect();

        if cards.is_empty() {
            println!("No coins match.");
            return Ok(());
        }

        let selection = self.state.selection.read().selection().to_vec();
        print!("{}", render_catalog(&cards, &selection));
        Ok(())
    }

    async fn select(&self, id: &str, replace: Option<&str>) -> Result<()> {
        self.state.refresh_catalog_or_warn().await;
        let lines = select_coin(&mut self.state.selection.write(), id, replace)?;
        for line in lines {
            println!("{}", line.trim_end());
        }
        Ok(())
    }

    fn unselect(&self, id: &str) -> Result<()> {
        match self.state.selection.write().remove(id)? {
            SelectionChange::Applied(event) => {
                for notice in event.notices() {
                    println!("{notice}");
                }
            }
            _ => println!("{id} is not selected"),
        }
        Ok(())
    }

    async fn show_selected(&self) -> Result<()> {
        self.state.refresh_catalog_or_warn().await;
        print!("{}", render_selection(&self.state.selection.read()));
        Ok(())
    }

    async fn show_info(&self, id: &str) -> Result<()> {
        match self.state.more_info.get_more_info(id).await {
            Some(info) => print!("{}", render_more_info(id, &info)),
            None => println!("More info for {id} is not available right now."),
        }
        Ok(())
    }

    async fn report(&self, ticks: Option<u64>) -> Result<()> {
        self.state.refresh_catalog_or_warn().await;
        let symbols = report_symbols(&self.state.selection.read())?;
        if symbols.is_empty() {
            println!("No coins selected. Use `coin-desk select <id>` first.");
            return Ok(());
        }

        let (handle, mut events) = self.state.start_poller()?;
        let mut shutdown = shutdown_signal();

        println!("{}", render_report_header(&symbols));
        let mut outcomes = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = events.recv() => match event {
                    Ok(PollEvent::Sample { sample, .. }) => {
                        println!("{}", render_sample_row(&sample, &symbols));
                        outcomes += 1;
                    }
                    Ok(PollEvent::FetchFailed { error, .. }) => {
                        eprintln!("Reports API error: {error}");
                        outcomes += 1;
                    }
                    Ok(PollEvent::Cleared { .. }) => println!("No coins selected, chart cleared."),
                    Err(RecvError::Lagged(missed)) => warn!(missed, "Report output fell behind"),
                    Err(RecvError::Closed) => break,
                },
            }

            if ticks.is_some_and(|max| outcomes >= max) {
                break;
            }
        }

        handle.stop();
        println!("{}", render_report_summary(&handle.metrics()));
        Ok(())
    }

    async fn recommend(&self, id: &str) -> Result<()> {
        let selection = self.state.selection.read().selection().to_vec();
        let advisor = self.state.advisor()?;
        let recommendation = advisor
            .recommend(id, &selection)
            .await
            .with_context(|| format!("Failed to get a recommendation for {id}"))?;

        println!("Recommendation for {}: {}", recommendation.coin_id, recommendation.verdict);
        println!();
        println!("{}", recommendation.html);
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let rendered = toml::to_string_pretty(&self.state.config).context("Failed to render configuration")?;
        print!("{rendered}");
        Ok(())
    }
}
