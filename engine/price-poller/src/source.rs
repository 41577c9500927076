use crate::error::Result;

/// Supplies the ticker symbols to poll, re-read on every tick
///
/// An error is logged and the tick proceeds as if the set were empty.
pub trait SymbolSource: Send + Sync {
    fn symbols(&self) -> Result<Vec<String>>;
}

impl<F> SymbolSource for F
where
    F: Fn() -> Result<Vec<String>> + Send + Sync,
{
    fn symbols(&self) -> Result<Vec<String>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollerError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_source_reads_latest_state() {
        let selected = Arc::new(Mutex::new(vec!["BTC".to_string()]));
        let shared = selected.clone();
        let source = move || -> Result<Vec<String>> { Ok(shared.lock().clone()) };

        assert_eq!(source.symbols().unwrap(), vec!["BTC"]);
        selected.lock().push("ETH".to_string());
        assert_eq!(source.symbols().unwrap(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_closure_source_error() {
        let source = || -> Result<Vec<String>> { Err(PollerError::symbol_source("offline")) };
        assert!(matches!(source.symbols(), Err(PollerError::SymbolSource(_))));
    }
}
