use serde::{Deserialize, Serialize};

/// The user's in-progress input on the backtest page.
///
/// Numeric fields are kept as the raw text the user typed; they are only
/// interpreted when a request is built at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Strategy identifier, passed through to the backend untouched
    pub method: String,

    /// Backtest horizon as typed (e.g. "5")
    pub years: String,

    /// Initial investment as typed (e.g. "1000.50")
    pub initial_investment: String,

    /// Tickers added so far, in insertion order. Duplicates are allowed.
    pub tickers: Vec<String>,

    /// Ticker currently being typed, not yet added
    pub ticker_input: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            method: String::new(),
            years: String::new(),
            // The investment field starts out showing zero.
            initial_investment: "0".to_string(),
            tickers: Vec::new(),
            ticker_input: String::new(),
        }
    }
}

/// Phase of the ticker input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickerInputState {
    Empty,
    Composing,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ticker_input_state(&self) -> TickerInputState {
        if self.ticker_input.is_empty() {
            TickerInputState::Empty
        } else {
            TickerInputState::Composing
        }
    }

    /// Append the trimmed ticker input to the list and clear the input.
    ///
    /// Whitespace-only input is rejected before anything is touched, so the
    /// raw input text stays as it was. Returns the ticker that was added.
    pub fn add_ticker(&mut self) -> Option<&str> {
        let trimmed = self.ticker_input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let ticker = trimmed.to_string();
        self.tickers.push(ticker);
        self.ticker_input.clear();
        self.tickers.last().map(String::as_str)
    }

    /// Remove the ticker at `index`. Out-of-range indices are ignored.
    pub fn remove_ticker(&mut self, index: usize) -> Option<String> {
        if index < self.tickers.len() {
            Some(self.tickers.remove(index))
        } else {
            None
        }
    }
}
