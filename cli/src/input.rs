//! Parsing of interactive commands.

use fxquote_common::Currency;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SellAmount(String),
    BuyAmount(String),
    SellCurrency(Currency),
    BuyCurrency(Currency),
    Retry,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  sell <amount>     set the amount you sell (sell becomes fixed)
  buy <amount>      set the amount you buy (buy becomes fixed)
  sell-ccy <code>   pick the currency you sell
  buy-ccy <code>    pick the currency you buy
  retry             request a new quote after a failure
  show              print the current quote
  help              print this message
  quit              leave";

impl Input {
    /// Parse a line. Blank lines are `Show`.
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Input::Show);
        };
        let argument = words.next();

        if words.next().is_some() {
            anyhow::bail!("Too many arguments for '{}'", command);
        }

        let input = match (command.to_ascii_lowercase().as_str(), argument) {
            // An amount may be cleared by giving no argument
            ("sell", amount) => Input::SellAmount(amount.unwrap_or_default().to_string()),
            ("buy", amount) => Input::BuyAmount(amount.unwrap_or_default().to_string()),
            ("sell-ccy", Some(code)) => Input::SellCurrency(currency(code)?),
            ("buy-ccy", Some(code)) => Input::BuyCurrency(currency(code)?),
            ("sell-ccy" | "buy-ccy", None) => anyhow::bail!("'{}' needs a currency code", command),
            ("retry", None) => Input::Retry,
            ("show", None) => Input::Show,
            ("help" | "?", None) => Input::Help,
            ("quit" | "exit" | "q", None) => Input::Quit,
            _ => anyhow::bail!("Unknown command: {}", line.trim()),
        };

        Ok(input)
    }
}

fn currency(code: &str) -> anyhow::Result<Currency> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!("'{}' is not a three letter currency code", code);
    }
    Ok(Currency::new(code))
}
