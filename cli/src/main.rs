//! FxQuote terminal client
//!
//! Drives one quote session against a running pricing server. Edits are
//! typed at the prompt; the quote panel is reprinted whenever it changes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fxquote_client::{spawn_session, ClientConfig, HttpQuoteTransport, SessionConfig};
use fxquote_common::{Currency, FixedSide};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod input;
mod render;

use input::{Input, HELP};
use render::render;

/// FxQuote terminal client
#[derive(Parser, Debug)]
#[command(name = "fxquote")]
#[command(about = "Interactive FX quote session against an FxQuote server")]
struct Args {
    /// Pricing server base URL (defaults to FXQUOTE_SERVER_URL or localhost)
    #[arg(long)]
    server_url: Option<String>,

    /// Currency to sell
    #[arg(long, default_value = "AUD")]
    sell: String,

    /// Currency to buy
    #[arg(long, default_value = "USD")]
    buy: String,

    /// Opening amount on the fixed leg
    #[arg(long, default_value = "1000")]
    amount: String,

    /// Which leg the opening amount belongs to (sell or buy)
    #[arg(long, default_value = "sell")]
    fixed: FixedSide,

    /// Seconds a quote stays valid
    #[arg(long, default_value = "30")]
    validity_secs: u64,

    /// Minimum seconds between pricing calls
    #[arg(long, default_value = "5")]
    spacing_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the panel
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut client_config = ClientConfig::from_env();
    if let Some(url) = args.server_url {
        client_config.server_url = url;
    }
    client_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid client configuration")?;

    let session_config = SessionConfig {
        quote_validity: Duration::from_secs(args.validity_secs),
        requote_spacing: Duration::from_secs(args.spacing_secs),
        initial_sell: Currency::new(args.sell),
        initial_buy: Currency::new(args.buy),
        initial_amount: args.amount,
        initial_fixed: args.fixed,
    };
    session_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid session configuration")?;

    info!(server = %client_config.server_url, "Starting FxQuote session");

    let transport = Arc::new(HttpQuoteTransport::new(client_config)?);
    let (handle, task) = spawn_session(session_config, transport);
    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", HELP);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}\n", render(&snapshot, Instant::now()));
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };

                let input = match Input::parse(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                match input {
                    Input::SellAmount(amount) => handle.edit_sell_amount(amount)?,
                    Input::BuyAmount(amount) => handle.edit_buy_amount(amount)?,
                    Input::SellCurrency(currency) => handle.edit_sell_currency(currency)?,
                    Input::BuyCurrency(currency) => handle.edit_buy_currency(currency)?,
                    Input::Retry => handle.retry()?,
                    Input::Show => println!("{}\n", render(&handle.snapshot(), Instant::now())),
                    Input::Help => println!("{}\n", HELP),
                    Input::Quit => break,
                }
            }
        }
    }

    handle.shutdown().ok();
    task.await.context("Session task failed")?;

    Ok(())
}
