use std::{io::Write, time::Duration};

use api_types::transaction::PostingNew;
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use engine::{LedgerView, Money};
use tracing_subscriber::EnvFilter;

use crate::{
    client::Client,
    config::{AppConfig, Overrides},
    error::{AppError, Result},
    load_guard::LoadGuard,
};

mod client;
mod config;
mod error;
mod load_guard;
mod render;
mod statement;

#[derive(Debug, Parser)]
#[command(name = "collecta_cli", about = "Terminal client for Collecta")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,
    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Customers visible to you, with their balances.
    Customers,
    /// Full statement of a customer.
    Statement {
        id: i64,
        /// Reload every N seconds until interrupted.
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Debit history of a customer.
    Debits { id: i64 },
    /// Collection history of a customer.
    Collections { id: i64 },
    /// Record a collection (amount in rupees, e.g. 150.50).
    Collect {
        id: i64,
        amount: Money,
        #[arg(long)]
        note: Option<String>,
    },
    /// Record a debit (administrators only).
    Debit {
        id: i64,
        amount: Money,
        #[arg(long)]
        note: Option<String>,
    },
    /// Collections per agent for a day (default: today, UTC).
    Summary {
        #[arg(long)]
        day: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collecta_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load(cli.overrides)?;
    let tz = settings.tz()?;
    let client = connect(&settings)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Customers => {
            let list = client.customers().await?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&list)?)?;
            } else {
                render::customers(&mut out, &list)?;
            }
        }
        Command::Statement { id, watch: None } => {
            show(&client, &mut out, id, LedgerView::Statement, tz, cli.json).await?;
        }
        Command::Statement {
            id,
            watch: Some(secs),
        } => {
            drop(out);
            watch(client, id, tz, Duration::from_secs(secs.max(1)), cli.json).await?;
        }
        Command::Debits { id } => {
            show(&client, &mut out, id, LedgerView::Debits, tz, cli.json).await?;
        }
        Command::Collections { id } => {
            show(&client, &mut out, id, LedgerView::Collections, tz, cli.json).await?;
        }
        Command::Collect { id, amount, note } => {
            let tx = client.collect(&posting(id, amount, note)?).await?;
            render::posted(&mut out, &tx, tz)?;
        }
        Command::Debit { id, amount, note } => {
            let tx = client.debit(&posting(id, amount, note)?).await?;
            render::posted(&mut out, &tx, tz)?;
        }
        Command::Summary { day } => {
            let summary = client.daily_summary(day).await?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            } else {
                render::summary(&mut out, &summary)?;
            }
        }
    }

    Ok(())
}

fn connect(settings: &AppConfig) -> Result<Client> {
    let password = config::password()?;
    Client::new(&settings.base_url, &settings.username, &password)
}

fn posting(customer_id: i64, amount: Money, note: Option<String>) -> Result<PostingNew> {
    if !amount.is_positive() {
        return Err(AppError::Input("amount must be > 0".to_string()));
    }
    Ok(PostingNew {
        customer_id,
        amount_minor: amount.minor(),
        note,
        created_at: None,
    })
}

async fn show(
    client: &Client,
    out: &mut impl Write,
    id: i64,
    view: LedgerView,
    tz: Tz,
    json: bool,
) -> Result<()> {
    let loaded = statement::load(client, id, view).await?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&loaded)?)?;
    } else {
        render::statement(out, &loaded, view, tz)?;
    }
    Ok(())
}

/// Reloads a statement on a fixed interval. Reloads may overlap; one that
/// finishes after a newer reload was already shown is dropped.
async fn watch(client: Client, id: i64, tz: Tz, every: Duration, json: bool) -> Result<()> {
    let guard = LoadGuard::new();
    let (results_tx, mut results) = tokio::sync::mpsc::channel(4);
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ticket = guard.begin();
                let client = client.clone();
                let results_tx = results_tx.clone();
                tokio::spawn(async move {
                    let result = statement::load(&client, id, LedgerView::Statement).await;
                    let _ = results_tx.send((ticket, result)).await;
                });
            }
            Some((ticket, result)) = results.recv() => {
                let Some(result) = ticket.accept(result) else {
                    continue;
                };
                let mut out = std::io::stdout().lock();
                match result {
                    Ok(loaded) if json => {
                        writeln!(out, "{}", serde_json::to_string_pretty(&loaded)?)?;
                    }
                    Ok(loaded) => {
                        render::statement(&mut out, &loaded, LedgerView::Statement, tz)?;
                        writeln!(out)?;
                    }
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                guard.invalidate();
                return Ok(());
            }
        }
    }
}
