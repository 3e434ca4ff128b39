use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use stockfighter::exchange::{BlockingClient, Stockfighter};
use stockfighter::logging::{log, obj, v_str, Domain, Level};
use stockfighter::types::{Direction, OrderRequest, OrderType};
use stockfighter::{AuthScheme, Config};

#[derive(Parser, Debug)]
#[command(name = "stockfighter", about = "Stockfighter exchange API client")]
struct Cli {
    /// API key (falls back to STOCKFIGHTER_API_KEY). Long form only: `-key` is rejected
    #[arg(long)]
    key: Option<String>,

    /// API base URL (falls back to STOCKFIGHTER_BASE)
    #[arg(long)]
    base_url: Option<String>,

    /// How to send the key: none, header:<NAME> or query:<PARAM>
    #[arg(long)]
    auth: Option<AuthScheme>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the API is up
    Ping,
    /// Check a venue is up
    Venue { venue: String },
    /// List the stocks traded on a venue
    Stocks { venue: String },
    /// Order book snapshot
    Book { venue: String, stock: String },
    /// Current quote
    Quote { venue: String, stock: String },
    /// Status of one order
    Order { venue: String, stock: String, id: u64 },
    /// Place an order
    Place {
        venue: String,
        stock: String,
        #[arg(long)]
        account: String,
        #[arg(long)]
        direction: Direction,
        #[arg(long)]
        qty: u64,
        #[arg(long, default_value_t = 0)]
        price: u64,
        #[arg(long, default_value = "limit")]
        order_type: OrderType,
    },
    /// Cancel an order
    Cancel { venue: String, stock: String, id: u64 },
    /// Orders for an account, optionally limited to one stock
    Orders {
        venue: String,
        account: String,
        #[arg(long)]
        stock: Option<String>,
    },
}

fn print<T: Serialize>(value: Option<T>, what: &str) -> Result<()> {
    let value = value.ok_or_else(|| anyhow!("{} failed", what))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn check(ok: bool, what: &str) -> Result<()> {
    if !ok {
        return Err(anyhow!("{} failed", what));
    }
    println!("ok");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = Config::from_env()?;
    if let Some(key) = cli.key {
        cfg = cfg.with_api_key(key);
    }
    if let Some(base) = cli.base_url {
        cfg = cfg.with_base_url(base);
    }
    if let Some(auth) = cli.auth {
        cfg = cfg.with_auth(auth);
    }
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("base_url", v_str(&cfg.base_url)),
            ("auth", v_str(&cfg.auth.to_string())),
            ("has_key", serde_json::json!(cfg.api_key.is_some())),
        ]),
    );

    let client = BlockingClient::new(&cfg)?;

    match cli.command {
        Command::Ping => check(client.ping(), "heartbeat"),
        Command::Venue { venue } => check(client.ping_venue(&venue), "venue heartbeat"),
        Command::Stocks { venue } => print(client.fetch_stocks(&venue), "stock listing"),
        Command::Book { venue, stock } => {
            print(client.fetch_orderbook(&venue, &stock), "orderbook")
        }
        Command::Quote { venue, stock } => print(client.fetch_quote(&venue, &stock), "quote"),
        Command::Order { venue, stock, id } => {
            print(client.fetch_order(&venue, &stock, id), "order lookup")
        }
        Command::Place {
            venue,
            stock,
            account,
            direction,
            qty,
            price,
            order_type,
        } => {
            let req = OrderRequest::limit(account, direction, qty, price).with_type(order_type);
            print(client.place_order(&venue, &stock, &req), "order placement")
        }
        Command::Cancel { venue, stock, id } => {
            check(client.cancel_order(&venue, &stock, id), "cancel")
        }
        Command::Orders {
            venue,
            account,
            stock: Some(stock),
        } => print(
            client.fetch_account_stock_orders(&venue, &account, &stock),
            "account orders",
        ),
        Command::Orders {
            venue,
            account,
            stock: None,
        } => print(client.fetch_account_orders(&venue, &account), "account orders"),
    }
}
