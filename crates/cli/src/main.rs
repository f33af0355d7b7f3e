//! Campus Market CLI - Persisted cart maintenance.
//!
//! # Usage
//!
//! ```bash
//! # List persisted carts
//! cm-cli cart list
//!
//! # Inspect a cart
//! cm-cli cart show cart-<token>
//!
//! # Add, update, remove, clear
//! cm-cli cart add cart-<token> --id 12 --price 1500 --size M
//! cm-cli cart update cart-<token> --id 12 --size M --quantity 3
//! cm-cli cart remove cart-<token> --id 12 --size M
//! cm-cli cart clear cart-<token>
//! ```
//!
//! Operates on the file storage directory the storefront writes to. Stop the
//! storefront (or accept last-writer-wins) before editing live carts: a
//! hydrated cart in the service overwrites the file on its next change.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use campus_market_core::{CartProduct, CurrencyCode, Price, ProductId};
use campus_market_storefront::cart::FileStorage;
use campus_market_storefront::config::DEFAULT_CART_DATA_DIR;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

use commands::cart::{line_key, parse_product_id};

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(author, version, about = "Campus Market CLI tools")]
struct Cli {
    /// Cart storage directory
    #[arg(long, global = true, env = "CART_DATA_DIR", default_value = DEFAULT_CART_DATA_DIR)]
    data_dir: PathBuf,

    /// Currency used to format totals
    #[arg(long, global = true, env = "CART_CURRENCY", default_value = "KES")]
    currency: CurrencyCode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit persisted carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

/// Identity of a line inside a cart.
#[derive(Args)]
struct LineArgs {
    /// Product ID (integers are numeric IDs)
    #[arg(long, value_parser = parse_product_id)]
    id: ProductId,

    /// Selected size variant
    #[arg(long)]
    size: Option<String>,

    /// Selected color variant
    #[arg(long)]
    color: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// List every persisted cart
    List,
    /// Show the lines of one cart
    Show {
        /// Storage key (e.g. cart-<token>)
        key: String,
    },
    /// Add a product to a cart
    Add {
        /// Storage key (e.g. cart-<token>)
        key: String,

        #[command(flatten)]
        line: LineArgs,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (values below 1 are ignored)
    Update {
        /// Storage key (e.g. cart-<token>)
        key: String,

        #[command(flatten)]
        line: LineArgs,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line from a cart
    Remove {
        /// Storage key (e.g. cart-<token>)
        key: String,

        #[command(flatten)]
        line: LineArgs,
    },
    /// Remove every line from a cart
    Clear {
        /// Storage key (e.g. cart-<token>)
        key: String,
    },
}

fn main() {
    // Load .env before parsing so env-backed arguments see it
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::open(&cli.data_dir)?;
    let currency = cli.currency;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::List => {
                commands::cart::list(&storage, currency)?;
            }
            CartAction::Show { key } => commands::cart::show(storage, &key, currency)?,
            CartAction::Add {
                key,
                line,
                price,
                name,
                image,
                quantity,
            } => {
                let mut product = CartProduct::new(line.id, Price::new(price));
                if let Some(name) = name {
                    product = product.with_name(name);
                }
                if let Some(image) = image {
                    product = product.with_image(image);
                }
                if let Some(size) = line.size {
                    product = product.with_size(size);
                }
                if let Some(color) = line.color {
                    product = product.with_color(color);
                }
                commands::cart::add(storage, &key, product, quantity)?;
            }
            CartAction::Update {
                key,
                line,
                quantity,
            } => {
                let line = line_key(line.id, line.size, line.color);
                commands::cart::update(storage, &key, &line, quantity)?;
            }
            CartAction::Remove { key, line } => {
                let line = line_key(line.id, line.size, line.color);
                commands::cart::remove(storage, &key, &line)?;
            }
            CartAction::Clear { key } => commands::cart::clear(storage, &key)?,
        },
    }
    Ok(())
}
