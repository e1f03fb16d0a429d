//! Shop CLI - command line client for the storefront.
//!
//! Commands:
//! - `shop login` / `register` / `logout` / `whoami` - Session
//! - `shop products` - Browse and manage the catalog
//! - `shop cart` - Show and change the cart
//! - `shop checkout` - Turn the cart into orders
//! - `shop buy` - Order a single product
//! - `shop orders` - Order history and fulfilment
//! - `shop admin` - User management
//! - `shop config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shop_sdk::data::ClientEvent;

use commands::{
    AdminArgs, BuyArgs, CartArgs, CheckoutArgs, ConfigArgs, LoginArgs, OrdersArgs, ProductsArgs,
    RegisterArgs,
};

/// Shop CLI - browse, buy and sell from the terminal
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// End the session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Browse and manage products
    Products(ProductsArgs),

    /// Show and change the cart
    Cart(CartArgs),

    /// Order everything in the cart
    Checkout(CheckoutArgs),

    /// Order a single product
    Buy(BuyArgs),

    /// Order history and fulfilment
    Orders(OrdersArgs),

    /// Manage user accounts (admin only)
    Admin(AdminArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    let mut events = ctx.app.subscribe();

    let result = match cli.command {
        Commands::Login(args) => commands::auth::login(args, &ctx).await,
        Commands::Register(args) => commands::auth::register(args, &ctx).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::cart::checkout(args, &ctx).await,
        Commands::Buy(args) => commands::orders::buy(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    let mut expired = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ClientEvent::Unauthorized { .. }) {
            expired = true;
        }
    }

    if let Err(e) = result {
        if expired {
            ctx.output.error("session expired, run `shop login`");
        } else {
            ctx.output.error(&format!("{:#}", e));
        }
        std::process::exit(1);
    }

    Ok(())
}
