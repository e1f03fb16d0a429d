//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod config;
pub mod orders;
pub mod products;

use clap::{Args, Subcommand};
use shop_sdk::auth::Role;
use shop_sdk::commerce::checkout::OrderStatus;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Username (prompted for when omitted).
    pub username: Option<String>,

    /// Password (prompted for when omitted).
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Username (prompted for when omitted).
    pub username: Option<String>,

    /// Email address (prompted for when omitted).
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

/// Paging shared by the list commands. `page` is 1-based.
#[derive(Args, Clone, Copy)]
pub struct PageArgs {
    /// Page number.
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Items per page.
    #[arg(long)]
    pub size: Option<u32>,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List products.
    List {
        #[command(flatten)]
        paging: PageArgs,

        /// Only this category.
        #[arg(long)]
        category: Option<String>,

        /// Only listed (true) or unlisted (false) products.
        #[arg(long)]
        available: Option<bool>,

        /// Minimum price.
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum price.
        #[arg(long)]
        max_price: Option<f64>,

        /// Sort field, e.g. `price` or `createdAt`.
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending.
        #[arg(long)]
        desc: bool,

        /// Only my own products (sellers).
        #[arg(long)]
        mine: bool,
    },
    /// Show one product.
    Show {
        /// Product ID.
        id: i64,
    },
    /// Search by keyword.
    Search {
        /// Search term.
        keyword: String,

        #[command(flatten)]
        paging: PageArgs,
    },
    /// List a category.
    Category {
        /// Category name.
        name: String,

        #[command(flatten)]
        paging: PageArgs,
    },
    /// Best sellers.
    Top {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Newest arrivals.
    Newest {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Create a product.
    Create {
        /// Product name.
        name: String,

        /// Price.
        #[arg(long)]
        price: f64,

        /// Units in stock.
        #[arg(long, default_value = "0")]
        stock: i64,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        /// Percentage off, 0 to 100.
        #[arg(long)]
        discount: Option<f64>,

        /// Create without listing it.
        #[arg(long)]
        unlisted: bool,
    },
    /// Change product fields.
    Update {
        /// Product ID.
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        brand: Option<String>,
    },
    /// Delete a product.
    Delete {
        /// Product ID.
        id: i64,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// List or unlist a product.
    Toggle {
        /// Product ID.
        id: i64,
    },
    /// Set the stock level.
    Stock {
        /// Product ID.
        id: i64,

        /// Units in stock.
        quantity: i64,
    },
    /// Set the price.
    Price {
        /// Product ID.
        id: i64,

        /// New price.
        price: f64,
    },
    /// Set the discount.
    Discount {
        /// Product ID.
        id: i64,

        /// Percentage off, 0 to 100.
        percent: f64,
    },
    /// Catalog statistics.
    Stats,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart (default).
    Show,
    /// Add a product.
    Add {
        /// Product ID.
        product: i64,

        /// How many to add.
        #[arg(default_value = "1")]
        quantity: i64,
    },
    /// Set the quantity of a product already in the cart.
    Set {
        /// Product ID.
        product: i64,

        /// New quantity.
        quantity: i64,
    },
    /// Remove a product.
    Remove {
        /// Product ID.
        product: i64,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Cart totals as the server reports them.
    Stats,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the buy command.
#[derive(Args)]
pub struct BuyArgs {
    /// Product ID.
    pub product: i64,

    /// How many to buy.
    #[arg(default_value = "1")]
    pub quantity: i64,

    /// Note for the seller.
    #[arg(long)]
    pub remarks: Option<String>,

    /// Shipping address.
    #[arg(long)]
    pub address: Option<String>,

    /// Contact phone.
    #[arg(long)]
    pub phone: Option<String>,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// My orders (default).
    List {
        #[command(flatten)]
        paging: PageArgs,

        /// Only this status.
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Orders for the products I sell.
    Seller {
        #[command(flatten)]
        paging: PageArgs,

        /// Only this status.
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show one order.
    Show {
        /// Order ID.
        id: i64,
    },
    /// Move an order to a new status (sellers).
    Status {
        /// Order ID.
        id: i64,

        /// PENDING, PAID, SHIPPED, COMPLETED or CANCELLED.
        status: OrderStatus,
    },
    /// Cancel an order.
    Cancel {
        /// Order ID.
        id: i64,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Order statistics.
    Stats,
    /// Whether I have bought a product.
    Purchased {
        /// Product ID.
        product: i64,
    },
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List user accounts.
    Users {
        #[command(flatten)]
        paging: PageArgs,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Account statistics.
    Stats,
    /// Enable or disable an account.
    Toggle {
        /// User ID.
        id: i64,
    },
    /// Change an account's role.
    Role {
        /// User ID.
        id: i64,

        /// USER, SHOPER or ADMIN.
        role: Role,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Write a starter shop.toml in the current directory.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
