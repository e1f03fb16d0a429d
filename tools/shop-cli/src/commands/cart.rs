//! Cart and checkout commands.

use anyhow::Result;
use dialoguer::Confirm;
use serde_json::json;
use shop_sdk::commerce::cart::{CartState, UpdateCart};
use shop_sdk::commerce::catalog::ProductQuery;
use shop_sdk::commerce::checkout::Order;
use shop_sdk::commerce::ProductId;

use super::{CartArgs, CartCommand, CheckoutArgs};
use crate::context::Context;
use crate::output::status_badge;

const WIDTHS: [usize; 4] = [6, 32, 5, 10];

pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let cart = ctx.app.cart();
    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {
            cart.fetch_cart().await?;
        }
        CartCommand::Add { product, quantity } => {
            cart.add_to_cart(ProductId::new(product), quantity).await?;
            ctx.output.success("Added to cart");
        }
        CartCommand::Set { product, quantity } => {
            let update = UpdateCart::new().set(ProductId::new(product), quantity)?;
            cart.update_cart(update).await?;
            ctx.output.success("Cart updated");
        }
        CartCommand::Remove { product } => {
            cart.remove_from_cart(ProductId::new(product)).await?;
            ctx.output.success("Removed from cart");
        }
        CartCommand::Clear { yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt("Remove everything from the cart?")
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Cancelled.");
                return Ok(());
            }
            cart.clear_cart().await?;
            ctx.output.success("Cart cleared");
        }
        CartCommand::Stats => {
            let state = cart.get_cart_statistics().await?;
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "lines": state.line_count(),
                    "totalItems": state.total_items(),
                }));
            } else {
                ctx.output.kv("lines", &state.line_count().to_string());
                ctx.output.kv("items", &state.total_items().to_string());
            }
            return Ok(());
        }
    }
    print_cart(ctx, &cart.cart()).await;
    Ok(())
}

/// Print the cart with product names and prices.
///
/// Products are looked up in the loaded catalog; the first page of the
/// catalog is fetched to fill it.
async fn print_cart(ctx: &Context, state: &CartState) {
    let cart = ctx.app.cart();
    if state.has_items() && ctx.app.products().products().is_empty() {
        let query = ProductQuery::new().size(100);
        if let Err(e) = ctx.app.products().fetch_products(&query).await {
            ctx.output.debug(&format!("Product names unavailable: {}", e));
        }
    }

    let details = cart.items_with_details();
    let total = cart.total_amount();
    if ctx.output.is_json() {
        let lines: Vec<_> = details
            .iter()
            .map(|d| {
                json!({
                    "productId": d.product_id,
                    "quantity": d.quantity,
                    "productName": d.product.as_ref().map(|p| p.product_name.clone()),
                    "subtotal": d.subtotal,
                })
            })
            .collect();
        ctx.output.json(&json!({"items": lines, "totalAmount": total}));
        return;
    }

    ctx.output.header("Cart");
    if details.is_empty() {
        ctx.output.info("Your cart is empty.");
        return;
    }
    ctx.output.table_row(&["ID", "PRODUCT", "QTY", "SUBTOTAL"], &WIDTHS);
    for line in &details {
        let name = line
            .product
            .as_ref()
            .map(|p| p.product_name.clone())
            .unwrap_or_else(|| "(not loaded)".to_string());
        ctx.output.table_row(
            &[
                &line.product_id.to_string(),
                &name,
                &line.quantity.to_string(),
                &line.subtotal.display(),
            ],
            &WIDTHS,
        );
    }
    ctx.output.kv("items", &state.total_items().to_string());
    ctx.output.kv("total", &total.display());
}

pub async fn checkout(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.app.cart();
    if ctx.app.auth().is_logged_in() {
        cart.fetch_cart().await?;
    }

    if !args.yes && cart.has_items() && !ctx.output.is_json() {
        print_cart(ctx, &cart.cart()).await;
        if !Confirm::new()
            .with_prompt("Place the order?")
            .default(true)
            .interact()?
        {
            ctx.output.info("Cancelled.");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let result = cart.create_order().await;
    spinner.finish_and_clear();
    let orders = result?;
    print_orders(ctx, &orders);
    Ok(())
}

pub(crate) fn print_orders(ctx: &Context, orders: &[Order]) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }
    for order in orders {
        ctx.output.list_item(&format!(
            "#{} {} x{} {} {}",
            order.id,
            order.product_name,
            order.quantity,
            order.total_amount,
            status_badge(order.status)
        ));
    }
}
