//! Order commands.

use anyhow::Result;
use dialoguer::Confirm;
use serde_json::json;
use shop_sdk::commerce::checkout::{
    CreateOrderRequest, Order, OrderPage, OrderQuery, OrderStatus, DEFAULT_ORDER_PAGE_SIZE,
};
use shop_sdk::commerce::{OrderId, ProductId};

use super::{BuyArgs, OrdersArgs, OrdersCommand, PageArgs};
use crate::context::Context;
use crate::output::status_badge;

const WIDTHS: [usize; 5] = [6, 28, 5, 10, 12];

pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let store = ctx.app.orders();
    let command = args.command.unwrap_or(OrdersCommand::List {
        paging: PageArgs {
            page: 1,
            size: None,
        },
        status: None,
    });

    match command {
        OrdersCommand::List { paging, status } => {
            let page = store.fetch_orders(Some(query_for(paging, status))).await?;
            print_page(ctx, "My orders", &page);
        }
        OrdersCommand::Seller { paging, status } => {
            let page = store
                .fetch_seller_orders(Some(query_for(paging, status)))
                .await?;
            print_page(ctx, "Orders to fulfil", &page);
        }
        OrdersCommand::Show { id } => {
            let order = store.fetch_order_detail(OrderId::new(id)).await?;
            print_order(ctx, &order);
        }
        OrdersCommand::Status { id, status } => {
            let order = store.update_order_status(OrderId::new(id), status).await?;
            print_order(ctx, &order);
        }
        OrdersCommand::Cancel { id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Cancel order {}?", id))
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Kept the order.");
                return Ok(());
            }
            let order = store.cancel_order(OrderId::new(id)).await?;
            print_order(ctx, &order);
        }
        OrdersCommand::Stats => {
            let stats = store.fetch_statistics().await?;
            if ctx.output.is_json() {
                ctx.output.json(&stats);
                return Ok(());
            }
            ctx.output.header("Order statistics");
            ctx.output.kv("orders", &stats.total_orders.to_string());
            ctx.output.kv("pending", &stats.pending_orders.to_string());
            ctx.output.kv("completed", &stats.completed_orders.to_string());
            ctx.output.kv("total spent", &stats.total_amount.display());
        }
        OrdersCommand::Purchased { product } => {
            let bought = store.check_purchase_status(ProductId::new(product)).await;
            if ctx.output.is_json() {
                ctx.output
                    .json(&json!({"productId": product, "hasPurchased": bought}));
            } else if bought {
                ctx.output.success(&format!("You have bought product {}", product));
            } else {
                ctx.output.info(&format!("You have not bought product {}", product));
            }
        }
    }
    Ok(())
}

/// Buy one product without going through the cart.
pub async fn buy(args: BuyArgs, ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let mut request = CreateOrderRequest::new(ProductId::new(args.product), args.quantity)?;
    if let Some(remarks) = args.remarks {
        request = request.remarks(remarks);
    }
    if let Some(address) = args.address {
        request = request.shipping_address(address);
    }
    if let Some(phone) = args.phone {
        request = request.contact_phone(phone);
    }

    let order = ctx.app.orders().create_order(&request).await?;
    print_order(ctx, &order);
    Ok(())
}

fn query_for(paging: PageArgs, status: Option<OrderStatus>) -> OrderQuery {
    OrderQuery::new(
        paging.page.saturating_sub(1),
        paging.size.unwrap_or(DEFAULT_ORDER_PAGE_SIZE),
    )
    .with_status(status)
}

fn print_page(ctx: &Context, title: &str, page: &OrderPage) {
    if ctx.output.is_json() {
        ctx.output.json(page);
        return;
    }

    ctx.output.header(title);
    if page.is_empty() {
        ctx.output.info("No orders found.");
        return;
    }
    ctx.output
        .table_row(&["ID", "PRODUCT", "QTY", "TOTAL", "STATUS"], &WIDTHS);
    for order in &page.orders {
        ctx.output.table_row(
            &[
                &order.id.to_string(),
                &order.product_name,
                &order.quantity.to_string(),
                &order.total_amount.display(),
                &status_badge(order.status),
            ],
            &WIDTHS,
        );
    }

    let counts = ctx.app.orders().orders_by_status();
    let summary: Vec<String> = OrderStatus::ALL
        .into_iter()
        .filter(|s| counts.get(*s) > 0)
        .map(|s| format!("{} {}", counts.get(s), s.display_name().to_lowercase()))
        .collect();
    if !summary.is_empty() {
        ctx.output.kv("on this page", &summary.join(", "));
    }
    ctx.output.pagination(&ctx.app.orders().pagination());
}

fn print_order(ctx: &Context, order: &Order) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order #{}", order.id));
    ctx.output.kv("status", &status_badge(order.status));
    ctx.output.kv(
        "product",
        &format!("{} (#{})", order.product_name, order.product_id),
    );
    ctx.output.kv("quantity", &order.quantity.to_string());
    ctx.output.kv("unit price", &order.unit_price.display());
    ctx.output.kv("total", &order.total_amount.display());
    if !order.seller_name.is_empty() {
        ctx.output.kv("seller", &order.seller_name);
    }
    if !order.username.is_empty() {
        ctx.output.kv("buyer", &order.username);
    }
    for (key, value) in [
        ("placed", &order.created_at),
        ("ship to", &order.shipping_address),
        ("phone", &order.contact_phone),
        ("remarks", &order.remarks),
    ] {
        if let Some(value) = value {
            ctx.output.kv(key, value);
        }
    }
    if order.can_cancel() {
        ctx.output
            .kv("hint", &format!("`shop orders cancel {}` to cancel", order.id));
    }
}
