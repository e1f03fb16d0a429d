//! Catalog commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use shop_sdk::commerce::catalog::{
    Product, ProductDraft, ProductPage, ProductQuery, ProductUpdate, SortOrder,
    DEFAULT_PRODUCT_PAGE_SIZE,
};
use shop_sdk::commerce::ProductId;

use super::{PageArgs, ProductsArgs, ProductsCommand};
use crate::context::Context;
use crate::output::availability_badge;

const WIDTHS: [usize; 5] = [6, 32, 10, 7, 8];

pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let store = ctx.app.products();
    match args.command {
        ProductsCommand::List {
            paging,
            category,
            available,
            min_price,
            max_price,
            sort,
            desc,
            mine,
        } => {
            let mut query = query_for(paging);
            if let Some(category) = category {
                query = query.category(category);
            }
            if let Some(available) = available {
                query = query.available(available);
            }
            if min_price.is_some() || max_price.is_some() {
                query = query.price_range(min_price, max_price);
            }
            if let Some(sort) = sort {
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                query = query.sort(sort, order);
            }
            let page = if mine {
                ctx.require_login()?;
                store.fetch_merchant_products(&query).await?
            } else {
                store.fetch_products(&query).await?
            };
            print_page(ctx, "Products", &page);
        }
        ProductsCommand::Show { id } => {
            let product = store.fetch_product(ProductId::new(id)).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Search { keyword, paging } => {
            let page = store.search_products(&keyword, &query_for(paging)).await?;
            print_page(ctx, &format!("Results for \"{}\"", keyword), &page);
        }
        ProductsCommand::Category { name, paging } => {
            let page = store
                .fetch_products_by_category(&name, &query_for(paging))
                .await?;
            print_page(ctx, &name, &page);
        }
        ProductsCommand::Top { paging } => {
            let page = store.fetch_top_selling(&query_for(paging)).await?;
            print_page(ctx, "Best sellers", &page);
        }
        ProductsCommand::Newest { paging } => {
            let page = store.fetch_newest(&query_for(paging)).await?;
            print_page(ctx, "New arrivals", &page);
        }
        ProductsCommand::Create {
            name,
            price,
            stock,
            description,
            category,
            brand,
            discount,
            unlisted,
        } => {
            require_seller(ctx)?;
            let draft = ProductDraft {
                product_name: name,
                description,
                price,
                discount,
                stock_quantity: stock,
                is_available: !unlisted,
                category,
                brand,
                ..Default::default()
            };
            let product = store.create_product(&draft).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Update {
            id,
            name,
            price,
            description,
            category,
            brand,
        } => {
            require_seller(ctx)?;
            let update = ProductUpdate {
                product_name: name,
                price,
                description,
                category,
                brand,
                ..Default::default()
            };
            if update.is_empty() {
                bail!("Nothing to update, pass at least one field");
            }
            let product = store.update_product(ProductId::new(id), &update).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Delete { id, yes } => {
            require_seller(ctx)?;
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete product {}?", id))
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Cancelled.");
                return Ok(());
            }
            store.delete_product(ProductId::new(id)).await?;
        }
        ProductsCommand::Toggle { id } => {
            require_seller(ctx)?;
            let product = store.toggle_availability(ProductId::new(id)).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Stock { id, quantity } => {
            require_seller(ctx)?;
            let product = store.update_stock(ProductId::new(id), quantity).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Price { id, price } => {
            require_seller(ctx)?;
            let product = store.update_price(ProductId::new(id), price).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Discount { id, percent } => {
            require_seller(ctx)?;
            let product = store.update_discount(ProductId::new(id), percent).await?;
            print_product(ctx, &product);
        }
        ProductsCommand::Stats => {
            require_seller(ctx)?;
            let stats = store.fetch_statistics().await?;
            if ctx.output.is_json() {
                ctx.output.json(&stats);
                return Ok(());
            }
            ctx.output.header("Catalog statistics");
            ctx.output.kv("products", &stats.total_products.to_string());
            ctx.output.kv("listed", &stats.available_products.to_string());
            ctx.output.kv("unlisted", &stats.unavailable_products.to_string());
            ctx.output.kv("units sold", &stats.total_sales.to_string());
            ctx.output.kv("revenue", &stats.total_revenue.display());
            ctx.output.kv("average price", &stats.average_price.display());
            ctx.output.kv("low stock", &stats.low_stock_count.to_string());
            ctx.output.kv("out of stock", &stats.out_of_stock_count.to_string());
        }
    }
    Ok(())
}

fn require_seller(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    if !ctx.app.auth().can_manage_products() {
        bail!("Only sellers and admins can manage products");
    }
    Ok(())
}

/// API query for a 1-based page.
fn query_for(paging: PageArgs) -> ProductQuery {
    ProductQuery::new()
        .page(paging.page.saturating_sub(1))
        .size(paging.size.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE))
}

fn print_page(ctx: &Context, title: &str, page: &ProductPage) {
    if ctx.output.is_json() {
        ctx.output.json(page);
        return;
    }

    ctx.output.header(title);
    if page.data.is_empty() {
        ctx.output.info("No products found.");
        return;
    }
    ctx.output
        .table_row(&["ID", "NAME", "PRICE", "STOCK", "STATUS"], &WIDTHS);
    for product in &page.data {
        let price = if product.has_discount() {
            format!("{}*", product.discounted_price())
        } else {
            product.price.display()
        };
        ctx.output.table_row(
            &[
                &product.id.to_string(),
                &product.product_name,
                &price,
                &product.stock_quantity.to_string(),
                &availability_badge(product.is_available),
            ],
            &WIDTHS,
        );
    }
    ctx.output.pagination(&ctx.app.products().pagination());
}

fn print_product(ctx: &Context, product: &Product) {
    if ctx.output.is_json() {
        ctx.output.json(product);
        return;
    }

    ctx.output.header(&product.product_name);
    ctx.output.kv("id", &product.id.to_string());
    if product.has_discount() {
        ctx.output.kv(
            "price",
            &format!(
                "{} ({}% off {})",
                product.discounted_price(),
                product.discount,
                product.price
            ),
        );
    } else {
        ctx.output.kv("price", &product.price.display());
    }
    ctx.output.kv("stock", &product.stock_quantity.to_string());
    ctx.output.kv("sold", &product.sales_count.to_string());
    ctx.output.kv("status", &availability_badge(product.is_available));
    for (key, value) in [
        ("category", &product.category),
        ("brand", &product.brand),
        ("seller", &product.creator_username),
        ("description", &product.description),
    ] {
        if let Some(value) = value {
            ctx.output.kv(key, value);
        }
    }
}
