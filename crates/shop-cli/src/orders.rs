use nu_ansi_term::Color::{Cyan, Green, LightRed, Yellow};
use shop_db::{
    models::{
        order::{NewOrder, Order, OrderFilter, UpdateOrderReq},
        types::Page,
    },
    OrderRepository,
};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{info, warn};

use crate::{
    cli::OrderAction,
    context::ShopContext,
    utils::{format_money, print_json, read_json, Colored},
};

pub fn handle(ctx: &mut ShopContext, action: OrderAction) -> miette::Result<()> {
    match action {
        OrderAction::List {
            search,
            status,
            start_date,
            end_date,
            list,
        } => {
            let filter = OrderFilter {
                id: None,
                search,
                status,
                start_date,
                end_date,
                paginate: ctx.paginate(&list),
                sort: ctx.sort(&list),
            };
            let deadline = ctx.deadline();
            let page = OrderRepository::find_many(&mut ctx.db, &filter, deadline);

            if ctx.json {
                return print_json(&page);
            }
            info!("\n{}", orders_table(&page));
            Ok(())
        }
        OrderAction::Get {
            id,
        } => {
            let deadline = ctx.deadline();
            let order = OrderRepository::find_one(&mut ctx.db, &id, deadline)?;
            show_order(ctx, &order)
        }
        OrderAction::Create {
            file,
        } => {
            let req: NewOrder = read_json(&file)?;
            let deadline = ctx.deadline();
            let order = OrderRepository::insert(&mut ctx.db, &req, deadline)?;
            if req.total_paid > 0.0 && (req.total_paid - order.total_paid).abs() > f64::EPSILON {
                warn!(
                    "Ignored client total {}; stored {}",
                    format_money(req.total_paid),
                    format_money(order.total_paid)
                );
            }
            info!("Placed order {}", Colored(Cyan, &order.id));
            show_order(ctx, &order)
        }
        OrderAction::Status {
            id,
            status,
        } => {
            let req = UpdateOrderReq {
                order_id: id,
                status: Some(status),
                transfer_slip: None,
            };
            let deadline = ctx.deadline();
            let order = OrderRepository::update(&mut ctx.db, &req, deadline)?;
            info!(
                "Order {} is now {}",
                Colored(Cyan, &order.id),
                Colored(Yellow, &order.status)
            );
            Ok(())
        }
    }
}

fn show_order(ctx: &ShopContext, order: &Order) -> miette::Result<()> {
    if ctx.json {
        return print_json(order);
    }

    let mut builder = Builder::new();
    builder.push_record(["Product", "Qty", "Price", "Subtotal"]);
    for item in &order.products {
        builder.push_record([
            item.product.title.clone(),
            item.qty.to_string(),
            format_money(item.product.price),
            format_money(item.product.price * f64::from(item.qty)),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(format!(
            "Order {} | {} | {}",
            Colored(Cyan, &order.id),
            Colored(Yellow, &order.status),
            order.created_at
        )))
        .with(Panel::footer(format!(
            "Total {}",
            Colored(LightRed, format_money(order.total_paid))
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    info!("Ship to: {} ({})", order.address, order.contact);
    if let Some(slip) = &order.transfer_slip {
        info!("Transfer slip: {} {}", slip.filename, slip.url);
    }
    Ok(())
}

fn orders_table(page: &Page<Order>) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Id", "User", "Status", "Items", "Total", "Created"]);
    for order in &page.data {
        builder.push_record([
            format!("{}", Colored(Cyan, &order.id)),
            order.user_id.clone(),
            format!("{}", Colored(Yellow, &order.status)),
            order.products.len().to_string(),
            format!("{}", Colored(LightRed, format_money(order.total_paid))),
            order.created_at.clone(),
        ]);
    }

    builder
        .build()
        .with(Panel::footer(format!(
            "Page {} of {} ({} orders)",
            page.page,
            page.total_page,
            Colored(Green, page.total_item)
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string()
}
