use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed};
use shop_db::{
    models::{
        catalog::{NewProduct, Product, ProductFilter, ProductUpdate},
        types::Page,
    },
    ProductRepository,
};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::{
    cli::{ListArgs, ProductAction},
    context::ShopContext,
    utils::{format_money, print_json, read_json, Colored},
};

pub fn handle(ctx: &mut ShopContext, action: ProductAction) -> miette::Result<()> {
    match action {
        ProductAction::List {
            search,
            list,
        } => list_products(ctx, search, &list),
        ProductAction::Get {
            id,
        } => {
            let deadline = ctx.deadline();
            let product = ProductRepository::find_one(&mut ctx.db, &id, deadline)?;
            show_product(ctx, &product)
        }
        ProductAction::Create {
            file,
        } => {
            let req: NewProduct = read_json(&file)?;
            let deadline = ctx.deadline();
            let product = ProductRepository::insert(&mut ctx.db, &req, deadline)?;
            info!("Created product {}", Colored(Cyan, &product.id));
            show_product(ctx, &product)
        }
        ProductAction::Update {
            file,
        } => {
            let req: ProductUpdate = read_json(&file)?;
            let deadline = ctx.deadline();
            let product = ProductRepository::update(&mut ctx.db, &req, deadline)?;
            info!("Updated product {}", Colored(Cyan, &product.id));
            show_product(ctx, &product)
        }
        ProductAction::Delete {
            id,
        } => {
            let deadline = ctx.deadline();
            ProductRepository::delete(&mut ctx.db, &id, deadline)?;
            info!("Deleted product {}", Colored(Cyan, &id));
            Ok(())
        }
    }
}

fn list_products(
    ctx: &mut ShopContext,
    search: Option<String>,
    list: &ListArgs,
) -> miette::Result<()> {
    let filter = ProductFilter {
        id: None,
        search,
        paginate: ctx.paginate(list),
        sort: ctx.sort(list),
    };
    let deadline = ctx.deadline();
    let page = ProductRepository::find_many(&mut ctx.db, &filter, deadline);

    if ctx.json {
        return print_json(&page);
    }

    info!("\n{}", products_table(&page));
    Ok(())
}

fn show_product(ctx: &ShopContext, product: &Product) -> miette::Result<()> {
    if ctx.json {
        return print_json(product);
    }

    let mut builder = Builder::new();
    builder.push_record(["Id".to_string(), format!("{}", Colored(Cyan, &product.id))]);
    builder.push_record(["Title".to_string(), format!("{}", Colored(Blue, &product.title))]);
    builder.push_record(["Description".to_string(), product.description.clone()]);
    builder.push_record([
        "Price".to_string(),
        format!("{}", Colored(LightRed, format_money(product.price))),
    ]);
    builder.push_record([
        "Category".to_string(),
        product
            .category
            .as_ref()
            .map(|c| format!("{} ({})", c.title, c.id))
            .unwrap_or_default(),
    ]);
    for image in &product.images {
        builder.push_record(["Image".to_string(), format!("{} {}", image.filename, image.url)]);
    }
    builder.push_record(["Created".to_string(), product.created_at.clone()]);
    builder.push_record(["Updated".to_string(), product.updated_at.clone()]);

    let table = builder
        .build()
        .with(Panel::header("Product"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    Ok(())
}

fn products_table(page: &Page<Product>) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Id", "Title", "Price", "Category", "Images"]);
    for product in &page.data {
        builder.push_record([
            format!("{}", Colored(Cyan, &product.id)),
            format!("{}", Colored(Blue, &product.title)),
            format!("{}", Colored(LightRed, format_money(product.price))),
            product
                .category
                .as_ref()
                .map(|c| c.title.clone())
                .unwrap_or_default(),
            product.images.len().to_string(),
        ]);
    }

    builder
        .build()
        .with(Panel::footer(format!(
            "Page {} of {} ({} products)",
            page.page,
            page.total_page,
            Colored(Green, page.total_item)
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string()
}

#[cfg(test)]
mod tests {
    use shop_db::models::{
        catalog::{Category, Image},
        types::PaginateReq,
    };

    use super::*;

    #[test]
    fn test_products_table_lists_rows_and_totals() {
        let product = Product {
            id: "P0123456789ab".to_string(),
            title: "Coffee".to_string(),
            description: String::new(),
            price: 10.0,
            category: Some(Category {
                id: 1,
                title: "Drinks".to_string(),
            }),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
            images: vec![Image {
                id: 1,
                filename: "a.png".to_string(),
                url: "/a.png".to_string(),
            }],
        };
        let page = Page::new(vec![product], PaginateReq::new(1, 10), 1);

        let table = products_table(&page);
        assert!(table.contains("Coffee"));
        assert!(table.contains("10.00"));
        assert!(table.contains("Drinks"));
        assert!(table.contains("Page 1 of 1"));
    }
}
