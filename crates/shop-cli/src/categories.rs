use nu_ansi_term::Color::Cyan;
use shop_db::{
    models::catalog::{Category, CategoryFilter},
    CategoryRepository,
};
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::{
    cli::CategoryAction,
    context::ShopContext,
    utils::{print_json, Colored},
};

pub fn handle(ctx: &mut ShopContext, action: CategoryAction) -> miette::Result<()> {
    match action {
        CategoryAction::List {
            title,
        } => {
            let filter = CategoryFilter {
                title,
            };
            let deadline = ctx.deadline();
            let categories = CategoryRepository::find_many(&mut ctx.db, &filter, deadline);
            show_categories(ctx, &categories)
        }
        CategoryAction::Add {
            titles,
        } => {
            let deadline = ctx.deadline();
            let categories = CategoryRepository::insert_many(&mut ctx.db, &titles, deadline)?;
            info!("Added {} categories", categories.len());
            show_categories(ctx, &categories)
        }
        CategoryAction::Delete {
            id,
        } => {
            let deadline = ctx.deadline();
            CategoryRepository::delete(&mut ctx.db, id, deadline)?;
            info!("Deleted category {}", Colored(Cyan, id));
            Ok(())
        }
    }
}

fn show_categories(ctx: &ShopContext, categories: &[Category]) -> miette::Result<()> {
    if ctx.json {
        return print_json(&categories);
    }
    if categories.is_empty() {
        info!("No categories");
        return Ok(());
    }
    info!("\n{}", categories_table(categories));
    Ok(())
}

fn categories_table(categories: &[Category]) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Id", "Title"]);
    for category in categories {
        builder.push_record([category.id.to_string(), category.title.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_table() {
        let table = categories_table(&[
            Category {
                id: 1,
                title: "Drinks".to_string(),
            },
            Category {
                id: 2,
                title: "Snacks".to_string(),
            },
        ]);
        assert!(table.contains("Drinks"));
        assert!(table.contains("Snacks"));
    }
}
