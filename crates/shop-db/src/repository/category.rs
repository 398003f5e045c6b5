use diesel::prelude::*;
use tracing::debug;

use super::find_all;
use crate::{
    deadline::Deadline,
    error::{DbError, Result},
    models::catalog::{Category, CategoryFilter, NewCategory},
    query::CATEGORIES,
    schema::categories,
    write::{WriteStep, WriteTx},
};

/// Repository for product categories.
pub struct CategoryRepository;

impl CategoryRepository {
    /// Lists categories, optionally narrowed by a title search.
    pub fn find_many(
        conn: &mut SqliteConnection,
        filter: &CategoryFilter,
        deadline: Deadline,
    ) -> Vec<Category> {
        find_all(conn, &CATEGORIES, filter, deadline)
    }

    /// Inserts several categories in one transaction. Either all are stored
    /// or none is.
    pub fn insert_many(
        conn: &mut SqliteConnection,
        titles: &[String],
        deadline: Deadline,
    ) -> Result<Vec<Category>> {
        if titles.iter().any(|title| title.trim().is_empty()) {
            return Err(DbError::InvalidInput("category title is empty".to_string()));
        }

        let mut tx = WriteTx::begin(conn, deadline, "insert categories")?;
        let mut inserted = Vec::with_capacity(titles.len());
        for title in titles {
            let category = tx.step(WriteStep::InsertParent, |c| {
                diesel::insert_into(categories::table)
                    .values(NewCategory { title: title.trim() })
                    .returning(Category::as_returning())
                    .get_result(c)
            })?;
            inserted.push(category);
        }
        tx.commit()?;
        debug!(count = inserted.len(), "categories inserted");

        Ok(inserted)
    }

    /// Deletes a category. Product links to it are removed with it.
    pub fn delete(conn: &mut SqliteConnection, id: i32, deadline: Deadline) -> Result<()> {
        deadline.check("delete category")?;
        let deleted = diesel::delete(categories::table.find(id))
            .execute(conn)
            .map_err(|err| DbError::from_write(WriteStep::DeleteParent, err))?;
        if deleted == 0 {
            return Err(DbError::NotFound("Category".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        repository::ProductRepository,
        test_utils::{count_rows, TestDb},
    };

    fn titles(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_insert_many_and_search() {
        let mut db = TestDb::new();
        let inserted = CategoryRepository::insert_many(
            db.conn(),
            &titles(&["Hot Drinks", "Cold Drinks", "Snacks"]),
            Deadline::none(),
        )
        .unwrap();
        assert_eq!(inserted.len(), 3);
        assert_eq!(inserted[2].title, "Snacks");

        let all = CategoryRepository::find_many(db.conn(), &CategoryFilter::default(), Deadline::none());
        assert_eq!(all, inserted);

        let drinks = CategoryRepository::find_many(
            db.conn(),
            &CategoryFilter {
                title: Some("drink".into()),
            },
            Deadline::none(),
        );
        assert_eq!(drinks.len(), 2);
    }

    #[test]
    fn test_insert_many_is_all_or_nothing() {
        let mut db = TestDb::new();
        db.seed_category("Snacks");

        let err = CategoryRepository::insert_many(
            db.conn(),
            &titles(&["Hot Drinks", "Snacks"]),
            Deadline::none(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "category title have been used");
        assert_eq!(count_rows(db.conn(), "categories"), 1);
    }

    #[test]
    fn test_delete_unlinks_products() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        let product = db.seed_product("Coffee", 10.0, category);

        CategoryRepository::delete(db.conn(), category, Deadline::none()).unwrap();
        let product = ProductRepository::find_one(db.conn(), &product, Deadline::none()).unwrap();
        assert!(product.category.is_none());

        let err = CategoryRepository::delete(db.conn(), category, Deadline::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
