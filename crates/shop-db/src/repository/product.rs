//! Product reads and composite writes (product + category link + images).

use diesel::prelude::*;
use tracing::debug;

use super::{find_one, find_page};
use crate::{
    deadline::Deadline,
    error::{DbError, Result},
    models::{
        catalog::{
            NewImage, NewImageRow, NewProduct, NewProductRow, Product, ProductCategoryLink,
            ProductChangeset, ProductFilter, ProductUpdate,
        },
        types::{timestamp_now, Page},
    },
    query::{source, PredicateFragment, PRODUCTS},
    schema::{categories, images, products, products_categories},
    traits::Expression,
    write::{WriteStep, WriteTx},
};

/// Repository for catalog products.
pub struct ProductRepository;

fn category_exists(conn: &mut SqliteConnection, category_id: i32) -> Result<bool> {
    let found = categories::table
        .find(category_id)
        .select(categories::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(found.is_some())
}

fn image_rows<'a>(product_id: &'a str, images: &'a [NewImage]) -> Vec<NewImageRow<'a>> {
    images
        .iter()
        .map(|image| {
            NewImageRow {
                filename: &image.filename,
                url: &image.url,
                product_id,
            }
        })
        .collect()
}

impl ProductRepository {
    /// Lists products matching the filter. Never fails; see the module docs.
    pub fn find_many(
        conn: &mut SqliteConnection,
        filter: &ProductFilter,
        deadline: Deadline,
    ) -> Page<Product> {
        find_page(conn, &PRODUCTS, filter, deadline)
    }

    /// Finds a product by id, with its category and images.
    pub fn find_one(conn: &mut SqliteConnection, id: &str, deadline: Deadline) -> Result<Product> {
        find_one(
            conn,
            &PRODUCTS,
            PredicateFragment::new(source::products::ID.eq(id)),
            deadline,
        )
    }

    /// Inserts a product, links it to an existing category and stores its
    /// images, all in one transaction. Returns the stored product.
    pub fn insert(
        conn: &mut SqliteConnection,
        req: &NewProduct,
        deadline: Deadline,
    ) -> Result<Product> {
        let mut tx = WriteTx::begin(conn, deadline, "insert product")?;

        let product_id: String = tx.step(WriteStep::InsertParent, |c| {
            diesel::insert_into(products::table)
                .values(NewProductRow {
                    title: &req.title,
                    description: &req.description,
                    price: req.price,
                })
                .returning(products::id)
                .get_result(c)
        })?;

        if !tx.read(|c, _| category_exists(c, req.category_id))? {
            return tx.abort(DbError::InvalidInput(format!(
                "category {} does not exist",
                req.category_id
            )));
        }

        tx.step(WriteStep::LinkAssociation, |c| {
            diesel::insert_into(products_categories::table)
                .values(ProductCategoryLink {
                    product_id: &product_id,
                    category_id: req.category_id,
                })
                .execute(c)
        })?;

        if !req.images.is_empty() {
            let rows = image_rows(&product_id, &req.images);
            tx.step(WriteStep::InsertChildren, |c| {
                diesel::insert_into(images::table).values(&rows).execute(c)
            })?;
        }

        tx.commit()?;
        debug!(product_id = %product_id, images = req.images.len(), "product inserted");

        Self::find_one(conn, &product_id, deadline)
    }

    /// Updates the provided fields of a product.
    ///
    /// A `category_id` replaces the category link. `images: Some(..)` deletes
    /// every stored image and inserts the given set.
    pub fn update(
        conn: &mut SqliteConnection,
        req: &ProductUpdate,
        deadline: Deadline,
    ) -> Result<Product> {
        let mut tx = WriteTx::begin(conn, deadline, "update product")?;

        let changeset = ProductChangeset {
            title: req.title.as_deref(),
            description: req.description.as_deref(),
            price: req.price,
            updated_at: timestamp_now(),
        };
        let updated = tx.step(WriteStep::UpdateParent, |c| {
            diesel::update(products::table.find(req.id.as_str()))
                .set(&changeset)
                .execute(c)
        })?;
        if updated == 0 {
            return tx.abort(DbError::NotFound("Product".to_string()));
        }

        if let Some(category_id) = req.category_id {
            if !tx.read(|c, _| category_exists(c, category_id))? {
                return tx.abort(DbError::InvalidInput(format!(
                    "category {category_id} does not exist"
                )));
            }
            tx.step(WriteStep::LinkAssociation, |c| {
                diesel::replace_into(products_categories::table)
                    .values(ProductCategoryLink {
                        product_id: &req.id,
                        category_id,
                    })
                    .execute(c)
            })?;
        }

        if let Some(new_images) = &req.images {
            tx.step(WriteStep::ClearChildren, |c| {
                diesel::delete(images::table.filter(images::product_id.eq(req.id.as_str()))).execute(c)
            })?;
            if !new_images.is_empty() {
                let rows = image_rows(&req.id, new_images);
                tx.step(WriteStep::InsertChildren, |c| {
                    diesel::insert_into(images::table).values(&rows).execute(c)
                })?;
            }
        }

        tx.commit()?;
        debug!(product_id = %req.id, "product updated");

        Self::find_one(conn, &req.id, deadline)
    }

    /// Deletes a product. Its category link and images go with it.
    pub fn delete(conn: &mut SqliteConnection, id: &str, deadline: Deadline) -> Result<()> {
        deadline.check("delete product")?;
        let deleted = diesel::delete(products::table.find(id))
            .execute(conn)
            .map_err(|err| DbError::from_write(WriteStep::DeleteParent, err))?;
        if deleted == 0 {
            return Err(DbError::NotFound("Product".to_string()));
        }
        debug!(product_id = id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use diesel::sql_query;

    use super::*;
    use crate::{
        error::ErrorKind,
        models::types::{PaginateReq, SortReq},
        test_utils::{count_rows, new_product, TestDb},
    };

    fn image(name: &str) -> NewImage {
        NewImage {
            filename: name.to_string(),
            url: format!("https://cdn.example.com/{name}"),
        }
    }

    #[test]
    fn test_insert_with_images_round_trips_graph() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        let req = NewProduct {
            images: vec![image("a.png"), image("b.png"), image("c.png")],
            ..new_product("Coffee", 10.0, category)
        };

        let product = ProductRepository::insert(db.conn(), &req, Deadline::none()).unwrap();
        assert!(product.id.starts_with('P'));
        assert_eq!(product.title, "Coffee");
        assert_eq!(product.category.as_ref().unwrap().title, "drinks");
        let names: Vec<&str> = product.images.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_insert_without_images_reads_empty_list() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        let product =
            ProductRepository::insert(db.conn(), &new_product("Tea", 5.0, category), Deadline::none())
                .unwrap();
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_duplicate_title_is_conflict_and_writes_nothing() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        db.seed_product("Coffee", 10.0, category);
        let before = count_rows(db.conn(), "products");

        let err = ProductRepository::insert(
            db.conn(),
            &new_product("Coffee", 12.0, category),
            Deadline::none(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadInput);
        assert_eq!(err.to_string(), "product title have been used");
        assert_eq!(count_rows(db.conn(), "products"), before);
    }

    #[test]
    fn test_unknown_category_rolls_back_parent() {
        let mut db = TestDb::new();
        let err =
            ProductRepository::insert(db.conn(), &new_product("Coffee", 10.0, 99), Deadline::none())
                .unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
        assert_eq!(count_rows(db.conn(), "products"), 0);
    }

    #[test]
    fn test_child_failure_leaves_no_trace() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        sql_query(
            "CREATE TRIGGER fail_images BEFORE INSERT ON images \
             BEGIN SELECT RAISE(ABORT, 'forced'); END",
        )
        .execute(db.conn())
        .unwrap();

        let req = NewProduct {
            images: vec![image("a.png")],
            ..new_product("Coffee", 10.0, category)
        };
        let err = ProductRepository::insert(db.conn(), &req, Deadline::none()).unwrap_err();
        assert!(matches!(
            err,
            DbError::WriteFailed {
                step: WriteStep::InsertChildren,
                ..
            }
        ));

        // a second connection sees nothing of the aborted write
        let mut other = db.open_second();
        let page = ProductRepository::find_many(other.conn(), &ProductFilter::default(), Deadline::none());
        assert_eq!(page.total_item, 0);
        assert!(page.data.is_empty());
        assert_eq!(count_rows(other.conn(), "products"), 0);
        assert_eq!(count_rows(other.conn(), "products_categories"), 0);
        assert_eq!(count_rows(other.conn(), "images"), 0);
    }

    #[test]
    fn test_find_one_missing_is_not_found() {
        let mut db = TestDb::new();
        let err = ProductRepository::find_one(db.conn(), "P000000000000", Deadline::none())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_find_many_default_order_and_count() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        for (title, price) in [("Tea", 5.0), ("Coffee", 10.0), ("Milk", 3.0)] {
            db.seed_product(title, price, category);
        }

        let page = ProductRepository::find_many(db.conn(), &ProductFilter::default(), Deadline::none());
        let titles: Vec<&str> = page.data.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Coffee", "Milk", "Tea"]);
        assert_eq!(page.total_item, 3);
        assert_eq!(page.total_page, 1);

        let again = ProductRepository::find_many(db.conn(), &ProductFilter::default(), Deadline::none());
        assert_eq!(again.total_item, page.total_item);
    }

    #[test]
    fn test_find_many_search_sort_and_pages() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        for i in 0..7 {
            db.seed_product(&format!("Green Tea {i}"), 10.0 + i as f64, category);
        }
        db.seed_product("Coffee", 1.0, category);

        let filter = ProductFilter {
            search: Some("TEA".into()),
            paginate: PaginateReq::new(2, 5),
            sort: SortReq::new("price", "desc"),
            ..Default::default()
        };
        let page = ProductRepository::find_many(db.conn(), &filter, Deadline::none());
        assert_eq!(page.total_item, 7);
        assert_eq!(page.total_page, 2);
        let prices: Vec<f64> = page.data.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![11.0, 10.0]);
    }

    #[test]
    fn test_find_many_ignores_hostile_sort_column() {
        let mut db = TestDb::new();
        let category = db.seed_category("drinks");
        db.seed_product("Tea", 5.0, category);
        db.seed_product("Coffee", 10.0, category);

        let filter = ProductFilter {
            sort: SortReq::new("title; DROP TABLE products; --", "ASC"),
            ..Default::default()
        };
        let page = ProductRepository::find_many(db.conn(), &filter, Deadline::none());
        let titles: Vec<&str> = page.data.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Coffee", "Tea"]);
        assert_eq!(count_rows(db.conn(), "products"), 2);
    }

    #[test]
    fn test_update_replaces_images_and_category() {
        let mut db = TestDb::new();
        let drinks = db.seed_category("drinks");
        let snacks = db.seed_category("snacks");
        let req = NewProduct {
            images: vec![image("a.png"), image("b.png")],
            ..new_product("Coffee", 10.0, drinks)
        };
        let product = ProductRepository::insert(db.conn(), &req, Deadline::none()).unwrap();

        let update = ProductUpdate {
            id: product.id.clone(),
            price: Some(12.5),
            category_id: Some(snacks),
            images: Some(vec![image("c.png")]),
            ..Default::default()
        };
        let updated = ProductRepository::update(db.conn(), &update, Deadline::none()).unwrap();

        assert_eq!(updated.title, "Coffee");
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.category.unwrap().title, "snacks");
        assert_eq!(updated.images.len(), 1);
        assert_eq!(updated.images[0].filename, "c.png");
        assert_eq!(count_rows(db.conn(), "images"), 1);
    }

    #[test]
    fn test_update_without_images_keeps_them() {
        let mut db = TestDb::new();
        let drinks = db.seed_category("drinks");
        let req = NewProduct {
            images: vec![image("a.png")],
            ..new_product("Coffee", 10.0, drinks)
        };
        let product = ProductRepository::insert(db.conn(), &req, Deadline::none()).unwrap();

        let update = ProductUpdate {
            id: product.id.clone(),
            description: Some("dark roast".into()),
            ..Default::default()
        };
        let updated = ProductRepository::update(db.conn(), &update, Deadline::none()).unwrap();
        assert_eq!(updated.description, "dark roast");
        assert_eq!(updated.images.len(), 1);

        let cleared = ProductRepository::update(
            db.conn(),
            &ProductUpdate {
                id: product.id,
                images: Some(vec![]),
                ..Default::default()
            },
            Deadline::none(),
        )
        .unwrap();
        assert!(cleared.images.is_empty());
    }

    #[test]
    fn test_update_missing_product_is_not_found() {
        let mut db = TestDb::new();
        let update = ProductUpdate {
            id: "P000000000000".into(),
            title: Some("Ghost".into()),
            ..Default::default()
        };
        let err = ProductRepository::update(db.conn(), &update, Deadline::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_delete_cascades_children() {
        let mut db = TestDb::new();
        let drinks = db.seed_category("drinks");
        let req = NewProduct {
            images: vec![image("a.png")],
            ..new_product("Coffee", 10.0, drinks)
        };
        let product = ProductRepository::insert(db.conn(), &req, Deadline::none()).unwrap();

        ProductRepository::delete(db.conn(), &product.id, Deadline::none()).unwrap();
        assert_eq!(count_rows(db.conn(), "images"), 0);
        assert_eq!(count_rows(db.conn(), "products_categories"), 0);

        let err = ProductRepository::delete(db.conn(), &product.id, Deadline::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
