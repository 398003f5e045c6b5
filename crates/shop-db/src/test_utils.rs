//! Test helpers: a throwaway database file with the schema applied, and
//! seed functions for the common fixtures.

use std::path::PathBuf;

use diesel::{prelude::*, sql_query, sql_types::BigInt};
use tempfile::TempDir;

use crate::{
    connection::{ConnectionOptions, DbConnection},
    deadline::Deadline,
    models::{
        catalog::{NewCategory, NewProduct},
        user::{NewUser, Role},
    },
    repository::{ProductRepository, UserRepository},
    schema::categories,
};

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// A migrated database in a temporary directory, removed on drop.
pub struct TestDb {
    db: DbConnection,
    path: PathBuf,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let db = DbConnection::open(&path, ConnectionOptions::default()).unwrap();
        Self {
            db,
            path,
            _dir: dir,
        }
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        self.db.conn()
    }

    /// An independent connection to the same database file.
    pub fn open_second(&self) -> DbConnection {
        DbConnection::open(&self.path, ConnectionOptions::default()).unwrap()
    }

    pub fn seed_category(&mut self, title: &str) -> i32 {
        diesel::insert_into(categories::table)
            .values(NewCategory { title })
            .returning(categories::id)
            .get_result(self.conn())
            .unwrap()
    }

    pub fn seed_product(&mut self, title: &str, price: f64, category_id: i32) -> String {
        ProductRepository::insert(
            self.conn(),
            &new_product(title, price, category_id),
            Deadline::none(),
        )
        .unwrap()
        .id
    }

    pub fn seed_user(&mut self, username: &str) -> String {
        let user = NewUser {
            email: format!("{username}@example.com"),
            password: "$2a$10$hash".to_string(),
            username: username.to_string(),
            role: Role::Customer,
        };
        UserRepository::insert(self.conn(), &user, Deadline::none())
            .unwrap()
            .id
    }
}

pub fn new_product(title: &str, price: f64, category_id: i32) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: String::new(),
        price,
        category_id,
        images: vec![],
    }
}

pub fn count_rows(conn: &mut SqliteConnection, table: &str) -> i64 {
    sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
        .get_result::<CountRow>(conn)
        .unwrap()
        .count
}
