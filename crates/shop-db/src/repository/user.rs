use diesel::prelude::*;
use tracing::debug;

use crate::{
    deadline::Deadline,
    error::{DbError, Result},
    models::user::{NewUser, NewUserRow, User},
    schema::{roles, users},
    write::{WriteStep, WriteTx},
};

/// Repository for user accounts.
pub struct UserRepository;

impl UserRepository {
    /// Finds a user by id, with the role title.
    pub fn find_one(conn: &mut SqliteConnection, id: &str, deadline: Deadline) -> Result<User> {
        deadline.check("find user")?;
        users::table
            .inner_join(roles::table)
            .filter(users::id.eq(id))
            .select((users::id, users::email, users::username, roles::title))
            .first::<User>(conn)
            .optional()?
            .ok_or_else(|| DbError::NotFound("User".to_string()))
    }

    /// Registers a user. Duplicate email or username is a conflict.
    pub fn insert(conn: &mut SqliteConnection, req: &NewUser, deadline: Deadline) -> Result<User> {
        let mut tx = WriteTx::begin(conn, deadline, "insert user")?;
        let user_id: String = tx.step(WriteStep::InsertParent, |c| {
            diesel::insert_into(users::table)
                .values(NewUserRow {
                    email: &req.email,
                    password: &req.password,
                    username: &req.username,
                    role_id: req.role.id(),
                })
                .returning(users::id)
                .get_result(c)
        })?;
        tx.commit()?;
        debug!(user_id = %user_id, "user registered");

        Self::find_one(conn, &user_id, deadline)
    }
}
