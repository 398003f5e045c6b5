use diesel::{
    connection::{AnsiTransactionManager, TransactionManager},
    result::QueryResult,
    sqlite::SqliteConnection,
};
use tracing::{debug, error, warn};

use super::{WriteState, WriteStep};
use crate::{
    deadline::Deadline,
    error::{DbError, Result},
};

/// A write transaction on a borrowed connection.
///
/// Every exit that is not [`WriteTx::commit`] rolls back: a failing step
/// rolls back before its error is returned, and dropping the guard in any
/// non-terminal state (early return, panic) rolls back from `Drop`.
pub struct WriteTx<'c> {
    conn: &'c mut SqliteConnection,
    state: WriteState,
    deadline: Deadline,
    label: &'static str,
}

impl<'c> WriteTx<'c> {
    /// Opens an immediate transaction so the write lock is taken up front.
    pub fn begin(
        conn: &'c mut SqliteConnection,
        deadline: Deadline,
        label: &'static str,
    ) -> Result<Self> {
        deadline.check(label)?;
        // A held write lock must not outlast the deadline.
        deadline
            .with_lock_wait(&mut *conn, |c| {
                AnsiTransactionManager::begin_transaction_sql(c, "BEGIN IMMEDIATE")
            })
            .and_then(|begun| begun.map_err(DbError::from))
            .map_err(|err| DbError::TransactionBegin(err.to_string()))?;
        debug!(write = label, "transaction open");

        Ok(Self {
            conn,
            state: WriteState::TransactionOpen,
            deadline,
            label,
        })
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Runs one write statement. Any failure, including a missed deadline,
    /// rolls the transaction back before the error is returned.
    pub fn step<T>(
        &mut self,
        step: WriteStep,
        f: impl FnOnce(&mut SqliteConnection) -> QueryResult<T>,
    ) -> Result<T> {
        if let Err(err) = self.deadline.check(self.label) {
            self.rollback(&err);
            return Err(err);
        }

        match f(&mut *self.conn) {
            Ok(value) => {
                self.state = step.reaches();
                debug!(write = self.label, %step, state = ?self.state, "step done");
                Ok(value)
            }
            Err(err) => {
                let err = DbError::from_write(step, err);
                self.rollback(&err);
                Err(err)
            }
        }
    }

    /// Runs a read inside the transaction, such as re-fetching catalog prices.
    pub fn read<T>(
        &mut self,
        f: impl FnOnce(&mut SqliteConnection, Deadline) -> Result<T>,
    ) -> Result<T> {
        let deadline = self.deadline;
        let result = match deadline.check(self.label) {
            Ok(()) => f(&mut *self.conn, deadline),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            self.rollback(err);
        }
        result
    }

    /// Rolls back and returns `err`. For validation failures discovered
    /// mid-write.
    pub fn abort<T>(mut self, err: DbError) -> Result<T> {
        self.rollback(&err);
        Err(err)
    }

    /// Commits. A failed commit leaves no transaction open.
    pub fn commit(mut self) -> Result<()> {
        if let Err(err) = self.deadline.check(self.label) {
            self.rollback(&err);
            return Err(err);
        }

        match AnsiTransactionManager::commit_transaction(&mut *self.conn) {
            Ok(()) => {
                self.state = WriteStep::Commit.reaches();
                debug!(write = self.label, "committed");
                Ok(())
            }
            Err(err) => {
                let err = DbError::WriteFailed {
                    step: WriteStep::Commit,
                    reason: err.to_string(),
                };
                self.rollback(&err);
                Err(err)
            }
        }
    }

    fn in_transaction(&mut self) -> bool {
        AnsiTransactionManager::transaction_manager_status_mut(&mut *self.conn)
            .transaction_depth()
            .map(|depth| depth.is_some())
            .unwrap_or(false)
    }

    fn rollback(&mut self, cause: &DbError) {
        if self.state.is_terminal() {
            return;
        }
        warn!(write = self.label, state = ?self.state, error = %cause, "rolling back");

        if self.in_transaction() {
            if let Err(err) = AnsiTransactionManager::rollback_transaction(&mut *self.conn) {
                error!(write = self.label, error = %err, "rollback failed");
            }
        }
        self.state = WriteState::RolledBack;
    }
}

impl Drop for WriteTx<'_> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            let cause = DbError::WriteFailed {
                step: WriteStep::Commit,
                reason: "transaction left without commit".to_string(),
            };
            self.rollback(&cause);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use diesel::{dsl::count_star, prelude::*, sql_query};

    use super::*;
    use crate::{
        deadline::busy_timeout,
        models::catalog::NewCategory,
        schema::categories,
        test_utils::TestDb,
    };

    fn category_count(conn: &mut SqliteConnection) -> i64 {
        categories::table.select(count_star()).first(conn).unwrap()
    }

    fn insert(conn: &mut SqliteConnection, title: &str) -> QueryResult<usize> {
        diesel::insert_into(categories::table)
            .values(NewCategory { title })
            .execute(conn)
    }

    #[test]
    fn test_commit_persists_and_reaches_terminal_state() {
        let mut db = TestDb::new();
        let mut tx = WriteTx::begin(db.conn(), Deadline::none(), "test").unwrap();
        assert_eq!(tx.state(), WriteState::TransactionOpen);
        tx.step(WriteStep::InsertParent, |c| insert(c, "drinks")).unwrap();
        assert_eq!(tx.state(), WriteState::ParentWritten);
        tx.commit().unwrap();

        assert_eq!(category_count(db.conn()), 1);
    }

    #[test]
    fn test_failed_step_rolls_back_earlier_steps() {
        let mut db = TestDb::new();
        let mut tx = WriteTx::begin(db.conn(), Deadline::none(), "test").unwrap();
        tx.step(WriteStep::InsertParent, |c| insert(c, "drinks")).unwrap();
        let err = tx
            .step(WriteStep::InsertChildren, |c| insert(c, "drinks"))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref r) if r == "category title have been used"));
        assert_eq!(tx.state(), WriteState::RolledBack);
        drop(tx);

        assert_eq!(category_count(db.conn()), 0);
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let mut db = TestDb::new();
        {
            let mut tx = WriteTx::begin(db.conn(), Deadline::none(), "test").unwrap();
            tx.step(WriteStep::InsertParent, |c| insert(c, "drinks")).unwrap();
        }
        assert_eq!(category_count(db.conn()), 0);

        // the connection is usable for a fresh transaction afterwards
        let mut tx = WriteTx::begin(db.conn(), Deadline::none(), "test").unwrap();
        tx.step(WriteStep::InsertParent, |c| insert(c, "snacks")).unwrap();
        tx.commit().unwrap();
        assert_eq!(category_count(db.conn()), 1);
    }

    #[test]
    fn test_missed_deadline_rolls_back() {
        let mut db = TestDb::new();
        let deadline = Deadline::at(Instant::now() + Duration::from_millis(50));
        let mut tx = WriteTx::begin(db.conn(), deadline, "test").unwrap();
        tx.step(WriteStep::InsertParent, |c| insert(c, "drinks")).unwrap();
        std::thread::sleep(Duration::from_millis(80));

        let err = tx
            .step(WriteStep::InsertChildren, |c| insert(c, "snacks"))
            .unwrap_err();
        assert!(matches!(err, DbError::Timeout(_)));
        assert_eq!(tx.state(), WriteState::RolledBack);
        drop(tx);

        assert_eq!(category_count(db.conn()), 0);
    }

    #[test]
    fn test_locked_store_fails_begin_within_deadline() {
        let mut db = TestDb::new();
        let mut other = db.open_second();
        sql_query("BEGIN IMMEDIATE").execute(other.conn()).unwrap();

        let started = Instant::now();
        let result = WriteTx::begin(db.conn(), Deadline::after(Duration::from_millis(200)), "test");
        assert!(matches!(result, Err(DbError::TransactionBegin(_))));
        drop(result);
        assert!(started.elapsed() < Duration::from_secs(3));

        // the configured lock wait is back in place
        assert_eq!(busy_timeout(db.conn()).unwrap(), 5_000);

        sql_query("ROLLBACK").execute(other.conn()).unwrap();
        let tx = WriteTx::begin(db.conn(), Deadline::none(), "test").unwrap();
        tx.commit().unwrap();
    }

    #[test]
    fn test_expired_deadline_never_begins() {
        let mut db = TestDb::new();
        let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
        let err = WriteTx::begin(db.conn(), deadline, "test").err().unwrap();
        assert!(matches!(err, DbError::Timeout(_)));
    }
}
