//! Caller-imposed time limits, checked before every store round trip.

use std::time::{Duration, Instant};

use diesel::{prelude::*, sql_query, sql_types::BigInt, sqlite::SqliteConnection};
use tracing::warn;

use crate::error::{DbError, Result};

#[derive(QueryableByName)]
struct BusyTimeoutRow {
    #[diesel(sql_type = BigInt)]
    timeout: i64,
}

/// The connection's current `busy_timeout`, in milliseconds.
pub(crate) fn busy_timeout(conn: &mut SqliteConnection) -> QueryResult<i64> {
    let row = sql_query("PRAGMA busy_timeout").get_result::<BusyTimeoutRow>(conn)?;
    Ok(row.timeout)
}

fn set_busy_timeout(conn: &mut SqliteConnection, millis: i64) -> QueryResult<()> {
    sql_query(format!("PRAGMA busy_timeout = {millis}")).execute(conn)?;
    Ok(())
}

/// An optional point in time after which no further statements are issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No limit.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    pub fn at(instant: Instant) -> Self {
        Self {
            at: Some(instant),
        }
    }

    /// Builds a deadline from a millisecond budget, where `None` or `0` means unlimited.
    pub fn from_millis(millis: Option<u64>) -> Self {
        match millis {
            Some(ms) if ms > 0 => Self::after(Duration::from_millis(ms)),
            _ => Self::none(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fails with [`DbError::Timeout`] once the deadline has passed.
    pub fn check(&self, activity: &str) -> Result<()> {
        if self.is_expired() {
            return Err(DbError::Timeout(activity.to_string()));
        }
        Ok(())
    }

    /// Runs `f` with SQLite's lock wait capped at the time left, then puts
    /// the connection's own `busy_timeout` back.
    pub(crate) fn with_lock_wait<T>(
        &self,
        conn: &mut SqliteConnection,
        f: impl FnOnce(&mut SqliteConnection) -> T,
    ) -> Result<T> {
        let Some(remaining) = self.remaining() else {
            return Ok(f(conn));
        };

        let configured = busy_timeout(conn)?;
        let remaining_ms = i64::try_from(remaining.as_millis()).unwrap_or(i64::MAX);
        let capped = configured.min(remaining_ms.max(1));
        if capped == configured {
            return Ok(f(conn));
        }

        set_busy_timeout(conn, capped)?;
        let out = f(conn);
        // `f` may have opened a transaction; a failed restore must not hide it.
        if let Err(err) = set_busy_timeout(conn, configured) {
            warn!(error = %err, configured, "could not restore busy_timeout");
        }
        Ok(out)
    }
}
