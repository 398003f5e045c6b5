use std::error::Error;

use diesel::{sql_query, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::debug;

pub const SHOP_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Brings the schema up to date.
pub fn apply_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    loop {
        match conn.run_pending_migrations(SHOP_MIGRATIONS) {
            Ok(applied) => {
                for version in applied {
                    debug!(version = %version, "applied migration");
                }
                break;
            }
            // Tables created by an earlier bootstrap without the bookkeeping table.
            Err(e) if e.to_string().contains("already exists") => {
                mark_first_pending(conn)?;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn mark_first_pending(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let pending = conn.pending_migrations(SHOP_MIGRATIONS)?;
    if let Some(first) = pending.first() {
        sql_query("INSERT INTO __diesel_schema_migrations (version) VALUES (?1)")
            .bind::<diesel::sql_types::Text, _>(first.name().version().to_string())
            .execute(conn)?;
    }

    Ok(())
}
