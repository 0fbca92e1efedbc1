//! Schema setup and teardown from the SQL scripts shipped with this crate
//!
//! `migrations/` is applied in ascending file-name order and `cleanup/` in
//! descending order, so each cleanup script undoes the migration of the same
//! number. Tests normally rely on `sqlx::migrate!` instead; these helpers are
//! for provisioning and wiping a database from tooling.

use sqlx::PgPool;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create the report schema
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use meter_report_postgres::repository::db_init::init_database;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_database(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    run_scripts(pool, &script_dir("migrations"), ScriptOrder::Ascending).await
}

/// Drop the report schema, including the `sqlx` migration bookkeeping
pub async fn cleanup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    run_scripts(pool, &script_dir("cleanup"), ScriptOrder::Descending).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptOrder {
    Ascending,
    Descending,
}

fn script_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

/// `.sql` files of `dir`, sorted by file name.
fn sql_scripts(dir: &Path, order: ScriptOrder) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut scripts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("sql") {
            scripts.push(path);
        }
    }
    scripts.sort();
    if order == ScriptOrder::Descending {
        scripts.reverse();
    }
    Ok(scripts)
}

async fn run_scripts(pool: &PgPool, dir: &Path, order: ScriptOrder) -> Result<(), sqlx::Error> {
    for script in sql_scripts(dir, order).map_err(sqlx::Error::Io)? {
        debug!(script = %script.display(), "executing sql script");
        let sql = fs::read_to_string(&script).map_err(sqlx::Error::Io)?;
        sqlx::raw_sql(&sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cleanup_scripts_mirror_migrations() {
        let names = |dir: &str, order| -> Vec<String> {
            sql_scripts(&script_dir(dir), order)
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        let mut cleanup = names("cleanup", ScriptOrder::Descending);
        cleanup.reverse();
        assert_eq!(names("migrations", ScriptOrder::Ascending), cleanup);
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires DATABASE_URL; drops the schema"]
    async fn test_init_and_cleanup() -> Result<(), Box<dyn std::error::Error>> {
        let database_url = std::env::var("DATABASE_URL")?;
        let pool = PgPool::connect(&database_url).await?;

        cleanup_database(&pool).await?;
        init_database(&pool).await?;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name IN ('yantek_report', 'connection_report', 'activity_log') \
             ORDER BY table_name",
        )
        .fetch_all(&pool)
        .await?;
        assert_eq!(tables, vec!["activity_log", "connection_report", "yantek_report"]);

        // Leave the database empty so `sqlx::migrate!` can rebuild it with its bookkeeping.
        cleanup_database(&pool).await?;
        Ok(())
    }
}
