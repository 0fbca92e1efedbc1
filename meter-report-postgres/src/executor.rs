use sqlx::{Postgres, Transaction};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle on one database transaction.
///
/// Every repository of a session holds a clone; statements lock the
/// transaction for their duration. Once committed or rolled back the
/// transaction is consumed and further statements fail.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn commit(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tx = self.tx.lock().await.take();
        let tx = tx.ok_or("Transaction has been consumed")?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tx = self.tx.lock().await.take();
        let tx = tx.ok_or("Transaction has been consumed")?;
        tx.rollback().await?;
        Ok(())
    }

    /// Transaction-scoped advisory lock keyed on `key`, released at commit or rollback.
    pub async fn advisory_lock(&self, key: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let query = sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))").bind(key);
        let mut tx = self.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        query.execute(&mut **transaction).await?;
        Ok(())
    }
}
