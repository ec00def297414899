//! Connection and transaction carrier.
//!
//! A [`Session`] is either the pool itself or one open transaction. It is
//! passed explicitly to [`crate::queries::Queries`] methods, so code that
//! does not care which it has can run the same way in and out of a
//! transaction.
//!
//! ```rust,ignore
//! let session = Session::connect("postgres://localhost/app", 5).await?;
//! let tx = session.begin().await?;
//! users.insert(&tx, &mut user).await?;
//! audit.insert(&tx, &mut entry).await?;
//! tx.commit().await?;
//! ```

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DaoError, DaoResult};

type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

#[derive(Clone)]
pub(crate) enum Handle {
    Pool(PgPool),
    Tx(SharedTx),
}

/// A pool or an open transaction.
#[derive(Clone)]
pub struct Session {
    pub(crate) handle: Handle,
}

impl Session {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            handle: Handle::Pool(pool),
        }
    }

    /// Connect a new pool.
    pub async fn connect(url: &str, max_connections: u32) -> DaoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self.handle, Handle::Tx(_))
    }

    /// Start a transaction.
    ///
    /// On a session that is already a transaction this returns a handle to
    /// the same transaction: committing or rolling back through either
    /// handle ends it for both.
    pub async fn begin(&self) -> DaoResult<Session> {
        match &self.handle {
            Handle::Pool(pool) => {
                let tx = pool.begin().await?;
                debug!("transaction started");
                Ok(Self {
                    handle: Handle::Tx(Arc::new(Mutex::new(Some(tx)))),
                })
            }
            Handle::Tx(_) => Ok(self.clone()),
        }
    }

    /// Commit the transaction. No-op on a pool session.
    pub async fn commit(&self) -> DaoResult<()> {
        if let Some(tx) = self.take_tx().await? {
            tx.commit().await?;
            debug!("transaction committed");
        }
        Ok(())
    }

    /// Roll back the transaction. No-op on a pool session.
    pub async fn rollback(&self) -> DaoResult<()> {
        if let Some(tx) = self.take_tx().await? {
            tx.rollback().await?;
            debug!("transaction rolled back");
        }
        Ok(())
    }

    /// The underlying pool, when this is not a transaction.
    pub fn pool(&self) -> Option<&PgPool> {
        match &self.handle {
            Handle::Pool(pool) => Some(pool),
            Handle::Tx(_) => None,
        }
    }

    async fn take_tx(&self) -> DaoResult<Option<Transaction<'static, Postgres>>> {
        match &self.handle {
            Handle::Pool(_) => Ok(None),
            Handle::Tx(shared) => shared
                .lock()
                .await
                .take()
                .map(Some)
                .ok_or(DaoError::TransactionClosed),
        }
    }
}

impl From<PgPool> for Session {
    fn from(pool: PgPool) -> Self {
        Self::new(pool)
    }
}

/// Run `$body` with `$exec` bound to the session's executor.
///
/// A transaction session holds its lock for the duration of `$body`.
macro_rules! with_executor {
    ($session:expr, $exec:ident => $body:expr) => {
        match &$session.handle {
            $crate::session::Handle::Pool(pool) => {
                let $exec = pool;
                $body
            }
            $crate::session::Handle::Tx(shared) => {
                let mut guard = shared.lock().await;
                let tx = guard
                    .as_mut()
                    .ok_or($crate::error::DaoError::TransactionClosed)?;
                let $exec = &mut **tx;
                $body
            }
        }
    };
}

pub(crate) use with_executor;
