use std::{future::Future, str::FromStr, time::Duration};

use futures_util::future::BoxFuture;
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod auctions;
pub mod matches;
pub mod players;
pub mod teams;

#[cfg(test)]
pub mod testing;

const DEFERRED: &str = "BEGIN";
const IMMEDIATE: &str = "BEGIN IMMEDIATE";

/// Process-wide handle to the entity store. Cloning shares the pool.
#[derive(Clone)]
pub struct AuctionStore {
    pool: SqlitePool,
    op_timeout: Duration,
}

impl AuctionStore {
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.op_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Applied database migrations.");

        Ok(Self::new(pool, config.op_timeout))
    }

    pub fn new(pool: SqlitePool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bounds `fut` by the operation deadline.
    pub async fn with_deadline<T, Fut>(&self, fut: Fut) -> AppResult<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| AppError::Timeout)?
    }

    /// Runs `op` inside one deferred transaction, for reads. Commits only when
    /// `op` succeeds; any error, including the deadline expiring, leaves the
    /// store untouched.
    pub async fn transaction<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        self.run(DEFERRED, op).await
    }

    /// Like [`AuctionStore::transaction`], but takes the write lock up front.
    /// Writers queue on the busy timeout instead of failing when a read has
    /// to be upgraded, so compare-on-write alone decides who wins a race.
    pub async fn write_transaction<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        self.run(IMMEDIATE, op).await
    }

    async fn run<T, F>(&self, begin: &'static str, op: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        self.with_deadline(async move {
            let mut tx = self.pool.begin_with(begin).await?;
            match op(&mut *tx).await {
                Ok(value) => {
                    tx.commit().await?;
                    Ok(value)
                }
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!("Rollback after '{}' failed: {}", err, rollback_err);
                    }
                    Err(err)
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::testing;

    #[tokio::test]
    async fn failed_operation_rolls_back_every_write() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;

        let result: AppResult<()> = store
            .transaction(move |conn| {
                Box::pin(async move {
                    teams::insert(conn, auction.id, "Chennai").await?;
                    Err(AppError::conflict("abandon"))
                })
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let mut conn = store.pool().acquire().await.unwrap();
        let teams = teams::list_for_auction(&mut conn, auction.id).await.unwrap();
        assert!(teams.is_empty());
    }

    #[tokio::test]
    async fn operation_past_deadline_times_out() {
        let store = testing::memory_store_with_timeout(Duration::from_millis(50)).await;
        // The single pooled connection stays busy, so the transaction cannot begin.
        let _busy = store.pool().acquire().await.unwrap();

        let result: AppResult<()> = store
            .transaction(|_conn| Box::pin(async move { Ok(()) }))
            .await;
        assert!(matches!(result, Err(AppError::Timeout)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn writers_wait_for_the_lock_instead_of_failing() {
        let (store, _dir) = testing::file_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;

        // Another writer holds the lock while the second transaction reads and then writes.
        let mut holder = store.pool().begin_with(IMMEDIATE).await.unwrap();
        teams::insert(&mut holder, auction.id, "Held").await.unwrap();

        let waiting = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .write_transaction(move |conn| {
                        Box::pin(async move {
                            let before = teams::list_for_auction(&mut *conn, auction.id).await?.len();
                            teams::insert(conn, auction.id, "Queued").await?;
                            Ok(before)
                        })
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        holder.commit().await.unwrap();

        let seen_before = waiting.await.unwrap().unwrap();
        assert_eq!(seen_before, 1);

        let mut conn = store.pool().acquire().await.unwrap();
        assert_eq!(teams::list_for_auction(&mut conn, auction.id).await.unwrap().len(), 2);
    }
}
