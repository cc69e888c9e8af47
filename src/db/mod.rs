//! Lazily-established, process-shared MongoDB connection.
//!
//! The cache is owned by application state and injected into request
//! handlers; there is no ambient global. The first data operation
//! establishes the connection, every later one reuses the cached handle,
//! and concurrent callers racing the first establishment all await the same
//! attempt.

use std::future::Future;
use std::sync::Arc;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::AppError;

/// Name of the application database opened on the deployment.
pub const DATABASE_NAME: &str = "imaginify";

/// Memoizes the handle produced by the first successful connection attempt.
///
/// Callers that arrive while an attempt is in flight await that same
/// attempt instead of starting their own. A failed attempt caches nothing,
/// so the next caller is free to try again.
#[derive(Debug)]
struct CachedHandle<T> {
    slot: OnceCell<T>,
}

// Manual impl: a derive would bound `T: Default`
impl<T> Default for CachedHandle<T> {
    fn default() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }
}

impl<T> CachedHandle<T> {
    async fn get_or_connect<F, Fut, E>(&self, connect: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.slot.get_or_try_init(connect).await
    }

    fn get(&self) -> Option<&T> {
        self.slot.get()
    }
}

/// Hands request handlers a ready database handle.
///
/// Constructed once at startup from configuration (no I/O); cloning shares
/// the same underlying slot, so every handler in the process sees one
/// connection.
#[derive(Debug, Clone)]
pub struct ConnectionCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    url: Option<String>,
    handle: CachedHandle<Database>,
}

impl ConnectionCache {
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                url,
                handle: CachedHandle::default(),
            }),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mongodb_url.clone())
    }

    /// Return a ready database handle, connecting on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `MONGODB_URL` is unset (on every
    /// call, before touching the network) and `AppError::Database` when
    /// establishment fails. Failed attempts are not cached.
    pub async fn get(&self) -> Result<&Database, AppError> {
        let url = self
            .inner
            .url
            .as_deref()
            .ok_or_else(|| AppError::Config("MONGODB_URL must be set".to_string()))?;

        self.inner.handle.get_or_connect(|| connect(url)).await
    }

    /// Peek at the cached handle without triggering establishment.
    ///
    /// Used by health reporting, which must stay cheap and must not consume
    /// the first-connection attempt.
    #[must_use]
    pub fn handle(&self) -> Option<&Database> {
        self.inner.handle.get()
    }
}

/// Establish a connection and verify the deployment is reachable.
async fn connect(url: &str) -> Result<Database, AppError> {
    tracing::debug!("Establishing database connection...");

    let options = ClientOptions::parse(url)
        .await
        .map_err(|e| AppError::Database(format!("Invalid MongoDB connection string: {e}")))?;

    let client = Client::with_options(options)
        .map_err(|e| AppError::Database(format!("Failed to create MongoDB client: {e}")))?;

    let db = client.database(DATABASE_NAME);

    // The driver opens sockets lazily; ping so establishment failures
    // surface here rather than inside the first query.
    db.run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to database: {e}")))?;

    tracing::info!(database = DATABASE_NAME, "Database connection established");

    Ok(db)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn sequential_calls_reuse_the_cached_handle() {
        let cache = CachedHandle::default();
        let attempts = AtomicUsize::new(0);

        let first = cache
            .get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(7_u32)
            })
            .await
            .copied();

        let second = cache
            .get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(8_u32)
            })
            .await
            .copied();

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_attempt() {
        let cache = Arc::new(CachedHandle::default());
        let attempts = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let attempts = Arc::clone(&attempts);
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_connect(|| async {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(42_u32)
                    })
                    .await
                    .copied()
            }));
        }

        for task in tasks {
            assert_eq!(task.await.unwrap_or(Err(())), Ok(42));
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_attempt_is_not_cached() {
        let cache = CachedHandle::default();
        let attempts = AtomicUsize::new(0);

        let first: Result<&u32, &str> = cache
            .get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err("connection refused")
            })
            .await;

        assert!(first.is_err());
        assert!(cache.get().is_none());

        let second = cache
            .get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(9_u32)
            })
            .await
            .copied();

        assert_eq!(second, Ok(9));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_url_fails_every_call_without_caching() {
        let cache = ConnectionCache::new(None);

        for _ in 0..2 {
            let message = match cache.get().await {
                Ok(_) => String::new(),
                Err(err) => err.to_string(),
            };
            assert!(message.contains("MONGODB_URL"));
        }

        assert!(cache.handle().is_none());
    }

    #[tokio::test]
    async fn unparseable_url_fails_without_caching() {
        let cache = ConnectionCache::new(Some("not-a-connection-string".to_string()));

        for _ in 0..2 {
            let result = cache.get().await;
            assert!(matches!(result, Err(AppError::Database(_))));
        }

        assert!(cache.handle().is_none());
    }
}
