//! Lazily established, process-wide connection slot
//!
//! The first caller opens the connection; every concurrent caller awaits that
//! same in-flight attempt instead of starting its own handshake. Once the slot
//! is closed it never reconnects.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Single-assignment connection holder
#[derive(Debug)]
pub struct SharedConnection<C> {
    cell: OnceCell<C>,
    closed: AtomicBool,
}

impl<C: Clone> SharedConnection<C> {
    /// Create an empty slot; nothing is connected until first use
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Return the memoized connection, running `connect` if none exists yet.
    ///
    /// A failed attempt leaves the slot empty, so the next caller retries.
    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> CacheResult<C>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CacheResult<C>>,
    {
        if self.is_closed() {
            return Err(CacheError::Closed);
        }

        let connection = self
            .cell
            .get_or_try_init(|| async {
                debug!("Opening shared connection");
                connect().await
            })
            .await?;

        // close() may have raced with the handshake
        if self.is_closed() {
            return Err(CacheError::Closed);
        }

        Ok(connection.clone())
    }

    /// Connection established so far, if any
    pub fn get(&self) -> Option<C> {
        self.cell.get().cloned()
    }

    /// Mark the slot closed and hand back the live connection for teardown
    pub fn close(&self) -> Option<C> {
        self.closed.store(true, Ordering::SeqCst);
        self.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<C: Clone> Default for SharedConnection<C> {
    fn default() -> Self {
        Self::new()
    }
}
