//! Cancellation signal
//!
//! A [`Canceller`] flips a `watch` channel once; every [`CancelToken`] cloned
//! from it observes the flip at its next suspension point.

use apkbuilder_core::{Error, Result};
use std::future::Future;
use tokio::sync::watch;

/// Sending half, held by whoever decides to stop (Ctrl-C handler, tests)
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

/// Receiving half, threaded through the poll loop
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl Canceller {
    /// New canceller and its first token
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx: Some(rx) })
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        // receivers may already be gone
        let _ = self.tx.send(true);
    }

    /// Another token observing this canceller
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is requested
    ///
    /// Pends forever if the canceller is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Run `fut` unless cancellation wins the race
    ///
    /// On cancellation `fut` is dropped mid-flight and the result is a
    /// `Cancelled` error.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut token = self.clone();
        tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::cancelled()),
            result = fut => result,
        }
    }
}
