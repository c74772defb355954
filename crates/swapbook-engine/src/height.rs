//! Block height sources.
//!
//! The engine never reads the chain itself. Every peek and pop on an
//! [`OrderQueue`](crate::OrderQueue) awaits a [`BlockHeightSource`] and
//! uses the answer to evict expired orders. A failing source fails the
//! peek or pop that asked.

use std::future::{self, Future};
use std::sync::Arc;

use swapbook_types::{BlockHeight, Result, SwapbookError};
use tokio::sync::watch;

/// Anything that can report the current block height.
pub trait BlockHeightSource {
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send;
}

impl<S: BlockHeightSource + ?Sized> BlockHeightSource for &S {
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send {
        (**self).current_height()
    }
}

impl<S: BlockHeightSource + ?Sized> BlockHeightSource for Arc<S> {
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send {
        (**self).current_height()
    }
}

// ---------------------------------------------------------------------------
// FixedHeight
// ---------------------------------------------------------------------------

/// A height that never moves. Used for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeight(pub BlockHeight);

impl FixedHeight {
    #[must_use]
    pub fn new(height: u64) -> Self {
        Self(BlockHeight(height))
    }
}

impl BlockHeightSource for FixedHeight {
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send {
        future::ready(Ok(self.0))
    }
}

// ---------------------------------------------------------------------------
// FnHeightSource
// ---------------------------------------------------------------------------

/// Adapts an async callable into a [`BlockHeightSource`]. See [`height_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnHeightSource<F>(F);

/// Wrap `f` as a height source.
///
/// ```
/// use swapbook_engine::height::height_fn;
/// use swapbook_types::BlockHeight;
///
/// let source = height_fn(|| async { Ok(BlockHeight(7)) });
/// # let _ = &source;
/// ```
pub fn height_fn<F, Fut>(f: F) -> FnHeightSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<BlockHeight>> + Send,
{
    FnHeightSource(f)
}

impl<F, Fut> BlockHeightSource for FnHeightSource<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<BlockHeight>> + Send,
{
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send {
        (self.0)()
    }
}

// ---------------------------------------------------------------------------
// WatchHeight
// ---------------------------------------------------------------------------

/// Height published by a chain follower over a `tokio::sync::watch` channel.
///
/// Reads the latest published value. Once the sender is dropped the follower
/// is gone and every read fails with `HeightSourceClosed`.
#[derive(Debug, Clone)]
pub struct WatchHeight {
    rx: watch::Receiver<u64>,
}

impl WatchHeight {
    #[must_use]
    pub fn new(rx: watch::Receiver<u64>) -> Self {
        Self { rx }
    }

    /// A sender/source pair starting at `initial`.
    #[must_use]
    pub fn channel(initial: u64) -> (watch::Sender<u64>, Self) {
        let (tx, rx) = watch::channel(initial);
        (tx, Self::new(rx))
    }

    fn read(&self) -> Result<BlockHeight> {
        self.rx
            .has_changed()
            .map_err(|_| SwapbookError::HeightSourceClosed)?;
        Ok(BlockHeight(*self.rx.borrow()))
    }
}

impl BlockHeightSource for WatchHeight {
    fn current_height(&self) -> impl Future<Output = Result<BlockHeight>> + Send {
        future::ready(self.read())
    }
}
