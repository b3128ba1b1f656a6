//! Image resource registry with bulk asynchronous loading
//!
//! Loading follows the launch-then-confirm model: an id is registered in the
//! cache the moment its load begins, and the handle flips to ready (or
//! failed) when the loader finishes. Readers never wait.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use lazy_static::lazy_static;
use thiserror::Error;
use tokio::task::JoinSet;

/// A decoded image as produced by the loader collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Bytes,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Bytes) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

#[derive(Debug)]
enum ImageState {
    Pending,
    Ready(ImageData),
    Failed(String),
}

/// Cheaply clonable handle to a registered image slot. The slot exists from
/// the moment a load is launched; whether the pixels ever arrived is a
/// separate question answered by the state accessors.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    url: String,
    state: Mutex<ImageState>,
}

impl ImageHandle {
    fn pending(url: &str) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                url: url.to_string(),
                state: Mutex::new(ImageState::Pending),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.lock_state(), ImageState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock_state(), ImageState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(*self.lock_state(), ImageState::Failed(_))
    }

    /// Width and height once the image arrived; `None` while pending or after
    /// a failure.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match &*self.lock_state() {
            ImageState::Ready(data) => Some((data.width, data.height)),
            _ => None,
        }
    }

    /// Runs `f` against the decoded image without cloning it; `None` while
    /// pending or after a failure.
    pub fn with_data<T>(&self, f: impl FnOnce(&ImageData) -> T) -> Option<T> {
        match &*self.lock_state() {
            ImageState::Ready(data) => Some(f(data)),
            _ => None,
        }
    }

    fn fulfill(&self, data: ImageData) {
        *self.lock_state() = ImageState::Ready(data);
    }

    fn fail(&self, reason: &str) {
        *self.lock_state() = ImageState::Failed(reason.to_string());
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ImageState> {
        self.inner.state.lock().expect("image state lock poisoned")
    }
}

/// Error produced by a loader collaborator.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by [`ImageLoader::fetch`]. Owns everything it needs, so a
/// launched load keeps running whether or not anyone keeps awaiting it.
pub type ImageFuture = Pin<Box<dyn Future<Output = Result<ImageData, FetchError>> + Send>>;

/// The external image-loading mechanism: a url asynchronously yields a
/// decoded image or an error. No other contract assumed.
pub trait ImageLoader {
    fn fetch(&self, url: &str) -> ImageFuture;
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// A single resource failed; the whole batch fails with it. Entries
    /// registered for the batch stay in the cache.
    #[error("resource '{id}' failed to load from '{url}'")]
    Fetch {
        id: String,
        url: String,
        #[source]
        source: FetchError,
    },
    /// A loader task panicked.
    #[error("resource load task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Registry of resource id → image handle. Interior locking keeps `load`
/// callable through a shared reference without ever holding a guard across an
/// await point.
#[derive(Default)]
pub struct ResourceCache {
    entries: Mutex<HashMap<String, ImageHandle>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered handle for `id`, if a load for it was ever launched.
    /// Never blocks on in-flight loads.
    pub fn get(&self, id: &str) -> Option<ImageHandle> {
        self.lock_entries().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Launches one fetch per `(id, url)` pair and resolves once all of them
    /// finished, or fails as soon as the first one fails. Each id is
    /// registered before its fetch starts, so `get` observes the pair while
    /// the load is still in flight. On failure the in-flight siblings are
    /// detached rather than aborted: they finish into their already
    /// registered handles, and nothing is rolled back.
    pub async fn load<L: ImageLoader>(
        &self,
        loader: &L,
        pairs: &[(String, String)],
    ) -> Result<(), LoadError> {
        if pairs.is_empty() {
            return Ok(());
        }

        let mut inflight = JoinSet::new();
        for (id, url) in pairs {
            let handle = self.register(id, url);
            let fetch = loader.fetch(url);
            let id = id.clone();
            let url = url.clone();
            inflight.spawn(async move {
                match fetch.await {
                    Ok(data) => {
                        handle.fulfill(data);
                        Ok(())
                    }
                    Err(source) => {
                        handle.fail(&source.to_string());
                        Err(LoadError::Fetch { id, url, source })
                    }
                }
            });
        }

        // join_next yields in completion order, which is what makes the
        // failure path fail-fast rather than wait-for-slowest.
        while let Some(joined) = inflight.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    inflight.detach_all();
                    return Err(LoadError::Join(join_err));
                }
            };
            if let Err(err) = outcome {
                inflight.detach_all();
                return Err(err);
            }
        }
        Ok(())
    }

    fn register(&self, id: &str, url: &str) -> ImageHandle {
        let handle = ImageHandle::pending(url);
        self.lock_entries()
            .insert(id.to_string(), handle.clone());
        handle
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, ImageHandle>> {
        self.entries.lock().expect("resource cache lock poisoned")
    }
}

lazy_static! {
    static ref RESOURCES: ResourceCache = ResourceCache::new();
}

/// The shared cache, created lazily on first access and alive for the
/// process lifetime.
pub fn global() -> &'static ResourceCache {
    &RESOURCES
}
