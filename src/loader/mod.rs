//! Processing modules that consume ingested buffers.
//!
//! The module is not available up front: it is resolved through a
//! [`ModuleLoader`] only once a buffer is ready, which lets callers inject a
//! fake in tests. [`LazyModule`] resolves once and reuses the result.

mod cartridge;

pub use cartridge::{Cartridge, CartridgeConsumer, Mirroring};

use crate::core::ByteBuffer;
use crate::error::Result;
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A module that takes ownership of an ingested buffer.
pub trait RomConsumer: Send + Sync {
    /// Hands the buffer to the module and returns its report.
    ///
    /// # Errors
    ///
    /// Returns an error if the module rejects the buffer.
    fn accept(&self, rom: ByteBuffer) -> Result<String>;
}

/// Resolves the processing module on demand.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Returns the module, resolving it first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the module can't be resolved.
    async fn resolve(&self) -> Result<Arc<dyn RomConsumer>>;
}

type ModuleInit = Box<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn RomConsumer>>> + Send + Sync>;

/// A module resolved on first use and cached afterwards.
///
/// A failed resolution is not cached; the next call tries again.
///
/// # Examples
///
/// ```
/// use rom_ingest::loader::{CartridgeConsumer, LazyModule, ModuleLoader, RomConsumer};
/// use std::sync::Arc;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let module = LazyModule::new(|| async {
///     Ok::<Arc<dyn RomConsumer>, rom_ingest::Error>(Arc::new(CartridgeConsumer::new()))
/// });
/// assert!(!module.is_resolved());
/// module.resolve().await.unwrap();
/// assert!(module.is_resolved());
/// # });
/// ```
pub struct LazyModule {
    init: ModuleInit,
    cell: OnceCell<Arc<dyn RomConsumer>>,
}

impl LazyModule {
    /// Creates a module resolved by `init` on first use.
    pub fn new<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn RomConsumer>>> + Send + 'static,
    {
        Self {
            init: Box::new(move || init().boxed()),
            cell: OnceCell::new(),
        }
    }

    /// Returns true once the module has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl ModuleLoader for LazyModule {
    async fn resolve(&self) -> Result<Arc<dyn RomConsumer>> {
        let module = self
            .cell
            .get_or_try_init(|| {
                tracing::debug!("resolving processing module");
                (self.init)()
            })
            .await?;
        Ok(Arc::clone(module))
    }
}
