//! Collector registry and build capabilities
//!
//! Collectors are supplied by the embedding application as closures keyed by
//! [`Signal`]. Synchronous collectors return a [`Datapoint`] directly;
//! permission-gated collectors return a future resolving to an optional value.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use cp_error::{ClientprintError, Result};
use serde::{Deserialize, Serialize};

use super::{Datapoint, Signal};

/// Synchronous collector
pub type CollectorFn = Box<dyn Fn() -> Result<Datapoint> + Send + Sync>;

/// Future returned by an asynchronous collector; `None` means nothing was collected
pub type CollectorFuture = Pin<Box<dyn Future<Output = Result<Option<Datapoint>>> + Send>>;

/// Asynchronous collector
pub type AsyncCollectorFn = Box<dyn Fn() -> CollectorFuture + Send + Sync>;

// ============================================================================
// Registry
// ============================================================================

/// Collectors available to one fingerprinter
#[derive(Default)]
pub struct CollectorRegistry {
    sync: HashMap<Signal, CollectorFn>,
    asynchronous: HashMap<Signal, AsyncCollectorFn>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous collector, replacing any previous one for `signal`
    pub fn register<F>(&mut self, signal: Signal, collector: F)
    where
        F: Fn() -> Result<Datapoint> + Send + Sync + 'static,
    {
        self.sync.insert(signal, Box::new(collector));
    }

    /// Register an asynchronous collector, replacing any previous one for `signal`
    pub fn register_async<F, Fut>(&mut self, signal: Signal, collector: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Datapoint>>> + Send + 'static,
    {
        self.asynchronous
            .insert(signal, Box::new(move || Box::pin(collector()) as CollectorFuture));
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, signal: Signal, collector: F) -> Self
    where
        F: Fn() -> Result<Datapoint> + Send + Sync + 'static,
    {
        self.register(signal, collector);
        self
    }

    /// Register a collector that always yields `value`
    pub fn with_value(self, signal: Signal, value: impl Into<Datapoint>) -> Self {
        let value = value.into();
        self.with(signal, move || Ok(value.clone()))
    }

    /// Builder form of [`register_async`](Self::register_async)
    pub fn with_async<F, Fut>(mut self, signal: Signal, collector: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Datapoint>>> + Send + 'static,
    {
        self.register_async(signal, collector);
        self
    }

    /// Whether any collector is registered for `signal`
    pub fn has(&self, signal: Signal) -> bool {
        self.sync.contains_key(&signal) || self.asynchronous.contains_key(&signal)
    }

    /// Run the synchronous collector for `signal`
    pub fn collect(&self, signal: Signal) -> Result<Datapoint> {
        let collector = self
            .sync
            .get(&signal)
            .ok_or_else(|| ClientprintError::CollectorMissing(signal.to_string()))?;
        collector()
    }

    /// Run the collector for `signal`, preferring an asynchronous one
    ///
    /// A synchronous collector registered for the signal is treated as already
    /// resolved.
    pub async fn collect_async(&self, signal: Signal) -> Result<Option<Datapoint>> {
        if let Some(collector) = self.asynchronous.get(&signal) {
            return collector().await;
        }
        self.collect(signal).map(Some)
    }
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sync: Vec<_> = self.sync.keys().collect();
        sync.sort();
        let mut asynchronous: Vec<_> = self.asynchronous.keys().collect();
        asynchronous.sort();
        f.debug_struct("CollectorRegistry")
            .field("sync", &sync)
            .field("async", &asynchronous)
            .finish()
    }
}

// ============================================================================
// Build capabilities
// ============================================================================

/// Optional collectors carried by a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub java: bool,
    #[serde(default)]
    pub flash: bool,
}

impl Capabilities {
    /// Neither Java nor Flash detection
    pub fn base() -> Self {
        Self { java: false, flash: false }
    }

    pub fn java() -> Self {
        Self { java: true, flash: false }
    }

    pub fn flash() -> Self {
        Self { java: false, flash: true }
    }

    pub fn full() -> Self {
        Self { java: true, flash: true }
    }

    /// Name of the build these capabilities correspond to
    pub fn build_name(&self) -> &'static str {
        match (self.java, self.flash) {
            (false, false) => "base",
            (true, false) => "java",
            (false, true) => "flash",
            (true, true) => "full",
        }
    }

    /// Whether `signal` may be collected in this build
    pub fn allows(&self, signal: Signal) -> bool {
        match signal {
            Signal::JavaVersion => self.java,
            Signal::FlashVersion => self.flash,
            _ => true,
        }
    }

    /// Fail with `CapabilityDisabled` if `signal` is not part of this build
    pub fn ensure(&self, signal: Signal) -> Result<()> {
        if self.allows(signal) {
            Ok(())
        } else {
            Err(ClientprintError::CapabilityDisabled {
                signal: signal.to_string(),
                build: self.build_name().to_string(),
            })
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}
