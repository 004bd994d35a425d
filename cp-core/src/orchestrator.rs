//! Fingerprint orchestration
//!
//! Reads signals through a [`CollectorRegistry`] in a fixed order, assembles the
//! key and hashes it.
//!
//! - **Exact** ([`Fingerprinter::get_fingerprint`]): eleven fixed signals joined
//!   with `|`, MurmurHash3 with the configured seed (256 by default).
//! - **Custom** ([`compute_fingerprint`]): caller values, each followed by `|`,
//!   same hash.
//! - **Extended** ([`Fingerprinter::get_fingerprint_async`]): every enabled
//!   signal, each followed by `|`, fuzzy digest of the key.
//!   [`compute_fuzzy_fingerprint`] does the same for values collected elsewhere.
//!
//! # Failure policy
//!
//! A failing synchronous collector aborts the computation and its error is
//! returned. A failing asynchronous (permission-gated) collector is logged and
//! dropped: it contributes nothing to the key and is absent from the
//! datapoints, and the fingerprint still completes.

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::exact::DEFAULT_SEED;
use crate::hash::{ctph, murmur};
use crate::settings::{FingerprintOptions, OptionOverrides, Settings};
use crate::signals::{
    joined_key, terminated_key, Capabilities, CollectorRegistry, Datapoint, Datapoints, KeyBuilder,
    Signal,
};
use cp_error::Result;

/// Result of the extended fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyFingerprint {
    /// CTPH digest of the assembled key
    pub digest: String,
    /// Values that went into the key, in key order
    pub datapoints: Datapoints,
}

/// Per-instance fingerprint orchestrator
///
/// Owns its collectors and options; instances share no state.
#[derive(Debug)]
pub struct Fingerprinter {
    registry: CollectorRegistry,
    capabilities: Capabilities,
    options: FingerprintOptions,
    seed: u32,
}

impl Fingerprinter {
    /// Full build, default options, seed 256
    pub fn new(registry: CollectorRegistry) -> Self {
        Self {
            registry,
            capabilities: Capabilities::default(),
            options: FingerprintOptions::default(),
            seed: DEFAULT_SEED,
        }
    }

    /// Configure from persisted settings
    pub fn from_settings(registry: CollectorRegistry, settings: &Settings) -> Result<Self> {
        Ok(Self::new(registry)
            .with_capabilities(settings.capabilities)
            .with_options(settings.fingerprint_options()?)
            .with_seed(settings.seed))
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Base options the async overrides are merged onto
    pub fn with_options(mut self, options: FingerprintOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn options(&self) -> &FingerprintOptions {
        &self.options
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Run one synchronous collector, honouring the build capabilities
    pub fn collect(&self, signal: Signal) -> Result<Datapoint> {
        self.capabilities.ensure(signal)?;
        self.registry.collect(signal)
    }

    // ========================================================================
    // Exact fingerprint
    // ========================================================================

    /// Key of the exact fingerprint: the eleven fixed signals joined with `|`
    pub fn exact_key(&self) -> Result<String> {
        let values = Signal::EXACT
            .iter()
            .map(|signal| self.collect(*signal))
            .collect::<Result<Vec<_>>>()?;
        Ok(joined_key(&values))
    }

    /// 32-bit exact fingerprint of this client
    pub fn get_fingerprint(&self) -> Result<u32> {
        let key = self.exact_key()?;
        let fingerprint = murmur::hash32_str(&key, self.seed);
        debug!(fingerprint, "Computed exact fingerprint");
        Ok(fingerprint)
    }

    /// Exact fingerprint of caller-chosen values, each followed by `|`
    pub fn get_custom_fingerprint<I, T>(&self, values: I) -> u32
    where
        I: IntoIterator<Item = T>,
        T: Into<Datapoint>,
    {
        compute_fingerprint_with_seed(values, self.seed)
    }

    // ========================================================================
    // Extended fingerprint
    // ========================================================================

    /// Extended fuzzy fingerprint
    ///
    /// `overrides` are merged onto this instance's options. Asynchronous
    /// signals are resolved first, in collection order, and only contribute
    /// when they yield a defined value; the synchronous signals follow.
    pub async fn get_fingerprint_async(&self, overrides: &OptionOverrides) -> Result<FuzzyFingerprint> {
        let options = self.options.merged(overrides)?;
        let mut collected = Vec::new();

        for signal in options.enabled().filter(Signal::is_async) {
            match self.registry.collect_async(signal).await {
                Ok(Some(value)) if !value.is_undefined() => collected.push((signal, value)),
                Ok(_) => {
                    debug!(signal = %signal, "Async collector produced no value");
                }
                Err(e) => {
                    warn!(signal = %signal, error = %e, "Dropping failed async collector");
                }
            }
        }

        for signal in options.enabled().filter(|s| !s.is_async()) {
            collected.push((signal, self.collect(signal)?));
        }

        let fingerprint = compute_fuzzy_fingerprint(collected);
        debug!(
            digest = %fingerprint.digest,
            datapoints = fingerprint.datapoints.len(),
            "Computed fuzzy fingerprint"
        );
        Ok(fingerprint)
    }

    /// Callback form of [`get_fingerprint_async`](Self::get_fingerprint_async)
    ///
    /// The callback runs once the fingerprint is complete. On error it is not
    /// called and the error is returned.
    pub async fn get_fingerprint_async_with<F>(&self, overrides: &OptionOverrides, callback: F) -> Result<()>
    where
        F: FnOnce(&str, &Datapoints),
    {
        let fingerprint = self.get_fingerprint_async(overrides).await?;
        callback(&fingerprint.digest, &fingerprint.datapoints);
        Ok(())
    }
}

/// Exact fingerprint of arbitrary values with the default seed
///
/// Every value, the last included, is followed by `|` before hashing.
pub fn compute_fingerprint<I, T>(values: I) -> u32
where
    I: IntoIterator<Item = T>,
    T: Into<Datapoint>,
{
    compute_fingerprint_with_seed(values, DEFAULT_SEED)
}

/// Exact fingerprint of arbitrary values with an explicit seed
pub fn compute_fingerprint_with_seed<I, T>(values: I, seed: u32) -> u32
where
    I: IntoIterator<Item = T>,
    T: Into<Datapoint>,
{
    let values: Vec<Datapoint> = values.into_iter().map(Into::into).collect();
    murmur::hash32_str(&terminated_key(&values), seed)
}

/// Fuzzy fingerprint of values that were already collected, in key order
///
/// Every value is rendered into the key, `undefined` included.
pub fn compute_fuzzy_fingerprint<I>(results: I) -> FuzzyFingerprint
where
    I: IntoIterator<Item = (Signal, Datapoint)>,
{
    let mut key = KeyBuilder::new();
    let mut datapoints = Datapoints::new();
    for (signal, value) in results {
        key.push(&value);
        datapoints.insert(signal, value);
    }

    FuzzyFingerprint {
        digest: ctph::digest_str(&key.finish()),
        datapoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_error::ClientprintError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn stub_registry() -> CollectorRegistry {
        CollectorRegistry::new()
            .with_value(Signal::UserAgent, "UA1")
            .with_value(Signal::ScreenPrint, "1920x1080")
            .with_value(Signal::Plugins, "")
            .with_value(Signal::Fonts, "Arial")
            .with_value(Signal::LocalStorage, true)
            .with_value(Signal::SessionStorage, true)
            .with_value(Signal::TimeZone, "GMT-0500")
            .with_value(Signal::Language, "en-US")
            .with_value(Signal::SystemLanguage, "en-US")
            .with_value(Signal::Cookies, true)
            .with_value(Signal::CanvasPrint, "data:...")
    }

    fn full_registry() -> CollectorRegistry {
        let mut registry = stub_registry();
        for signal in Signal::ALL {
            if !registry.has(signal) && !signal.is_async() {
                registry.register(signal, || Ok(Datapoint::Undefined));
            }
        }
        registry
    }

    #[test]
    fn test_exact_key_layout() {
        let fp = Fingerprinter::new(stub_registry());
        assert_eq!(
            fp.exact_key().unwrap(),
            "UA1|1920x1080||Arial|true|true|GMT-0500|en-US|en-US|true|data:..."
        );
    }

    #[test]
    fn test_exact_fingerprint_pinned() {
        let fp = Fingerprinter::new(stub_registry());
        assert_eq!(fp.get_fingerprint().unwrap(), 2_070_457_555);
        assert_eq!(fp.get_fingerprint().unwrap(), 2_070_457_555);
    }

    #[test]
    fn test_exact_fingerprint_tracks_language() {
        let registry = stub_registry().with_value(Signal::Language, "en");
        let fp = Fingerprinter::new(registry);
        assert_eq!(fp.get_fingerprint().unwrap(), 1_272_121_067);
    }

    #[test]
    fn test_sync_collector_failure_propagates() {
        let registry = stub_registry().with(Signal::Fonts, || {
            Err(ClientprintError::collector_failed("getFonts", "probe crashed"))
        });
        let err = Fingerprinter::new(registry).get_fingerprint().unwrap_err();
        assert!(matches!(err, ClientprintError::CollectorFailed { .. }));
    }

    #[test]
    fn test_custom_fingerprint_includes_last_argument() {
        let a = compute_fingerprint(["custom", "fingerprint"]);
        let b = compute_fingerprint(["custom", "fingerprint :)"]);
        assert_eq!(a, 166_029_777);
        assert_ne!(a, b);

        let fp = Fingerprinter::new(stub_registry());
        assert_eq!(fp.get_custom_fingerprint(["custom", "fingerprint"]), a);
        assert_ne!(a, fp.get_fingerprint().unwrap());
    }

    #[test]
    fn test_custom_fingerprint_mixed_values() {
        let values: Vec<Datapoint> = vec!["a".into(), true.into(), 24u32.into()];
        assert_eq!(
            compute_fingerprint(values),
            murmur::hash32_str("a|true|24|", DEFAULT_SEED)
        );
    }

    #[test]
    fn test_optional_collector_needs_capability() {
        let registry = stub_registry().with_value(Signal::FlashVersion, "32.0.0");
        let fp = Fingerprinter::new(registry).with_capabilities(Capabilities::base());
        assert!(matches!(
            fp.collect(Signal::FlashVersion),
            Err(ClientprintError::CapabilityDisabled { .. })
        ));

        let fp = fp.with_capabilities(Capabilities::flash());
        assert_eq!(fp.collect(Signal::FlashVersion).unwrap(), Datapoint::from("32.0.0"));
    }

    #[test]
    fn test_fuzzy_fingerprint_of_collected_values() {
        let result = compute_fuzzy_fingerprint(vec![
            (Signal::UserAgent, Datapoint::from("UA1")),
            (Signal::Device, Datapoint::Undefined),
            (Signal::Cookies, Datapoint::from(true)),
        ]);
        assert_eq!(result.digest, ctph::digest_str("UA1|undefined|true|"));
        assert_eq!(result.datapoints.len(), 3);
        assert_eq!(
            result.datapoints.signals().collect::<Vec<_>>(),
            vec![Signal::UserAgent, Signal::Device, Signal::Cookies]
        );
    }

    #[tokio::test]
    async fn test_async_defaults_skip_permission_gated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = full_registry().with_async(Signal::LocalIps, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Some(Datapoint::from("192.168.1.2"))) }
        });

        let fp = Fingerprinter::new(registry);
        let result = fp.get_fingerprint_async(&OptionOverrides::new()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!result.datapoints.contains(Signal::LocalIps));
        assert_eq!(result.datapoints.len(), 28);
        assert_eq!(result.datapoints.signals().next(), Some(Signal::UserAgent));
    }

    #[tokio::test]
    async fn test_async_values_come_first() {
        let registry = full_registry()
            .with_async(Signal::LocalIps, || async { Ok(Some(Datapoint::from("192.168.1.2"))) });
        let fp = Fingerprinter::new(registry);
        let overrides = OptionOverrides::new().with("getIPs", true);
        let result = fp.get_fingerprint_async(&overrides).await.unwrap();

        assert_eq!(result.datapoints.signals().next(), Some(Signal::LocalIps));
        assert_eq!(result.datapoints.len(), 29);
    }

    #[tokio::test]
    async fn test_async_failure_is_dropped() {
        let failing = full_registry().with_async(Signal::LocalIps, || async {
            Err(ClientprintError::collector_failed("getIPs", "permission denied"))
        });
        let overrides = OptionOverrides::new().with("getIPs", true);
        let with_failure = Fingerprinter::new(failing)
            .get_fingerprint_async(&overrides)
            .await
            .unwrap();
        let without = Fingerprinter::new(full_registry())
            .get_fingerprint_async(&OptionOverrides::new())
            .await
            .unwrap();

        assert!(!with_failure.datapoints.contains(Signal::LocalIps));
        assert_eq!(with_failure.digest, without.digest);
    }

    #[tokio::test]
    async fn test_async_none_and_undefined_are_not_recorded() {
        let registry = full_registry()
            .with_async(Signal::LocalIps, || async { Ok(None) })
            .with_async(Signal::MediaDevices, || async { Ok(Some(Datapoint::Undefined)) });
        let overrides = OptionOverrides::new()
            .with("getIPs", true)
            .with("getMediaDevices", true);
        let result = Fingerprinter::new(registry)
            .get_fingerprint_async(&overrides)
            .await
            .unwrap();
        assert!(!result.datapoints.contains(Signal::LocalIps));
        assert!(!result.datapoints.contains(Signal::MediaDevices));
    }

    #[tokio::test]
    async fn test_async_sync_failure_propagates() {
        let registry = full_registry().with(Signal::CanvasPrint, || {
            Err(ClientprintError::collector_failed("getCanvasPrint", "no 2d context"))
        });
        let fp = Fingerprinter::new(registry);

        let mut called = false;
        let result = fp
            .get_fingerprint_async_with(&OptionOverrides::new(), |_, _| called = true)
            .await;
        assert!(result.is_err());
        assert!(!called);
    }

    #[tokio::test]
    async fn test_async_callback_receives_digest() {
        let fp = Fingerprinter::new(full_registry());
        let expected = fp.get_fingerprint_async(&OptionOverrides::new()).await.unwrap();

        let mut seen = None;
        fp.get_fingerprint_async_with(&OptionOverrides::new(), |digest, datapoints| {
            seen = Some((digest.to_string(), datapoints.len()));
        })
        .await
        .unwrap();

        assert_eq!(seen, Some((expected.digest, expected.datapoints.len())));
    }

    #[tokio::test]
    async fn test_async_override_removes_signal() {
        let fp = Fingerprinter::new(full_registry());
        let overrides = OptionOverrides::new().with("getCanvasPrint", false);
        let result = fp.get_fingerprint_async(&overrides).await.unwrap();
        assert!(!result.datapoints.contains(Signal::CanvasPrint));
        assert!(fp.options().is_enabled(Signal::CanvasPrint));
    }

    #[tokio::test]
    async fn test_async_unknown_override_fails() {
        let fp = Fingerprinter::new(full_registry());
        let overrides = OptionOverrides::new().with("getShoeSize", true);
        assert!(fp.get_fingerprint_async(&overrides).await.is_err());
    }
}
