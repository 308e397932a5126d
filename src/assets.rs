// SPDX-License-Identifier: GPL-3.0-only

//! Offline asset cache
//!
//! A static manifest of resource entries is installed into a cache
//! directory named after the manifest version. Installation is
//! per-entry best-effort: a failing fetch is logged and skipped, the
//! rest of the manifest still lands. Activation evicts every sibling
//! cache whose name differs from the current one, so bumping the
//! version string retires stale caches. Reads are cache-first with the
//! fetcher as fallback.

use crate::constants::assets::{CACHE_VERSION, DEFAULT_ENTRIES};
use crate::errors::AssetError;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Versioned list of resources to keep available offline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    cache_name: String,
    entries: Vec<String>,
}

impl AssetManifest {
    /// The cache name embeds the version; changing either retires the
    /// old cache at the next activation.
    pub fn new<I, S>(name: &str, version: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cache_name: format!("{}-v{}", name, version),
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in scanner manifest
    pub fn builtin() -> Self {
        Self::new("qrsnap", CACHE_VERSION, DEFAULT_ENTRIES.iter().copied())
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Source of asset bytes, by manifest entry
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, entry: &str) -> Result<Vec<u8>, AssetError>;
}

/// Fetcher resolving entries against a local bundle directory
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl AssetFetcher for DirFetcher {
    fn fetch(&self, entry: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(entry);
        fs::read(&path).map_err(|e| AssetError::FetchFailed {
            entry: entry.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Outcome of a manifest installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallReport {
    /// Entries now present in the cache
    pub cached: usize,
    /// Entries that failed to fetch and were skipped
    pub failed: usize,
}

/// Versioned on-disk cache of manifest entries
pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Cache under the user's cache directory
    pub fn default_location() -> Result<Self, AssetError> {
        let base = dirs::cache_dir().ok_or_else(|| AssetError::Io("no cache dir".into()))?;
        Ok(Self::new(base.join("qrsnap")))
    }

    /// Install every manifest entry, skipping individual failures.
    pub fn install(
        &self,
        manifest: &AssetManifest,
        fetcher: &dyn AssetFetcher,
    ) -> Result<InstallReport, AssetError> {
        let dir = self.cache_dir(manifest);
        fs::create_dir_all(&dir)?;

        let mut report = InstallReport::default();
        for entry in manifest.entries() {
            match fetcher.fetch(entry) {
                Ok(bytes) => {
                    let path = dir.join(entry_file_name(entry));
                    fs::write(&path, bytes)?;
                    debug!(entry = %entry, "Asset cached");
                    report.cached += 1;
                }
                Err(e) => {
                    // One bad entry must not abort the rest
                    error!(entry = %entry, error = %e, "Asset fetch failed, skipping");
                    report.failed += 1;
                }
            }
        }

        info!(
            cache = %manifest.cache_name(),
            cached = report.cached,
            failed = report.failed,
            "Asset cache installed"
        );
        Ok(report)
    }

    /// Evict every cache whose name differs from the manifest's.
    /// Returns the number of removed caches.
    pub fn activate(&self, manifest: &AssetManifest) -> Result<usize, AssetError> {
        let mut evicted = 0;
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            // Nothing installed yet; nothing to evict
            Err(_) => return Ok(0),
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy() != manifest.cache_name() && entry.path().is_dir() {
                info!(cache = %name.to_string_lossy(), "Removing stale asset cache");
                fs::remove_dir_all(entry.path())?;
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    /// Cached bytes for an entry, if present
    pub fn lookup(&self, manifest: &AssetManifest, entry: &str) -> Option<Vec<u8>> {
        fs::read(self.cache_dir(manifest).join(entry_file_name(entry))).ok()
    }

    /// Cache-first read: serve the cached copy when present, otherwise
    /// go to the fetcher.
    pub fn fetch_cached(
        &self,
        manifest: &AssetManifest,
        fetcher: &dyn AssetFetcher,
        entry: &str,
    ) -> Result<Vec<u8>, AssetError> {
        if let Some(bytes) = self.lookup(manifest, entry) {
            return Ok(bytes);
        }
        fetcher.fetch(entry)
    }

    fn cache_dir(&self, manifest: &AssetManifest) -> PathBuf {
        self.root.join(manifest.cache_name())
    }
}

/// Flatten an entry (which may be a URL or a relative path) into a
/// single file name inside the cache directory.
fn entry_file_name(entry: &str) -> String {
    entry
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '?' | '#' => '_',
            other => other,
        })
        .collect()
}

/// Convenience for paths in logs and CLI output
pub fn describe_cache_dir(cache: &AssetCache, manifest: &AssetManifest) -> String {
    cache.cache_dir(manifest).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir(tag: &str) -> PathBuf {
        let seq = TEST_DIR_SEQ.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "qrsnap-assets-{}-{}-{}",
            tag,
            std::process::id(),
            seq
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn bundle_with(entries: &[(&str, &[u8])]) -> PathBuf {
        let dir = scratch_dir("bundle");
        for (name, bytes) in entries {
            let path = dir.join(entry_file_name(name));
            fs::write(path, bytes).unwrap();
        }
        dir
    }

    struct FlatFetcher {
        root: PathBuf,
    }

    impl AssetFetcher for FlatFetcher {
        fn fetch(&self, entry: &str) -> Result<Vec<u8>, AssetError> {
            fs::read(self.root.join(entry_file_name(entry))).map_err(|e| {
                AssetError::FetchFailed {
                    entry: entry.to_string(),
                    reason: e.to_string(),
                }
            })
        }
    }

    #[test]
    fn test_install_tolerates_failing_entry() {
        let bundle = bundle_with(&[("a.js", b"aa"), ("c.css", b"cc")]);
        let fetcher = FlatFetcher { root: bundle };
        let cache = AssetCache::new(scratch_dir("cache"));
        let manifest = AssetManifest::new("app", "1", ["a.js", "missing.js", "c.css"]);

        let report = cache.install(&manifest, &fetcher).unwrap();
        assert_eq!(report.cached, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(cache.lookup(&manifest, "a.js").unwrap(), b"aa");
        assert!(cache.lookup(&manifest, "missing.js").is_none());
    }

    #[test]
    fn test_activate_evicts_stale_caches() {
        let bundle = bundle_with(&[("a.js", b"aa")]);
        let fetcher = FlatFetcher { root: bundle };
        let cache = AssetCache::new(scratch_dir("cache"));

        let old = AssetManifest::new("app", "1", ["a.js"]);
        let new = AssetManifest::new("app", "2", ["a.js"]);
        cache.install(&old, &fetcher).unwrap();
        cache.install(&new, &fetcher).unwrap();

        let evicted = cache.activate(&new).unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.lookup(&old, "a.js").is_none());
        assert_eq!(cache.lookup(&new, "a.js").unwrap(), b"aa");
    }

    #[test]
    fn test_activate_on_empty_root_is_noop() {
        let cache = AssetCache::new(std::env::temp_dir().join("qrsnap-assets-nonexistent"));
        let manifest = AssetManifest::new("app", "1", ["a.js"]);
        assert_eq!(cache.activate(&manifest).unwrap(), 0);
    }

    #[test]
    fn test_cache_first_read() {
        let bundle = bundle_with(&[("a.js", b"fresh")]);
        let fetcher = FlatFetcher {
            root: bundle.clone(),
        };
        let cache = AssetCache::new(scratch_dir("cache"));
        let manifest = AssetManifest::new("app", "1", ["a.js"]);

        // Not cached yet: falls back to the fetcher
        assert_eq!(
            cache.fetch_cached(&manifest, &fetcher, "a.js").unwrap(),
            b"fresh"
        );

        cache.install(&manifest, &fetcher).unwrap();
        // Cached copy wins even if the bundle changes afterwards
        fs::write(bundle.join("a.js"), b"changed").unwrap();
        assert_eq!(
            cache.fetch_cached(&manifest, &fetcher, "a.js").unwrap(),
            b"fresh"
        );
    }

    #[test]
    fn test_url_entries_flatten_to_file_names() {
        assert_eq!(
            entry_file_name("https://unpkg.com/onsenui@2.11.2/js/onsenui.min.js"),
            "https___unpkg.com_onsenui@2.11.2_js_onsenui.min.js"
        );
    }
}
