//! Validation options with process-wide defaults.
//!
//! Defaults follow a single-writer-at-init, many-readers-after discipline:
//! set them once before token traffic starts, then every call reads a
//! lock-free snapshot. Per-call overrides merge into a copy of the snapshot
//! and never write back.

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULTS: Lazy<ArcSwap<Options>> =
    Lazy::new(|| ArcSwap::from_pointee(Options::default()));

/// Validation flags applied by the decode and decrypt paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Skip expiry validation.
    pub ignore_exp: bool,
    /// Skip not-before validation.
    pub ignore_nbf: bool,
    /// Skip signature verification entirely.
    pub ignore_signature: bool,
    /// Tolerated clock skew in seconds for `exp`/`nbf`.
    pub max_clock_skew: u64,
    /// Accepted issuers. Empty means issuer is not checked.
    pub valid_iss: Vec<String>,
    /// Accepted audiences. Empty means audience is not checked.
    pub valid_aud: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_exp: false,
            ignore_nbf: false,
            ignore_signature: false,
            max_clock_skew: 0,
            valid_iss: Vec::new(),
            valid_aud: Vec::new(),
        }
    }
}

impl Options {
    /// Current process-wide defaults.
    #[must_use]
    pub fn defaults() -> Arc<Options> {
        DEFAULTS.load_full()
    }

    /// Replace the process-wide defaults.
    ///
    /// Call during single-threaded initialization, before any concurrent
    /// token processing. The swap itself is atomic but the library does not
    /// serialize configuration changes against in-flight validation.
    pub fn set_defaults(options: Options) {
        DEFAULTS.store(Arc::new(options));
    }

    /// Copy of `self` with the override patch applied on top.
    #[must_use]
    pub fn with_overrides(&self, overrides: &OptionsOverride) -> Options {
        Options {
            ignore_exp: overrides.ignore_exp.unwrap_or(self.ignore_exp),
            ignore_nbf: overrides.ignore_nbf.unwrap_or(self.ignore_nbf),
            ignore_signature: overrides
                .ignore_signature
                .unwrap_or(self.ignore_signature),
            max_clock_skew: overrides.max_clock_skew.unwrap_or(self.max_clock_skew),
            valid_iss: overrides
                .valid_iss
                .clone()
                .unwrap_or_else(|| self.valid_iss.clone()),
            valid_aud: overrides
                .valid_aud
                .clone()
                .unwrap_or_else(|| self.valid_aud.clone()),
        }
    }

    /// Effective options for one call: the current defaults with the given
    /// overrides merged in.
    #[must_use]
    pub fn effective(overrides: &OptionsOverride) -> Options {
        Self::defaults().with_overrides(overrides)
    }
}

/// Per-call override patch. Unset fields fall through to the defaults.
#[derive(Debug, Clone, Default)]
pub struct OptionsOverride {
    /// Override expiry validation.
    pub ignore_exp: Option<bool>,
    /// Override not-before validation.
    pub ignore_nbf: Option<bool>,
    /// Override signature verification.
    pub ignore_signature: Option<bool>,
    /// Override tolerated clock skew.
    pub max_clock_skew: Option<u64>,
    /// Override accepted issuers.
    pub valid_iss: Option<Vec<String>>,
    /// Override accepted audiences.
    pub valid_aud: Option<Vec<String>>,
}

impl OptionsOverride {
    /// An empty patch: every field falls through to the defaults.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_do_not_leak_into_defaults() {
        let before = Options::defaults();
        let patch = OptionsOverride {
            ignore_exp: Some(true),
            max_clock_skew: Some(30),
            ..Default::default()
        };
        let effective = Options::effective(&patch);
        assert!(effective.ignore_exp);
        assert_eq!(effective.max_clock_skew, 30);

        let after = Options::defaults();
        assert_eq!(*before, *after);
        assert!(!after.ignore_exp);
        assert_eq!(after.max_clock_skew, 0);
    }

    #[test]
    fn unset_patch_fields_fall_through() {
        let base = Options {
            valid_iss: vec!["example.org".to_string()],
            ..Default::default()
        };
        let merged = base.with_overrides(&OptionsOverride::none());
        assert_eq!(merged, base);
    }
}
