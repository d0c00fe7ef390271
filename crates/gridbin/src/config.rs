// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Marshalling configuration.

/// Per-context marshalling configuration.
///
/// `compact_footer` selects the footer shape (§ wire module docs): compact
/// footers carry offsets only and rely on the metadata registry for
/// by-name access; full footers embed field ids in every object, trading
/// a few bytes per field for independence from the registry. A context
/// wired to the no-op metadata strategy should use full footers, since
/// there is no registry to resolve compact ones.
#[derive(Debug, Clone)]
pub struct BinaryConfiguration {
    compact_footer: bool,
}

impl BinaryConfiguration {
    pub fn new() -> Self {
        Self {
            compact_footer: true,
        }
    }

    /// Builder-style setter for the footer mode.
    #[must_use]
    pub fn compact_footer(mut self, compact: bool) -> Self {
        self.compact_footer = compact;
        self
    }

    pub fn is_compact_footer(&self) -> bool {
        self.compact_footer
    }
}

impl Default for BinaryConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_compact_footers() {
        assert!(BinaryConfiguration::default().is_compact_footer());
    }

    #[test]
    fn builder_setter_flips_mode() {
        let cfg = BinaryConfiguration::new().compact_footer(false);
        assert!(!cfg.is_compact_footer());
    }
}
