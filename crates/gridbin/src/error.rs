// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Error taxonomy for metadata resolution and decoding.
//!
//! `NotFound` and `Unreachable` are the only recoverable kinds: callers
//! retry once with registration/fetch before surfacing them. Everything
//! else propagates immediately — returning wrong field values is strictly
//! worse than failing.

use crate::wire::CodecError;
use crate::{SchemaId, TypeId};
use std::fmt;

/// Errors surfaced by metadata lookup, registration, and decoding.
#[derive(Debug, Clone)]
pub enum MetaError {
    /// Type or schema genuinely absent. Non-fatal: register and retry.
    NotFound { what: String },

    /// Authoritative store not reachable (includes timeouts). Retryable.
    Unreachable { reason: String },

    /// TypeId already bound to a different name.
    NameCollision {
        type_id: TypeId,
        existing: String,
        requested: String,
    },

    /// Enum re-registered with a different mapping.
    EnumMismatch { type_name: String },

    /// No-op strategy in use and name-based access was attempted.
    MetadataUnavailable { what: String },

    /// Wire data cannot be resolved (unknown schema, malformed bytes).
    Corrupt { reason: String },

    /// Same SchemaId computed for two different field-id lists.
    SchemaCollision {
        type_id: TypeId,
        schema_id: SchemaId,
    },

    /// Metadata merge hit an object/enum kind or affinity-key divergence.
    MergeConflict { type_name: String, reason: String },
}

impl MetaError {
    /// True for kinds the caller is expected to retry once.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MetaError::NotFound { .. } | MetaError::Unreachable { .. }
        )
    }
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaError::NotFound { what } => write!(f, "not found: {}", what),
            MetaError::Unreachable { reason } => {
                write!(f, "metadata registry unreachable: {}", reason)
            }
            MetaError::NameCollision {
                type_id,
                existing,
                requested,
            } => write!(
                f,
                "type id {} already bound to '{}', cannot bind '{}'",
                type_id, existing, requested
            ),
            MetaError::EnumMismatch { type_name } => {
                write!(f, "enum '{}' already registered with a different mapping", type_name)
            }
            MetaError::MetadataUnavailable { what } => {
                write!(f, "metadata unavailable: {}", what)
            }
            MetaError::Corrupt { reason } => write!(f, "corrupt binary data: {}", reason),
            MetaError::SchemaCollision { type_id, schema_id } => write!(
                f,
                "schema id {} of type {} collides with a different field set",
                schema_id, type_id
            ),
            MetaError::MergeConflict { type_name, reason } => {
                write!(f, "metadata conflict for '{}': {}", type_name, reason)
            }
        }
    }
}

impl std::error::Error for MetaError {}

impl From<CodecError> for MetaError {
    fn from(err: CodecError) -> Self {
        MetaError::Corrupt {
            reason: err.to_string(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(MetaError::NotFound { what: "t".into() }.is_retryable());
        assert!(MetaError::Unreachable { reason: "r".into() }.is_retryable());
        assert!(!MetaError::Corrupt { reason: "c".into() }.is_retryable());
        assert!(!MetaError::EnumMismatch {
            type_name: "Color".into()
        }
        .is_retryable());
    }

    #[test]
    fn codec_error_becomes_corrupt() {
        let codec = CodecError::ReadFailed {
            offset: 3,
            reason: "unexpected end of buffer".into(),
        };
        let err: MetaError = codec.into();
        match err {
            MetaError::Corrupt { reason } => {
                assert!(reason.contains("offset 3"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn display_mentions_both_names_on_collision() {
        let err = MetaError::NameCollision {
            type_id: 42,
            existing: "Person".into(),
            requested: "Parcel".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Person"));
        assert!(text.contains("Parcel"));
    }
}
