// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! # gridbin - self-describing binary marshalling for distributed caches
//!
//! Client and server processes of a distributed cache exchange
//! user-defined objects without sharing compiled type definitions. Every
//! object travels as compact binary with numeric type and schema ids in
//! its preamble; the metadata that maps those ids back to names and field
//! layouts is synchronized separately, through a cluster-wide registry,
//! and cached aggressively on every node.
//!
//! ## Quick start
//!
//! ```rust
//! use gridbin::{BinaryConfiguration, BinaryContext, BinaryObjectBuilder, Marshaller};
//! use gridbin::meta::NoopMetadataProcessor;
//! use std::sync::Arc;
//!
//! // Full footers: objects stay self-describing without any registry.
//! let ctx = BinaryContext::new(
//!     BinaryConfiguration::new().compact_footer(false),
//!     Arc::new(NoopMetadataProcessor::new()),
//! );
//! let marshaller = Marshaller::new(Arc::new(ctx));
//!
//! let bytes = marshaller
//!     .marshal(&BinaryObjectBuilder::new("Person").field("Id", 100i32).field("Name", "foo"))
//!     .unwrap();
//!
//! let person = marshaller.unmarshal(bytes).unwrap();
//! assert_eq!(person.field("Name").unwrap().unwrap().as_str(), Some("foo"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                    Marshaller / BinaryContext                |
//! |        encode & decode orchestration, retry policy           |
//! +--------------------------------------------------------------+
//! |  wire            |  meta                                     |
//! |  object codec,   |  SchemaCache | LocalTypeStore             |
//! |  cursors, values |  MetadataProcessor (Networked / NoOp)     |
//! +--------------------------------------------------------------+
//! |        MetadataTransport (external network collaborator)     |
//! +--------------------------------------------------------------+
//! ```
//!
//! The authoritative registry lives in the companion
//! `gridbin-registry` crate.

pub mod config;
pub mod error;
pub mod hash;
pub mod marshal;
pub mod meta;
pub mod wire;

/// Stable integer identity of a user type.
pub type TypeId = i32;

/// Stable integer identity of one field layout of a type.
pub type SchemaId = i32;

/// Stable integer identity of a field within a type.
pub type FieldId = i32;

pub use config::BinaryConfiguration;
pub use error::{MetaError, Result};
pub use marshal::{BinaryContext, BinaryObject, Marshaller};
pub use wire::{BinaryObjectBuilder, BinaryValue};
