// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! # gridbin-registry - authoritative type-metadata registry
//!
//! The cluster-side keeper of record for gridbin type metadata. Client
//! nodes talk to it through the metadata exchange protocol; this crate
//! provides the store itself, the request handler, an in-process
//! loopback transport for embedded/single-node use, and a JSON snapshot
//! for diagnostics.
//!
//! ```rust
//! use gridbin::meta::RemoteMetadataProcessor;
//! use gridbin_registry::{LocalTransport, MetadataRegistry, RegistryHandler};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(MetadataRegistry::new());
//! let handler = Arc::new(RegistryHandler::new(Arc::clone(&registry)));
//! let processor = RemoteMetadataProcessor::new(LocalTransport::new(handler));
//! # let _ = processor;
//! ```

pub mod export;
pub mod handler;
pub mod registry;
pub mod transport;

pub use export::{RegistrySnapshot, SchemaSnapshot, TypeSnapshot};
pub use handler::RegistryHandler;
pub use registry::MetadataRegistry;
pub use transport::LocalTransport;
