// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Type metadata: the local caches, the processor capability set, and
//! the exchange protocol that keeps them in sync with the cluster.

pub mod processor;
pub mod protocol;
pub mod remote;
pub mod schema_cache;
pub mod store;
pub mod type_meta;

pub use processor::{MetadataProcessor, NoopMetadataProcessor};
pub use protocol::{MetaRequest, MetaResponse};
pub use remote::{MetadataTransport, RemoteMetadataProcessor, TransportError};
pub use schema_cache::{LookupStats, SchemaCache};
pub use store::LocalTypeStore;
pub use type_meta::{BinarySchema, BinaryTypeMetadata, EnumMapping};
