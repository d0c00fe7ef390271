// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Networked metadata strategy.
//!
//! Delegates to the cluster's authoritative registry through a byte-level
//! transport and keeps a read-through local view with no expiry (metadata
//! is append-only truth, so staleness only ever means "not yet known
//! here"). Transport failures surface as retryable `Unreachable`, which
//! is a different condition from a type that is genuinely unknown.

use super::processor::MetadataProcessor;
use super::protocol::{MetaRequest, MetaResponse};
use super::schema_cache::SchemaCache;
use super::store::LocalTypeStore;
use super::type_meta::{BinaryTypeMetadata, EnumMapping};
use crate::error::{MetaError, Result};
use crate::{FieldId, SchemaId, TypeId};
use std::fmt;
use std::sync::Arc;

/// Failure raised by a transport. Both kinds are retryable; the split
/// keeps timeouts distinguishable in logs and error chains.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Endpoint not reachable (connection refused, link down, ...).
    Unreachable(String),
    /// The exchange started but did not complete in time.
    TimedOut,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unreachable(reason) => write!(f, "transport unreachable: {}", reason),
            TransportError::TimedOut => write!(f, "transport timed out"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for MetaError {
    fn from(err: TransportError) -> Self {
        MetaError::Unreachable {
            reason: err.to_string(),
        }
    }
}

/// One request/response exchange with the authoritative registry.
///
/// Implementations carry whole frames; connection management, framing,
/// and timeouts live behind this seam.
pub trait MetadataTransport: Send + Sync {
    fn exchange(&self, request: &[u8]) -> std::result::Result<Vec<u8>, TransportError>;
}

/// Metadata processor backed by the cluster registry.
pub struct RemoteMetadataProcessor<T: MetadataTransport> {
    transport: T,
    local: LocalTypeStore,
    /// Schemas fetched by id before their type's full metadata (and thus
    /// its name) was ever seen here.
    schemas: SchemaCache,
}

impl<T: MetadataTransport> RemoteMetadataProcessor<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            local: LocalTypeStore::new(),
            schemas: SchemaCache::new(),
        }
    }

    /// The advisory local view accumulated from responses.
    pub fn local_view(&self) -> &LocalTypeStore {
        &self.local
    }

    fn roundtrip(&self, request: &MetaRequest) -> Result<MetaResponse> {
        let reply = self.transport.exchange(&request.encode())?;
        let response = MetaResponse::decode(&reply)?;
        if let MetaResponse::Error(err) = response {
            return Err(err);
        }
        Ok(response)
    }

    fn cache(&self, meta: BinaryTypeMetadata) -> Result<Arc<BinaryTypeMetadata>> {
        self.local.merge(meta)
    }
}

impl<T: MetadataTransport> MetadataProcessor for RemoteMetadataProcessor<T> {
    fn get_binary_type(&self, type_id: TypeId) -> Result<Option<Arc<BinaryTypeMetadata>>> {
        if let Some(meta) = self.local.get(type_id) {
            return Ok(Some(meta));
        }
        match self.roundtrip(&MetaRequest::GetType { type_id })? {
            MetaResponse::TypeFound(meta) => {
                log::debug!("fetched metadata for type {}", type_id);
                Ok(Some(self.cache(meta)?))
            }
            MetaResponse::TypeUnknown => Ok(None),
            other => Err(unexpected_response("GetType", &other)),
        }
    }

    fn get_binary_types(&self) -> Result<Vec<Arc<BinaryTypeMetadata>>> {
        // Enumeration serves the advisory local view; the full cluster
        // inventory is a registry-side diagnostic.
        Ok(self.local.all())
    }

    fn get_schema(&self, type_id: TypeId, schema_id: SchemaId) -> Result<Option<Arc<[FieldId]>>> {
        if let Some(meta) = self.local.get(type_id) {
            if let Some(schema) = meta.schema(schema_id) {
                return Ok(Some(Arc::clone(schema.field_ids())));
            }
        }
        if let Some(field_ids) = self.schemas.get(type_id, schema_id) {
            return Ok(Some(field_ids));
        }
        match self.roundtrip(&MetaRequest::GetSchema { type_id, schema_id })? {
            MetaResponse::SchemaFound(field_ids) => {
                log::debug!("fetched schema {} of type {}", schema_id, type_id);
                let field_ids: Arc<[FieldId]> = field_ids.into();
                self.schemas.put(type_id, schema_id, Arc::clone(&field_ids));
                Ok(Some(field_ids))
            }
            MetaResponse::SchemaUnknown => Ok(None),
            other => Err(unexpected_response("GetSchema", &other)),
        }
    }

    fn put_binary_types(&self, types: Vec<BinaryTypeMetadata>) -> Result<()> {
        if types.is_empty() {
            return Ok(());
        }
        match self.roundtrip(&MetaRequest::PutTypes {
            types: types.clone(),
        })? {
            MetaResponse::TypesAccepted => {
                for meta in types {
                    log::debug!(
                        "published metadata for '{}' ({} schemas)",
                        meta.type_name(),
                        meta.schemas().len()
                    );
                    self.cache(meta)?;
                }
                Ok(())
            }
            other => Err(unexpected_response("PutTypes", &other)),
        }
    }

    fn register_type(&self, type_id: TypeId, type_name: &str) -> Result<bool> {
        // A locally known, matching binding needs no round trip.
        if let Some(meta) = self.local.get(type_id) {
            if meta.type_name().to_lowercase() == type_name.to_lowercase() {
                return Ok(true);
            }
        }
        match self.roundtrip(&MetaRequest::RegisterType {
            type_id,
            type_name: type_name.to_string(),
        })? {
            MetaResponse::TypeRegistered(accepted) => {
                if !accepted {
                    log::warn!(
                        "type id {} is bound to another name, rejected '{}'",
                        type_id,
                        type_name
                    );
                }
                Ok(accepted)
            }
            other => Err(unexpected_response("RegisterType", &other)),
        }
    }

    fn register_enum(
        &self,
        type_name: &str,
        mapping: EnumMapping,
    ) -> Result<Arc<BinaryTypeMetadata>> {
        match self.roundtrip(&MetaRequest::RegisterEnum {
            type_name: type_name.to_string(),
            mapping,
        })? {
            MetaResponse::EnumRegistered(meta) => self.cache(meta),
            other => Err(unexpected_response("RegisterEnum", &other)),
        }
    }

    fn get_type_name(&self, type_id: TypeId) -> Result<Option<String>> {
        Ok(self
            .get_binary_type(type_id)?
            .map(|meta| meta.type_name().to_string()))
    }
}

fn unexpected_response(operation: &str, response: &MetaResponse) -> MetaError {
    MetaError::Corrupt {
        reason: format!("{} got mismatched response {:?}", operation, response),
    }
}
