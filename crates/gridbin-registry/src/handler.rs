// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Request dispatch for the metadata exchange protocol.
//!
//! The handler is transport-agnostic: whatever carries the frames
//! (sockets, in-process loopback) hands each request frame in and ships
//! the response frame back. Conflicts become mirrored error responses;
//! absence stays absence, never an error.

use crate::registry::MetadataRegistry;
use gridbin::error::MetaError;
use gridbin::meta::{MetaRequest, MetaResponse};
use std::sync::Arc;

/// Applies decoded requests to a [`MetadataRegistry`].
pub struct RegistryHandler {
    registry: Arc<MetadataRegistry>,
}

impl RegistryHandler {
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Handle one decoded request.
    pub fn handle(&self, request: MetaRequest) -> MetaResponse {
        match request {
            MetaRequest::GetType { type_id } => match self.registry.get(type_id) {
                Some(meta) => MetaResponse::TypeFound((*meta).clone()),
                None => MetaResponse::TypeUnknown,
            },
            MetaRequest::GetSchema { type_id, schema_id } => {
                match self.registry.get_schema(type_id, schema_id) {
                    Some(field_ids) => MetaResponse::SchemaFound(field_ids.to_vec()),
                    None => MetaResponse::SchemaUnknown,
                }
            }
            MetaRequest::PutTypes { types } => match self.registry.put_types(types) {
                Ok(()) => MetaResponse::TypesAccepted,
                Err(err) => MetaResponse::Error(err),
            },
            MetaRequest::RegisterType { type_id, type_name } => {
                MetaResponse::TypeRegistered(self.registry.register_type(type_id, &type_name))
            }
            MetaRequest::RegisterEnum { type_name, mapping } => {
                match self.registry.register_enum(&type_name, mapping) {
                    Ok(meta) => MetaResponse::EnumRegistered((*meta).clone()),
                    Err(err) => MetaResponse::Error(err),
                }
            }
        }
    }

    /// Handle one raw frame; malformed requests answer with a `Corrupt`
    /// error frame instead of dropping the exchange.
    pub fn handle_frame(&self, frame: &[u8]) -> Vec<u8> {
        let response = match MetaRequest::decode(frame) {
            Ok(request) => self.handle(request),
            Err(err) => {
                log::warn!("dropping malformed metadata request: {}", err);
                MetaResponse::Error(MetaError::from(err))
            }
        };
        response.encode()
    }
}
