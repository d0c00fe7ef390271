// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! In-process transport for embedded registries.
//!
//! Routes request frames straight into a [`RegistryHandler`], which makes
//! a node its own authoritative registry (single-node deployments,
//! tests). Real deployments put a network transport behind the same
//! trait; connection management is that transport's concern, not ours.

use crate::handler::RegistryHandler;
use gridbin::meta::{MetadataTransport, TransportError};
use std::sync::Arc;

/// Loopback transport over an in-process handler.
#[derive(Clone)]
pub struct LocalTransport {
    handler: Arc<RegistryHandler>,
}

impl LocalTransport {
    pub fn new(handler: Arc<RegistryHandler>) -> Self {
        Self { handler }
    }
}

impl MetadataTransport for LocalTransport {
    fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(self.handler.handle_frame(request))
    }
}
