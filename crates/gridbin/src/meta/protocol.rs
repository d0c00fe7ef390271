// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Metadata exchange wire protocol.
//!
//! Requests and responses are tag-byte framed binary messages built with
//! the same cursors as object encoding. The transport carries whole
//! frames; framing below that (length prefixes, sockets, retries) is the
//! transport's business.

use super::type_meta::{BinarySchema, BinaryTypeMetadata, EnumMapping};
use crate::error::MetaError;
use crate::wire::cursor::{write_string, ByteWriter, Cursor};
use crate::wire::{CodecError, CodecResult};
use crate::{FieldId, SchemaId, TypeId};

/// Requests accepted by the authoritative registry.
#[derive(Debug, Clone)]
pub enum MetaRequest {
    GetType {
        type_id: TypeId,
    },
    GetSchema {
        type_id: TypeId,
        schema_id: SchemaId,
    },
    PutTypes {
        types: Vec<BinaryTypeMetadata>,
    },
    RegisterType {
        type_id: TypeId,
        type_name: String,
    },
    RegisterEnum {
        type_name: String,
        mapping: EnumMapping,
    },
}

/// Responses mirroring each request with success/absent/conflict
/// outcomes.
#[derive(Debug, Clone)]
pub enum MetaResponse {
    TypeFound(BinaryTypeMetadata),
    TypeUnknown,
    SchemaFound(Vec<FieldId>),
    SchemaUnknown,
    TypesAccepted,
    TypeRegistered(bool),
    EnumRegistered(BinaryTypeMetadata),
    Error(MetaError),
}

// ---------------------------------------------------------------------------
// Frame tags
// ---------------------------------------------------------------------------

mod req_tag {
    pub const GET_TYPE: u8 = 1;
    pub const GET_SCHEMA: u8 = 2;
    pub const PUT_TYPES: u8 = 3;
    pub const REGISTER_TYPE: u8 = 4;
    pub const REGISTER_ENUM: u8 = 5;
}

mod resp_tag {
    pub const TYPE_FOUND: u8 = 1;
    pub const TYPE_UNKNOWN: u8 = 2;
    pub const SCHEMA_FOUND: u8 = 3;
    pub const SCHEMA_UNKNOWN: u8 = 4;
    pub const TYPES_ACCEPTED: u8 = 5;
    pub const TYPE_REGISTERED: u8 = 6;
    pub const ENUM_REGISTERED: u8 = 7;
    pub const ERROR: u8 = 8;
}

mod err_code {
    pub const NOT_FOUND: u8 = 1;
    pub const UNREACHABLE: u8 = 2;
    pub const NAME_COLLISION: u8 = 3;
    pub const ENUM_MISMATCH: u8 = 4;
    pub const METADATA_UNAVAILABLE: u8 = 5;
    pub const CORRUPT: u8 = 6;
    pub const SCHEMA_COLLISION: u8 = 7;
    pub const MERGE_CONFLICT: u8 = 8;
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl MetaRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            MetaRequest::GetType { type_id } => {
                w.write_u8(req_tag::GET_TYPE);
                w.write_i32_le(*type_id);
            }
            MetaRequest::GetSchema { type_id, schema_id } => {
                w.write_u8(req_tag::GET_SCHEMA);
                w.write_i32_le(*type_id);
                w.write_i32_le(*schema_id);
            }
            MetaRequest::PutTypes { types } => {
                w.write_u8(req_tag::PUT_TYPES);
                w.write_u32_le(types.len() as u32);
                for meta in types {
                    write_metadata(&mut w, meta);
                }
            }
            MetaRequest::RegisterType { type_id, type_name } => {
                w.write_u8(req_tag::REGISTER_TYPE);
                w.write_i32_le(*type_id);
                write_string(&mut w, type_name);
            }
            MetaRequest::RegisterEnum { type_name, mapping } => {
                w.write_u8(req_tag::REGISTER_ENUM);
                write_string(&mut w, type_name);
                write_mapping(&mut w, mapping);
            }
        }
        w.into_bytes()
    }

    pub fn decode(frame: &[u8]) -> CodecResult<Self> {
        let mut cur = Cursor::new(frame);
        let frame_tag = cur.read_u8()?;
        let request = match frame_tag {
            req_tag::GET_TYPE => MetaRequest::GetType {
                type_id: cur.read_i32_le()?,
            },
            req_tag::GET_SCHEMA => MetaRequest::GetSchema {
                type_id: cur.read_i32_le()?,
                schema_id: cur.read_i32_le()?,
            },
            req_tag::PUT_TYPES => {
                let count = cur.read_u32_le()? as usize;
                let mut types = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    types.push(read_metadata(&mut cur)?);
                }
                MetaRequest::PutTypes { types }
            }
            req_tag::REGISTER_TYPE => MetaRequest::RegisterType {
                type_id: cur.read_i32_le()?,
                type_name: cur.read_string()?,
            },
            req_tag::REGISTER_ENUM => MetaRequest::RegisterEnum {
                type_name: cur.read_string()?,
                mapping: read_mapping(&mut cur)?,
            },
            other => {
                return Err(CodecError::InvalidData {
                    offset: 0,
                    reason: format!("unknown request tag {}", other),
                })
            }
        };
        expect_eof(&cur)?;
        Ok(request)
    }
}

impl MetaResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            MetaResponse::TypeFound(meta) => {
                w.write_u8(resp_tag::TYPE_FOUND);
                write_metadata(&mut w, meta);
            }
            MetaResponse::TypeUnknown => w.write_u8(resp_tag::TYPE_UNKNOWN),
            MetaResponse::SchemaFound(field_ids) => {
                w.write_u8(resp_tag::SCHEMA_FOUND);
                w.write_u32_le(field_ids.len() as u32);
                for id in field_ids {
                    w.write_i32_le(*id);
                }
            }
            MetaResponse::SchemaUnknown => w.write_u8(resp_tag::SCHEMA_UNKNOWN),
            MetaResponse::TypesAccepted => w.write_u8(resp_tag::TYPES_ACCEPTED),
            MetaResponse::TypeRegistered(accepted) => {
                w.write_u8(resp_tag::TYPE_REGISTERED);
                w.write_u8(u8::from(*accepted));
            }
            MetaResponse::EnumRegistered(meta) => {
                w.write_u8(resp_tag::ENUM_REGISTERED);
                write_metadata(&mut w, meta);
            }
            MetaResponse::Error(err) => {
                w.write_u8(resp_tag::ERROR);
                write_error(&mut w, err);
            }
        }
        w.into_bytes()
    }

    pub fn decode(frame: &[u8]) -> CodecResult<Self> {
        let mut cur = Cursor::new(frame);
        let frame_tag = cur.read_u8()?;
        let response = match frame_tag {
            resp_tag::TYPE_FOUND => MetaResponse::TypeFound(read_metadata(&mut cur)?),
            resp_tag::TYPE_UNKNOWN => MetaResponse::TypeUnknown,
            resp_tag::SCHEMA_FOUND => {
                let count = cur.read_u32_le()? as usize;
                let mut field_ids = Vec::with_capacity(count.min(256));
                for _ in 0..count {
                    field_ids.push(cur.read_i32_le()?);
                }
                MetaResponse::SchemaFound(field_ids)
            }
            resp_tag::SCHEMA_UNKNOWN => MetaResponse::SchemaUnknown,
            resp_tag::TYPES_ACCEPTED => MetaResponse::TypesAccepted,
            resp_tag::TYPE_REGISTERED => MetaResponse::TypeRegistered(cur.read_u8()? != 0),
            resp_tag::ENUM_REGISTERED => MetaResponse::EnumRegistered(read_metadata(&mut cur)?),
            resp_tag::ERROR => MetaResponse::Error(read_error(&mut cur)?),
            other => {
                return Err(CodecError::InvalidData {
                    offset: 0,
                    reason: format!("unknown response tag {}", other),
                })
            }
        };
        expect_eof(&cur)?;
        Ok(response)
    }
}

fn expect_eof(cur: &Cursor<'_>) -> CodecResult<()> {
    if cur.is_eof() {
        Ok(())
    } else {
        Err(CodecError::InvalidData {
            offset: cur.offset(),
            reason: "trailing bytes after message".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Metadata payloads
// ---------------------------------------------------------------------------

fn write_metadata(w: &mut ByteWriter, meta: &BinaryTypeMetadata) {
    w.write_i32_le(meta.type_id());
    write_string(w, meta.type_name());
    match meta.affinity_key_field() {
        Some(field) => {
            w.write_u8(1);
            write_string(w, field);
        }
        None => w.write_u8(0),
    }
    match meta.enum_mapping() {
        Some(mapping) => {
            w.write_u8(1);
            write_mapping(w, mapping);
        }
        None => {
            w.write_u8(0);
            w.write_u32_le(meta.schemas().len() as u32);
            for schema in meta.schemas() {
                w.write_i32_le(schema.id());
                w.write_u32_le(schema.field_ids().len() as u32);
                for id in schema.field_ids().iter() {
                    w.write_i32_le(*id);
                }
            }
        }
    }
}

fn read_metadata(cur: &mut Cursor<'_>) -> CodecResult<BinaryTypeMetadata> {
    let type_id = cur.read_i32_le()?;
    let type_name = cur.read_string()?;
    let affinity = if cur.read_u8()? != 0 {
        Some(cur.read_string()?)
    } else {
        None
    };
    if cur.read_u8()? != 0 {
        let mapping = read_mapping(cur)?;
        Ok(BinaryTypeMetadata::from_parts(
            type_id,
            type_name,
            affinity,
            Vec::new(),
            Some(mapping),
        ))
    } else {
        let schema_count = cur.read_u32_le()? as usize;
        let mut schemas = Vec::with_capacity(schema_count.min(64));
        for _ in 0..schema_count {
            let schema_id = cur.read_i32_le()?;
            let field_count = cur.read_u32_le()? as usize;
            let mut field_ids = Vec::with_capacity(field_count.min(256));
            for _ in 0..field_count {
                field_ids.push(cur.read_i32_le()?);
            }
            schemas.push(BinarySchema::from_parts(schema_id, field_ids));
        }
        Ok(BinaryTypeMetadata::from_parts(
            type_id, type_name, affinity, schemas, None,
        ))
    }
}

fn write_mapping(w: &mut ByteWriter, mapping: &EnumMapping) {
    w.write_u32_le(mapping.pairs().len() as u32);
    for (name, ordinal) in mapping.pairs() {
        write_string(w, name);
        w.write_i32_le(*ordinal);
    }
}

fn read_mapping(cur: &mut Cursor<'_>) -> CodecResult<EnumMapping> {
    let count = cur.read_u32_le()? as usize;
    let mut pairs = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        let name = cur.read_string()?;
        let ordinal = cur.read_i32_le()?;
        pairs.push((name, ordinal));
    }
    Ok(EnumMapping::new(pairs))
}

// ---------------------------------------------------------------------------
// Error payloads
// ---------------------------------------------------------------------------

fn write_error(w: &mut ByteWriter, err: &MetaError) {
    match err {
        MetaError::NotFound { what } => {
            w.write_u8(err_code::NOT_FOUND);
            write_string(w, what);
        }
        MetaError::Unreachable { reason } => {
            w.write_u8(err_code::UNREACHABLE);
            write_string(w, reason);
        }
        MetaError::NameCollision {
            type_id,
            existing,
            requested,
        } => {
            w.write_u8(err_code::NAME_COLLISION);
            w.write_i32_le(*type_id);
            write_string(w, existing);
            write_string(w, requested);
        }
        MetaError::EnumMismatch { type_name } => {
            w.write_u8(err_code::ENUM_MISMATCH);
            write_string(w, type_name);
        }
        MetaError::MetadataUnavailable { what } => {
            w.write_u8(err_code::METADATA_UNAVAILABLE);
            write_string(w, what);
        }
        MetaError::Corrupt { reason } => {
            w.write_u8(err_code::CORRUPT);
            write_string(w, reason);
        }
        MetaError::SchemaCollision { type_id, schema_id } => {
            w.write_u8(err_code::SCHEMA_COLLISION);
            w.write_i32_le(*type_id);
            w.write_i32_le(*schema_id);
        }
        MetaError::MergeConflict { type_name, reason } => {
            w.write_u8(err_code::MERGE_CONFLICT);
            write_string(w, type_name);
            write_string(w, reason);
        }
    }
}

fn read_error(cur: &mut Cursor<'_>) -> CodecResult<MetaError> {
    let code = cur.read_u8()?;
    let err = match code {
        err_code::NOT_FOUND => MetaError::NotFound {
            what: cur.read_string()?,
        },
        err_code::UNREACHABLE => MetaError::Unreachable {
            reason: cur.read_string()?,
        },
        err_code::NAME_COLLISION => MetaError::NameCollision {
            type_id: cur.read_i32_le()?,
            existing: cur.read_string()?,
            requested: cur.read_string()?,
        },
        err_code::ENUM_MISMATCH => MetaError::EnumMismatch {
            type_name: cur.read_string()?,
        },
        err_code::METADATA_UNAVAILABLE => MetaError::MetadataUnavailable {
            what: cur.read_string()?,
        },
        err_code::CORRUPT => MetaError::Corrupt {
            reason: cur.read_string()?,
        },
        err_code::SCHEMA_COLLISION => MetaError::SchemaCollision {
            type_id: cur.read_i32_le()?,
            schema_id: cur.read_i32_le()?,
        },
        err_code::MERGE_CONFLICT => MetaError::MergeConflict {
            type_name: cur.read_string()?,
            reason: cur.read_string()?,
        },
        other => {
            return Err(CodecError::InvalidData {
                offset: cur.offset().saturating_sub(1),
                reason: format!("unknown error code {}", other),
            })
        }
    };
    Ok(err)
}
