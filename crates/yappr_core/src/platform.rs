//! Typed decoding of platform document responses.
//!
//! Responses are either a bare JSON array or `{ "documents": [...] }`.
//! Anything that does not match is an `UnexpectedResponseShape` error.
use crate::codec::from_base64;
use crate::consts::FILTER_VERSION;
use crate::errors::{Result, YapprError};
use crate::filter::BloomFilter;
use crate::identifier::Identifier;
use serde::Deserialize;
use serde_json::Value;

/// "`owner_id` blocks `blocked_id`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockDocument {
    pub owner_id: Identifier,
    pub blocked_id: Identifier,
}

/// A viewer's published block filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFilterDocument {
    pub owner_id: Identifier,
    pub filter_data: String,
    pub item_count: u64,
    pub version: u32,
}

impl BlockFilterDocument {
    pub fn to_filter(&self) -> Result<BloomFilter> {
        if self.version != FILTER_VERSION {
            return Err(YapprError::UnsupportedFilterVersion {
                found: self.version,
                expected: FILTER_VERSION,
            });
        }
        from_base64(&self.filter_data, self.item_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformDocument {
    Block(BlockDocument),
    BlockFilter(BlockFilterDocument),
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "$type", default)]
    doc_type: Option<String>,
    #[serde(rename = "$ownerId")]
    owner_id: Identifier,
    #[serde(rename = "blockedId")]
    blocked_id: Identifier,
}

fn default_version() -> u32 {
    FILTER_VERSION
}

#[derive(Deserialize)]
struct RawBlockFilter {
    #[serde(rename = "$ownerId")]
    owner_id: Identifier,
    #[serde(rename = "filterData")]
    filter_data: String,
    #[serde(rename = "itemCount", default)]
    item_count: u64,
    #[serde(default = "default_version")]
    version: u32,
}

#[derive(Deserialize)]
#[serde(tag = "$type")]
enum RawDocument {
    #[serde(rename = "block")]
    Block {
        #[serde(rename = "$ownerId")]
        owner_id: Identifier,
        #[serde(rename = "blockedId")]
        blocked_id: Identifier,
    },
    #[serde(rename = "blockFilter")]
    BlockFilter {
        #[serde(rename = "$ownerId")]
        owner_id: Identifier,
        #[serde(rename = "filterData")]
        filter_data: String,
        #[serde(rename = "itemCount", default)]
        item_count: u64,
        #[serde(default = "default_version")]
        version: u32,
    },
}

impl From<RawBlockFilter> for BlockFilterDocument {
    fn from(r: RawBlockFilter) -> Self {
        Self {
            owner_id: r.owner_id,
            filter_data: r.filter_data,
            item_count: r.item_count,
            version: r.version,
        }
    }
}

impl From<RawDocument> for PlatformDocument {
    fn from(r: RawDocument) -> Self {
        match r {
            RawDocument::Block { owner_id, blocked_id } => {
                PlatformDocument::Block(BlockDocument { owner_id, blocked_id })
            }
            RawDocument::BlockFilter { owner_id, filter_data, item_count, version } => {
                PlatformDocument::BlockFilter(BlockFilterDocument {
                    owner_id,
                    filter_data,
                    item_count,
                    version,
                })
            }
        }
    }
}

fn shape(msg: impl Into<String>) -> YapprError {
    YapprError::UnexpectedResponseShape(msg.into())
}

/// Unwrap the list envelope.
fn document_list(value: &Value) -> Result<&Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("documents") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(shape(format!(
                "`documents` must be an array, got {}",
                kind_of(other)
            ))),
            None => Err(shape("object response without `documents`")),
        },
        other => Err(shape(format!("expected array or object, got {}", kind_of(other)))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_one<T: for<'de> Deserialize<'de>>(i: usize, v: &Value) -> Result<T> {
    T::deserialize(v).map_err(|e| shape(format!("document {i}: {e}")))
}

/// Block documents; a `$type`, when present, must be `block`.
pub fn decode_block_documents(value: &Value) -> Result<Vec<BlockDocument>> {
    let items = document_list(value)?;
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let raw: RawBlock = decode_one(i, v)?;
        if let Some(t) = raw.doc_type.as_deref() {
            if t != "block" {
                return Err(shape(format!("document {i}: expected type `block`, got `{t}`")));
            }
        }
        out.push(BlockDocument { owner_id: raw.owner_id, blocked_id: raw.blocked_id });
    }
    Ok(out)
}

pub fn decode_block_filter_document(value: &Value) -> Result<BlockFilterDocument> {
    let raw: RawBlockFilter = decode_one(0, value)?;
    Ok(raw.into())
}

/// Mixed responses, discriminated by `$type`.
pub fn decode_documents(value: &Value) -> Result<Vec<PlatformDocument>> {
    let items = document_list(value)?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| decode_one::<RawDocument>(i, v).map(PlatformDocument::from))
        .collect()
}
