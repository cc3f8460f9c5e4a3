// Copyright 2025 SILO Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Self-describing binary codecs for nodes and neighbor sets.
//!
//! A node encodes as a length-prefixed key followed by a kind tag and a
//! big-endian payload; lists recurse with a count prefix. Equal logical
//! values always produce identical bytes (numbers are normalized at
//! construction, see [`crate::model::Value::float`]), so byte equality of
//! encoded nodes is logical equality and the backend can treat keys as
//! opaque ordered bytes.
//!
//! A stored neighbor set is a count followed by length-prefixed node blobs.
//! Set order is not preserved and not observable.

use std::collections::BTreeSet;

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::model::{DataNode, Value};

const TAG_NIL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_SLICE: u8 = 5;

/// Raised on malformed bytes; never on bytes written by this codec, so any
/// occurrence signals store corruption.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unexpected end of encoded data")]
    UnexpectedEof,
    #[error("unknown value tag {0}")]
    UnknownTag(u8),
    #[error("encoded string is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode a node into its binary key form.
pub fn encode_node(node: &DataNode) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + node.key.len());
    put_str(&mut buf, &node.key);
    encode_value(&node.data, &mut buf);
    buf
}

/// Decode a node from the front of `buf`.
pub fn decode_node(buf: &mut impl Buf) -> Result<DataNode, CodecError> {
    let key = get_str(buf)?;
    let data = decode_value(buf)?;
    Ok(DataNode { key, data })
}

/// Decode a node from a full slice.
pub fn decode_node_bytes(bytes: &[u8]) -> Result<DataNode, CodecError> {
    decode_node(&mut &bytes[..])
}

fn encode_value(value: &Value, buf: &mut impl BufMut) {
    match value {
        Value::Null => buf.put_u8(TAG_NIL),
        Value::Bool(b) => {
            buf.put_u8(TAG_BOOL);
            buf.put_u8(*b as u8);
        }
        Value::Int(i) => {
            buf.put_u8(TAG_INT);
            buf.put_i64(*i);
        }
        Value::Float(f) => {
            buf.put_u8(TAG_FLOAT);
            buf.put_u64(f.to_bits());
        }
        Value::Text(s) => {
            buf.put_u8(TAG_STRING);
            put_str(buf, s);
        }
        Value::List(items) => {
            buf.put_u8(TAG_SLICE);
            buf.put_u32(items.len() as u32);
            for item in items {
                encode_value(item, buf);
            }
        }
    }
}

fn decode_value(buf: &mut impl Buf) -> Result<Value, CodecError> {
    ensure_remaining(buf, 1)?;
    let tag = buf.get_u8();
    let value = match tag {
        TAG_NIL => Value::Null,
        TAG_BOOL => {
            ensure_remaining(buf, 1)?;
            Value::Bool(buf.get_u8() != 0)
        }
        TAG_INT => {
            ensure_remaining(buf, 8)?;
            Value::Int(buf.get_i64())
        }
        TAG_FLOAT => {
            ensure_remaining(buf, 8)?;
            Value::Float(f64::from_bits(buf.get_u64()))
        }
        TAG_STRING => Value::Text(get_str(buf)?),
        TAG_SLICE => {
            ensure_remaining(buf, 4)?;
            let len = buf.get_u32() as usize;
            let mut items = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                items.push(decode_value(buf)?);
            }
            Value::List(items)
        }
        other => return Err(CodecError::UnknownTag(other)),
    };
    Ok(value)
}

fn put_str(buf: &mut impl BufMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn get_str(buf: &mut impl Buf) -> Result<String, CodecError> {
    ensure_remaining(buf, 4)?;
    let len = buf.get_u32() as usize;
    ensure_remaining(buf, len)?;
    let bytes = buf.copy_to_bytes(len);
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn ensure_remaining(buf: &impl Buf, len: usize) -> Result<(), CodecError> {
    if buf.remaining() < len {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(())
}

/// Encode a neighbor set of binary node keys.
pub fn encode_neighbor_set(neighbors: &BTreeSet<Vec<u8>>) -> Vec<u8> {
    let total: usize = neighbors.iter().map(|n| 4 + n.len()).sum();
    let mut buf = Vec::with_capacity(4 + total);
    buf.put_u32(neighbors.len() as u32);
    for neighbor in neighbors {
        buf.put_u32(neighbor.len() as u32);
        buf.put_slice(neighbor);
    }
    buf
}

/// Decode a stored neighbor set back into binary node keys.
pub fn decode_neighbor_set(bytes: &[u8]) -> Result<BTreeSet<Vec<u8>>, CodecError> {
    let mut buf = bytes;
    ensure_remaining(&buf, 4)?;
    let len = buf.get_u32() as usize;
    let mut neighbors = BTreeSet::new();
    for _ in 0..len {
        ensure_remaining(&buf, 4)?;
        let blob_len = buf.get_u32() as usize;
        ensure_remaining(&buf, blob_len)?;
        let mut blob = vec![0u8; blob_len];
        buf.copy_to_slice(&mut blob);
        neighbors.insert(blob);
    }
    Ok(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(node: DataNode) {
        let encoded = encode_node(&node);
        let decoded = decode_node_bytes(&encoded).unwrap();
        assert_eq!(node, decoded);
    }

    #[test]
    fn test_node_roundtrip() {
        roundtrip(DataNode::new("id", Value::Int(42)));
        roundtrip(DataNode::new("name", Value::Text("alice".into())));
        roundtrip(DataNode::new("active", Value::Bool(false)));
        roundtrip(DataNode::new("score", Value::Float(2.5)));
        roundtrip(DataNode::new(
            "tags",
            Value::List(vec![Value::Text("a".into()), Value::Null]),
        ));
    }

    #[test]
    fn test_equal_canonical_forms_share_bytes() {
        let from_int = DataNode::new("k", Value::from_json(serde_json::json!(1)));
        let from_float = DataNode::new("k", Value::from_json(serde_json::json!(1.0)));
        assert_eq!(from_int.to_string(), from_float.to_string());
        assert_eq!(encode_node(&from_int), encode_node(&from_float));
    }

    #[test]
    fn test_distinct_kinds_have_distinct_bytes() {
        let number = DataNode::new("k", Value::Int(1));
        let string = DataNode::new("k", Value::Text("1".into()));
        assert_ne!(encode_node(&number), encode_node(&string));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_node_bytes(&[0, 0, 0, 1, b'k', 9]),
            Err(CodecError::UnknownTag(9))
        ));
        assert!(matches!(
            decode_node_bytes(&[0, 0, 0, 10, b'k']),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_neighbor_set_roundtrip_collapses_duplicates() {
        let a = encode_node(&DataNode::new("a", Value::Int(1)));
        let b = encode_node(&DataNode::new("b", Value::Int(2)));
        let set: BTreeSet<_> = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        let decoded = decode_neighbor_set(&encode_neighbor_set(&set)).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.contains(&a) && decoded.contains(&b));
    }
}
