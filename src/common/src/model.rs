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

//! The SILO data model: dynamically typed values, nodes, links and rows.
//!
//! A [`DataNode`] is a `(column, value)` pair observed in some input row. Two
//! nodes are equal iff both the column name and the kind-tagged value are
//! equal, so `number(1)` and `string(1)` never unify. The canonical string
//! form `<key>=<kind>(<lexical>)` is the reference for equality and for the
//! binary key produced by [`crate::codec`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::discriminant;

/// A dynamically typed scalar or list carried as node data.
///
/// Numbers are normalized at construction: a finite float with no fractional
/// part inside the `i64` range collapses into [`Value::Int`], so `1` and
/// `1.0` share one canonical form and therefore one binary key.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Build a value from a decoded JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            // Objects are outside the value domain and carry no identity.
            serde_json::Value::Object(_) => Value::Null,
        }
    }

    /// Normalizing float constructor. NaN payloads are collapsed to a single
    /// bit pattern so that equal canonical forms hash equally.
    pub fn float(f: f64) -> Self {
        if f.is_nan() {
            return Value::Float(f64::NAN);
        }
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Value::Int(f as i64)
        } else {
            Value::Float(f)
        }
    }

    /// Convert back into a JSON value, preserving the original kind.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Int(l), Value::Int(r)) => l == r,
            // Bitwise: distinct bit patterns have distinct canonical forms
            // after constructor normalization.
            (Value::Float(l), Value::Float(r)) => l.to_bits() == r.to_bits(),
            (Value::Text(l), Value::Text(r)) => l == r,
            (Value::List(l), Value::List(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil(nil)"),
            Value::Bool(b) => write!(f, "bool({})", b),
            Value::Int(i) => write!(f, "number({})", i),
            Value::Float(x) => write!(f, "number({})", x),
            Value::Text(s) => write!(f, "string({})", s),
            Value::List(items) => {
                f.write_str("slice(")?;
                for item in items {
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A `(column, value)` pair, the vertex type of the equivalence graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataNode {
    pub key: String,
    pub data: Value,
}

impl DataNode {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.data)
    }
}

/// An unordered pair of nodes declared equivalent by co-occurrence in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLink {
    pub e1: DataNode,
    pub e2: DataNode,
}

impl DataLink {
    pub fn new(e1: DataNode, e2: DataNode) -> Self {
        Self { e1, e2 }
    }

    pub fn is_self_link(&self) -> bool {
        self.e1 == self.e2
    }
}

impl fmt::Display for DataLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} <-> {}}}", self.e1, self.e2)
    }
}

/// One input record: an unordered mapping from column name to value.
///
/// Insertion order is kept for stable iteration; a repeated column replaces
/// the earlier value, matching JSON object semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRow {
    columns: Vec<(String, Value)>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut row = Self::new();
        for (column, value) in object {
            row.set(column, Value::from_json(value));
        }
        row
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataRow {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}
