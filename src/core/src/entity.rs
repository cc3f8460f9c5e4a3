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

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use silo_common::DataNode;
use uuid::Uuid;

/// Quality label attached to a finalized entity.
///
/// Precedence when several apply: inconsistent over complete over empty
/// over consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every included column appears at least once.
    Complete,
    /// Default: no conflict detected.
    Consistent,
    /// Some column carries two distinct values.
    Inconsistent,
    /// No counted column remains after include filtering.
    Empty,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Complete => "complete",
            Status::Consistent => "consistent",
            Status::Inconsistent => "inconsistent",
            Status::Empty => "empty",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One connected component under construction during dump.
///
/// Member nodes form a multiset; the per-column counts only grow on the
/// first insertion of a distinct node, so a column counted twice means two
/// distinct values collided into the same entity.
pub struct Entity {
    uuid: String,
    nodes: HashMap<DataNode, usize>,
    counts: BTreeMap<String, usize>,
    include: Vec<String>,
}

impl Entity {
    pub fn new(include: Vec<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            nodes: HashMap::new(),
            counts: BTreeMap::new(),
            include,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Record a visit of `node`. Returns `true` iff the node was not
    /// already a member.
    pub fn append(&mut self, node: DataNode) -> bool {
        let key = node.key.clone();
        let count = self.nodes.entry(node).or_insert(0);
        *count += 1;
        let fresh = *count == 1;
        if fresh {
            *self.counts.entry(key).or_insert(0) += 1;
        }
        fresh
    }

    /// Number of distinct member nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Close the entity: filter counts by the include order when non-empty,
    /// derive the status and log the result.
    pub fn finalize(self) -> (Status, BTreeMap<String, usize>) {
        let counts = if self.include.is_empty() {
            self.counts
        } else {
            self.include
                .iter()
                .filter_map(|key| self.counts.get(key).map(|count| (key.clone(), *count)))
                .collect()
        };

        let mut status = if !self.include.is_empty() && counts.len() == self.include.len() {
            Status::Complete
        } else if counts.is_empty() {
            Status::Empty
        } else {
            Status::Consistent
        };
        if counts.values().any(|count| *count > 1) {
            status = Status::Inconsistent;
        }

        if status == Status::Inconsistent {
            tracing::warn!(uuid = %self.uuid, status = %status, counts = ?counts, "entity identified");
        } else {
            tracing::info!(uuid = %self.uuid, status = %status, counts = ?counts, "entity identified");
        }

        (status, counts)
    }
}

#[cfg(test)]
mod tests {
    use silo_common::Value;

    use super::*;

    fn node(key: &str, value: i64) -> DataNode {
        DataNode::new(key, Value::Int(value))
    }

    #[test]
    fn test_append_reports_first_insertion() {
        let mut entity = Entity::new(Vec::new());
        assert!(entity.append(node("a", 1)));
        assert!(!entity.append(node("a", 1)));
        assert!(entity.append(node("a", 2)));
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn test_consistent_without_include() {
        let mut entity = Entity::new(Vec::new());
        entity.append(node("a", 1));
        entity.append(node("b", 2));
        let (status, counts) = entity.finalize();
        assert_eq!(status, Status::Consistent);
        assert_eq!(counts, BTreeMap::from([("a".into(), 1), ("b".into(), 1)]));
    }

    #[test]
    fn test_complete_when_every_included_column_appears() {
        let mut entity = Entity::new(vec!["a".into(), "b".into()]);
        entity.append(node("a", 1));
        entity.append(node("b", 2));
        let (status, _) = entity.finalize();
        assert_eq!(status, Status::Complete);
    }

    #[test]
    fn test_missing_included_column_stays_consistent() {
        let mut entity = Entity::new(vec!["a".into(), "b".into()]);
        entity.append(node("a", 1));
        let (status, counts) = entity.finalize();
        assert_eq!(status, Status::Consistent);
        assert_eq!(counts, BTreeMap::from([("a".into(), 1)]));
    }

    #[test]
    fn test_inconsistent_wins_over_complete() {
        let mut entity = Entity::new(vec!["a".into()]);
        entity.append(node("a", 1));
        entity.append(node("a", 2));
        let (status, counts) = entity.finalize();
        assert_eq!(status, Status::Inconsistent);
        assert_eq!(counts, BTreeMap::from([("a".into(), 2)]));
    }

    #[test]
    fn test_empty_when_include_filters_everything() {
        let mut entity = Entity::new(vec!["z".into()]);
        entity.append(node("a", 1));
        let (status, counts) = entity.finalize();
        assert_eq!(status, Status::Empty);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_revisiting_a_node_does_not_inflate_counts() {
        let mut entity = Entity::new(Vec::new());
        entity.append(node("a", 1));
        entity.append(node("a", 1));
        let (status, counts) = entity.finalize();
        assert_eq!(status, Status::Consistent);
        assert_eq!(counts, BTreeMap::from([("a".into(), 1)]));
    }
}
