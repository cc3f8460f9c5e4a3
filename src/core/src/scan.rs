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

use itertools::Itertools;
use silo_common::{DataLink, DataNode, DataRow};

use crate::config::Config;

/// Transform one row into its accepted node set and the links among them.
///
/// Null values are dropped, the include filter applies before aliasing, and
/// duplicate nodes within the row collapse. A row that yields a single node
/// produces one self-link so the node still enters the graph; larger sets
/// produce every unordered pair. Quadratic in the node count; rows are
/// expected to be narrow.
pub fn scan_row(config: &Config, row: &DataRow) -> (Vec<DataNode>, Vec<DataLink>) {
    let mut nodes: Vec<DataNode> = Vec::with_capacity(row.len());
    for (column, value) in row.columns() {
        if value.is_null() || !config.accepts(column) {
            continue;
        }
        let key = config.alias_for(column).unwrap_or(column);
        let node = DataNode::new(key, value.clone());
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    let links = match nodes.as_slice() {
        [] => Vec::new(),
        [only] => vec![DataLink::new(only.clone(), only.clone())],
        _ => nodes
            .iter()
            .tuple_combinations()
            .map(|(left, right)| DataLink::new(left.clone(), right.clone()))
            .collect(),
    };

    (nodes, links)
}
