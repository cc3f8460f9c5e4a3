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

use std::collections::{HashMap, HashSet};

use silo_common::{Result, SiloError};

/// Scan-time projection and renaming of row columns.
///
/// An empty include set accepts every column. Aliases are applied after the
/// inclusion test, so the substituted key does not itself have to be
/// included. The include order keeps the first-seen insertion order and
/// drives entity-status filtering during dump.
#[derive(Debug, Clone, Default)]
pub struct Config {
    include: HashSet<String>,
    include_order: Vec<String>,
    aliases: HashMap<String, String>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn accepts(&self, column: &str) -> bool {
        self.include.is_empty() || self.include.contains(column)
    }

    pub fn alias_for(&self, column: &str) -> Option<&str> {
        self.aliases.get(column).map(String::as_str)
    }

    pub fn include_order(&self) -> &[String] {
        &self.include_order
    }
}

/// Builds a [`Config`] and validates cross-field consistency: every alias
/// key must be included when the include set is non-empty.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    include: HashSet<String>,
    include_order: Vec<String>,
    aliases: HashMap<String, String>,
}

impl ConfigBuilder {
    pub fn include(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if self.include.insert(column.clone()) {
            self.include_order.push(column);
        }
        self
    }

    pub fn includes<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self = self.include(column);
        }
        self
    }

    pub fn alias(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(column.into(), alias.into());
        self
    }

    pub fn aliases<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (column, alias) in pairs {
            self = self.alias(column, alias);
        }
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut errors = Vec::new();
        if !self.include.is_empty() {
            let mut offenders: Vec<_> = self
                .aliases
                .keys()
                .filter(|key| !self.include.contains(*key))
                .cloned()
                .collect();
            offenders.sort();
            errors.extend(
                offenders
                    .into_iter()
                    .map(|alias| SiloError::AliasNotIncluded { alias }),
            );
        }

        match errors.len() {
            0 => Ok(Config {
                include: self.include,
                include_order: self.include_order,
                aliases: self.aliases,
            }),
            1 => Err(errors.remove(0)),
            _ => Err(SiloError::Config(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_include_accepts_everything() {
        let config = Config::builder().build().unwrap();
        assert!(config.accepts("anything"));
    }

    #[test]
    fn test_include_restricts_and_keeps_first_seen_order() {
        let config = Config::builder()
            .includes(["b", "a", "b"])
            .build()
            .unwrap();
        assert!(config.accepts("a") && config.accepts("b"));
        assert!(!config.accepts("c"));
        assert_eq!(config.include_order(), ["b", "a"]);
    }

    #[test]
    fn test_alias_outside_include_is_rejected() {
        let err = Config::builder()
            .include("a")
            .alias("c", "d")
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: alias [c] is not included"
        );
    }

    #[test]
    fn test_multiple_offending_aliases_are_joined() {
        let err = Config::builder()
            .include("a")
            .alias("x", "1")
            .alias("y", "2")
            .build()
            .unwrap_err();
        assert!(matches!(err, SiloError::Config(ref errors) if errors.len() == 2));
    }

    #[test]
    fn test_alias_target_needs_no_include() {
        let config = Config::builder().include("a").alias("a", "z").build().unwrap();
        assert_eq!(config.alias_for("a"), Some("z"));
        assert!(!config.accepts("z"));
    }

    #[test]
    fn test_aliases_without_include_are_valid() {
        let config = Config::builder().alias("a", "z").build().unwrap();
        assert_eq!(config.alias_for("a"), Some("z"));
    }
}
