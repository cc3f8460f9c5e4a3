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

use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

use crate::codec::CodecError;

pub type Result<T> = std::result::Result<T, SiloError>;

/// All error kinds surfaced by the engine. The first error aborts the
/// running operation; nothing is recovered inside the scan or dump loops.
#[derive(Error, Debug)]
pub enum SiloError {
    /// The store path exists as a non-directory, or as a non-empty directory
    /// without the engine marker.
    #[error("invalid silo store path [{}]", .path.display())]
    PathNotValid { path: PathBuf },

    /// Failure from the backing engine (open, set, get, flush, iterator).
    #[error("storage engine failure")]
    Storage(#[source] anyhow::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("error while reading next input")]
    ReadingNextInput(#[source] anyhow::Error),

    #[error("error while persisting data")]
    PersistingData(#[source] Box<SiloError>),

    #[error("error while reading persisted data")]
    ReadingPersistedData(#[source] Box<SiloError>),

    #[error("error while writing dump output")]
    DumpWrite(#[source] anyhow::Error),

    #[error("configuration error: alias [{alias}] is not included")]
    AliasNotIncluded { alias: String },

    /// Joined validation errors.
    #[error("invalid configuration: {}", join_messages(.0))]
    Config(Vec<SiloError>),
}

impl SiloError {
    pub fn storage(cause: impl Into<anyhow::Error>) -> Self {
        Self::Storage(cause.into())
    }

    pub fn persisting(cause: SiloError) -> Self {
        Self::PersistingData(Box::new(cause))
    }

    pub fn reading_persisted(cause: SiloError) -> Self {
        Self::ReadingPersistedData(Box::new(cause))
    }
}

fn join_messages(errors: &[SiloError]) -> String {
    errors.iter().map(|e| e.to_string()).join("; ")
}
