// Copyright 2025 Chris Custine
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

use thiserror::Error;

/// Errors raised by the data layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The track extract is missing, not gzip, or has a malformed row.
    #[error("track data unavailable at {}: {source}", path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A map mode name other than `takeoff` or `landing`.
    #[error("\"maptype\" should be one of [\"takeoff\", \"landing\"], got {0:?}")]
    InvalidMode(String),

    /// A malformed or out-of-range query parameter in a share link.
    #[error("invalid value for query parameter '{name}': {value:?} ({reason})")]
    InvalidQueryParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn data_unavailable(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }
}
