// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Split value types shared by the combiner and the per-block generator.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A contiguous byte range of one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    /// Path of the file the bytes belong to.
    pub path: String,
    /// File-relative offset of the first byte.
    pub offset: u64,
    /// Number of bytes.
    pub length: u64,
}

impl Fragment {
    pub fn new(path: impl Into<String>, offset: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            length,
        }
    }

    /// Offset one past the last byte of this fragment.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// The unit of work handed to one task.
///
/// A split is an ordered list of [`Fragment`]s, possibly spanning several
/// files, plus the hosts the scheduler should prefer when placing it. An
/// empty location list means there is no locality preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedSplit {
    fragments: Vec<Fragment>,
    locations: Vec<String>,
}

impl CombinedSplit {
    /// Creates a split, dropping duplicate locations while keeping first-seen order.
    pub fn new(fragments: Vec<Fragment>, locations: Vec<String>) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(locations.len());
        for location in locations {
            if !deduped.contains(&location) {
                deduped.push(location);
            }
        }
        Self {
            fragments,
            locations: deduped,
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Number of fragments; a file contributing several blocks counts once per block.
    pub fn num_paths(&self) -> usize {
        self.fragments.len()
    }

    pub fn path(&self, i: usize) -> &str {
        &self.fragments[i].path
    }

    pub fn offset(&self, i: usize) -> u64 {
        self.fragments[i].offset
    }

    pub fn length(&self, i: usize) -> u64 {
        self.fragments[i].length
    }

    /// Sum of all fragment lengths.
    pub fn total_length(&self) -> u64 {
        self.fragments.iter().map(|f| f.length).sum()
    }
}

impl Display for CombinedSplit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let paths = self
            .fragments
            .iter()
            .map(|frag| format!("{}:{}+{}", frag.path, frag.offset, frag.length))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{paths} locations:[{}]", self.locations.join(","))
    }
}
