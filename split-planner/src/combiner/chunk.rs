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

use crate::catalog::{CatalogFile, Location};
use crate::split::Fragment;

/// The unit the combiner places: a whole block, or a piece of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk {
    /// Index of the owning file in the combined file list.
    pub file: usize,
    pub offset: u64,
    pub length: u64,
    pub locations: Vec<Location>,
}

impl Chunk {
    pub fn fragment(&self, files: &[&CatalogFile]) -> Fragment {
        Fragment::new(files[self.file].path.clone(), self.offset, self.length)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|l| l.host.as_str())
    }
}

/// Cuts `length` bytes into chunk lengths no larger than `max_split_size`.
///
/// A remainder between one and two times the maximum is halved instead of
/// leaving a small tail. `max_split_size == 0` keeps the range whole.
pub(crate) fn chunk_lengths(length: u64, max_split_size: u64) -> Vec<u64> {
    let mut lengths = vec![];
    let mut remaining = length;
    while remaining > 0 {
        let next = if max_split_size == 0 {
            remaining
        } else if remaining > max_split_size
            && remaining < max_split_size.saturating_mul(2)
        {
            remaining / 2
        } else {
            remaining.min(max_split_size)
        };
        lengths.push(next);
        remaining -= next;
    }
    lengths
}

/// Builds the chunk arena. Chunk ids follow file order, then offset.
pub(crate) fn chunk_files(files: &[&CatalogFile], max_split_size: u64) -> Vec<Chunk> {
    let mut chunks = vec![];
    for (file_idx, file) in files.iter().enumerate() {
        if file.is_placeholder() {
            continue;
        }

        if !file.splittable {
            chunks.push(Chunk {
                file: file_idx,
                offset: 0,
                length: file.length,
                locations: file.blocks[0].locations.clone(),
            });
            continue;
        }

        for block in &file.blocks {
            let mut offset = block.offset;
            for length in chunk_lengths(block.length, max_split_size) {
                chunks.push(Chunk {
                    file: file_idx,
                    offset,
                    length,
                    locations: block.locations.clone(),
                });
                offset += length;
            }
        }
    }
    chunks
}
