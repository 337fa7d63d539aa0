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

//! Greedy, locality-aware combination of blocks into splits.
//!
//! Blocks are first cut into chunks no larger than the maximum split size.
//! Chunks are then grouped in three passes that share one claim state:
//!
//! 1. node level: chunks sharing a host are grouped on that host; a group is
//!    committed when it reaches the maximum size, or when the host runs out
//!    and the group holds at least the per-node minimum,
//! 2. rack level: the remaining chunks are grouped per rack, visiting racks
//!    round-robin until every chunk is either committed or deferred,
//! 3. leftover: deferred chunks, and chunks with no known replica, are
//!    concatenated in file order regardless of location.
//!
//! The output order (node splits, rack splits, leftover splits) is part of
//! the contract.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogFile;
use crate::error::{PlannerError, Result};
use crate::split::CombinedSplit;

mod chunk;
mod index;

use chunk::{Chunk, chunk_files};
use index::{ClaimState, LocationIndex, rack_locations};

/// Size limits applied while combining one pool. Zero means unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitThresholds {
    /// Smallest group committed at node level.
    pub min_split_size_node: u64,
    /// Smallest group committed at rack level.
    pub min_split_size_rack: u64,
    /// Size at which a group is closed. Zero is unbounded.
    pub max_split_size: u64,
}

impl SplitThresholds {
    pub fn new(min_split_size_node: u64, min_split_size_rack: u64, max_split_size: u64) -> Self {
        Self {
            min_split_size_node,
            min_split_size_rack,
            max_split_size,
        }
    }

    pub fn with_min_split_size_node(mut self, size: u64) -> Self {
        self.min_split_size_node = size;
        self
    }

    pub fn with_min_split_size_rack(mut self, size: u64) -> Self {
        self.min_split_size_rack = size;
        self
    }

    pub fn with_max_split_size(mut self, size: u64) -> Self {
        self.max_split_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            min_split_size_node: min_node,
            min_split_size_rack: min_rack,
            max_split_size: max,
        } = *self;

        if max != 0 && min_node > max {
            return Err(PlannerError::InvalidThreshold(format!(
                "minimum split size per node {min_node} cannot be larger than maximum split size {max}"
            )));
        }
        if max != 0 && min_rack > max {
            return Err(PlannerError::InvalidThreshold(format!(
                "minimum split size per rack {min_rack} cannot be larger than maximum split size {max}"
            )));
        }
        if min_rack != 0 && min_node > min_rack {
            return Err(PlannerError::InvalidThreshold(format!(
                "minimum split size per node {min_node} cannot be larger than minimum split size per rack {min_rack}"
            )));
        }
        Ok(())
    }
}

/// Combines the files of one pool into splits.
#[derive(Debug, Clone)]
pub struct SplitCombiner {
    thresholds: SplitThresholds,
}

impl SplitCombiner {
    pub fn new(thresholds: SplitThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Combines `files` into splits. Files without blocks are ignored.
    pub fn combine(&self, files: &[CatalogFile]) -> Vec<CombinedSplit> {
        let PassSplits {
            mut node,
            rack,
            leftover,
        } = self.combine_by_pass(files);
        node.extend(rack);
        node.extend(leftover);
        node
    }

    fn combine_by_pass(&self, files: &[CatalogFile]) -> PassSplits {
        let files: Vec<&CatalogFile> = files.iter().filter(|f| !f.is_placeholder()).collect();
        let chunks = chunk_files(&files, self.thresholds.max_split_size);
        if chunks.is_empty() {
            return PassSplits::default();
        }

        let mut run = Combination {
            files: &files,
            chunks: &chunks,
            claims: ClaimState::new(chunks.len()),
            splits: vec![],
        };

        self.node_pass(&mut run);
        let node = std::mem::take(&mut run.splits);
        self.rack_pass(&mut run);
        let rack = std::mem::take(&mut run.splits);
        self.leftover_pass(&mut run);
        let leftover = std::mem::take(&mut run.splits);

        debug!(
            "Combined {} chunks of {} files into {} splits ({} node-local, {} rack-local, {} leftover) with {:?}",
            chunks.len(),
            files.len(),
            node.len() + rack.len() + leftover.len(),
            node.len(),
            rack.len(),
            leftover.len(),
            self.thresholds
        );
        debug_assert!(run.claims.all_claimed());
        PassSplits {
            node,
            rack,
            leftover,
        }
    }

    fn reached_max(&self, group: &PendingGroup) -> bool {
        self.thresholds.max_split_size != 0 && group.size >= self.thresholds.max_split_size
    }

    fn node_pass(&self, run: &mut Combination) {
        let min_node = self.thresholds.min_split_size_node;
        let index = LocationIndex::hosts(run.chunks, |_| true);

        for (host, ids) in index.iter() {
            let mut group = PendingGroup::default();
            for &id in ids {
                if !run.claims.is_unclaimed(id) {
                    continue;
                }
                group.add(id, run.chunks[id].length);
                if self.reached_max(&group) {
                    run.commit(group.take(), vec![host.to_string()]);
                }
            }

            // a short remainder stays unclaimed for the rack pass
            if !group.is_empty() && min_node != 0 && group.size >= min_node {
                run.commit(group.take(), vec![host.to_string()]);
            }
        }
    }

    fn rack_pass(&self, run: &mut Combination) {
        let min_rack = self.thresholds.min_split_size_rack;
        let index = {
            let claims = &run.claims;
            LocationIndex::racks(run.chunks, |id| claims.is_unclaimed(id))
        };

        // Each round a rack yields at most one split, so a dense rack cannot
        // absorb chunks its neighbours could place.
        loop {
            let mut progressed = false;
            for (rack, ids) in index.iter() {
                let mut group = PendingGroup::default();
                let mut committed = false;
                for &id in ids {
                    if !run.claims.is_unclaimed(id) {
                        continue;
                    }
                    group.add(id, run.chunks[id].length);
                    if self.reached_max(&group) {
                        let ids = group.take();
                        let hosts = rack_locations(run.chunks, &ids, rack);
                        run.commit(ids, hosts);
                        committed = true;
                        break;
                    }
                }

                if committed {
                    progressed = true;
                } else if !group.is_empty() {
                    progressed = true;
                    if min_rack != 0 && group.size >= min_rack {
                        let ids = group.take();
                        let hosts = rack_locations(run.chunks, &ids, rack);
                        run.commit(ids, hosts);
                    } else {
                        run.claims.defer(&group.ids);
                    }
                }
            }
            if !progressed {
                break;
            }
        }
    }

    fn leftover_pass(&self, run: &mut Combination) {
        let mut group = PendingGroup::default();
        for id in run.claims.unplaced() {
            group.add(id, run.chunks[id].length);
            if self.reached_max(&group) {
                let ids = group.take();
                let hosts = run.hosts_of(&ids);
                run.commit(ids, hosts);
            }
        }
        if !group.is_empty() {
            let ids = group.take();
            let hosts = run.hosts_of(&ids);
            run.commit(ids, hosts);
        }
    }
}

/// Splits of one combination, by the pass that committed them.
#[derive(Debug, Default)]
struct PassSplits {
    node: Vec<CombinedSplit>,
    rack: Vec<CombinedSplit>,
    leftover: Vec<CombinedSplit>,
}

/// Mutable state of one `combine` call.
struct Combination<'a> {
    files: &'a [&'a CatalogFile],
    chunks: &'a [Chunk],
    claims: ClaimState,
    splits: Vec<CombinedSplit>,
}

impl Combination<'_> {
    fn commit(&mut self, ids: Vec<usize>, locations: Vec<String>) {
        self.claims.claim(&ids);
        let fragments = ids
            .iter()
            .map(|&id| self.chunks[id].fragment(self.files))
            .collect();
        self.splits.push(CombinedSplit::new(fragments, locations));
    }

    /// Union of the chunks' replica hosts, first seen first.
    fn hosts_of(&self, ids: &[usize]) -> Vec<String> {
        ids.iter()
            .flat_map(|&id| self.chunks[id].hosts())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default)]
struct PendingGroup {
    ids: Vec<usize>,
    size: u64,
}

impl PendingGroup {
    fn add(&mut self, id: usize, length: u64) {
        self.ids.push(id);
        self.size += length;
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn take(&mut self) -> Vec<usize> {
        self.size = 0;
        std::mem::take(&mut self.ids)
    }
}
