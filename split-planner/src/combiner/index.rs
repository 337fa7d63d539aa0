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

use std::collections::{BTreeMap, BTreeSet};

use crate::combiner::chunk::Chunk;

/// Per-location lists of chunk ids, in processing order.
///
/// Locations holding fewer chunks come first; equal counts are ordered by
/// identifier, descending. Each list keeps chunk id order.
#[derive(Debug)]
pub(crate) struct LocationIndex {
    entries: Vec<(String, Vec<usize>)>,
}

impl LocationIndex {
    /// Indexes the chunks accepted by `include` under every host holding a replica.
    pub fn hosts(chunks: &[Chunk], include: impl Fn(usize) -> bool) -> Self {
        Self::build(chunks, include, |loc| loc.host.as_str())
    }

    /// Indexes the chunks accepted by `include` under every rack holding a replica.
    pub fn racks(chunks: &[Chunk], include: impl Fn(usize) -> bool) -> Self {
        Self::build(chunks, include, |loc| loc.rack.as_str())
    }

    fn build(
        chunks: &[Chunk],
        include: impl Fn(usize) -> bool,
        key: impl Fn(&crate::catalog::Location) -> &str,
    ) -> Self {
        let mut by_location: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (id, chunk) in chunks.iter().enumerate() {
            if !include(id) {
                continue;
            }
            for location in &chunk.locations {
                let ids = by_location.entry(key(location)).or_default();
                // two replicas on one rack index the chunk once
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
        }

        let mut entries: Vec<(String, Vec<usize>)> = by_location
            .into_iter()
            .map(|(location, ids)| (location.to_string(), ids))
            .collect();
        entries.sort_by(|(a_name, a_ids), (b_name, b_ids)| {
            a_ids.len().cmp(&b_ids.len()).then_with(|| b_name.cmp(a_name))
        });
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.entries
            .iter()
            .map(|(location, ids)| (location.as_str(), ids.as_slice()))
    }

    #[cfg(test)]
    pub fn order(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }
}

/// Location hint of a rack-level group: the hosts on `rack` holding every
/// chunk of the group, sorted by name. When no host holds them all, the host
/// holding the most of them, ties going to the smallest name.
pub(crate) fn rack_locations(chunks: &[Chunk], ids: &[usize], rack: &str) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &id in ids {
        let hosts: BTreeSet<&str> = chunks[id]
            .locations
            .iter()
            .filter(|location| location.rack == rack)
            .map(|location| location.host.as_str())
            .collect();
        for host in hosts {
            *counts.entry(host).or_default() += 1;
        }
    }

    let shared: Vec<String> = counts
        .iter()
        .filter(|(_, count)| **count == ids.len())
        .map(|(host, _)| host.to_string())
        .collect();
    if !shared.is_empty() {
        return shared;
    }
    // max_by_key keeps the last maximum, so walk names in reverse
    counts
        .iter()
        .rev()
        .max_by_key(|(_, count)| **count)
        .map(|(host, _)| vec![host.to_string()])
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkState {
    Unclaimed,
    /// Set aside by the rack pass for the leftover pass.
    Deferred,
    /// Part of a committed split. Final.
    Claimed,
}

/// Claim bookkeeping shared by the three passes of one combination.
#[derive(Debug)]
pub(crate) struct ClaimState {
    states: Vec<ChunkState>,
    claimed: usize,
}

impl ClaimState {
    pub fn new(num_chunks: usize) -> Self {
        Self {
            states: vec![ChunkState::Unclaimed; num_chunks],
            claimed: 0,
        }
    }

    pub fn is_unclaimed(&self, id: usize) -> bool {
        self.states[id] == ChunkState::Unclaimed
    }

    pub fn claim(&mut self, ids: &[usize]) {
        for &id in ids {
            debug_assert_ne!(self.states[id], ChunkState::Claimed, "chunk {id}");
            self.states[id] = ChunkState::Claimed;
        }
        self.claimed += ids.len();
    }

    pub fn defer(&mut self, ids: &[usize]) {
        for &id in ids {
            debug_assert_eq!(self.states[id], ChunkState::Unclaimed, "chunk {id}");
            self.states[id] = ChunkState::Deferred;
        }
    }

    /// Ids of every chunk not yet in a split, in id order.
    pub fn unplaced(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state != ChunkState::Claimed)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn all_claimed(&self) -> bool {
        self.claimed == self.states.len()
    }
}
