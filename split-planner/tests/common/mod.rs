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

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use split_planner::catalog::Location;
use split_planner::config::{
    INPUT_PATHS, SPLIT_MAX_SIZE, SPLIT_MIN_SIZE_PER_NODE, SPLIT_MIN_SIZE_PER_RACK,
};
use split_planner::{CombinedSplit, InMemoryStorage, PlannerConfig, Result, SplitPlanner};

pub const BLOCK_SIZE: u64 = 1024;

pub const HOST1: &str = "host1.rack1.com";
pub const HOST2: &str = "host2.rack2.com";
pub const HOST3: &str = "host3.rack3.com";

fn host1() -> Location {
    Location::new(HOST1, "/r1")
}

fn host2() -> Location {
    Location::new(HOST2, "/r2")
}

fn host3() -> Location {
    Location::new(HOST3, "/r3")
}

/// Three racks with one host each. file1 and file5 are stored on host1 only,
/// file2 on host1 and host2, file3 and file4 on all three hosts.
pub fn rack_storage() -> Arc<InMemoryStorage> {
    let storage = InMemoryStorage::new();
    storage.write_file("/dir1/file1", BLOCK_SIZE, 1, &[host1()]);
    storage.write_file("/dir2/file2", BLOCK_SIZE, 2, &[host1(), host2()]);
    storage.write_file("/dir3/file3", BLOCK_SIZE, 3, &[host1(), host2(), host3()]);
    storage.write_file("/dir4/file4", BLOCK_SIZE, 3, &[host1(), host2(), host3()]);
    storage.write_file("/dir5/file5", BLOCK_SIZE, 1, &[host1()]);
    Arc::new(storage)
}

/// Lengths of the gzip files written by [`compressed_rack_storage`].
pub const GZ_LENGTHS: [u64; 5] = [29, 31, 33, 33, 29];

/// The placement of [`rack_storage`] with single-block gzip files.
pub fn compressed_rack_storage() -> Arc<InMemoryStorage> {
    let storage = InMemoryStorage::new();
    let [f1, f2, f3, f4, f5] = GZ_LENGTHS;
    storage.write_file("/dir1/file1.gz", f1, 1, &[host1()]);
    storage.write_file("/dir2/file2.gz", f2, 1, &[host1(), host2()]);
    storage.write_file("/dir3/file3.gz", f3, 1, &[host1(), host2(), host3()]);
    storage.write_file("/dir4/file4.gz", f4, 1, &[host1(), host2(), host3()]);
    storage.write_file("/dir5/file5.gz", f5, 1, &[host1()]);
    Arc::new(storage)
}

/// Builds a config reading `inputs` with the given thresholds.
pub fn config(inputs: &str, min_node: u64, min_rack: u64, max: u64) -> Result<PlannerConfig> {
    PlannerConfig::default()
        .with_setting(INPUT_PATHS, inputs)?
        .with_setting(SPLIT_MIN_SIZE_PER_NODE, min_node.to_string())?
        .with_setting(SPLIT_MIN_SIZE_PER_RACK, min_rack.to_string())?
        .with_setting(SPLIT_MAX_SIZE, max.to_string())
}

pub async fn plan(
    storage: Arc<InMemoryStorage>,
    config: PlannerConfig,
) -> Result<Vec<CombinedSplit>> {
    SplitPlanner::try_new(storage, config)?.get_splits(1).await
}

/// Fragments of `split` as (file name, offset, length).
pub fn fragments(split: &CombinedSplit) -> Vec<(&str, u64, u64)> {
    split
        .fragments()
        .iter()
        .map(|f| {
            let name = f.path.rsplit('/').next().unwrap_or(&f.path);
            (name, f.offset, f.length)
        })
        .collect()
}

/// Asserts every byte of `lengths` appears in exactly one fragment.
pub fn assert_coverage(splits: &[CombinedSplit], lengths: &BTreeMap<&str, u64>) {
    let mut ranges: BTreeMap<&str, Vec<(u64, u64)>> = BTreeMap::new();
    for fragment in splits.iter().flat_map(|s| s.fragments()) {
        ranges
            .entry(fragment.path.as_str())
            .or_default()
            .push((fragment.offset, fragment.end()));
    }
    assert_eq!(
        lengths.keys().collect::<Vec<_>>(),
        ranges.keys().collect::<Vec<_>>()
    );
    for (path, mut file_ranges) in ranges {
        file_ranges.sort();
        let mut next = 0;
        for (start, end) in file_ranges {
            assert_eq!(next, start, "gap or overlap in {path}");
            next = end;
        }
        assert_eq!(lengths[path], next, "{path} not fully covered");
    }
}

#[ctor::ctor]
fn init() {
    // Enable RUST_LOG logging configuration for test
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_filters("split_planner=debug")
        .is_test(true)
        .try_init();
}
