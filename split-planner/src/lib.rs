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

#![doc = include_str!("../README.md")]

/// The current version of the split planner, derived from the Cargo package version.
pub const SPLIT_PLANNER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-block split generation, one split per block.
pub mod baseline;
/// File listing and block placement lookup.
pub mod catalog;
/// Locality-aware combination of blocks into splits.
pub mod combiner;
/// Configuration options and settings.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Path predicates.
pub mod filter;
/// Split planning entry point.
pub mod planner;
/// Pool registration and file partitioning.
pub mod pool;
/// Split value types.
pub mod split;

/// Test utilities for split planning.
#[cfg(test)]
pub mod test_utils;

pub use catalog::memory::InMemoryStorage;
pub use catalog::{BlockCatalog, CatalogFile, StorageBackend};
pub use combiner::{SplitCombiner, SplitThresholds};
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use filter::PathFilter;
pub use planner::SplitPlanner;
pub use split::{CombinedSplit, Fragment};
