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

//! Pools: filter-defined subsets of the input combined independently of each other.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::catalog::CatalogFile;
use crate::combiner::SplitThresholds;
use crate::error::Result;
use crate::filter::PathFilter;

/// Identifier of a registered pool, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(usize);

impl PoolId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Where a file landed after partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolAssignment {
    Pool(PoolId),
    /// Files no registered pool accepts.
    Default,
}

impl Display for PoolAssignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolAssignment::Pool(id) => write!(f, "pool-{}", id.0),
            PoolAssignment::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone)]
struct Pool {
    filter: PathFilter,
    thresholds: Option<SplitThresholds>,
}

/// Files of one pool, in catalog order.
#[derive(Debug, Clone)]
pub struct PoolFiles {
    pub assignment: PoolAssignment,
    /// Thresholds registered with the pool, if any.
    pub thresholds: Option<SplitThresholds>,
    pub files: Vec<CatalogFile>,
}

#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pool accepting paths any of `filters` accepts.
    pub fn create_pool(&mut self, filters: Vec<PathFilter>) -> PoolId {
        self.register(filters, None)
    }

    /// Registers a pool combined with its own thresholds instead of the global ones.
    pub fn create_pool_with_thresholds(
        &mut self,
        filters: Vec<PathFilter>,
        thresholds: SplitThresholds,
    ) -> Result<PoolId> {
        thresholds.validate()?;
        Ok(self.register(filters, Some(thresholds)))
    }

    fn register(&mut self, filters: Vec<PathFilter>, thresholds: Option<SplitThresholds>) -> PoolId {
        let id = PoolId(self.pools.len());
        let filter = PathFilter::AnyOf(filters);
        debug!("Registered pool-{} with filter {filter}", id.0);
        self.pools.push(Pool { filter, thresholds });
        id
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Assigns each file to the first pool accepting its path.
    ///
    /// Every registered pool is listed, in creation order, even when it got
    /// no files. The default pool comes last.
    pub fn partition(&self, files: Vec<CatalogFile>) -> Vec<PoolFiles> {
        let mut result: Vec<PoolFiles> = self
            .pools
            .iter()
            .enumerate()
            .map(|(i, pool)| PoolFiles {
                assignment: PoolAssignment::Pool(PoolId(i)),
                thresholds: pool.thresholds,
                files: vec![],
            })
            .collect();
        result.push(PoolFiles {
            assignment: PoolAssignment::Default,
            thresholds: None,
            files: vec![],
        });

        let default_idx = self.pools.len();
        for file in files {
            let idx = self
                .pools
                .iter()
                .position(|pool| pool.filter.accepts(&file.path))
                .unwrap_or(default_idx);
            result[idx].files.push(file);
        }
        result
    }
}
