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

use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use log::{debug, info};

use crate::baseline::PerBlockSplitGenerator;
use crate::catalog::{BlockCatalog, StorageBackend};
use crate::combiner::{SplitCombiner, SplitThresholds};
use crate::config::{PlannerConfig, SplitMode};
use crate::error::{PlannerError, Result};
use crate::filter::PathFilter;
use crate::pool::{PoolFiles, PoolId, PoolRegistry};
use crate::split::CombinedSplit;

/// Plans the splits of one input definition.
///
/// Thresholds are validated on construction, before the storage is touched.
pub struct SplitPlanner {
    catalog: BlockCatalog,
    config: PlannerConfig,
    combiner: SplitCombiner,
    pools: PoolRegistry,
}

impl SplitPlanner {
    pub fn try_new(storage: Arc<dyn StorageBackend>, config: PlannerConfig) -> Result<Self> {
        let combiner = SplitCombiner::new(config.thresholds())?;
        let catalog = BlockCatalog::new(storage, config.listing_options());
        Ok(Self {
            catalog,
            config,
            combiner,
            pools: PoolRegistry::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn create_pool(&mut self, filters: Vec<PathFilter>) -> PoolId {
        self.pools.create_pool(filters)
    }

    pub fn create_pool_with_thresholds(
        &mut self,
        filters: Vec<PathFilter>,
        thresholds: SplitThresholds,
    ) -> Result<PoolId> {
        self.pools.create_pool_with_thresholds(filters, thresholds)
    }

    /// Lists the configured inputs once and turns them into splits.
    ///
    /// `desired_split_count` is advisory and currently ignored: split counts
    /// follow from the size thresholds alone.
    pub async fn get_splits(&self, desired_split_count: usize) -> Result<Vec<CombinedSplit>> {
        let start = Instant::now();
        let roots = self.config.input_paths();
        if roots.is_empty() {
            return Err(PlannerError::InvalidInput(
                "No input paths configured".to_string(),
            ));
        }
        debug!("Planning splits for {roots:?}, desired split count {desired_split_count}");

        let files = self.catalog.list_files(&roots).await?;
        let splits = match self.config.split_mode() {
            SplitMode::PerBlock => PerBlockSplitGenerator::new().generate(&files),
            SplitMode::Combine => {
                let pools = self.pools.partition(files);
                if self.config.parallel_pools() {
                    self.combine_parallel(pools).await?
                } else {
                    self.combine_sequential(pools)?
                }
            }
        };

        info!(
            "Planned {} splits in {} ms",
            splits.len(),
            start.elapsed().as_millis()
        );
        Ok(splits)
    }

    fn combiner_for(&self, pool: &PoolFiles) -> Result<SplitCombiner> {
        match pool.thresholds {
            Some(thresholds) => SplitCombiner::new(thresholds),
            None => Ok(self.combiner.clone()),
        }
    }

    fn combine_sequential(&self, pools: Vec<PoolFiles>) -> Result<Vec<CombinedSplit>> {
        let mut splits = vec![];
        for pool in pools {
            let combiner = self.combiner_for(&pool)?;
            let pool_splits = combiner.combine(&pool.files);
            debug!(
                "{} produced {} splits from {} files",
                pool.assignment,
                pool_splits.len(),
                pool.files.len()
            );
            splits.extend(pool_splits);
        }
        Ok(splits)
    }

    async fn combine_parallel(&self, pools: Vec<PoolFiles>) -> Result<Vec<CombinedSplit>> {
        let mut tasks = Vec::with_capacity(pools.len());
        for pool in pools {
            let combiner = self.combiner_for(&pool)?;
            tasks.push(tokio::task::spawn_blocking(move || {
                let splits = combiner.combine(&pool.files);
                debug!(
                    "{} produced {} splits from {} files",
                    pool.assignment,
                    splits.len(),
                    pool.files.len()
                );
                splits
            }));
        }

        // try_join_all keeps task order, so pool order survives
        let per_pool = try_join_all(tasks).await?;
        Ok(per_pool.into_iter().flatten().collect())
    }
}
