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

use log::debug;

use crate::catalog::CatalogFile;
use crate::split::{CombinedSplit, Fragment};

/// Emits one split per block, located at that block's replica hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerBlockSplitGenerator;

impl PerBlockSplitGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, files: &[CatalogFile]) -> Vec<CombinedSplit> {
        let mut splits = vec![];
        for file in files.iter().filter(|f| !f.is_placeholder()) {
            if !file.splittable {
                splits.push(CombinedSplit::new(
                    vec![Fragment::new(file.path.clone(), 0, file.length)],
                    file.blocks[0].hosts(),
                ));
                continue;
            }
            splits.extend(file.blocks.iter().map(|block| {
                CombinedSplit::new(
                    vec![Fragment::new(file.path.clone(), block.offset, block.length)],
                    block.hosts(),
                )
            }));
        }
        debug!("Generated {} per-block splits for {} files", splits.len(), files.len());
        splits
    }
}
