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

//! Block catalog: resolves input paths into files, blocks and replica locations.

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::filter::is_hidden;

/// In-memory storage backend.
pub mod memory;

/// Rack assigned to replicas whose topology is unknown.
pub const DEFAULT_RACK: &str = "/default-rack";

fn default_rack() -> String {
    DEFAULT_RACK.to_string()
}

/// A host holding a replica, and the rack that host sits in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub host: String,
    #[serde(default = "default_rack")]
    pub rack: String,
}

impl Location {
    pub fn new(host: impl Into<String>, rack: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            rack: rack.into(),
        }
    }

    /// A location on an unknown rack.
    pub fn host_only(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_RACK)
    }
}

/// One replicated block of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLocation {
    pub offset: u64,
    pub length: u64,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl BlockLocation {
    pub fn new(offset: u64, length: u64, locations: Vec<Location>) -> Self {
        Self {
            offset,
            length,
            locations,
        }
    }

    pub fn hosts(&self) -> Vec<String> {
        self.locations.iter().map(|l| l.host.clone()).collect()
    }
}

/// What a storage listing reports about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub length: u64,
    pub is_dir: bool,
}

/// A regular file with its blocks resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub path: String,
    pub length: u64,
    /// Blocks ordered by offset.
    pub blocks: Vec<BlockLocation>,
    /// Whether the file may be cut at block boundaries. Compressed files
    /// can only be read from the start and are handled as a single unit.
    pub splittable: bool,
}

impl CatalogFile {
    /// A file without blocks contributes nothing to any split.
    pub fn is_placeholder(&self) -> bool {
        self.length == 0 || self.blocks.is_empty()
    }
}

/// The storage collaborator that owns file listings and block placement.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Status of `path`, or `None` when it does not exist.
    async fn file_status(&self, path: &str) -> Result<Option<FileStatus>>;

    /// Children of the directory `path`.
    async fn list_status(&self, path: &str) -> Result<Vec<FileStatus>>;

    /// Blocks of `path` overlapping `[offset, offset + length)`.
    async fn get_block_locations(
        &self,
        path: &str,
        offset: u64,
        length: u64,
    ) -> Result<Vec<BlockLocation>>;
}

/// Listing behaviour, normally derived from [`crate::config::PlannerConfig`].
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Descend into nested directories instead of rejecting them.
    pub recursive: bool,
    /// Skip entries whose name starts with `_` or `.`.
    pub skip_hidden: bool,
    /// File name suffixes that mark a file as non-splittable.
    pub non_splittable_suffixes: Vec<String>,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            skip_hidden: true,
            non_splittable_suffixes: vec![
                ".gz".to_string(),
                ".deflate".to_string(),
                ".snappy".to_string(),
            ],
        }
    }
}

impl ListingOptions {
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    pub fn with_non_splittable_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.non_splittable_suffixes = suffixes;
        self
    }

    fn is_splittable(&self, path: &str) -> bool {
        !self
            .non_splittable_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}

/// Turns input roots into a snapshot of [`CatalogFile`]s.
#[derive(Clone)]
pub struct BlockCatalog {
    storage: Arc<dyn StorageBackend>,
    options: ListingOptions,
}

impl BlockCatalog {
    pub fn new(storage: Arc<dyn StorageBackend>, options: ListingOptions) -> Self {
        Self { storage, options }
    }

    /// Lists the regular files under `roots` and resolves their blocks.
    ///
    /// Files come back in listing order: roots in the given order, children
    /// in the order storage reports them. Files without blocks are dropped,
    /// and a file reached from overlapping roots is kept once.
    pub async fn list_files(&self, roots: &[String]) -> Result<Vec<CatalogFile>> {
        let statuses = self.list_status(roots).await?;

        let mut files = Vec::with_capacity(statuses.len());
        for status in statuses {
            let mut blocks = self
                .storage
                .get_block_locations(&status.path, 0, status.length)
                .await?;
            blocks.sort_by_key(|b| b.offset);

            let covered: u64 = blocks.iter().map(|b| b.length).sum();
            if covered != status.length && !blocks.is_empty() {
                warn!(
                    "Blocks of {} cover {covered} bytes but the file has {} bytes",
                    status.path, status.length
                );
            }

            let file = CatalogFile {
                splittable: self.options.is_splittable(&status.path),
                path: status.path,
                length: status.length,
                blocks,
            };
            if file.is_placeholder() {
                debug!("Skipping {} which has no blocks", file.path);
                continue;
            }
            files.push(file);
        }

        debug!("Listed {} files under {} input paths", files.len(), roots.len());
        Ok(files)
    }

    async fn list_status(&self, roots: &[String]) -> Result<Vec<FileStatus>> {
        let mut result: Vec<FileStatus> = vec![];
        for root in roots {
            let status = self.storage.file_status(root).await?.ok_or_else(|| {
                PlannerError::InvalidInput(format!("Input path does not exist: {root}"))
            })?;
            if status.is_dir {
                self.list_directory(status.path, &mut result).await?;
            } else {
                result.push(status);
            }
        }

        let mut seen = HashSet::new();
        result.retain(|status| seen.insert(status.path.clone()));
        Ok(result)
    }

    fn list_directory<'a>(
        &'a self,
        dir: String,
        result: &'a mut Vec<FileStatus>,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            for child in self.storage.list_status(&dir).await? {
                if self.options.skip_hidden && is_hidden(&child.path) {
                    continue;
                }
                if !child.is_dir {
                    result.push(child);
                } else if self.options.recursive {
                    self.list_directory(child.path, result).await?;
                } else {
                    return Err(PlannerError::NestedDirectory(child.path));
                }
            }
            Ok(())
        }
        .boxed()
    }
}
