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

use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::{BlockLocation, FileStatus, Location, StorageBackend};
use crate::error::{PlannerError, Result};

#[derive(Debug, Clone)]
enum Entry {
    Directory,
    File {
        length: u64,
        blocks: Vec<BlockLocation>,
    },
}

/// A storage backend holding its namespace in memory.
///
/// Parent directories are created implicitly. Children are listed in path
/// order.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<BTreeMap<String, Entry>>,
    unavailable: RwLock<HashSet<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a storage from a serialized catalog document.
    pub fn from_document(document: CatalogDocument) -> Self {
        let storage = Self::new();
        for dir in document.directories {
            storage.add_directory(&dir);
        }
        for file in document.files {
            storage.add_file(&file.path, file.blocks);
        }
        storage
    }

    pub fn add_directory(&self, path: &str) {
        let mut entries = self.entries.write();
        let mut current = normalize(path);
        loop {
            entries
                .entry(current.clone())
                .or_insert(Entry::Directory);
            match parent(&current) {
                Some(p) => current = p,
                None => break,
            }
        }
    }

    /// Adds a file whose length is the sum of its block lengths.
    pub fn add_file(&self, path: &str, mut blocks: Vec<BlockLocation>) {
        let path = normalize(path);
        if let Some(p) = parent(&path) {
            self.add_directory(&p);
        }
        blocks.sort_by_key(|b| b.offset);
        let length = blocks.iter().map(|b| b.length).sum();
        self.entries
            .write()
            .insert(path, Entry::File { length, blocks });
    }

    /// Adds a file of `num_blocks` blocks of `block_size` bytes, every block
    /// replicated on all of `replicas`.
    pub fn write_file(
        &self,
        path: &str,
        block_size: u64,
        num_blocks: u64,
        replicas: &[Location],
    ) {
        let blocks = (0..num_blocks)
            .map(|i| BlockLocation::new(i * block_size, block_size, replicas.to_vec()))
            .collect();
        self.add_file(path, blocks);
    }

    /// Makes block lookups of `path` fail from now on.
    pub fn fail_block_locations(&self, path: &str) {
        self.unavailable.write().insert(normalize(path));
    }

    fn status(path: &str, entry: &Entry) -> FileStatus {
        match entry {
            Entry::Directory => FileStatus {
                path: path.to_string(),
                length: 0,
                is_dir: true,
            },
            Entry::File { length, .. } => FileStatus {
                path: path.to_string(),
                length: *length,
                is_dir: false,
            },
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for InMemoryStorage {
    async fn file_status(&self, path: &str) -> Result<Option<FileStatus>> {
        let path = normalize(path);
        Ok(self
            .entries
            .read()
            .get(&path)
            .map(|entry| Self::status(&path, entry)))
    }

    async fn list_status(&self, path: &str) -> Result<Vec<FileStatus>> {
        let dir = normalize(path);
        let entries = self.entries.read();
        match entries.get(&dir) {
            Some(Entry::Directory) => Ok(entries
                .iter()
                .filter(|(p, _)| parent(p).as_deref() == Some(dir.as_str()))
                .map(|(p, entry)| Self::status(p, entry))
                .collect()),
            Some(entry) => Ok(vec![Self::status(&dir, entry)]),
            None => Err(PlannerError::StorageUnavailable(format!(
                "cannot list {dir}: no such path"
            ))),
        }
    }

    async fn get_block_locations(
        &self,
        path: &str,
        offset: u64,
        length: u64,
    ) -> Result<Vec<BlockLocation>> {
        let path = normalize(path);
        if self.unavailable.read().contains(&path) {
            return Err(PlannerError::StorageUnavailable(format!(
                "block locations of {path} cannot be resolved"
            )));
        }
        let end = offset.saturating_add(length);
        match self.entries.read().get(&path) {
            Some(Entry::File { blocks, .. }) => Ok(blocks
                .iter()
                .filter(|b| b.offset < end && b.offset + b.length > offset)
                .cloned()
                .collect()),
            Some(Entry::Directory) => Ok(vec![]),
            None => Err(PlannerError::StorageUnavailable(format!(
                "cannot resolve blocks of {path}: no such file"
            ))),
        }
    }
}

/// Serialized form of a storage namespace, as read by the command line tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDocument {
    pub path: String,
    #[serde(default)]
    pub blocks: Vec<BlockLocation>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parent(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some("/".to_string()),
        Some((p, _)) => Some(p.to_string()),
        None => None,
    }
}
