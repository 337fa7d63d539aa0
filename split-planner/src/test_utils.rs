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

use crate::catalog::memory::InMemoryStorage;
use crate::catalog::{BlockLocation, CatalogFile, Location};
use crate::split::CombinedSplit;

pub const BLOCK_SIZE: u64 = 1024;

pub fn host1() -> Location {
    Location::new("host1.rack1.com", "/r1")
}

pub fn host2() -> Location {
    Location::new("host2.rack2.com", "/r2")
}

pub fn host3() -> Location {
    Location::new("host3.rack3.com", "/r3")
}

/// Three single-host racks and five files:
/// file1 and file5 live on host1 only, file2 on hosts 1-2, file3 and file4
/// on hosts 1-3.
pub struct RackTopology {
    files: Vec<CatalogFile>,
}

impl RackTopology {
    /// Files of 1, 2, 3, 3 and 1 blocks of [`BLOCK_SIZE`] bytes.
    pub fn new() -> Self {
        let file = |path: &str, num_blocks: u64, replicas: Vec<Location>| CatalogFile {
            path: path.to_string(),
            length: num_blocks * BLOCK_SIZE,
            blocks: (0..num_blocks)
                .map(|i| BlockLocation::new(i * BLOCK_SIZE, BLOCK_SIZE, replicas.clone()))
                .collect(),
            splittable: true,
        };
        Self {
            files: vec![
                file("/dir1/file1", 1, vec![host1()]),
                file("/dir2/file2", 2, vec![host1(), host2()]),
                file("/dir3/file3", 3, vec![host1(), host2(), host3()]),
                file("/dir4/file4", 3, vec![host1(), host2(), host3()]),
                file("/dir5/file5", 1, vec![host1()]),
            ],
        }
    }

    /// Same placement with small gzip files of differing lengths.
    pub fn compressed() -> Self {
        let file = |path: &str, length: u64, replicas: Vec<Location>| CatalogFile {
            path: path.to_string(),
            length,
            blocks: vec![BlockLocation::new(0, length, replicas)],
            splittable: false,
        };
        Self {
            files: vec![
                file("/dir1/file1.gz", 29, vec![host1()]),
                file("/dir2/file2.gz", 31, vec![host1(), host2()]),
                file("/dir3/file3.gz", 33, vec![host1(), host2(), host3()]),
                file("/dir4/file4.gz", 33, vec![host1(), host2(), host3()]),
                file("/dir5/file5.gz", 29, vec![host1()]),
            ],
        }
    }

    pub fn file1(&self) -> CatalogFile {
        self.files[0].clone()
    }

    pub fn file2(&self) -> CatalogFile {
        self.files[1].clone()
    }

    pub fn file3(&self) -> CatalogFile {
        self.files[2].clone()
    }

    pub fn file4(&self) -> CatalogFile {
        self.files[3].clone()
    }

    pub fn file5(&self) -> CatalogFile {
        self.files[4].clone()
    }

    pub fn all_files(&self) -> Vec<CatalogFile> {
        self.files.clone()
    }

    pub fn storage(&self) -> Arc<InMemoryStorage> {
        let storage = InMemoryStorage::new();
        for file in &self.files {
            storage.add_file(&file.path, file.blocks.clone());
        }
        Arc::new(storage)
    }
}

/// Asserts the fragments of `splits` tile every file exactly once.
pub fn assert_covers(files: &[CatalogFile], splits: &[CombinedSplit]) {
    for file in files {
        let mut ranges: Vec<(u64, u64)> = splits
            .iter()
            .flat_map(|s| s.fragments())
            .filter(|f| f.path == file.path)
            .map(|f| (f.offset, f.end()))
            .collect();
        ranges.sort();

        let mut expected_start = 0;
        for (start, end) in ranges {
            assert_eq!(expected_start, start, "gap or overlap in {}", file.path);
            expected_start = end;
        }
        assert_eq!(file.length, expected_start, "{} not fully covered", file.path);
    }
}
