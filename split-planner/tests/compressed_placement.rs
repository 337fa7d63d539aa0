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

mod common;

use common::{GZ_LENGTHS, HOST1, HOST2, HOST3, compressed_rack_storage, config, fragments, plan};
use split_planner::{PathFilter, Result, SplitPlanner};

const F1: u64 = GZ_LENGTHS[0];
const F2: u64 = GZ_LENGTHS[1];
const F3: u64 = GZ_LENGTHS[2];
const F4: u64 = GZ_LENGTHS[3];
const F5: u64 = GZ_LENGTHS[4];
const ALL_FOUR: &str = "/dir1,/dir2,/dir3,/dir4";

#[tokio::test]
async fn gzip_files_are_never_cut() -> Result<()> {
    let splits = plan(compressed_rack_storage(), config("/dir1,/dir5", 0, 0, 0)?).await?;

    assert_eq!(1, splits.len());
    assert_eq!(
        vec![("file1.gz", 0, F1), ("file5.gz", 0, F5)],
        fragments(&splits[0])
    );
    assert_eq!(HOST1, splits[0].locations()[0]);
    Ok(())
}

#[tokio::test]
async fn rack_minimum_places_each_file_on_its_rack() -> Result<()> {
    let splits = plan(compressed_rack_storage(), config("/dir1,/dir2", 0, F1, 0)?).await?;

    assert_eq!(2, splits.len());
    assert_eq!(vec![("file2.gz", 0, F2)], fragments(&splits[0]));
    assert_eq!(HOST2, splits[0].locations()[0]);
    assert_eq!(vec![("file1.gz", 0, F1)], fragments(&splits[1]));
    assert_eq!(HOST1, splits[1].locations()[0]);

    let splits = plan(
        compressed_rack_storage(),
        config("/dir1,/dir2,/dir3", 0, F1, 0)?,
    )
    .await?;
    assert_eq!(3, splits.len());
    assert_eq!(vec![("file3.gz", 0, F3)], fragments(&splits[0]));
    assert_eq!(HOST3, splits[0].locations()[0]);
    assert_eq!(vec![("file2.gz", 0, F2)], fragments(&splits[1]));
    assert_eq!(HOST2, splits[1].locations()[0]);
    assert_eq!(vec![("file1.gz", 0, F1)], fragments(&splits[2]));
    assert_eq!(HOST1, splits[2].locations()[0]);
    Ok(())
}

#[tokio::test]
async fn replicated_gzip_files_share_a_rack_split() -> Result<()> {
    let splits = plan(compressed_rack_storage(), config(ALL_FOUR, 0, F1, 0)?).await?;

    assert_eq!(3, splits.len());
    assert_eq!(
        vec![("file3.gz", 0, F3), ("file4.gz", 0, F4)],
        fragments(&splits[0])
    );
    assert_eq!(HOST3, splits[0].locations()[0]);
    assert_eq!(vec![("file2.gz", 0, F2)], fragments(&splits[1]));
    assert_eq!(HOST2, splits[1].locations()[0]);
    assert_eq!(vec![("file1.gz", 0, F1)], fragments(&splits[2]));
    assert_eq!(HOST1, splits[2].locations()[0]);
    Ok(())
}

#[tokio::test]
async fn maximum_below_file_size_gives_one_split_per_file() -> Result<()> {
    let splits = plan(compressed_rack_storage(), config(ALL_FOUR, F1, 0, F1)?).await?;

    assert_eq!(4, splits.len());
    let expected = [
        (("file3.gz", F3), HOST3),
        (("file4.gz", F4), HOST3),
        (("file2.gz", F2), HOST2),
        (("file1.gz", F1), HOST1),
    ];
    for (split, ((name, length), host)) in splits.iter().zip(expected) {
        assert_eq!(vec![(name, 0, length)], fragments(split));
        assert_eq!(host, split.locations()[0]);
    }
    Ok(())
}

#[tokio::test]
async fn node_level_grouping_of_gzip_files() -> Result<()> {
    let splits = plan(compressed_rack_storage(), config(ALL_FOUR, F1, 0, 2 * F1)?).await?;
    assert_eq!(3, splits.len());
    assert_eq!(
        vec![("file3.gz", 0, F3), ("file4.gz", 0, F4)],
        fragments(&splits[0])
    );
    assert_eq!(HOST3, splits[0].locations()[0]);
    assert_eq!(vec![("file2.gz", 0, F2)], fragments(&splits[1]));
    assert_eq!(HOST2, splits[1].locations()[0]);
    assert_eq!(vec![("file1.gz", 0, F1)], fragments(&splits[2]));
    assert_eq!(HOST1, splits[2].locations()[0]);

    // file2 alone is below the node minimum on host2 and joins file1 on host1
    let splits = plan(
        compressed_rack_storage(),
        config(ALL_FOUR, 2 * F1, 0, 4 * F1)?,
    )
    .await?;
    assert_eq!(2, splits.len());
    assert_eq!(
        vec![("file3.gz", 0, F3), ("file4.gz", 0, F4)],
        fragments(&splits[0])
    );
    assert_eq!(HOST3, splits[0].locations()[0]);
    assert_eq!(
        vec![("file1.gz", 0, F1), ("file2.gz", 0, F2)],
        fragments(&splits[1])
    );
    assert_eq!(HOST1, splits[1].locations()[0]);
    Ok(())
}

#[tokio::test]
async fn everything_ends_up_on_the_best_replicated_host() -> Result<()> {
    let splits = plan(
        compressed_rack_storage(),
        config(ALL_FOUR, 0, 4 * F1, 4 * F1)?,
    )
    .await?;
    assert_eq!(1, splits.len());
    assert_eq!(4, splits[0].num_paths());
    assert_eq!(&[HOST1.to_string()], splits[0].locations());

    let splits = plan(compressed_rack_storage(), config(ALL_FOUR, 4 * F1, 0, 0)?).await?;
    assert_eq!(1, splits.len());
    assert_eq!(4, splits[0].num_paths());
    assert_eq!(&[HOST1.to_string()], splits[0].locations());
    Ok(())
}

#[tokio::test]
async fn pools_of_gzip_files() -> Result<()> {
    let mut planner = SplitPlanner::try_new(compressed_rack_storage(), config(ALL_FOUR, 0, 1, 0)?)?;
    planner.create_pool(vec![
        PathFilter::prefix("/dir1"),
        PathFilter::prefix("/dir2"),
    ]);
    let splits = planner.get_splits(1).await?;

    assert_eq!(3, splits.len());
    assert_eq!(vec![("file2.gz", 0, F2)], fragments(&splits[0]));
    assert_eq!(&[HOST2.to_string()], splits[0].locations());
    assert_eq!(vec![("file1.gz", 0, F1)], fragments(&splits[1]));
    assert_eq!(&[HOST1.to_string()], splits[1].locations());
    assert_eq!(2, splits[2].num_paths());
    assert_eq!(&[HOST3.to_string()], splits[2].locations());
    Ok(())
}
