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

//! Split planner binary: plans the splits of a catalog described in JSON.

use std::io::Write;
use std::sync::Arc;
use std::{env, fs, io};

use clap::Parser;
use split_planner::catalog::memory::{CatalogDocument, InMemoryStorage};
use split_planner::config::{Config, LogRotationPolicy, PlannerConfig};
use split_planner::error::Result;
use split_planner::planner::SplitPlanner;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;

    runtime.block_on(inner())
}

async fn inner() -> Result<()> {
    // parse options
    let opt = Config::parse();

    let rust_log = env::var(EnvFilter::DEFAULT_ENV);
    let log_filter = EnvFilter::new(rust_log.unwrap_or(opt.log_level_setting.clone()));

    // stdout carries the splits
    let tracing = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_thread_names(opt.print_thread_info)
        .with_thread_ids(opt.print_thread_info)
        .with_writer(io::stderr)
        .with_env_filter(log_filter);

    // File layer
    if let Some(log_dir) = &opt.log_dir {
        let log_file_name_prefix = "split_planner";

        let log_file = match opt.log_rotation_policy {
            LogRotationPolicy::Minutely => {
                tracing_appender::rolling::minutely(log_dir, log_file_name_prefix)
            }
            LogRotationPolicy::Hourly => {
                tracing_appender::rolling::hourly(log_dir, log_file_name_prefix)
            }
            LogRotationPolicy::Daily => {
                tracing_appender::rolling::daily(log_dir, log_file_name_prefix)
            }
            LogRotationPolicy::Never => {
                tracing_appender::rolling::never(log_dir, log_file_name_prefix)
            }
        };

        tracing.with_writer(log_file).init();
    } else {
        tracing.init();
    }

    let document: CatalogDocument = serde_json::from_str(&fs::read_to_string(&opt.catalog)?)?;
    tracing::info!(
        "Loaded catalog {} with {} files",
        opt.catalog,
        document.files.len()
    );
    let storage = Arc::new(InMemoryStorage::from_document(document));

    let pools = opt.pool_filters();
    let hint = opt.split_count_hint;
    let config = PlannerConfig::try_from(&opt)?;

    let mut planner = SplitPlanner::try_new(storage, config)?;
    for filters in pools {
        planner.create_pool(filters);
    }
    let splits = planner.get_splits(hint).await?;

    let mut out = io::stdout().lock();
    for split in &splits {
        writeln!(out, "{}", serde_json::to_string(split)?)?;
    }
    out.flush()?;

    Ok(())
}
