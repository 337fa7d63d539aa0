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

//! Split planner configuration

use std::collections::HashMap;
use std::fmt::Display;
use std::result;
use std::sync::LazyLock;

use crate::catalog::ListingOptions;
use crate::combiner::SplitThresholds;
use crate::error::{PlannerError, Result};

/// Comma separated input roots.
pub const INPUT_PATHS: &str = "input.paths";
/// Walk directories nested inside input roots instead of failing.
pub const INPUT_RECURSIVE: &str = "input.recursive";
pub const INPUT_SKIP_HIDDEN: &str = "input.skipHidden";
/// Comma separated file name suffixes of files that cannot be cut.
pub const INPUT_NON_SPLITTABLE_SUFFIXES: &str = "input.nonSplittableSuffixes";
pub const SPLIT_MIN_SIZE_PER_NODE: &str = "split.minSize.perNode";
pub const SPLIT_MIN_SIZE_PER_RACK: &str = "split.minSize.perRack";
pub const SPLIT_MAX_SIZE: &str = "split.maxSize";
pub const SPLIT_MODE: &str = "split.mode";
/// Combine pools on the blocking thread pool instead of one after another.
pub const PLANNER_PARALLEL_POOLS: &str = "planner.parallelPools";

pub type ParseResult<T> = result::Result<T, String>;

static CONFIG_ENTRIES: LazyLock<HashMap<String, ConfigEntry>> = LazyLock::new(|| {
    let entries = vec![
        ConfigEntry::new(INPUT_PATHS.to_string(),
                         "Comma separated list of input files and directories".to_string(),
                         ValueType::Utf8, Some(String::new())),
        ConfigEntry::new(INPUT_RECURSIVE.to_string(),
                         "List directories nested inside input directories instead of rejecting them".to_string(),
                         ValueType::Boolean, Some(false.to_string())),
        ConfigEntry::new(INPUT_SKIP_HIDDEN.to_string(),
                         "Skip files and directories whose name starts with '_' or '.'".to_string(),
                         ValueType::Boolean, Some(true.to_string())),
        ConfigEntry::new(INPUT_NON_SPLITTABLE_SUFFIXES.to_string(),
                         "File name suffixes of compressed files that must be read as a whole".to_string(),
                         ValueType::Utf8, Some(".gz,.deflate,.snappy".to_string())),
        ConfigEntry::new(SPLIT_MIN_SIZE_PER_NODE.to_string(),
                         "Minimum size of a node-local split, 0 disables node-level remainders".to_string(),
                         ValueType::UInt64, Some(0.to_string())),
        ConfigEntry::new(SPLIT_MIN_SIZE_PER_RACK.to_string(),
                         "Minimum size of a rack-local split, 0 disables rack-level remainders".to_string(),
                         ValueType::UInt64, Some(0.to_string())),
        ConfigEntry::new(SPLIT_MAX_SIZE.to_string(),
                         "Maximum size of a split, 0 means unbounded".to_string(),
                         ValueType::UInt64, Some(0.to_string())),
        ConfigEntry::new(SPLIT_MODE.to_string(),
                         "Split generation mode, possible values: combine, per-block".to_string(),
                         ValueType::SplitMode, Some(SplitMode::Combine.to_string())),
        ConfigEntry::new(PLANNER_PARALLEL_POOLS.to_string(),
                         "Combine pools concurrently".to_string(),
                         ValueType::Boolean, Some(false.to_string())),
    ];
    entries
        .into_iter()
        .map(|e| (e.name.clone(), e))
        .collect::<HashMap<_, _>>()
});

/// Type a configuration value must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    UInt64,
    Boolean,
    Utf8,
    SplitMode,
}

/// Configuration option meta-data
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    name: String,
    description: String,
    value_type: ValueType,
    default_value: Option<String>,
}

impl ConfigEntry {
    fn new(
        name: String,
        description: String,
        value_type: ValueType,
        default_value: Option<String>,
    ) -> Self {
        Self {
            name,
            description,
            value_type,
            default_value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// Split planner configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Settings stored in map for easy serde
    settings: HashMap<String, String>,
}

impl PlannerConfig {
    /// Create a new configuration based on key-value pairs
    pub fn with_settings(settings: HashMap<String, String>) -> Result<Self> {
        let supported_entries = PlannerConfig::valid_entries();
        if let Some(unknown) = settings.keys().find(|k| !supported_entries.contains_key(*k)) {
            return Err(PlannerError::Configuration(format!(
                "configuration key `{unknown}` does not exist"
            )));
        }

        for (name, entry) in supported_entries {
            if let Some(v) = settings.get(name) {
                // validate that we can parse the user-supplied value
                Self::parse_value(v.as_str(), entry.value_type).map_err(|e| PlannerError::Configuration(format!("Failed to parse user-supplied value '{v}' for configuration setting '{name}': {e}")))?;
            } else if let Some(v) = entry.default_value.as_deref() {
                Self::parse_value(v, entry.value_type).map_err(|e| PlannerError::Configuration(format!("Failed to parse default value '{v}' for configuration setting '{name}': {e}")))?;
            }
        }

        Ok(Self { settings })
    }

    /// Returns a copy of this configuration with `key` set to `value`.
    pub fn with_setting(&self, key: &str, value: impl Into<String>) -> Result<Self> {
        let mut settings = self.settings.clone();
        settings.insert(key.to_string(), value.into());
        Self::with_settings(settings)
    }

    pub fn parse_value(val: &str, value_type: ValueType) -> ParseResult<()> {
        match value_type {
            ValueType::UInt64 => {
                val.parse::<u64>().map_err(|e| format!("{e:?}"))?;
            }
            ValueType::Boolean => {
                val.parse::<bool>().map_err(|e| format!("{e:?}"))?;
            }
            ValueType::SplitMode => {
                val.parse::<SplitMode>()?;
            }
            ValueType::Utf8 => {}
        }

        Ok(())
    }

    // All available configuration options
    pub fn valid_entries() -> &'static HashMap<String, ConfigEntry> {
        &CONFIG_ENTRIES
    }

    pub fn settings(&self) -> &HashMap<String, String> {
        &self.settings
    }

    pub fn input_paths(&self) -> Vec<String> {
        split_list(&self.get_string_setting(INPUT_PATHS))
    }

    pub fn recursive(&self) -> bool {
        self.get_bool_setting(INPUT_RECURSIVE)
    }

    pub fn skip_hidden(&self) -> bool {
        self.get_bool_setting(INPUT_SKIP_HIDDEN)
    }

    pub fn non_splittable_suffixes(&self) -> Vec<String> {
        split_list(&self.get_string_setting(INPUT_NON_SPLITTABLE_SUFFIXES))
    }

    pub fn min_split_size_node(&self) -> u64 {
        self.get_u64_setting(SPLIT_MIN_SIZE_PER_NODE)
    }

    pub fn min_split_size_rack(&self) -> u64 {
        self.get_u64_setting(SPLIT_MIN_SIZE_PER_RACK)
    }

    pub fn max_split_size(&self) -> u64 {
        self.get_u64_setting(SPLIT_MAX_SIZE)
    }

    pub fn split_mode(&self) -> SplitMode {
        self.get_string_setting(SPLIT_MODE)
            .parse()
            .unwrap_or_default()
    }

    pub fn parallel_pools(&self) -> bool {
        self.get_bool_setting(PLANNER_PARALLEL_POOLS)
    }

    /// Thresholds applied to pools registered without their own.
    pub fn thresholds(&self) -> SplitThresholds {
        SplitThresholds::new(
            self.min_split_size_node(),
            self.min_split_size_rack(),
            self.max_split_size(),
        )
    }

    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions::default()
            .with_recursive(self.recursive())
            .with_skip_hidden(self.skip_hidden())
            .with_non_splittable_suffixes(self.non_splittable_suffixes())
    }

    // values are validated in the constructor, so parsing does not fail here
    fn get_u64_setting(&self, key: &str) -> u64 {
        self.get_string_setting(key).parse().unwrap_or_default()
    }

    fn get_bool_setting(&self, key: &str) -> bool {
        self.get_string_setting(key).parse().unwrap_or_default()
    }

    fn get_string_setting(&self, key: &str) -> String {
        if let Some(v) = self.settings.get(key) {
            v.to_string()
        } else {
            Self::valid_entries()
                .get(key)
                .and_then(|entry| entry.default_value.clone())
                .unwrap_or_default()
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// How splits are produced from the listed files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Deserialize)]
#[cfg_attr(feature = "build-binary", derive(clap::ValueEnum))]
pub enum SplitMode {
    /// Group blocks by locality.
    #[default]
    Combine,
    /// One split per block.
    PerBlock,
}

impl Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitMode::Combine => f.write_str("combine"),
            SplitMode::PerBlock => f.write_str("per-block"),
        }
    }
}

impl std::str::FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "combine" => Ok(SplitMode::Combine),
            "per-block" => Ok(SplitMode::PerBlock),
            other => Err(format!(
                "unknown split mode '{other}', possible values: combine, per-block"
            )),
        }
    }
}

// an enum used to configure the log rolling policy
#[derive(Clone, Copy, Debug, serde::Deserialize, Default)]
#[cfg_attr(feature = "build-binary", derive(clap::ValueEnum))]
pub enum LogRotationPolicy {
    Minutely,
    Hourly,
    Daily,
    #[default]
    Never,
}

impl Display for LogRotationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogRotationPolicy::Minutely => f.write_str("minutely"),
            LogRotationPolicy::Hourly => f.write_str("hourly"),
            LogRotationPolicy::Daily => f.write_str("daily"),
            LogRotationPolicy::Never => f.write_str("never"),
        }
    }
}

#[cfg(feature = "build-binary")]
impl std::str::FromStr for LogRotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        clap::ValueEnum::from_str(s, true)
    }
}

/// Command line of the `split-planner` binary
#[cfg(feature = "build-binary")]
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[arg(
        long,
        help = "JSON document describing directories, files, blocks and replica locations"
    )]
    pub catalog: String,
    #[arg(
        long,
        value_delimiter = ',',
        required = true,
        help = "Input files or directories, comma separated or repeated"
    )]
    pub input: Vec<String>,
    #[arg(
        long,
        default_value_t = false,
        help = "List directories nested inside input directories. Default: false"
    )]
    pub recursive: bool,
    #[arg(
        long,
        default_value_t = 0,
        help = "Minimum size of a node-local split in bytes. Default: 0"
    )]
    pub min_split_size_node: u64,
    #[arg(
        long,
        default_value_t = 0,
        help = "Minimum size of a rack-local split in bytes. Default: 0"
    )]
    pub min_split_size_rack: u64,
    #[arg(
        long,
        default_value_t = 0,
        help = "Maximum size of a split in bytes, 0 means unbounded. Default: 0"
    )]
    pub max_split_size: u64,
    #[arg(
        long,
        default_value_t = SplitMode::Combine,
        help = "Split generation mode, possible values: combine, per-block. Default: combine"
    )]
    pub mode: SplitMode,
    #[arg(
        long,
        help = "Register a pool of comma separated path prefixes. May be repeated; pools are matched in order"
    )]
    pub pool: Vec<String>,
    #[arg(
        long,
        default_value_t = false,
        help = "Combine pools concurrently. Default: false"
    )]
    pub parallel_pools: bool,
    #[arg(
        long,
        default_value_t = 0,
        help = "Desired number of splits. Logged only, split counts follow the size thresholds"
    )]
    pub split_count_hint: usize,
    #[arg(
        long,
        help = "Log dir: a path to save log. This will create a new storage directory at the specified path if it does not already exist."
    )]
    pub log_dir: Option<String>,
    #[arg(
        long,
        default_value_t = true,
        help = "Enable print thread ids and names in log file."
    )]
    pub print_thread_info: bool,
    #[arg(
        long,
        default_value_t = String::from("INFO"),
        help = "special log level for sub mod. link: https://docs.rs/env_logger/latest/env_logger/#enabling-logging. For example we want whole level is INFO but split_planner mode is DEBUG"
    )]
    pub log_level_setting: String,
    #[arg(
        long,
        default_value_t = LogRotationPolicy::Daily,
        help = "Tracing log rotation policy, possible values: minutely, hourly, daily, never. Default: daily"
    )]
    pub log_rotation_policy: LogRotationPolicy,
}

#[cfg(feature = "build-binary")]
impl Config {
    /// Prefix filters of each `--pool` argument, in registration order.
    pub fn pool_filters(&self) -> Vec<Vec<crate::filter::PathFilter>> {
        self.pool
            .iter()
            .map(|pool| {
                split_list(pool)
                    .into_iter()
                    .map(crate::filter::PathFilter::prefix)
                    .collect()
            })
            .collect()
    }
}

#[cfg(feature = "build-binary")]
impl TryFrom<&Config> for PlannerConfig {
    type Error = PlannerError;

    fn try_from(opt: &Config) -> Result<Self> {
        let settings = HashMap::from([
            (INPUT_PATHS.to_string(), opt.input.join(",")),
            (INPUT_RECURSIVE.to_string(), opt.recursive.to_string()),
            (
                SPLIT_MIN_SIZE_PER_NODE.to_string(),
                opt.min_split_size_node.to_string(),
            ),
            (
                SPLIT_MIN_SIZE_PER_RACK.to_string(),
                opt.min_split_size_rack.to_string(),
            ),
            (SPLIT_MAX_SIZE.to_string(), opt.max_split_size.to_string()),
            (SPLIT_MODE.to_string(), opt.mode.to_string()),
            (
                PLANNER_PARALLEL_POOLS.to_string(),
                opt.parallel_pools.to_string(),
            ),
        ]);
        PlannerConfig::with_settings(settings)
    }
}
