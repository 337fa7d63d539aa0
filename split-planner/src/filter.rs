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

//! Path predicates used to assign files to pools.

use std::fmt::{Display, Formatter};

/// A predicate over file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    /// Accepts paths starting with the given prefix.
    Prefix(String),
    /// Accepts paths ending with the given suffix.
    Suffix(String),
    /// Accepts a path when any inner filter does. Empty accepts nothing.
    AnyOf(Vec<PathFilter>),
    /// Accepts a path when every inner filter does. Empty accepts everything.
    AllOf(Vec<PathFilter>),
    /// Inverts the inner filter.
    Not(Box<PathFilter>),
}

impl PathFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        PathFilter::Prefix(prefix.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        PathFilter::Suffix(suffix.into())
    }

    pub fn accepts(&self, path: &str) -> bool {
        match self {
            PathFilter::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathFilter::Suffix(suffix) => path.ends_with(suffix.as_str()),
            PathFilter::AnyOf(filters) => filters.iter().any(|f| f.accepts(path)),
            PathFilter::AllOf(filters) => filters.iter().all(|f| f.accepts(path)),
            PathFilter::Not(inner) => !inner.accepts(path),
        }
    }
}

impl Display for PathFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn join(filters: &[PathFilter]) -> String {
            filters
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            PathFilter::Prefix(p) => write!(f, "prefix({p})"),
            PathFilter::Suffix(s) => write!(f, "suffix({s})"),
            PathFilter::AnyOf(filters) => write!(f, "any[{}]", join(filters)),
            PathFilter::AllOf(filters) => write!(f, "all[{}]", join(filters)),
            PathFilter::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

/// Returns true for marker and checksum names such as `_SUCCESS` or `.part-0.crc`.
pub(crate) fn is_hidden(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.starts_with('_') || name.starts_with('.')
}
