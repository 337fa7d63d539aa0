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

//! Split planner error types

use std::{
    error::Error,
    fmt::{Display, Formatter},
    io, result,
};

/// Result type alias for split planning operations.
pub type Result<T> = result::Result<T, PlannerError>;

/// Errors raised while listing inputs or planning splits.
#[derive(Debug)]
pub enum PlannerError {
    /// A non-recursive listing found a directory inside an input directory.
    NestedDirectory(String),
    /// Split size thresholds contradict each other.
    InvalidThreshold(String),
    /// The storage layer could not list a path or resolve block locations.
    StorageUnavailable(String),
    /// An input path does not exist.
    InvalidInput(String),
    /// Configuration error with invalid settings.
    Configuration(String),
    /// I/O operation error.
    IoError(io::Error),
    /// Catalog (de)serialization error.
    SerdeError(serde_json::Error),
    /// Tokio task join error.
    TokioError(tokio::task::JoinError),
}

#[allow(clippy::from_over_into)]
impl<T> Into<Result<T>> for PlannerError {
    fn into(self) -> Result<T> {
        Err(self)
    }
}

impl From<io::Error> for PlannerError {
    fn from(e: io::Error) -> Self {
        PlannerError::IoError(e)
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(e: serde_json::Error) -> Self {
        PlannerError::SerdeError(e)
    }
}

impl From<tokio::task::JoinError> for PlannerError {
    fn from(e: tokio::task::JoinError) -> Self {
        PlannerError::TokioError(e)
    }
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            PlannerError::NestedDirectory(path) => {
                write!(f, "Not a file: {path} (set input.recursive to descend)")
            }
            PlannerError::InvalidThreshold(desc) => {
                write!(f, "Invalid split size threshold: {desc}")
            }
            PlannerError::StorageUnavailable(desc) => {
                write!(f, "Storage unavailable: {desc}")
            }
            PlannerError::InvalidInput(desc) => write!(f, "Invalid input: {desc}"),
            PlannerError::Configuration(desc) => {
                write!(f, "Configuration error: {desc}")
            }
            PlannerError::IoError(desc) => write!(f, "IO error: {desc}"),
            PlannerError::SerdeError(desc) => write!(f, "Catalog format error: {desc}"),
            PlannerError::TokioError(desc) => write!(f, "Tokio join error: {desc}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlannerError::IoError(e) => Some(e),
            PlannerError::SerdeError(e) => Some(e),
            PlannerError::TokioError(e) => Some(e),
            _ => None,
        }
    }
}
