// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for data lake composition

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LakeError {
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Duplicate prefix: {0}")]
    DuplicatePrefix(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Dependency cycle detected at resource: {0}")]
    DependencyCycle(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for LakeError {
    fn from(err: std::io::Error) -> Self {
        LakeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for LakeError {
    fn from(err: serde_json::Error) -> Self {
        LakeError::SerializationError(err.to_string())
    }
}

pub type LakeResult<T> = Result<T, LakeError>;
