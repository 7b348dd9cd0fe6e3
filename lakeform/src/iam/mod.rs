// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! IAM identities and policies
//!
//! Roles are the principals grants are made to. Every grant attaches a new
//! inline policy to its role; attached policies are never merged or removed.

pub mod managed_policy;
pub mod policy;
pub mod principal;
pub mod role;

pub use managed_policy::ManagedPolicy;
pub use policy::{wildcard_match, Effect, Policy, PolicyDocument, PolicyStatement};
pub use principal::Principal;
pub use role::{AttachedPolicy, Role, RoleProps};
