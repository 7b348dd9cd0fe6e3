//! Test utilities for lakeform integration tests
//!
//! `LakeFixture` builds a stack with a registration role and an analyst role so
//! tests only declare what they exercise.

#![allow(dead_code)]

pub mod lake_fixture;
