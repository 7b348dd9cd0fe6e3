// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Principals allowed to assume a role

use super::policy::POLICY_LANGUAGE_VERSION;
use crate::naming::Arns;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// AWS service, e.g. `glue.amazonaws.com`
    Service(String),
    /// Any identity in the given account
    Account(String),
    /// Several principals in one trust statement
    Composite(Vec<Principal>),
}

impl Principal {
    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(name.into())
    }

    pub fn account(id: impl Into<String>) -> Self {
        Principal::Account(id.into())
    }

    fn collect<'a>(&'a self, services: &mut Vec<&'a str>, accounts: &mut Vec<&'a str>) {
        match self {
            Principal::Service(name) => services.push(name),
            Principal::Account(id) => accounts.push(id),
            Principal::Composite(principals) => {
                for principal in principals {
                    principal.collect(services, accounts);
                }
            }
        }
    }

    /// Trust policy letting this principal assume a role
    pub fn assume_role_policy(&self, arns: &Arns<'_>) -> Value {
        let mut services = Vec::new();
        let mut accounts = Vec::new();
        self.collect(&mut services, &mut accounts);

        let mut principal = Map::new();
        if !accounts.is_empty() {
            let roots: Vec<String> = accounts.iter().map(|a| arns.account_root(a)).collect();
            principal.insert("AWS".to_string(), one_or_many(roots));
        }
        if !services.is_empty() {
            principal.insert(
                "Service".to_string(),
                one_or_many(services.iter().map(|s| s.to_string()).collect()),
            );
        }

        json!({
            "Version": POLICY_LANGUAGE_VERSION,
            "Statement": [{
                "Effect": "Allow",
                "Action": "sts:AssumeRole",
                "Principal": Value::Object(principal),
            }]
        })
    }
}

fn one_or_many(mut values: Vec<String>) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        json!(values)
    }
}
