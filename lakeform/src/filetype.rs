// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical file formats and their Glue crawler classifier identifiers

use crate::error::LakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classifier identifier for formats no built-in classifier recognises
pub const UNKNOWN_CLASSIFIER: &str = "UNKNOWN";

/// File format stored under a dataset prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Filetype {
    ApacheAvro,
    ApacheOrc,
    ApacheParquet,
    Json,
    BinaryJson,
    Xml,
    AmazonIon,
    CombinedApacheLog,
    ApacheLog,
    LinuxKernelLog,
    MicrosoftLog,
    RubyLog,
    #[serde(rename = "SQUID_3_LOG")]
    Squid3Log,
    RedisMonitorLog,
    RedisLog,
    Csv,
    AmazonRedshift,
    Mysql,
    Postgresql,
    OracleDatabase,
    MicrosoftSqlServer,
    AmazonDynamodb,
    Other,
}

impl Filetype {
    pub const ALL: [Filetype; 23] = [
        Filetype::ApacheAvro,
        Filetype::ApacheOrc,
        Filetype::ApacheParquet,
        Filetype::Json,
        Filetype::BinaryJson,
        Filetype::Xml,
        Filetype::AmazonIon,
        Filetype::CombinedApacheLog,
        Filetype::ApacheLog,
        Filetype::LinuxKernelLog,
        Filetype::MicrosoftLog,
        Filetype::RubyLog,
        Filetype::Squid3Log,
        Filetype::RedisMonitorLog,
        Filetype::RedisLog,
        Filetype::Csv,
        Filetype::AmazonRedshift,
        Filetype::Mysql,
        Filetype::Postgresql,
        Filetype::OracleDatabase,
        Filetype::MicrosoftSqlServer,
        Filetype::AmazonDynamodb,
        Filetype::Other,
    ];

    /// Glue crawler classifier identifier for this format
    pub fn glue_classifier(&self) -> &'static str {
        match self {
            Filetype::ApacheAvro => "avro",
            Filetype::ApacheOrc => "orc",
            Filetype::ApacheParquet => "parquet",
            Filetype::Json => "json",
            Filetype::BinaryJson => "bson",
            Filetype::Xml => "xml",
            Filetype::AmazonIon => "ion",
            Filetype::CombinedApacheLog => "combined_apache",
            Filetype::ApacheLog => "apache",
            Filetype::LinuxKernelLog => "linux_kernel",
            Filetype::MicrosoftLog => "microsoft_log",
            Filetype::RubyLog => "ruby_logger",
            Filetype::Squid3Log => "squid",
            Filetype::RedisMonitorLog => "redismonlog",
            Filetype::RedisLog => "redislog",
            Filetype::Csv => "csv",
            Filetype::AmazonRedshift => "redshift",
            Filetype::Mysql => "mysql",
            Filetype::Postgresql => "postgresql",
            Filetype::OracleDatabase => "oracle",
            Filetype::MicrosoftSqlServer => "sqlserver",
            Filetype::AmazonDynamodb => "dynamicdb",
            Filetype::Other => UNKNOWN_CLASSIFIER,
        }
    }

    /// Canonical upper-case name, as used in manifests
    pub fn name(&self) -> &'static str {
        match self {
            Filetype::ApacheAvro => "APACHE_AVRO",
            Filetype::ApacheOrc => "APACHE_ORC",
            Filetype::ApacheParquet => "APACHE_PARQUET",
            Filetype::Json => "JSON",
            Filetype::BinaryJson => "BINARY_JSON",
            Filetype::Xml => "XML",
            Filetype::AmazonIon => "AMAZON_ION",
            Filetype::CombinedApacheLog => "COMBINED_APACHE_LOG",
            Filetype::ApacheLog => "APACHE_LOG",
            Filetype::LinuxKernelLog => "LINUX_KERNEL_LOG",
            Filetype::MicrosoftLog => "MICROSOFT_LOG",
            Filetype::RubyLog => "RUBY_LOG",
            Filetype::Squid3Log => "SQUID_3_LOG",
            Filetype::RedisMonitorLog => "REDIS_MONITOR_LOG",
            Filetype::RedisLog => "REDIS_LOG",
            Filetype::Csv => "CSV",
            Filetype::AmazonRedshift => "AMAZON_REDSHIFT",
            Filetype::Mysql => "MYSQL",
            Filetype::Postgresql => "POSTGRESQL",
            Filetype::OracleDatabase => "ORACLE_DATABASE",
            Filetype::MicrosoftSqlServer => "MICROSOFT_SQL_SERVER",
            Filetype::AmazonDynamodb => "AMAZON_DYNAMODB",
            Filetype::Other => "OTHER",
        }
    }

    /// True when a built-in Glue classifier exists for this format
    pub fn has_builtin_classifier(&self) -> bool {
        !matches!(self, Filetype::Other)
    }
}

impl fmt::Display for Filetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Filetype {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Filetype::ALL
            .iter()
            .copied()
            .find(|filetype| filetype.name() == wanted)
            .ok_or_else(|| LakeError::InvalidConfiguration(format!("Unknown filetype '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_classifier_lookup_is_total() {
        for filetype in Filetype::ALL {
            assert!(
                !filetype.glue_classifier().is_empty(),
                "{} has no classifier",
                filetype
            );
        }
    }

    #[test]
    fn test_other_maps_to_unknown() {
        assert_eq!(Filetype::Other.glue_classifier(), "UNKNOWN");
        assert!(!Filetype::Other.has_builtin_classifier());
    }

    #[test]
    fn test_known_classifiers() {
        assert_eq!(Filetype::Csv.glue_classifier(), "csv");
        assert_eq!(Filetype::ApacheParquet.glue_classifier(), "parquet");
        assert_eq!(Filetype::BinaryJson.glue_classifier(), "bson");
        assert_eq!(Filetype::AmazonDynamodb.glue_classifier(), "dynamicdb");
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = Filetype::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Filetype::ALL.len());
    }

    #[test]
    fn test_parse_and_serde_agree() {
        for filetype in Filetype::ALL {
            let parsed: Filetype = filetype.name().parse().unwrap();
            assert_eq!(parsed, filetype);

            let json = serde_json::to_string(&filetype).unwrap();
            assert_eq!(json, format!("\"{}\"", filetype.name()));
        }
        assert_eq!("csv".parse::<Filetype>().unwrap(), Filetype::Csv);
        assert!("EXCEL".parse::<Filetype>().is_err());
    }
}
