// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Glue catalog declarations
//!
//! Tables are declared with an empty schema and the parameters a crawler writes
//! before its first run. The crawler later discovers the columns.

use crate::error::{LakeError, LakeResult};
use crate::stack::Stack;
use crate::template::{LogicalId, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DATABASE_RESOURCE_TYPE: &str = "AWS::Glue::Database";
pub const TABLE_RESOURCE_TYPE: &str = "AWS::Glue::Table";
pub const CRAWLER_RESOURCE_TYPE: &str = "AWS::Glue::Crawler";
pub const CLASSIFIER_RESOURCE_TYPE: &str = "AWS::Glue::Classifier";

/// Configuration attached verbatim to every crawler
pub const CRAWLER_CONFIGURATION: &str =
    r#"{"Grouping": {"TableGroupingPolicy": "CombineCompatibleSchemas"}, "Version": 1.0}"#;

pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";
pub const TABLE_OWNER: &str = "owner";

/// Parameters of a table whose schema has not been crawled yet
const PENDING_CRAWL_PARAMETERS: [(&str, &str); 10] = [
    ("CrawlerSchemaDeserializerVersion", "1.0"),
    ("CrawlerSchemaSerializerVersion", "1.0"),
    ("averageRecordSize", "0"),
    ("classification", "UNKNOWN"),
    ("compressionType", "unknown"),
    ("has_encrypted_data", "false"),
    ("objectCount", "0"),
    ("recordCount", "0"),
    ("sizeKey", "0"),
    ("typeOfData", "file"),
];

fn pending_crawl_parameters() -> Value {
    let params: Map<String, Value> = PENDING_CRAWL_PARAMETERS
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    Value::Object(params)
}

/// Declared catalog database
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    arn: String,
    logical_id: LogicalId,
}

impl Database {
    pub fn new(stack: &Stack, path: &str, name: impl Into<String>) -> LakeResult<Self> {
        let name = name.into();
        let properties = json!({
            "CatalogId": stack.environment().catalog_id(),
            "DatabaseInput": { "Name": name },
        });
        let logical_id = stack.add_resource(path, Resource::new(DATABASE_RESOURCE_TYPE, properties))?;
        Ok(Self {
            arn: stack.arns().glue_database(&name),
            name,
            logical_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
}

/// Declare an external table at `location` in `database`
///
/// The table depends on its database.
pub fn declare_table(
    stack: &Stack,
    path: &str,
    database: &Database,
    name: &str,
    description: &str,
    location: &str,
) -> LakeResult<LogicalId> {
    let parameters = pending_crawl_parameters();
    let properties = json!({
        "CatalogId": stack.environment().catalog_id(),
        "DatabaseName": database.name(),
        "TableInput": {
            "Name": name,
            "Description": description,
            "Owner": TABLE_OWNER,
            "Retention": 0,
            "Parameters": parameters,
            "PartitionKeys": [],
            "TableType": EXTERNAL_TABLE,
            "StorageDescriptor": {
                "Columns": [],
                "Location": location,
                "Compressed": true,
                "NumberOfBuckets": -1,
                "SerdeInfo": { "Parameters": {} },
                "Parameters": parameters,
                "StoredAsSubDirectories": false,
            },
        },
    });
    stack.add_resource(
        path,
        Resource::new(TABLE_RESOURCE_TYPE, properties).depends_on([database.logical_id()]),
    )
}

/// Crawler run schedule, e.g. `cron(0 1 * * ? *)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlerSchedule {
    pub expression: String,
}

impl CrawlerSchedule {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }
}

/// Everything a crawler declaration needs
#[derive(Debug, Clone)]
pub struct CrawlerProps {
    pub name: String,
    pub description: String,
    pub role_arn: String,
    pub database_name: String,
    /// `s3://bucket/prefix` the crawler scans
    pub s3_target: String,
    pub classifiers: Vec<String>,
    pub schedule: Option<CrawlerSchedule>,
}

pub fn declare_crawler<'a, I>(
    stack: &Stack,
    path: &str,
    props: CrawlerProps,
    depends_on: I,
) -> LakeResult<LogicalId>
where
    I: IntoIterator<Item = &'a LogicalId>,
{
    let mut properties = json!({
        "Name": props.name,
        "Description": props.description,
        "Role": props.role_arn,
        "DatabaseName": props.database_name,
        "Targets": { "S3Targets": [{ "Path": props.s3_target }] },
        "Configuration": CRAWLER_CONFIGURATION,
    });
    if !props.classifiers.is_empty() {
        properties["Classifiers"] = json!(props.classifiers);
    }
    if let Some(schedule) = &props.schedule {
        properties["Schedule"] = json!({ "ScheduleExpression": schedule.expression });
    }
    stack.add_resource(
        path,
        Resource::new(CRAWLER_RESOURCE_TYPE, properties).depends_on(depends_on),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderPolicy {
    Unknown,
    Present,
    Absent,
}

impl HeaderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderPolicy::Unknown => "UNKNOWN",
            HeaderPolicy::Present => "PRESENT",
            HeaderPolicy::Absent => "ABSENT",
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_quote_symbol() -> String {
    "\"".to_string()
}

fn default_header_policy() -> HeaderPolicy {
    HeaderPolicy::Unknown
}

/// Custom CSV classifier definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvClassifierProps {
    pub name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_quote_symbol")]
    pub quote_symbol: String,
    #[serde(default = "default_header_policy")]
    pub contains_header: HeaderPolicy,
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub allow_single_column: bool,
    #[serde(default)]
    pub disable_value_trimming: bool,
}

impl CsvClassifierProps {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delimiter: default_delimiter(),
            quote_symbol: default_quote_symbol(),
            contains_header: default_header_policy(),
            header: Vec::new(),
            allow_single_column: false,
            disable_value_trimming: false,
        }
    }

    /// Tab-separated values without a header row
    pub fn tsv(name: impl Into<String>) -> Self {
        Self {
            delimiter: "\t".to_string(),
            contains_header: HeaderPolicy::Absent,
            ..Self::new(name)
        }
    }

    pub fn validate(&self) -> LakeResult<()> {
        if self.name.trim().is_empty() {
            return Err(LakeError::InvalidConfiguration(
                "classifier name must not be empty".to_string(),
            ));
        }
        if self.delimiter.chars().count() != 1 {
            return Err(LakeError::InvalidConfiguration(format!(
                "classifier '{}' delimiter must be a single character",
                self.name
            )));
        }
        if self.quote_symbol.chars().count() != 1 {
            return Err(LakeError::InvalidConfiguration(format!(
                "classifier '{}' quote symbol must be a single character",
                self.name
            )));
        }
        if self.delimiter == self.quote_symbol {
            return Err(LakeError::InvalidConfiguration(format!(
                "classifier '{}' uses the same character as delimiter and quote",
                self.name
            )));
        }
        Ok(())
    }
}

/// Declared custom classifier; crawlers reference it by name
#[derive(Debug, Clone)]
pub struct Classifier {
    name: String,
    logical_id: LogicalId,
}

impl Classifier {
    pub fn csv(stack: &Stack, path: &str, props: &CsvClassifierProps) -> LakeResult<Self> {
        props.validate()?;
        let mut csv = json!({
            "Name": props.name,
            "Delimiter": props.delimiter,
            "QuoteSymbol": props.quote_symbol,
            "ContainsHeader": props.contains_header.as_str(),
            "AllowSingleColumn": props.allow_single_column,
            "DisableValueTrimming": props.disable_value_trimming,
        });
        if !props.header.is_empty() {
            csv["Header"] = json!(props.header);
        }
        let logical_id = stack.add_resource(
            path,
            Resource::new(CLASSIFIER_RESOURCE_TYPE, json!({ "CsvClassifier": csv })),
        )?;
        Ok(Self {
            name: props.name.clone(),
            logical_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }
}
