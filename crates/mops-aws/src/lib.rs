//! Media Ops AWS helpers
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Credential resolution and client construction for the AWS services the
//! media-ops tooling talks to, plus thin accessors over DynamoDB tables and
//! S3 objects.
//!
//! # Example
//!
//! ```no_run
//! use mops_aws::{AwsClientFactory, AwsDetails, DynamoAccessor};
//!
//! # async fn run() -> mops_aws::Result<()> {
//! let details = AwsDetails::from_json_str(r#"{"region_name": "us-east-1", "profile_name": "ops"}"#)?;
//! let factory = AwsClientFactory::new(Some(&details)).await?;
//! let dynamo = DynamoAccessor::new(factory.dynamodb());
//! let present = dynamo.table_exists("job-status").await?;
//! # let _ = present;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod dynamo;
pub mod error;
pub mod s3;

pub use credentials::{AwsClientFactory, AwsDetails, CredentialSource, StaticKeys};
pub use dynamo::{AttributeUpdate, DynamoAccessor, Item, TableMetadata};
pub use error::{AwsError, Result};
pub use s3::{S3Location, S3Objects};

pub use aws_sdk_dynamodb::types::AttributeValue;
