//! DynamoDB table access
//!
//! Thin async wrapper over the DynamoDB client: table lifecycle, point reads
//! and writes, `SET` updates and full paginated scans. Items are plain
//! attribute maps; typing them is the caller's business.

use crate::error::{AwsError, Result};
use aws_sdk_dynamodb::{
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
        ScalarAttributeType,
    },
    Client,
};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// One DynamoDB item (row)
pub type Item = HashMap<String, AttributeValue>;

/// One `SET name = :placeholder` clause of an update expression
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub name: String,
    pub value: AttributeValue,
}

impl AttributeUpdate {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A rendered update expression with its placeholder maps
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: Item,
}

impl UpdateExpression {
    /// Render `SET #a0 = :v0, #a1 = :v1`. Attribute names always go through
    /// placeholders since several useful names are reserved words.
    pub fn render(updates: &[AttributeUpdate]) -> Self {
        let mut clauses = Vec::with_capacity(updates.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (i, update) in updates.iter().enumerate() {
            let name_key = format!("#a{}", i);
            let value_key = format!(":v{}", i);
            clauses.push(format!("{} = {}", name_key, value_key));
            names.insert(name_key, update.name.clone());
            values.insert(value_key, update.value.clone());
        }

        Self {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
        }
    }
}

/// Table metadata from `DescribeTable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub item_count: Option<i64>,
    pub primary_key_name: Option<String>,
    pub status: Option<String>,
    pub bytes_size: Option<i64>,
}

#[derive(Clone)]
pub struct DynamoAccessor {
    client: Client,
}

impl DynamoAccessor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        match self.client.describe_table().table_name(table).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_resource_not_found_exception())
                    .unwrap_or(false);
                if missing {
                    Ok(false)
                } else {
                    Err(AwsError::service("describe_table", table, err))
                }
            },
        }
    }

    /// Create a pay-per-request table keyed by one string hash key.
    ///
    /// Returns once the request is accepted; the table is still `CREATING`
    /// until [`table_metadata`](Self::table_metadata) reports `ACTIVE`.
    #[instrument(skip(self))]
    pub async fn create_table(&self, table: &str, partition_key: &str) -> Result<()> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(partition_key)
            .key_type(KeyType::Hash)
            .build()?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(partition_key)
            .attribute_type(ScalarAttributeType::S)
            .build()?;

        self.client
            .create_table()
            .table_name(table)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| AwsError::service("create_table", table, e))?;

        info!(table, partition_key, "Created DynamoDB table");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn table_metadata(&self, table: &str) -> Result<TableMetadata> {
        let response = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| AwsError::service("describe_table", table, e))?;

        let description = response.table();
        Ok(TableMetadata {
            item_count: description.and_then(|t| t.item_count()),
            primary_key_name: description
                .and_then(|t| t.key_schema().first())
                .map(|k| k.attribute_name().to_string()),
            status: description
                .and_then(|t| t.table_status())
                .map(|s| s.as_str().to_string()),
            bytes_size: description.and_then(|t| t.table_size_bytes()),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, table: &str, pk_name: &str, pk_value: &str) -> Result<Option<Item>> {
        let response = self
            .client
            .get_item()
            .table_name(table)
            .key(pk_name, AttributeValue::S(pk_value.to_string()))
            .send()
            .await
            .map_err(|e| AwsError::service("get_item", table, e))?;

        debug!(found = response.item().is_some(), "DynamoDB get_item");
        Ok(response.item().cloned())
    }

    /// Unconditional put. Returns the item it replaced, if any.
    #[instrument(skip(self, item))]
    pub async fn put_item(&self, table: &str, item: Item) -> Result<Option<Item>> {
        let response = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| AwsError::service("put_item", table, e))?;

        Ok(response.attributes().cloned())
    }

    /// Apply `SET` updates to one item; DynamoDB creates the item when the
    /// key does not exist yet.
    #[instrument(skip(self, updates))]
    pub async fn update_item(
        &self,
        table: &str,
        pk_name: &str,
        pk_value: &str,
        updates: &[AttributeUpdate],
    ) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let rendered = UpdateExpression::render(updates);
        debug!(expression = %rendered.expression, "DynamoDB update_item");

        self.client
            .update_item()
            .table_name(table)
            .key(pk_name, AttributeValue::S(pk_value.to_string()))
            .update_expression(rendered.expression)
            .set_expression_attribute_names(Some(rendered.names))
            .set_expression_attribute_values(Some(rendered.values))
            .send()
            .await
            .map_err(|e| AwsError::service("update_item", table, e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, table: &str, pk_name: &str, pk_value: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .key(pk_name, AttributeValue::S(pk_value.to_string()))
            .send()
            .await
            .map_err(|e| AwsError::service("delete_item", table, e))?;

        Ok(())
    }

    /// Scan every page of the table
    #[instrument(skip(self))]
    pub async fn scan_all(&self, table: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let response = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| AwsError::service("scan", table, e))?;

            items.extend(response.items().iter().cloned());

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!(count = items.len(), "DynamoDB scan complete");
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_update_expression() {
        let rendered = UpdateExpression::render(&[
            AttributeUpdate::new("time_stamp", AttributeValue::S("2024-05-01T10:00:00Z".into())),
            AttributeUpdate::new("digest", AttributeValue::S("abc".into())),
        ]);

        assert_eq!(rendered.expression, "SET #a0 = :v0, #a1 = :v1");
        assert_eq!(rendered.names["#a0"], "time_stamp");
        assert_eq!(rendered.names["#a1"], "digest");
        assert_eq!(rendered.values[":v1"], AttributeValue::S("abc".into()));
    }

    #[test]
    fn test_render_single_update() {
        let rendered =
            UpdateExpression::render(&[AttributeUpdate::new("state", AttributeValue::Bool(true))]);
        assert_eq!(rendered.expression, "SET #a0 = :v0");
        assert_eq!(rendered.values.len(), 1);
    }
}
