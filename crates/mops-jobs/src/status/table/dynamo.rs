use super::{StatusTable, STATUS_TABLE_KEY};
use crate::error::{JobsError, Result};
use crate::status::types::StatusRecord;
use async_trait::async_trait;
use mops_aws::{AttributeUpdate, AttributeValue, DynamoAccessor, Item};
use tracing::{debug, instrument};

const TABLE_ACTIVE: &str = "ACTIVE";

/// Status records stored in a DynamoDB table
pub struct DynamoStatusTable {
    accessor: DynamoAccessor,
    table_name: String,
}

impl DynamoStatusTable {
    pub fn new(accessor: DynamoAccessor, table_name: impl Into<String>) -> Self {
        Self {
            accessor,
            table_name: table_name.into(),
        }
    }
}

fn string_attr(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

fn digest_attr(digest: Option<&str>) -> AttributeValue {
    match digest {
        Some(d) => string_attr(d),
        None => AttributeValue::Null(true),
    }
}

pub(crate) fn record_to_item(record: &StatusRecord) -> Item {
    Item::from([
        (STATUS_TABLE_KEY.to_string(), string_attr(&record.id)),
        ("asset_id".to_string(), string_attr(&record.asset_id)),
        ("complete".to_string(), AttributeValue::Bool(record.complete)),
        ("digest".to_string(), digest_attr(record.digest.as_deref())),
        ("state".to_string(), string_attr(&record.state)),
        ("time_stamp".to_string(), string_attr(&record.time_stamp)),
    ])
}

fn get_string(item: &Item, name: &str) -> Option<String> {
    match item.get(name) {
        Some(AttributeValue::S(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Attributes a partial item lacks read back as empty strings and `false`
pub(crate) fn item_to_record(item: &Item) -> Result<StatusRecord> {
    let id = get_string(item, STATUS_TABLE_KEY)
        .ok_or_else(|| JobsError::table("status item has no string 'id' attribute"))?;

    let complete = match item.get("complete") {
        Some(AttributeValue::Bool(b)) => *b,
        _ => false,
    };

    Ok(StatusRecord {
        id,
        asset_id: get_string(item, "asset_id").unwrap_or_default(),
        complete,
        digest: get_string(item, "digest"),
        state: get_string(item, "state").unwrap_or_default(),
        time_stamp: get_string(item, "time_stamp").unwrap_or_default(),
    })
}

#[async_trait]
impl StatusTable for DynamoStatusTable {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.accessor.table_exists(&self.table_name).await?)
    }

    async fn create(&self) -> Result<()> {
        Ok(self
            .accessor
            .create_table(&self.table_name, STATUS_TABLE_KEY)
            .await?)
    }

    async fn is_ready(&self) -> Result<bool> {
        let metadata = self.accessor.table_metadata(&self.table_name).await?;
        Ok(metadata.status.as_deref() == Some(TABLE_ACTIVE))
    }

    async fn get(&self, job_id: &str) -> Result<Option<StatusRecord>> {
        self.accessor
            .get_item(&self.table_name, STATUS_TABLE_KEY, job_id)
            .await?
            .map(|item| item_to_record(&item))
            .transpose()
    }

    #[instrument(skip(self, record), fields(table = %self.table_name, id = %record.id))]
    async fn put(&self, record: &StatusRecord) -> Result<bool> {
        let previous = self
            .accessor
            .put_item(&self.table_name, record_to_item(record))
            .await?;

        let replaced = previous.map(|item| !item.is_empty()).unwrap_or(false);
        debug!(replaced, "Status record written");
        Ok(replaced)
    }

    async fn refresh(&self, job_id: &str, time_stamp: &str, digest: Option<&str>) -> Result<()> {
        let mut updates = vec![AttributeUpdate::new("time_stamp", string_attr(time_stamp))];
        if let Some(digest) = digest {
            updates.push(AttributeUpdate::new("digest", string_attr(digest)));
        }

        Ok(self
            .accessor
            .update_item(&self.table_name, STATUS_TABLE_KEY, job_id, &updates)
            .await?)
    }

    async fn scan(&self) -> Result<Vec<StatusRecord>> {
        self.accessor
            .scan_all(&self.table_name)
            .await?
            .iter()
            .map(item_to_record)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(digest: Option<&str>) -> StatusRecord {
        StatusRecord {
            id: "transcode-42".to_string(),
            asset_id: "42".to_string(),
            complete: true,
            digest: digest.map(str::to_string),
            state: "done".to_string(),
            time_stamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_record_item_conversion() {
        let item = record_to_item(&record(Some("abc")));
        assert_eq!(item["complete"], AttributeValue::Bool(true));
        assert_eq!(item["digest"], AttributeValue::S("abc".to_string()));
        assert_eq!(item_to_record(&item).unwrap(), record(Some("abc")));
    }

    #[test]
    fn test_missing_digest_is_stored_as_null() {
        let item = record_to_item(&record(None));
        assert_eq!(item["digest"], AttributeValue::Null(true));
        assert_eq!(item_to_record(&item).unwrap().digest, None);
    }

    #[test]
    fn test_partial_item_reads_with_defaults() {
        let item = Item::from([
            ("id".to_string(), string_attr("transcode-7")),
            ("time_stamp".to_string(), string_attr("2024-01-01T00:00:00Z")),
        ]);

        let record = item_to_record(&item).unwrap();
        assert_eq!(record.asset_id, "");
        assert_eq!(record.state, "");
        assert!(!record.complete);
        assert_eq!(record.digest, None);
    }

    #[test]
    fn test_item_without_id_is_rejected() {
        let item = Item::from([("state".to_string(), string_attr("done"))]);
        assert!(matches!(item_to_record(&item), Err(JobsError::Table(_))));
    }
}
