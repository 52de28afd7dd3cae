use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{RawRecord, RecordQuery, RecordSource, SourceError};

use super::PostgresRecordSource;

const SOURCE: &str = "infra::db::menu";

const SELECT_ACTIVE_GROUPS: &str = "SELECT row_to_json(g) FROM ( \
        SELECT id, label, slug, description, image, image_alt, age_group, \
               is_active, sort_order, display_options \
        FROM menu_groups \
        WHERE is_active = true \
        ORDER BY sort_order ASC \
    ) g";

const SELECT_SECTIONS_OF_GROUP: &str = "SELECT row_to_json(s) FROM ( \
        SELECT id, heading, description, sort_order \
        FROM menu_sections \
        WHERE group_id::text = $1 \
        ORDER BY sort_order ASC \
    ) s";

const SELECT_ACTIVE_CATEGORIES_OF_SECTION: &str = "SELECT row_to_json(c) FROM ( \
        SELECT id, name, slug, description, product_count, is_active, \
               sort_order, featured, promotional_badge, image \
        FROM menu_categories \
        WHERE section_id::text = $1 AND is_active = true \
        ORDER BY sort_order ASC \
    ) c";

/// Map a driver failure onto the source error taxonomy. Pool and connection
/// failures mean the source is unreachable.
pub fn map_sqlx_error(query: &RecordQuery, err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => SourceError::Unavailable,
        sqlx::Error::Database(db) => SourceError::query(query, db.message()),
        other => SourceError::query(query, other),
    }
}

fn into_record(query: &RecordQuery, value: Value) -> Result<RawRecord, SourceError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SourceError::malformed(
            query.name(),
            format!("expected a JSON object row, got `{other}`"),
        )),
    }
}

#[async_trait]
impl RecordSource for PostgresRecordSource {
    async fn fetch(&self, query: RecordQuery) -> Result<Vec<RawRecord>, SourceError> {
        let statement = match &query {
            RecordQuery::ActiveGroups => sqlx::query_scalar::<_, Value>(SELECT_ACTIVE_GROUPS),
            RecordQuery::SectionsOfGroup(group_id) => {
                sqlx::query_scalar::<_, Value>(SELECT_SECTIONS_OF_GROUP).bind(group_id.clone())
            }
            RecordQuery::ActiveCategoriesOfSection(section_id) => {
                sqlx::query_scalar::<_, Value>(SELECT_ACTIVE_CATEGORIES_OF_SECTION)
                    .bind(section_id.clone())
            }
        };

        let rows = statement
            .fetch_all(self.pool())
            .await
            .map_err(|err| map_sqlx_error(&query, err))?;

        debug!(target = SOURCE, query = %query, rows = rows.len(), "Fetched menu records");

        rows.into_iter()
            .map(|value| into_record(&query, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pool_failures_mean_unavailable() {
        let err = map_sqlx_error(&RecordQuery::ActiveGroups, sqlx::Error::PoolTimedOut);
        assert!(matches!(err, SourceError::Unavailable));
    }

    #[test]
    fn other_failures_name_the_query() {
        let query = RecordQuery::SectionsOfGroup("baby".into());
        let err = map_sqlx_error(&query, sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            SourceError::Query {
                query: "sections-of-group",
                ..
            }
        ));
    }

    #[test]
    fn non_object_rows_are_malformed() {
        let err = into_record(&RecordQuery::ActiveGroups, json!([1, 2]))
            .expect_err("array row must be rejected");
        assert!(matches!(err, SourceError::Malformed { kind: "groups", .. }));

        let record = into_record(&RecordQuery::ActiveGroups, json!({ "id": "baby" }))
            .expect("object row");
        assert_eq!(record.get("id"), Some(&json!("baby")));
    }
}
