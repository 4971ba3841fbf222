//! PostgreSQL-based metadata store implementation.

use crate::error::{classify_db_error, MetadataError, MetadataResult};
use crate::models::*;
use crate::query::{Dialect, QueryBuilder, SqlArg};
use crate::repos::{BoxRepo, InstanceRepo, StampRepo, StatsRepo, TagRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Pool, Postgres};
use stampkeeper_core::listing::StampFilters;
use time::OffsetDateTime;
use uuid::Uuid;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("schema_postgres.sql");

/// Split the schema into individual statements; Postgres prepared statements
/// execute one at a time.
fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect from a connection URL and migrate.
    pub async fn from_url(url: &str, max_connections: u32) -> MetadataResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }
}

/// Bind builder-collected args onto a typed row query.
fn bind_query_as<'q, O>(
    sql: &'q str,
    args: &'q [SqlArg],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, PgRow>,
{
    let mut query = sqlx::query_as::<Postgres, O>(sql);
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v.as_str()),
            SqlArg::Int(v) => query.bind(*v),
            SqlArg::Uuid(v) => query.bind(*v),
            SqlArg::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// Bind builder-collected args onto a scalar query.
fn bind_query_scalar<'q, O>(
    sql: &'q str,
    args: &'q [SqlArg],
) -> sqlx::query::QueryScalar<'q, Postgres, O, PgArguments>
where
    (O,): for<'r> sqlx::FromRow<'r, PgRow>,
{
    let mut query = sqlx::query_scalar::<Postgres, O>(sql);
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v.as_str()),
            SqlArg::Int(v) => query.bind(*v),
            SqlArg::Uuid(v) => query.bind(*v),
            SqlArg::Bool(v) => query.bind(*v),
        };
    }
    query
}

const STAMP_COLUMNS: &str = "s.id, s.name, s.scott_number, s.issue_date, s.series, \
     s.notes, s.image_url, s.date_added, s.date_modified";

impl PostgresStore {
    async fn stamps_general(&self, filters: &StampFilters) -> MetadataResult<Vec<StampListRow>> {
        let mut qb = QueryBuilder::new(
            Dialect::Postgres,
            &format!(
                "SELECT {STAMP_COLUMNS}, COUNT(si.id) > 0 AS is_owned \
                 FROM stamps s \
                 LEFT JOIN stamp_instances si ON s.id = si.stamp_id AND si.date_deleted IS NULL \
                 WHERE s.date_deleted IS NULL"
            ),
        );
        qb.add_search_filter(filters.search.as_deref().unwrap_or(""), "s");
        qb.add_condition(&format!(" GROUP BY {STAMP_COLUMNS}"), vec![]);
        qb.add_owned_filter(filters.owned, "si");
        qb.add_sort_and_limit(filters.sort, filters.order, filters.limit, filters.offset, "s");

        let (sql, args) = qb.finish();
        let rows = bind_query_as::<StampListRow>(&sql, &args)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn stamps_in_box(&self, filters: &StampFilters) -> MetadataResult<Vec<StampListRow>> {
        // Inner join: only designs with a live instance in the box, so
        // ownership is true by construction. The owned filter is still
        // applied so count and list agree on contradictory combinations.
        let mut qb = QueryBuilder::new(
            Dialect::Postgres,
            &format!(
                "SELECT {STAMP_COLUMNS}, TRUE AS is_owned \
                 FROM stamps s \
                 JOIN stamp_instances si ON s.id = si.stamp_id AND si.date_deleted IS NULL \
                 WHERE s.date_deleted IS NULL"
            ),
        );
        qb.add_box_filter(filters.box_id, "si");
        qb.add_search_filter(filters.search.as_deref().unwrap_or(""), "s");
        qb.add_owned_exists_filter(filters.owned, "s");
        qb.add_condition(&format!(" GROUP BY {STAMP_COLUMNS}"), vec![]);
        qb.add_sort_and_limit(filters.sort, filters.order, filters.limit, filters.offset, "s");

        let (sql, args) = qb.finish();
        let rows = bind_query_as::<StampListRow>(&sql, &args)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn stamp_tags(&self, stamp_id: Uuid) -> MetadataResult<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            "SELECT t.name FROM tags t \
             JOIN stamp_tags st ON t.id = st.tag_id \
             WHERE st.stamp_id = $1",
        )
        .bind(stamp_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn stamp_box_names(&self, stamp_id: Uuid) -> MetadataResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT sb.name FROM stamp_instances si \
             JOIN storage_boxes sb ON si.box_id = sb.id \
             WHERE si.stamp_id = $1 AND si.date_deleted IS NULL AND si.box_id IS NOT NULL \
             ORDER BY sb.name",
        )
        .bind(stamp_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn compose_details(&self, row: StampListRow) -> MetadataResult<StampDetails> {
        let (stamp, is_owned) = row.into_row();
        let tags = self.stamp_tags(stamp.id).await?;
        let instances = self.list_instances_for_stamp(stamp.id).await?;
        let box_names = self.stamp_box_names(stamp.id).await?;
        Ok(StampDetails {
            stamp,
            is_owned,
            tags,
            instances,
            box_names,
        })
    }
}

#[async_trait]
impl StampRepo for PostgresStore {
    async fn list_stamps(&self, filters: &StampFilters) -> MetadataResult<Vec<StampDetails>> {
        let rows = if filters.box_id.is_some() {
            self.stamps_in_box(filters).await?
        } else {
            self.stamps_general(filters).await?
        };

        let mut stamps = Vec::with_capacity(rows.len());
        for row in rows {
            stamps.push(self.compose_details(row).await?);
        }
        Ok(stamps)
    }

    async fn count_stamps(&self, filters: &StampFilters) -> MetadataResult<i64> {
        let mut qb = QueryBuilder::new(
            Dialect::Postgres,
            "SELECT COUNT(DISTINCT s.id) FROM stamps s WHERE s.date_deleted IS NULL",
        );
        qb.add_search_filter(filters.search.as_deref().unwrap_or(""), "s");
        qb.add_owned_exists_filter(filters.owned, "s");
        if let Some(box_id) = filters.box_id {
            qb.add_condition(
                " AND EXISTS (SELECT 1 FROM stamp_instances bi \
                 WHERE bi.stamp_id = s.id AND bi.box_id = ? AND bi.date_deleted IS NULL)",
                vec![SqlArg::Uuid(box_id)],
            );
        }

        let (sql, args) = qb.finish();
        let count = bind_query_scalar::<i64>(&sql, &args)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_stamp(&self, id: Uuid) -> MetadataResult<Option<StampDetails>> {
        let row = sqlx::query_as::<_, StampRow>(&format!(
            "SELECT {STAMP_COLUMNS} FROM stamps s WHERE s.id = $1 AND s.date_deleted IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(stamp) = row else {
            return Ok(None);
        };

        let tags = self.stamp_tags(stamp.id).await?;
        let instances = self.list_instances_for_stamp(stamp.id).await?;
        let box_names = self.stamp_box_names(stamp.id).await?;
        Ok(Some(StampDetails {
            is_owned: !instances.is_empty(),
            stamp,
            tags,
            instances,
            box_names,
        }))
    }

    async fn create_stamp(&self, stamp: &StampRow, tags: &[String]) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO stamps \
             (id, name, scott_number, issue_date, series, notes, image_url, date_added, date_modified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(stamp.id)
        .bind(&stamp.name)
        .bind(&stamp.scott_number)
        .bind(&stamp.issue_date)
        .bind(&stamp.series)
        .bind(&stamp.notes)
        .bind(&stamp.image_url)
        .bind(stamp.date_added)
        .bind(stamp.date_modified)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_db_error(e, "a stamp with this scott number already exists"))?;

        if !tags.is_empty() {
            self.set_stamp_tags(stamp.id, tags).await?;
        }
        Ok(())
    }

    async fn update_stamp(&self, stamp: &StampRow) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE stamps SET name = $1, scott_number = $2, issue_date = $3, series = $4, \
             notes = $5, image_url = $6, date_modified = $7 \
             WHERE id = $8 AND date_deleted IS NULL",
        )
        .bind(&stamp.name)
        .bind(&stamp.scott_number)
        .bind(&stamp.issue_date)
        .bind(&stamp.series)
        .bind(&stamp.notes)
        .bind(&stamp.image_url)
        .bind(stamp.date_modified)
        .bind(stamp.id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_db_error(e, "a stamp with this scott number already exists"))?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!(
                "stamp {} not found",
                stamp.id
            )));
        }
        Ok(())
    }

    async fn delete_stamp(&self, id: Uuid, deleted_at: OffsetDateTime) -> MetadataResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE stamp_instances SET date_deleted = $1 \
             WHERE stamp_id = $2 AND date_deleted IS NULL",
        )
        .bind(deleted_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM stamp_tags WHERE stamp_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("UPDATE stamps SET date_deleted = $1 WHERE id = $2 AND date_deleted IS NULL")
                .bind(deleted_at)
                .bind(id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("stamp {id} not found")));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn set_stamp_tags(&self, stamp_id: Uuid, tags: &[String]) -> MetadataResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM stamp_tags WHERE stamp_id = $1")
            .bind(stamp_id)
            .execute(&mut *tx)
            .await?;

        for name in tags {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let tag_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM tags WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;
            let tag_id = match tag_id {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4();
                    sqlx::query("INSERT INTO tags (id, name) VALUES ($1, $2)")
                        .bind(id)
                        .bind(name)
                        .execute(&mut *tx)
                        .await?;
                    id
                }
            };

            sqlx::query(
                "INSERT INTO stamp_tags (stamp_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(stamp_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl InstanceRepo for PostgresStore {
    async fn create_instance(&self, instance: &InstanceRow) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO stamp_instances \
             (id, stamp_id, condition, box_id, quantity, date_added, date_modified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(instance.id)
        .bind(instance.stamp_id)
        .bind(&instance.condition)
        .bind(instance.box_id)
        .bind(instance.quantity)
        .bind(instance.date_added)
        .bind(instance.date_modified)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            classify_db_error(e, "an instance with this condition and box already exists")
        })?;
        Ok(())
    }

    async fn get_instance(&self, id: Uuid) -> MetadataResult<Option<InstanceDetails>> {
        let row = sqlx::query_as::<_, InstanceDetails>(
            "SELECT si.id, si.stamp_id, si.condition, si.box_id, sb.name AS box_name, \
             si.quantity, si.date_added, si.date_modified \
             FROM stamp_instances si \
             LEFT JOIN storage_boxes sb ON si.box_id = sb.id \
             WHERE si.id = $1 AND si.date_deleted IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_instances_for_stamp(
        &self,
        stamp_id: Uuid,
    ) -> MetadataResult<Vec<InstanceDetails>> {
        let rows = sqlx::query_as::<_, InstanceDetails>(
            "SELECT si.id, si.stamp_id, si.condition, si.box_id, sb.name AS box_name, \
             si.quantity, si.date_added, si.date_modified \
             FROM stamp_instances si \
             LEFT JOIN storage_boxes sb ON si.box_id = sb.id \
             WHERE si.stamp_id = $1 AND si.date_deleted IS NULL \
             ORDER BY si.condition NULLS LAST, sb.name NULLS LAST",
        )
        .bind(stamp_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_instance(&self, instance: &InstanceRow) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE stamp_instances SET condition = $1, box_id = $2, quantity = $3, \
             date_modified = $4 \
             WHERE id = $5 AND date_deleted IS NULL",
        )
        .bind(&instance.condition)
        .bind(instance.box_id)
        .bind(instance.quantity)
        .bind(instance.date_modified)
        .bind(instance.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            classify_db_error(e, "an instance with this condition and box already exists")
        })?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!(
                "instance {} not found",
                instance.id
            )));
        }
        Ok(())
    }

    async fn delete_instance(&self, id: Uuid, deleted_at: OffsetDateTime) -> MetadataResult<()> {
        let result = sqlx::query(
            "UPDATE stamp_instances SET date_deleted = $1 WHERE id = $2 AND date_deleted IS NULL",
        )
        .bind(deleted_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("instance {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl BoxRepo for PostgresStore {
    async fn list_boxes(&self) -> MetadataResult<Vec<BoxSummary>> {
        let rows = sqlx::query_as::<_, BoxSummary>(
            "SELECT sb.id, sb.name, sb.date_created, \
             CAST(COALESCE(SUM(si.quantity), 0) AS BIGINT) AS instance_count \
             FROM storage_boxes sb \
             LEFT JOIN stamp_instances si ON sb.id = si.box_id AND si.date_deleted IS NULL \
             GROUP BY sb.id, sb.name, sb.date_created \
             ORDER BY sb.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_box(&self, id: Uuid) -> MetadataResult<Option<StorageBoxRow>> {
        let row = sqlx::query_as::<_, StorageBoxRow>(
            "SELECT id, name, date_created FROM storage_boxes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_box(&self, storage_box: &StorageBoxRow) -> MetadataResult<()> {
        sqlx::query("INSERT INTO storage_boxes (id, name, date_created) VALUES ($1, $2, $3)")
            .bind(storage_box.id)
            .bind(&storage_box.name)
            .bind(storage_box.date_created)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_db_error(e, "a box with this name already exists"))?;
        Ok(())
    }

    async fn update_box(&self, storage_box: &StorageBoxRow) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE storage_boxes SET name = $1 WHERE id = $2")
            .bind(&storage_box.name)
            .bind(storage_box.id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_db_error(e, "a box with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!(
                "box {} not found",
                storage_box.id
            )));
        }
        Ok(())
    }

    async fn delete_box(&self, id: Uuid) -> MetadataResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE stamp_instances SET box_id = NULL WHERE box_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM storage_boxes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("box {id} not found")));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl TagRepo for PostgresStore {
    async fn list_tags(&self) -> MetadataResult<Vec<TagSummary>> {
        let rows = sqlx::query_as::<_, TagSummary>(
            "SELECT t.id, t.name, COUNT(st.stamp_id) AS stamp_count \
             FROM tags t \
             LEFT JOIN stamp_tags st ON t.id = st.tag_id \
             GROUP BY t.id, t.name \
             ORDER BY t.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_tag(&self, tag: &TagRow) -> MetadataResult<()> {
        sqlx::query("INSERT INTO tags (id, name) VALUES ($1, $2)")
            .bind(tag.id)
            .bind(&tag.name)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_db_error(e, "a tag with this name already exists"))?;
        Ok(())
    }

    async fn update_tag(&self, tag: &TagRow) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE tags SET name = $1 WHERE id = $2")
            .bind(&tag.name)
            .bind(tag.id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_db_error(e, "a tag with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("tag {} not found", tag.id)));
        }
        Ok(())
    }

    async fn delete_tag(&self, id: Uuid) -> MetadataResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM stamp_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("tag {id} not found")));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl StatsRepo for PostgresStore {
    async fn collection_stats(&self) -> MetadataResult<CollectionStats> {
        let total_owned: i64 = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(quantity), 0) AS BIGINT) \
             FROM stamp_instances WHERE date_deleted IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        let unique_stamps: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT scott_number) FROM stamps \
             WHERE scott_number IS NOT NULL AND date_deleted IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        let stamps_needed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stamps s \
             WHERE s.date_deleted IS NULL \
             AND NOT EXISTS (SELECT 1 FROM stamp_instances si \
             WHERE si.stamp_id = s.id AND si.date_deleted IS NULL)",
        )
        .fetch_one(&self.pool)
        .await?;

        let storage_boxes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storage_boxes")
            .fetch_one(&self.pool)
            .await?;

        Ok(CollectionStats {
            total_owned,
            unique_stamps,
            stamps_needed,
            storage_boxes,
        })
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let statements = postgres_schema_statements(POSTGRES_SCHEMA);
        assert!(statements.len() >= 8);
        assert!(statements[0].starts_with("-- Stampkeeper"));
        assert!(statements.iter().all(|s| !s.is_empty()));
        assert!(statements
            .iter()
            .any(|s| s.contains("idx_instances_stamp_condition_box")));
    }
}
