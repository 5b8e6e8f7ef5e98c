//! Side tables hanging off entities: favorites, tags and shares.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use filetree_core::result::AppResult;

use super::{IN_CHUNK_SIZE, map_db_error};

/// Repository for the favorite, tag and share tables.
#[derive(Debug, Clone, Default)]
pub struct MarkerRepository;

impl MarkerRepository {
    /// Create a new marker repository.
    pub fn new() -> Self {
        Self
    }

    /// Remove the acting user's favorites on the given entities.
    pub async fn delete_favorites(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        ids: &[i64],
    ) -> AppResult<u64> {
        let mut removed = 0;
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM favorite WHERE user_id = ");
            query.push_bind(user_id).push(" AND entity_id IN (");
            let mut list = query.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            list.push_unseparated(")");

            removed += query
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| map_db_error("Failed to delete favorites", e))?
                .rows_affected();
        }
        Ok(removed)
    }

    /// Remove every tag assignment of the given entities.
    pub async fn delete_tags(&self, conn: &mut SqliteConnection, ids: &[i64]) -> AppResult<u64> {
        self.delete_by_entity(conn, "entity_tag", ids).await
    }

    /// Remove every share of the given entities.
    pub async fn delete_shares(&self, conn: &mut SqliteConnection, ids: &[i64]) -> AppResult<u64> {
        self.delete_by_entity(conn, "entity_user", ids).await
    }

    async fn delete_by_entity(
        &self,
        conn: &mut SqliteConnection,
        table: &'static str,
        ids: &[i64],
    ) -> AppResult<u64> {
        let mut removed = 0;
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM ");
            query.push(table).push(" WHERE entity_id IN (");
            let mut list = query.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            list.push_unseparated(")");

            removed += query
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| map_db_error(&format!("Failed to delete from {table}"), e))?
                .rows_affected();
        }
        Ok(removed)
    }
}
