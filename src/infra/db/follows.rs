use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use crate::application::repos::{FollowsRepo, FollowsWriteRepo, RepoError};
use crate::domain::entities::FollowCounts;

use super::PostgresRepositories;
use super::map_sqlx_error;

#[derive(Debug, FromRow)]
struct CountsRow {
    followers: i64,
    following: i64,
}

#[async_trait]
impl FollowsRepo for PostgresRepositories {
    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (\
                 SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2\
             )",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn counts_for(&self, user_id: Uuid) -> Result<FollowCounts, RepoError> {
        let row = sqlx::query_as::<_, CountsRow>(
            "SELECT \
                 (SELECT COUNT(*) FROM follows WHERE author_id = $1) AS followers, \
                 (SELECT COUNT(*) FROM follows WHERE user_id = $1) AS following",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(FollowCounts {
            followers: Self::convert_count(row.followers)?,
            following: Self::convert_count(row.following)?,
        })
    }
}

#[async_trait]
impl FollowsWriteRepo for PostgresRepositories {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "INSERT INTO follows (id, user_id, author_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (author_id, user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(author_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
