use async_trait::async_trait;

use crate::application::repos::{RepoError, SessionsRepo};
use crate::domain::entities::UserRecord;

use super::PostgresRepositories;
use super::map_sqlx_error;
use super::types::UserRow;

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.display_name, u.joined_at \
             FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = $1 \
               AND (s.expires_at IS NULL OR s.expires_at > now())",
        )
        .bind(token)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }
}
