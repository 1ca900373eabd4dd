use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::{is_unique_violation, PostgresClient, PostgresError};
use crate::models::{MatchCandidate, RoommatePreference, UpdateUserRequest, User, UserSummary};

const USER_COLUMNS: &str = "id, name, email, is_verified, firebase_uid, university, major, \
     graduation_year, profile_picture, roommate_preferences, created_at, updated_at";

/// A user together with the stored password hash, for login only
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let preferences: Option<Json<RoommatePreference>> = row.try_get("roommate_preferences")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        is_verified: row.try_get("is_verified")?,
        firebase_uid: row.try_get("firebase_uid")?,
        university: row.try_get("university")?,
        major: row.try_get("major")?,
        graduation_year: row.try_get("graduation_year")?,
        profile_picture: row.try_get("profile_picture")?,
        roommate_preferences: preferences.map(|p| p.0),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl PostgresClient {
    /// Insert a new account. `email` must already be normalised.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        verification_token: &str,
    ) -> Result<User, PostgresError> {
        let query = format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, verification_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(verification_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostgresError::Conflict(email.to_string())
                } else {
                    e.into()
                }
            })?;

        let user = user_from_row(&row)?;
        tracing::debug!("Created user {}", user.id);

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, PostgresError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn user_exists(&self, id: Uuid) -> Result<bool, PostgresError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, PostgresError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, PostgresError> {
        let query = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");

        let Some(row) = sqlx::query(&query).bind(email).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        Ok(Some(Credentials {
            user: user_from_row(&row)?,
            password_hash: row.try_get("password_hash")?,
        }))
    }

    /// Update profile fields; absent fields keep their value
    pub async fn update_user(
        &self,
        id: Uuid,
        update: &UpdateUserRequest,
    ) -> Result<Option<User>, PostgresError> {
        let query = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                university = COALESCE($3, university),
                major = COALESCE($4, major),
                graduation_year = COALESCE($5, graduation_year),
                profile_picture = COALESCE($6, profile_picture),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.university.as_deref())
            .bind(update.major.as_deref())
            .bind(update.graduation_year)
            .bind(update.profile_picture.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    /// Delete an account; owned listings go with it
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, PostgresError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored preference record. Returns false if the user is gone.
    pub async fn set_preferences(
        &self,
        id: Uuid,
        preferences: &RoommatePreference,
    ) -> Result<bool, PostgresError> {
        let result = sqlx::query(
            "UPDATE users SET roommate_preferences = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(preferences))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every user with preferences except `exclude`, oldest account first
    pub async fn list_match_candidates(
        &self,
        exclude: Uuid,
    ) -> Result<Vec<MatchCandidate>, PostgresError> {
        let query = r#"
            SELECT id, name, email, profile_picture, roommate_preferences
            FROM users
            WHERE roommate_preferences IS NOT NULL AND id <> $1
            ORDER BY created_at, id
        "#;

        let rows = sqlx::query(query).bind(exclude).fetch_all(&self.pool).await?;

        let candidates = rows
            .iter()
            .map(|row| {
                let preferences: Json<RoommatePreference> = row.try_get("roommate_preferences")?;
                Ok(MatchCandidate {
                    user: UserSummary {
                        id: row.try_get("id")?,
                        name: row.try_get("name")?,
                        email: row.try_get("email")?,
                        profile_picture: row.try_get("profile_picture")?,
                    },
                    preferences: preferences.0,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Loaded {} match candidates", candidates.len());

        Ok(candidates)
    }

    /// Mark the owner of `token` verified and consume the token
    pub async fn verify_email(&self, token: &str) -> Result<Option<Uuid>, PostgresError> {
        let id = sqlx::query_scalar(
            r#"
            UPDATE users
            SET is_verified = TRUE, verification_token = NULL, updated_at = NOW()
            WHERE verification_token = $1
            RETURNING id
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Store a reset token for `email`. Returns the user id if the email is known.
    pub async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>, PostgresError> {
        let id = sqlx::query_scalar(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE email = $1
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Set a new password hash if `token` is known and unexpired, consuming it
    pub async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>, PostgresError> {
        let id = sqlx::query_scalar(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE reset_token = $1 AND reset_token_expires_at > NOW()
            RETURNING id
            "#,
        )
        .bind(token)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }
}
