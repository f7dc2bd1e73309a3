use crate::types::{ApiError, ApiStatusCode, StoreError};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Postgres};
use utoipa::ToSchema;

pub const ROLE_MEMBER: &str = "ROLE_MEMBER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// An enumeration of errors that may occur while working with member accounts.
#[derive(Debug, thiserror::Error)]
pub enum MemberErr {
    #[error("Member {0} doesn't exist")]
    DoesNotExist(String),
    #[error("Username {0} is already taken")]
    DuplicateUsername(String),
    #[error("Password does not match")]
    PasswordMismatch,
    #[error("{0} may not modify member {1}")]
    NotOwner(String, String),
    #[error("Invalid member: {0}")]
    InvalidInput(String),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MemberErr {
    pub fn status(&self) -> StatusCode {
        match self {
            MemberErr::DoesNotExist(_) => StatusCode::NOT_FOUND,
            MemberErr::DuplicateUsername(_) => StatusCode::CONFLICT,
            MemberErr::PasswordMismatch | MemberErr::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MemberErr::NotOwner(..) => StatusCode::FORBIDDEN,
            MemberErr::Hash(_) | MemberErr::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MemberErr {
    fn into_response(self) -> Response {
        ApiError::response(ApiStatusCode::from(self.status()), &self)
    }
}

/// A member account. `password` holds the bcrypt hash and is never serialized.
#[derive(Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Member {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: String,
    pub reg_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub auth_list: Vec<String>,
}

// Manually implement Debug so the password hash never ends up in a log line
impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("auth_list", &self.auth_list)
            .finish()
    }
}

impl Member {
    pub fn has_role(&self, role: &str) -> bool {
        self.auth_list.iter().any(|auth| auth == role)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberJoinRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberUpdateRequest {
    /// Current password, required to confirm the change
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub auth_list: Vec<String>,
}

/// Persistence for member accounts and their granted roles
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<Member>, StoreError>;

    /// # Errors
    /// `StoreError::Duplicate` when the username is taken
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError>;

    async fn update_email(&self, username: &str, email: &str) -> Result<bool, StoreError>;

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, StoreError>;
}

/// Member store backed by Postgres (`tbl_member`, `tbl_member_auth`)
#[derive(Debug, Clone)]
pub struct PgMemberStore {
    db_pool: Pool<Postgres>,
}

impl PgMemberStore {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        Self { db_pool }
    }

    async fn auth_list(&self, username: &str) -> Result<Vec<String>, StoreError> {
        let auths: Vec<(String,)> = sqlx::query_as(
            "SELECT auth FROM tbl_member_auth WHERE username = $1 ORDER BY auth",
        )
        .bind(username)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(auths.into_iter().map(|(auth,)| auth).collect())
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn find(&self, username: &str) -> Result<Option<Member>, StoreError> {
        let member: Option<Member> = sqlx::query_as(
            r#"
            SELECT username, password, email, reg_date, update_date
            FROM tbl_member
            WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?;

        match member {
            Some(mut member) => {
                member.auth_list = self.auth_list(username).await?;
                Ok(Some(member))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, new_member: NewMember) -> Result<Member, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let mut member: Member = sqlx::query_as(
            r#"
            INSERT INTO tbl_member (username, password, email)
            VALUES ($1, $2, $3)
            RETURNING username, password, email, reg_date, update_date"#,
        )
        .bind(&new_member.username)
        .bind(&new_member.password_hash)
        .bind(&new_member.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_insert(e, &new_member.username))?;

        for auth in &new_member.auth_list {
            sqlx::query("INSERT INTO tbl_member_auth (username, auth) VALUES ($1, $2)")
                .bind(&new_member.username)
                .bind(auth)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::trace!("member: {:?}", &member);
        member.auth_list = new_member.auth_list;
        Ok(member)
    }

    async fn update_email(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            "UPDATE tbl_member SET email = $1, update_date = now() WHERE username = $2",
        )
        .bind(email)
        .bind(username)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            "UPDATE tbl_member SET password = $1, update_date = now() WHERE username = $2",
        )
        .bind(password_hash)
        .bind(username)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
