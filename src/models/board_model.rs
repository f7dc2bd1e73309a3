use crate::models::push_search_predicate;
use crate::pagination::{ListingQuery, PageRequest, PaginationErr, SearchField};
use crate::types::{ApiError, ApiStatusCode, StoreError};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, Pool, Postgres, QueryBuilder};
use utoipa::ToSchema;

/// An enumeration of errors that may occur while working with board posts.
#[derive(Debug, thiserror::Error)]
pub enum BoardErr {
    #[error("Post {0} doesn't exist")]
    DoesNotExist(i64),
    #[error("Attachment {0} doesn't exist")]
    AttachmentDoesNotExist(i64),
    #[error("{0} is not the writer of post {1}")]
    NotWriter(String, i64),
    #[error("Invalid post: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Pagination(#[from] PaginationErr),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BoardErr {
    pub fn status(&self) -> StatusCode {
        match self {
            BoardErr::DoesNotExist(_) | BoardErr::AttachmentDoesNotExist(_) => StatusCode::NOT_FOUND,
            BoardErr::NotWriter(..) => StatusCode::FORBIDDEN,
            BoardErr::InvalidInput(_) | BoardErr::Pagination(_) => StatusCode::BAD_REQUEST,
            BoardErr::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BoardErr {
    fn into_response(self) -> Response {
        ApiError::response(ApiStatusCode::from(self.status()), &self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Board {
    pub no: i64,
    pub title: String,
    pub content: String,
    pub writer: String,
    pub reg_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub attachments: Vec<BoardAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct BoardAttachment {
    pub no: i64,
    pub bno: i64,
    pub filename: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
    pub reg_date: DateTime<Utc>,
}

/// Metadata for a file that has already been stored and should be linked to a post
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachmentForm {
    pub filename: String,
    pub path: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub size: i64,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Body of a create or update request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BoardForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentForm>,
}

#[derive(Debug, Clone)]
pub struct NewBoard {
    pub title: String,
    pub content: String,
    pub writer: String,
}

/// An attachment to link to a post; the store fills in the post number
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub filename: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
}

impl From<AttachmentForm> for NewAttachment {
    fn from(form: AttachmentForm) -> Self {
        Self {
            filename: form.filename,
            path: form.path,
            content_type: form.content_type,
            size: form.size,
        }
    }
}

/// Board column searched for each search field
pub fn board_column(field: SearchField) -> &'static str {
    match field {
        SearchField::Title => "title",
        SearchField::Content => "content",
        SearchField::Writer => "writer",
    }
}

/// Persistence for board posts and their attachments
///
/// Listing is newest first. Attachments belong to exactly one post and go away with it.
/// A post and the attachments written with it are stored all together or not at all.
#[async_trait]
pub trait BoardStore: ListingQuery<Board> {
    async fn get(&self, no: i64) -> Result<Option<Board>, StoreError>;

    async fn create(&self, board: NewBoard, attachments: Vec<NewAttachment>) -> Result<Board, StoreError>;

    /// Replaces title and content and adds `attachments`. Returns false when there was no such post.
    async fn update(
        &self,
        no: i64,
        title: &str,
        content: &str,
        attachments: Vec<NewAttachment>,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, no: i64) -> Result<bool, StoreError>;

    async fn attachments(&self, bno: i64) -> Result<Vec<BoardAttachment>, StoreError>;

    async fn get_attachment(&self, no: i64) -> Result<Option<BoardAttachment>, StoreError>;

    async fn delete_attachment(&self, no: i64) -> Result<bool, StoreError>;
}

/// Board store backed by Postgres (`tbl_board`, `tbl_board_attachment`)
#[derive(Debug, Clone)]
pub struct PgBoardStore {
    db_pool: Pool<Postgres>,
}

impl PgBoardStore {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        Self { db_pool }
    }

    async fn count(&self, request: Option<&PageRequest>) -> Result<i64, StoreError> {
        let (count,): (i64,) = count_query(request)
            .build_query_as()
            .fetch_one(&self.db_pool)
            .await?;
        Ok(count)
    }

    async fn fetch(&self, request: &PageRequest, filtered: bool) -> Result<Vec<Board>, StoreError> {
        let boards = page_query(request, filtered)
            .build_query_as::<Board>()
            .fetch_all(&self.db_pool)
            .await?;
        Ok(boards)
    }
}

fn count_query(request: Option<&PageRequest>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tbl_board");
    if let Some(request) = request {
        push_search_predicate(&mut builder, request, board_column);
    }
    builder
}

fn page_query(request: &PageRequest, filtered: bool) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new("SELECT no, title, content, writer, reg_date, update_date FROM tbl_board");
    if filtered {
        push_search_predicate(&mut builder, request, board_column);
    }
    builder
        .push(" ORDER BY no DESC LIMIT ")
        .push_bind(request.limit())
        .push(" OFFSET ")
        .push_bind(request.offset());
    builder
}

async fn insert_attachments(
    conn: &mut PgConnection,
    bno: i64,
    attachments: Vec<NewAttachment>,
) -> Result<(), StoreError> {
    for attachment in attachments {
        sqlx::query(
            r#"
            INSERT INTO tbl_board_attachment (bno, filename, path, content_type, size)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(bno)
        .bind(attachment.filename)
        .bind(attachment.path)
        .bind(attachment.content_type)
        .bind(attachment.size)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl ListingQuery<Board> for PgBoardStore {
    async fn total_count(&self) -> Result<i64, StoreError> {
        self.count(None).await
    }

    async fn total_count_matching(&self, request: &PageRequest) -> Result<i64, StoreError> {
        self.count(Some(request)).await
    }

    async fn page(&self, request: &PageRequest) -> Result<Vec<Board>, StoreError> {
        self.fetch(request, false).await
    }

    async fn page_matching(&self, request: &PageRequest) -> Result<Vec<Board>, StoreError> {
        self.fetch(request, true).await
    }
}

#[async_trait]
impl BoardStore for PgBoardStore {
    async fn get(&self, no: i64) -> Result<Option<Board>, StoreError> {
        let board = sqlx::query_as::<Postgres, Board>(
            r#"
            SELECT no, title, content, writer, reg_date, update_date
            FROM tbl_board
            WHERE no = $1"#,
        )
        .bind(no)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(board)
    }

    async fn create(&self, board: NewBoard, attachments: Vec<NewAttachment>) -> Result<Board, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let board = sqlx::query_as::<Postgres, Board>(
            r#"
            INSERT INTO tbl_board (title, content, writer)
            VALUES ($1, $2, $3)
            RETURNING no, title, content, writer, reg_date, update_date"#,
        )
        .bind(board.title)
        .bind(board.content)
        .bind(board.writer)
        .fetch_one(&mut *tx)
        .await?;

        insert_attachments(&mut *tx, board.no, attachments).await?;
        tx.commit().await?;

        Ok(board)
    }

    async fn update(
        &self,
        no: i64,
        title: &str,
        content: &str,
        attachments: Vec<NewAttachment>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE tbl_board
            SET title = $1, content = $2, update_date = now()
            WHERE no = $3"#,
        )
        .bind(title)
        .bind(content)
        .bind(no)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // dropping tx rolls back
        if rows_affected == 0 {
            return Ok(false);
        }

        insert_attachments(&mut *tx, no, attachments).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn delete(&self, no: i64) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM tbl_board WHERE no = $1")
            .bind(no)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn attachments(&self, bno: i64) -> Result<Vec<BoardAttachment>, StoreError> {
        let attachments = sqlx::query_as::<Postgres, BoardAttachment>(
            "SELECT * FROM tbl_board_attachment WHERE bno = $1 ORDER BY no",
        )
        .bind(bno)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(attachments)
    }

    async fn get_attachment(&self, no: i64) -> Result<Option<BoardAttachment>, StoreError> {
        let attachment = sqlx::query_as::<Postgres, BoardAttachment>(
            "SELECT * FROM tbl_board_attachment WHERE no = $1",
        )
        .bind(no)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(attachment)
    }

    async fn delete_attachment(&self, no: i64) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM tbl_board_attachment WHERE no = $1")
            .bind(no)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
