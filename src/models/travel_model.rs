use crate::models::push_search_predicate;
use crate::pagination::{ListingQuery, PageRequest, PaginationErr, SearchField};
use crate::types::{ApiError, ApiStatusCode, StoreError};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use utoipa::ToSchema;

/// An enumeration of errors that may occur while reading travel entries.
#[derive(Debug, thiserror::Error)]
pub enum TravelErr {
    #[error("Travel entry {0} doesn't exist")]
    DoesNotExist(i64),
    #[error("Travel image {0} doesn't exist")]
    ImageDoesNotExist(i64),
    #[error(transparent)]
    Pagination(#[from] PaginationErr),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TravelErr {
    pub fn status(&self) -> StatusCode {
        match self {
            TravelErr::DoesNotExist(_) | TravelErr::ImageDoesNotExist(_) => StatusCode::NOT_FOUND,
            TravelErr::Pagination(_) => StatusCode::BAD_REQUEST,
            TravelErr::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TravelErr {
    fn into_response(self) -> Response {
        ApiError::response(ApiStatusCode::from(self.status()), &self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Travel {
    pub no: i64,
    pub district: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub images: Vec<TravelImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct TravelImage {
    pub no: i64,
    pub travel_no: i64,
    pub filename: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct NewTravel {
    pub district: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub phone: String,
}

/// An image to store with a new entry; the store fills in the entry number
#[derive(Debug, Clone)]
pub struct NewTravelImage {
    pub filename: String,
    pub path: String,
}

/// Travel column searched for each search field. The district plays the writer's part.
pub fn travel_column(field: SearchField) -> &'static str {
    match field {
        SearchField::Title => "title",
        SearchField::Content => "description",
        SearchField::Writer => "district",
    }
}

/// Persistence for travel entries and their images
///
/// Listing is in entry number order. An entry is stored together with its images or not at all.
#[async_trait]
pub trait TravelStore: ListingQuery<Travel> {
    async fn get(&self, no: i64) -> Result<Option<Travel>, StoreError>;

    async fn create(&self, travel: NewTravel, images: Vec<NewTravelImage>) -> Result<Travel, StoreError>;

    async fn images(&self, travel_no: i64) -> Result<Vec<TravelImage>, StoreError>;

    async fn get_image(&self, no: i64) -> Result<Option<TravelImage>, StoreError>;
}

/// Travel store backed by Postgres (`tbl_travel`, `tbl_travel_image`)
#[derive(Debug, Clone)]
pub struct PgTravelStore {
    db_pool: Pool<Postgres>,
}

impl PgTravelStore {
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

    async fn fetch(&self, request: &PageRequest, filtered: bool) -> Result<Vec<Travel>, StoreError> {
        let travels = page_query(request, filtered)
            .build_query_as::<Travel>()
            .fetch_all(&self.db_pool)
            .await?;
        Ok(travels)
    }
}

fn count_query(request: Option<&PageRequest>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tbl_travel");
    if let Some(request) = request {
        push_search_predicate(&mut builder, request, travel_column);
    }
    builder
}

fn page_query(request: &PageRequest, filtered: bool) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new("SELECT no, district, title, description, address, phone FROM tbl_travel");
    if filtered {
        push_search_predicate(&mut builder, request, travel_column);
    }
    builder
        .push(" ORDER BY no LIMIT ")
        .push_bind(request.limit())
        .push(" OFFSET ")
        .push_bind(request.offset());
    builder
}

#[async_trait]
impl ListingQuery<Travel> for PgTravelStore {
    async fn total_count(&self) -> Result<i64, StoreError> {
        self.count(None).await
    }

    async fn total_count_matching(&self, request: &PageRequest) -> Result<i64, StoreError> {
        self.count(Some(request)).await
    }

    async fn page(&self, request: &PageRequest) -> Result<Vec<Travel>, StoreError> {
        self.fetch(request, false).await
    }

    async fn page_matching(&self, request: &PageRequest) -> Result<Vec<Travel>, StoreError> {
        self.fetch(request, true).await
    }
}

#[async_trait]
impl TravelStore for PgTravelStore {
    async fn get(&self, no: i64) -> Result<Option<Travel>, StoreError> {
        let travel = sqlx::query_as::<Postgres, Travel>(
            r#"
            SELECT no, district, title, description, address, phone
            FROM tbl_travel
            WHERE no = $1"#,
        )
        .bind(no)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(travel)
    }

    async fn create(&self, travel: NewTravel, images: Vec<NewTravelImage>) -> Result<Travel, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let travel = sqlx::query_as::<Postgres, Travel>(
            r#"
            INSERT INTO tbl_travel (district, title, description, address, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING no, district, title, description, address, phone"#,
        )
        .bind(travel.district)
        .bind(travel.title)
        .bind(travel.description)
        .bind(travel.address)
        .bind(travel.phone)
        .fetch_one(&mut *tx)
        .await?;

        for image in images {
            sqlx::query("INSERT INTO tbl_travel_image (travel_no, filename, path) VALUES ($1, $2, $3)")
                .bind(travel.no)
                .bind(image.filename)
                .bind(image.path)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(travel)
    }

    async fn images(&self, travel_no: i64) -> Result<Vec<TravelImage>, StoreError> {
        let images = sqlx::query_as::<Postgres, TravelImage>(
            "SELECT no, travel_no, filename, path FROM tbl_travel_image WHERE travel_no = $1 ORDER BY no",
        )
        .bind(travel_no)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(images)
    }

    async fn get_image(&self, no: i64) -> Result<Option<TravelImage>, StoreError> {
        let image = sqlx::query_as::<Postgres, TravelImage>(
            "SELECT no, travel_no, filename, path FROM tbl_travel_image WHERE no = $1",
        )
        .bind(no)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(image)
    }
}
