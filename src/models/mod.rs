use crate::pagination::{PageRequest, SearchField};
use sqlx::{Postgres, QueryBuilder};

pub mod auth_model;
pub mod board_model;
pub mod member_model;
pub mod memory_store;
pub mod travel_model;

/// Appends ` WHERE (col ILIKE $n OR ...)` for the request's search condition, if it has one.
///
/// Column names come from the caller's static mapping, only the pattern is bound.
pub(crate) fn push_search_predicate(
    builder: &mut QueryBuilder<'_, Postgres>,
    request: &PageRequest,
    column: fn(SearchField) -> &'static str,
) {
    let Some(filter) = request.search_filter() else {
        return;
    };

    let pattern = filter.like_pattern();
    builder.push(" WHERE (");
    let mut separated = builder.separated(" OR ");
    for field in filter.fields {
        separated
            .push(column(*field))
            .push_unseparated(" ILIKE ")
            .push_bind_unseparated(pattern.clone());
    }
    builder.push(")");
}
