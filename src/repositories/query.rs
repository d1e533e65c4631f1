use color_eyre::eyre::{Context, Result};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QuerySelect, Select,
};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page request with the page size clamped to `1..=MAX_PAGE_SIZE`.
///
/// The page is capped so the row offset always fits the signed 64-bit range SQLite binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u64;
        let max_page = i64::MAX as u64 / page_size;
        let page = (page.unwrap_or(1).max(1) as u64).min(max_page);
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> PaginatedResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn apply_pagination<E: EntityTrait>(query: Select<E>, pagination: Pagination) -> Select<E> {
    query
        .limit(pagination.page_size)
        .offset(pagination.offset())
}

/// Case-insensitive (for ASCII, as SQLite LIKE is) substring match over any of the columns.
pub fn apply_text_search<E, C>(query: Select<E>, columns: Vec<C>, term: &str) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let term = term.trim();
    if term.is_empty() || columns.is_empty() {
        return query;
    }

    let condition = columns
        .into_iter()
        .fold(Condition::any(), |condition, column| {
            condition.add(column.contains(term))
        });
    query.filter(condition)
}

/// Count the full query, then fetch one page of it.
pub async fn fetch_page<E>(
    conn: &DatabaseConnection,
    query: Select<E>,
    pagination: Pagination,
) -> Result<PaginatedResult<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync + 'static,
{
    let total_count = query
        .clone()
        .count(conn)
        .await
        .wrap_err("Failed to count rows")?;

    let items = apply_pagination(query, pagination)
        .all(conn)
        .await
        .wrap_err("Failed to fetch page")?;

    Ok(PaginatedResult {
        items,
        total_count,
        page: pagination.page,
        page_size: pagination.page_size,
    })
}
