use crate::types::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_AMOUNT: u32 = 10;

/// Number of page links shown at once by a pager
pub const PAGE_WINDOW: i64 = 10;

/// An enumeration of errors raised while reading paging parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationErr {
    #[error("page must be a positive integer, got '{0}'")]
    InvalidPage(String),
    #[error("amount must be a positive integer, got '{0}'")]
    InvalidAmount(String),
    #[error("page {page} with {amount} rows per page is out of range")]
    OutOfRange { page: u32, amount: u32 },
}

/// A column family a keyword search can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Content,
    Writer,
}

const ALL_FIELDS: &[SearchField] = &[SearchField::Title, SearchField::Content, SearchField::Writer];

/// Which field(s) a keyword is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Title,
    Content,
    Writer,
    TitleContent,
    Unrecognized,
}

impl SearchType {
    /// Parses a search tag. Both the long names and the one/two letter codes are accepted;
    /// anything else is `Unrecognized` rather than an error.
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "title" | "T" => SearchType::Title,
            "content" | "C" => SearchType::Content,
            "writer" | "W" => SearchType::Writer,
            "titleContent" | "TC" => SearchType::TitleContent,
            _ => SearchType::Unrecognized,
        }
    }

    pub fn fields(self) -> &'static [SearchField] {
        match self {
            SearchType::Title => &[SearchField::Title],
            SearchType::Content => &[SearchField::Content],
            SearchType::Writer => &[SearchField::Writer],
            SearchType::TitleContent => &[SearchField::Title, SearchField::Content],
            SearchType::Unrecognized => &[],
        }
    }
}

/// A resolved search condition: the fields to look at and the trimmed keyword.
///
/// A row matches when ANY of the fields contains the keyword, ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter<'a> {
    pub fields: &'static [SearchField],
    pub keyword: &'a str,
}

impl SearchFilter<'_> {
    /// `%keyword%` with LIKE wildcards in the keyword escaped
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.keyword.len() + 2);
        pattern.push('%');
        for c in self.keyword.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Evaluates the filter against an in-memory row
    pub fn matches<'r>(&self, value_of: impl Fn(SearchField) -> &'r str) -> bool {
        let needle = self.keyword.to_lowercase();
        self.fields
            .iter()
            .any(|field| value_of(*field).to_lowercase().contains(&needle))
    }
}

/// Paging and search parameters for one listing request
///
/// `page` and `amount` are always at least 1 and `(page - 1) * amount` always fits in an `i64`;
/// the constructors reject anything else, so `offset()` is never negative and never overflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    amount: u32,
    search_type: Option<SearchType>,
    keyword: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            amount: DEFAULT_AMOUNT,
            search_type: None,
            keyword: None,
        }
    }
}

impl PageRequest {
    /// Creates a request for a page without any search condition
    ///
    /// # Errors
    /// - `InvalidPage` / `InvalidAmount` when either value is below 1
    /// - `OutOfRange` when the offset of that page doesn't fit in an `i64`
    pub fn of(page: i64, amount: i64) -> Result<Self, PaginationErr> {
        Self::checked(
            positive(page).ok_or_else(|| PaginationErr::InvalidPage(page.to_string()))?,
            positive(amount).ok_or_else(|| PaginationErr::InvalidAmount(amount.to_string()))?,
            None,
            None,
        )
    }

    fn checked(
        page: u32,
        amount: u32,
        search_type: Option<SearchType>,
        keyword: Option<String>,
    ) -> Result<Self, PaginationErr> {
        if checked_offset(page, amount).is_none() {
            return Err(PaginationErr::OutOfRange { page, amount });
        }
        Ok(Self {
            page,
            amount,
            search_type,
            keyword,
        })
    }

    pub fn with_search(mut self, search_type: Option<SearchType>, keyword: impl Into<String>) -> Self {
        self.search_type = search_type;
        self.keyword = Some(keyword.into());
        self
    }

    /// Builds a request from raw query parameters (`page`, `amount`, `type`, `keyword`).
    ///
    /// Missing or blank `page`/`amount` fall back to the defaults. A blank `type` counts as absent.
    ///
    /// # Errors
    /// - `InvalidPage` / `InvalidAmount` when a value is not an integer or is below 1
    /// - `OutOfRange` when the offset of that page doesn't fit in an `i64`
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, PaginationErr> {
        Self::parse(
            params.get("page").map(String::as_str),
            params.get("amount").map(String::as_str),
            params.get("type").map(String::as_str),
            params.get("keyword").cloned(),
        )
    }

    fn parse(
        page: Option<&str>,
        amount: Option<&str>,
        search_type: Option<&str>,
        keyword: Option<String>,
    ) -> Result<Self, PaginationErr> {
        let page = match non_blank(page) {
            Some(raw) => parse_positive(raw).ok_or_else(|| PaginationErr::InvalidPage(raw.to_string()))?,
            None => DEFAULT_PAGE,
        };
        let amount = match non_blank(amount) {
            Some(raw) => {
                parse_positive(raw).ok_or_else(|| PaginationErr::InvalidAmount(raw.to_string()))?
            }
            None => DEFAULT_AMOUNT,
        };

        Self::checked(page, amount, non_blank(search_type).map(SearchType::parse), keyword)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn search_type(&self) -> Option<SearchType> {
        self.search_type
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Rows to skip before the current page
    pub fn offset(&self) -> i64 {
        checked_offset(self.page, self.amount).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.amount)
    }

    /// True when a keyword is present and not blank. The search type plays no part here.
    pub fn has_search_condition(&self) -> bool {
        self.keyword.as_deref().is_some_and(|kw| !kw.trim().is_empty())
    }

    /// The search condition to apply, if any.
    ///
    /// No type means every field is searched; an unrecognized type means no restriction at all.
    pub fn search_filter(&self) -> Option<SearchFilter<'_>> {
        if !self.has_search_condition() {
            return None;
        }
        let fields = match self.search_type {
            Some(search_type) => search_type.fields(),
            None => ALL_FIELDS,
        };
        if fields.is_empty() {
            return None;
        }
        let keyword = self.keyword.as_deref()?.trim();
        Some(SearchFilter { fields, keyword })
    }
}

fn checked_offset(page: u32, amount: u32) -> Option<i64> {
    (i64::from(page) - 1).checked_mul(i64::from(amount))
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v >= 1)
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<i64>().ok().and_then(positive)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Query string of a listing endpoint, as sent by the client
///
/// Values stay strings here so that malformed numbers surface as `PaginationErr` rather than
/// as an extractor rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// Page number, starting at 1. Default: 1
    pub page: Option<String>,
    /// Rows per page. Default: 10
    pub amount: Option<String>,
    /// Search type: `title`, `content`, `writer`, `titleContent` (or `T`, `C`, `W`, `TC`)
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    /// Search keyword; blank means no search
    pub keyword: Option<String>,
}

impl TryFrom<ListingParams> for PageRequest {
    type Error = PaginationErr;

    fn try_from(params: ListingParams) -> Result<Self, Self::Error> {
        PageRequest::parse(
            params.page.as_deref(),
            params.amount.as_deref(),
            params.search_type.as_deref(),
            params.keyword,
        )
    }
}

/// One page of a listing plus everything a pager needs to render its links
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: i64,
    pub page: u32,
    pub amount: u32,
    pub total_pages: i64,
    pub start_page: i64,
    pub end_page: i64,
    pub prev: bool,
    pub next: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: &PageRequest, total_count: i64, items: Vec<T>) -> Self {
        let amount = i64::from(request.amount());
        let total_count = total_count.max(0);
        let total_pages = (total_count + amount - 1) / amount;

        // a page past the end still gets the last window
        let last = total_pages.max(1);
        let current = i64::from(request.page()).min(last);
        let start_page = ((current - 1) / PAGE_WINDOW) * PAGE_WINDOW + 1;
        let end_page = (start_page + PAGE_WINDOW - 1).min(last);

        Self {
            total_count,
            page: request.page(),
            amount: request.amount(),
            total_pages,
            start_page,
            end_page,
            prev: start_page > 1,
            next: end_page < total_pages,
            items,
        }
    }
}

/// Paged, optionally filtered listing over one entity collection
///
/// `page`/`page_matching` return rows `[offset, offset + amount)` in the collection's default
/// sort order. A store must evaluate the count and the page of one request against the same
/// search condition; `fetch_page` picks the pair from `has_search_condition`.
#[async_trait]
pub trait ListingQuery<T: Send + 'static>: Send + Sync {
    async fn total_count(&self) -> Result<i64, StoreError>;

    async fn total_count_matching(&self, request: &PageRequest) -> Result<i64, StoreError>;

    async fn page(&self, request: &PageRequest) -> Result<Vec<T>, StoreError>;

    async fn page_matching(&self, request: &PageRequest) -> Result<Vec<T>, StoreError>;
}

/// Runs the count and the page query for `request` and assembles the pager.
///
/// The two queries are separate round trips without a transaction, so a concurrent insert or
/// delete can land between them and the total may be off by that write.
pub async fn fetch_page<T, L>(listing: &L, request: &PageRequest) -> Result<Page<T>, StoreError>
where
    T: Send + 'static,
    L: ListingQuery<T> + ?Sized,
{
    let (total_count, items) = if request.has_search_condition() {
        (
            listing.total_count_matching(request).await?,
            listing.page_matching(request).await?,
        )
    } else {
        (listing.total_count().await?, listing.page(request).await?)
    };

    tracing::trace!(
        "page {} of {} rows ({} returned)",
        request.page(),
        total_count,
        items.len()
    );

    Ok(Page::new(request, total_count, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.amount(), 10);
        assert_eq!(request.offset(), 0);
        assert!(!request.has_search_condition());
    }

    #[test]
    fn test_offset_is_multiple_of_amount() {
        for page in 1..=50 {
            for amount in 1..=25 {
                let request = PageRequest::of(page, amount).unwrap();
                assert_eq!(request.offset(), (page - 1) * amount);
                assert_eq!(request.offset() % amount, 0);
            }
        }
    }

    #[test]
    fn test_rejects_non_positive_page_and_amount() {
        assert_eq!(
            PageRequest::of(0, 10),
            Err(PaginationErr::InvalidPage("0".to_string()))
        );
        assert_eq!(
            PageRequest::of(-3, 10),
            Err(PaginationErr::InvalidPage("-3".to_string()))
        );
        assert_eq!(
            PageRequest::of(1, 0),
            Err(PaginationErr::InvalidAmount("0".to_string()))
        );
    }

    #[test]
    fn test_search_condition_requires_non_blank_keyword() {
        let base = PageRequest::default();
        assert!(!base.clone().with_search(Some(SearchType::Title), "").has_search_condition());
        assert!(!base.clone().with_search(Some(SearchType::Title), "   ").has_search_condition());
        assert!(!base.clone().with_search(None, "\t\n").has_search_condition());
        assert!(base.clone().with_search(None, "abc").has_search_condition());
        assert!(base.clone().with_search(Some(SearchType::Writer), "  abc  ").has_search_condition());
    }

    #[test]
    fn test_type_without_keyword_has_no_condition() {
        let request = PageRequest::from_params(&params(&[("type", "title")])).unwrap();
        assert_eq!(request.search_type(), Some(SearchType::Title));
        assert!(!request.has_search_condition());
        assert!(request.search_filter().is_none());
    }

    #[test]
    fn test_from_params_defaults() {
        let request = PageRequest::from_params(&HashMap::new()).unwrap();
        assert_eq!(request, PageRequest::default());

        let request = PageRequest::from_params(&params(&[("page", " "), ("amount", "")])).unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.amount(), 10);
    }

    #[test]
    fn test_from_params_reads_all_fields() {
        let request = PageRequest::from_params(&params(&[
            ("page", "3"),
            ("amount", "5"),
            ("type", "TC"),
            ("keyword", "spring"),
        ]))
        .unwrap();

        assert_eq!(request.page(), 3);
        assert_eq!(request.amount(), 5);
        assert_eq!(request.offset(), 10);
        assert_eq!(request.search_type(), Some(SearchType::TitleContent));
        assert_eq!(request.keyword(), Some("spring"));
    }

    #[test]
    fn test_from_params_rejects_bad_numbers() {
        assert_eq!(
            PageRequest::from_params(&params(&[("page", "0")])),
            Err(PaginationErr::InvalidPage("0".to_string()))
        );
        assert_eq!(
            PageRequest::from_params(&params(&[("page", "two")])),
            Err(PaginationErr::InvalidPage("two".to_string()))
        );
        assert_eq!(
            PageRequest::from_params(&params(&[("amount", "-1")])),
            Err(PaginationErr::InvalidAmount("-1".to_string()))
        );
    }

    #[test]
    fn test_search_type_parsing() {
        assert_eq!(SearchType::parse("title"), SearchType::Title);
        assert_eq!(SearchType::parse("C"), SearchType::Content);
        assert_eq!(SearchType::parse("writer"), SearchType::Writer);
        assert_eq!(SearchType::parse("titleContent"), SearchType::TitleContent);
        assert_eq!(SearchType::parse("nope"), SearchType::Unrecognized);
    }

    #[test]
    fn test_search_filter_fields() {
        let request = PageRequest::default().with_search(Some(SearchType::TitleContent), " rust ");
        let filter = request.search_filter().unwrap();
        assert_eq!(filter.fields, &[SearchField::Title, SearchField::Content]);
        assert_eq!(filter.keyword, "rust");

        let request = PageRequest::default().with_search(None, "rust");
        assert_eq!(request.search_filter().unwrap().fields.len(), 3);

        // unrecognized tag: condition present but nothing to restrict on
        let request = PageRequest::default().with_search(Some(SearchType::Unrecognized), "rust");
        assert!(request.has_search_condition());
        assert!(request.search_filter().is_none());
    }

    #[test]
    fn test_title_content_is_an_or() {
        let request = PageRequest::default().with_search(Some(SearchType::TitleContent), "Spring");
        let filter = request.search_filter().unwrap();

        let row = |title: &'static str, content: &'static str| {
            move |field: SearchField| match field {
                SearchField::Title => title,
                SearchField::Content => content,
                SearchField::Writer => "nobody",
            }
        };

        assert!(filter.matches(row("spring boot", "x")));
        assert!(filter.matches(row("x", "early SPRING")));
        assert!(!filter.matches(row("summer", "autumn")));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let filter = SearchFilter {
            fields: ALL_FIELDS,
            keyword: "50%_off\\",
        };
        assert_eq!(filter.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_page_scenarios() {
        let first = Page::new(&PageRequest::of(1, 10).unwrap(), 25, vec![0; 10]);
        assert_eq!(first.total_pages, 3);
        assert_eq!((first.start_page, first.end_page), (1, 3));
        assert!(!first.prev);
        assert!(!first.next);

        let past_end: Page<i32> = Page::new(&PageRequest::of(4, 10).unwrap(), 25, vec![]);
        assert_eq!(past_end.total_pages, 3);
        assert_eq!(past_end.total_count, 25);
        assert_eq!((past_end.start_page, past_end.end_page), (1, 3));
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_page_window_blocks() {
        let page: Page<()> = Page::new(&PageRequest::of(12, 10).unwrap(), 305, vec![]);
        assert_eq!(page.total_pages, 31);
        assert_eq!((page.start_page, page.end_page), (11, 20));
        assert!(page.prev);
        assert!(page.next);

        let last: Page<()> = Page::new(&PageRequest::of(31, 10).unwrap(), 305, vec![]);
        assert_eq!((last.start_page, last.end_page), (31, 31));
        assert!(last.prev);
        assert!(!last.next);
    }

    #[test]
    fn test_empty_listing_page() {
        let page: Page<()> = Page::new(&PageRequest::default(), 0, vec![]);
        assert_eq!(page.total_pages, 0);
        assert_eq!((page.start_page, page.end_page), (1, 1));
        assert!(!page.prev);
        assert!(!page.next);
    }

    #[test]
    fn test_listing_params_conversion() {
        let request = PageRequest::try_from(ListingParams {
            page: Some("2".into()),
            amount: None,
            search_type: Some("TC".into()),
            keyword: Some("jeju".into()),
        })
        .unwrap();
        assert_eq!(request.offset(), 10);
        assert_eq!(request.search_type(), Some(SearchType::TitleContent));

        let err = PageRequest::try_from(ListingParams {
            amount: Some("ten".into()),
            ..ListingParams::default()
        })
        .unwrap_err();
        assert_eq!(err, PaginationErr::InvalidAmount("ten".into()));
    }

    #[test]
    fn test_rejects_offset_overflow() {
        let max = u32::MAX.to_string();
        assert_eq!(
            PageRequest::from_params(&params(&[("page", max.as_str()), ("amount", max.as_str())])),
            Err(PaginationErr::OutOfRange {
                page: u32::MAX,
                amount: u32::MAX
            })
        );
        assert!(matches!(
            PageRequest::of(i64::from(u32::MAX), i64::from(u32::MAX)),
            Err(PaginationErr::OutOfRange { .. })
        ));

        // the largest page still reachable one row at a time
        let request = PageRequest::of(i64::from(u32::MAX), 1).unwrap();
        assert_eq!(request.offset(), i64::from(u32::MAX) - 1);
        let request = PageRequest::of(2, i64::from(u32::MAX)).unwrap();
        assert_eq!(request.offset(), i64::from(u32::MAX));
    }
}
