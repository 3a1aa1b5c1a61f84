use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Hard cap on page size so a single listing request cannot pull an
/// unbounded number of documents.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize, IntoParams, Clone)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl fmt::Display for PaginationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page:{}:limit:{}", self.page(), self.limit())
    }
}

impl PaginationQuery {
    pub fn page(&self) -> u32 {
        let page = self.page.unwrap_or(1); // Default page to 1
        if page > 1 { page } else { 1 }
    }

    pub fn limit(&self) -> u32 {
        let limit = self.limit.unwrap_or(20); // Default limit to 20
        if limit == 0 {
            return 20;
        }
        limit.min(MAX_PAGE_SIZE)
    }

    pub fn skip(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponseDto<T> {
    #[schema(example = 1)]
    pub total_docs: u64,

    #[schema(example = 1)]
    pub total_pages: u64,

    #[schema(example = 1)]
    pub page: u32,

    #[schema(example = 10)]
    pub limit: u32,

    pub docs: Vec<T>,
}

impl<T> PaginationResponseDto<T> {
    pub fn new(docs: Vec<T>, total_docs: u64, pagination: &PaginationQuery) -> Self {
        let limit = pagination.limit();
        PaginationResponseDto {
            total_docs,
            total_pages: total_docs.div_ceil(limit as u64),
            page: pagination.page(),
            limit,
            docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent_or_zero() {
        let q = PaginationQuery {
            page: None,
            limit: None,
        };
        assert_eq!((q.page(), q.limit(), q.skip()), (1, 20, 0));

        let q = PaginationQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!((q.page(), q.limit(), q.skip()), (1, 20, 0));
    }

    #[test]
    fn limit_is_capped() {
        let q = PaginationQuery {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.skip(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = PaginationQuery {
            page: Some(1),
            limit: Some(20),
        };
        let dto = PaginationResponseDto::new(vec![1, 2, 3], 41, &q);
        assert_eq!(dto.total_pages, 3);
    }
}
