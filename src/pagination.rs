use serde::{Deserialize, Serialize};

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl Pagination {
    /// Clamps page to >= 1 and limit to 1..=100.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Saturates instead of overflowing; a page past the end just yields no rows.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, p: Pagination) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + p.limit - 1) / p.limit
        };
        Self {
            data,
            meta: PageMeta {
                total,
                page: p.page,
                limit: p.limit,
                total_pages,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_out_of_range_values() {
        let p = Pagination { page: 0, limit: 1000 }.normalized();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);

        let p = Pagination { page: -3, limit: 0 }.normalized();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination { page: 1, limit: 20 }.offset(), 0);
        assert_eq!(Pagination { page: 3, limit: 10 }.offset(), 20);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let p = Pagination { page: i64::MAX, limit: 1000 }.normalized();
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination { page: i64::MIN, limit: 1000 }.normalized();
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination { page: 1, limit: 10 };
        assert_eq!(Paginated::new(Vec::<u8>::new(), 0, p).meta.total_pages, 0);
        assert_eq!(Paginated::new(Vec::<u8>::new(), 10, p).meta.total_pages, 1);
        assert_eq!(Paginated::new(Vec::<u8>::new(), 11, p).meta.total_pages, 2);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let page = Paginated::new(vec![1, 2], 2, Pagination::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["meta"]["totalPages"], 1);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }
}
