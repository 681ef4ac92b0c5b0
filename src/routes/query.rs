//! List-query parsing
//!
//! Pagination and search parameters parsed from the raw query string.

/// Query parameters for list endpoints
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
        }
    }
}

impl ListQuery {
    /// Parse from a raw query string; unknown keys are ignored, malformed
    /// values fall back to the defaults, and the limit is capped at 100.
    pub fn from_query_string(query: Option<&str>) -> Self {
        let mut params = Self::default();

        if let Some(q) = query {
            for pair in q.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    let value = urlencoding::decode(value).unwrap_or_default();
                    match key {
                        "page" => params.page = value.parse().unwrap_or(1).max(1),
                        "limit" => params.limit = value.parse::<u32>().unwrap_or(20).clamp(1, 100),
                        "search" => {
                            let trimmed = value.trim();
                            if !trimmed.is_empty() {
                                params.search = Some(trimmed.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        params
    }

    /// Documents to skip for the requested page
    pub fn skip(&self) -> u64 {
        ((self.page - 1) * self.limit) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = ListQuery::from_query_string(None);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
        assert!(q.search.is_none());
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn test_parse_page_and_limit() {
        let q = ListQuery::from_query_string(Some("page=3&limit=50"));
        assert_eq!(q.page, 3);
        assert_eq!(q.limit, 50);
        assert_eq!(q.skip(), 100);
    }

    #[test]
    fn test_limit_is_capped() {
        let q = ListQuery::from_query_string(Some("limit=5000"));
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let q = ListQuery::from_query_string(Some("page=zero&limit=-3"));
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn test_search_is_decoded_and_trimmed() {
        let q = ListQuery::from_query_string(Some("search=gestion%20de%20projet"));
        assert_eq!(q.search.as_deref(), Some("gestion de projet"));

        let q = ListQuery::from_query_string(Some("search=%20%20"));
        assert!(q.search.is_none());
    }
}
