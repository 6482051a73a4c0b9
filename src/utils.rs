use serde::Deserialize;

const DEFAULT_PAGE_LIMIT: u64 = 25;
const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    limit: u64,
    #[serde(default)]
    offset: u64,
}

impl PaginationParams {
    pub fn limit(&self) -> u64 {
        if self.limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            self.limit.min(MAX_PAGE_LIMIT)
        }
    }

    pub fn offset(&self) -> u64 {
        // Clamped so the i64 bind for OFFSET can never wrap negative.
        self.offset.min(i64::MAX as u64)
    }
}

/// Optional case-insensitive title substring filter for the public feed.
/// Extracted separately from pagination so both read the same query string.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_falls_back_to_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit": 5000, "offset": 10}"#).unwrap();
        assert_eq!(params.limit(), MAX_PAGE_LIMIT);
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn offset_stays_within_i64_range() {
        let params: PaginationParams =
            serde_json::from_str(&format!(r#"{{"offset": {}}}"#, u64::MAX)).unwrap();
        assert_eq!(params.offset(), i64::MAX as u64);
        assert!((params.offset() as i64) >= 0);
    }
}
