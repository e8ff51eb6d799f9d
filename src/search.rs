// Availability search criteria

use crate::wire::format_date_time;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_SIZE: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub restaurant_ids: BTreeSet<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    // 0 or negative disables the filter
    pub party_size: i32,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            restaurant_ids: BTreeSet::new(),
            from: None,
            to: None,
            party_size: 0,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_restaurant_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.restaurant_ids.insert(id.into());
        self
    }

    /// Query string of `GET reservations/availability`, without the api key.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .restaurant_ids
            .iter()
            .map(|id| ("restaurantIds".to_string(), id.clone()))
            .collect();
        params.push(("includeClosed".to_string(), "false".to_string()));
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("pageSize".to_string(), self.page_size.to_string()));
        if self.party_size > 0 {
            params.push(("partySize".to_string(), self.party_size.to_string()));
        }
        if let Some(from) = &self.from {
            params.push(("beginDateTime".to_string(), format_date_time(from)));
        }
        if let Some(to) = &self.to {
            params.push(("endDateTime".to_string(), format_date_time(to)));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::parse_local_date_time;
    use test_case::test_case;

    fn values<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_defaults() {
        let criteria = SearchCriteria::new();
        let params = criteria.query_params();

        assert_eq!(values(&params, "includeClosed"), vec!["false"]);
        assert_eq!(values(&params, "page"), vec!["0"]);
        assert_eq!(values(&params, "pageSize"), vec!["365"]);
        assert!(values(&params, "restaurantIds").is_empty());
        assert!(values(&params, "beginDateTime").is_empty());
        assert!(values(&params, "endDateTime").is_empty());
    }

    #[test]
    fn test_restaurant_ids_are_unique_and_repeated() {
        let mut criteria = SearchCriteria::new();
        criteria
            .add_restaurant_id("B")
            .add_restaurant_id("A")
            .add_restaurant_id("B");

        let params = criteria.query_params();
        assert_eq!(values(&params, "restaurantIds"), vec!["A", "B"]);
    }

    #[test_case(0, None; "zero is unfiltered")]
    #[test_case(-3, None; "negative is unfiltered")]
    #[test_case(4, Some("4"); "positive filters")]
    fn test_party_size_filter(party_size: i32, expected: Option<&str>) {
        let criteria = SearchCriteria {
            party_size,
            ..Default::default()
        };
        let params = criteria.query_params();
        assert_eq!(values(&params, "partySize").first().copied(), expected);
    }

    #[test]
    fn test_date_bounds_format() {
        let criteria = SearchCriteria {
            from: Some(parse_local_date_time("2014-08-29T00:00").unwrap()),
            to: Some(parse_local_date_time("2014-09-05T23:59:59").unwrap()),
            page: 2,
            page_size: 10,
            ..Default::default()
        };
        let params = criteria.query_params();

        assert_eq!(values(&params, "beginDateTime"), vec!["2014-08-29T00:00:00"]);
        assert_eq!(values(&params, "endDateTime"), vec!["2014-09-05T23:59:59"]);
        assert_eq!(values(&params, "page"), vec!["2"]);
        assert_eq!(values(&params, "pageSize"), vec!["10"]);
    }
}
