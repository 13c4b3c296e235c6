use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, SqlResult, TradeListParams};
use crate::config::ApiConfig;
use crate::database::models::TradeRecord;
use std::cmp::Ordering;

const TRADE_COLUMNS: &str = "id, seq, data, created_at";

/// A validated trade listing request: predicate, sort and page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFilter {
    pub where_data: FilterWhere,
    pub order_data: FilterOrderInfo,
    pub page: u32,
    pub limit: u32,
}

impl TradeFilter {
    pub fn from_params(params: &TradeListParams, api: &ApiConfig) -> Result<Self, FilterError> {
        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let requested = parse_positive(params.limit.as_deref()).unwrap_or(api.default_page_size);
        let limit = requested.min(api.max_page_size.max(1));
        if limit < requested {
            tracing::debug!("Limit {} exceeds max {}, capping to max", requested, limit);
        }

        Ok(Self {
            where_data: FilterWhere::new(params.product.clone(), params.search.clone()),
            order_data: FilterOrder::parse(params.sort_field.as_deref(), params.sort_order.as_deref())?,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_data.generate();
        let query = format!(
            "SELECT {} FROM trade_records WHERE {} {} LIMIT {} OFFSET {}",
            TRADE_COLUMNS,
            where_clause,
            FilterOrder::generate(&self.order_data),
            self.limit,
            self.offset()
        );
        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_data.generate();
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM trade_records WHERE {}", where_clause),
            params,
        }
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        self.where_data.matches(record)
    }

    pub fn compare(&self, a: &TradeRecord, b: &TradeRecord) -> Ordering {
        FilterOrder::compare(&self.order_data, a, b)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|&n| n > 0)
}
