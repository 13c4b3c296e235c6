use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection, SortKey};
use crate::database::models::TradeRecord;
use crate::ingest::headers;

pub struct FilterOrder;

impl FilterOrder {
    /// `sortField` is `_id` or a canonical field name; `sortOrder` is
    /// `desc`, anything else sorts ascending.
    pub fn parse(field: Option<&str>, order: Option<&str>) -> Result<FilterOrderInfo, FilterError> {
        let key = match field.map(str::trim).filter(|f| !f.is_empty()) {
            None | Some("_id") => SortKey::Insertion,
            Some(name) => headers::CANONICAL_FIELDS
                .iter()
                .find(|&&f| f == name)
                .map(|&f| SortKey::Field(f))
                .ok_or_else(|| FilterError::InvalidSortField(name.to_string()))?,
        };
        let sort = match order {
            Some(o) if o.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Ok(FilterOrderInfo { key, sort })
    }

    /// Missing values sort first ascending and last descending; insertion
    /// order breaks ties.
    pub fn generate(info: &FilterOrderInfo) -> String {
        match info.key {
            SortKey::Insertion => format!("ORDER BY seq {}", info.sort.to_sql()),
            SortKey::Field(field) => {
                let nulls = match info.sort {
                    SortDirection::Asc => "NULLS FIRST",
                    SortDirection::Desc => "NULLS LAST",
                };
                format!(
                    "ORDER BY data->>{} COLLATE \"C\" {} {}, seq ASC",
                    quote_literal(field),
                    info.sort.to_sql(),
                    nulls
                )
            }
        }
    }

    /// In-process equivalent of [`FilterOrder::generate`].
    pub fn compare(info: &FilterOrderInfo, a: &TradeRecord, b: &TradeRecord) -> Ordering {
        match info.key {
            SortKey::Insertion => directed(info.sort, a.seq.cmp(&b.seq)),
            SortKey::Field(field) => {
                // Option orders None before Some, which is the ascending rule
                directed(info.sort, a.field(field).cmp(&b.field(field))).then(a.seq.cmp(&b.seq))
            }
        }
    }
}

fn directed(sort: SortDirection, ordering: Ordering) -> Ordering {
    match sort {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
