use super::filter_order::quote_literal;
use super::types::SEARCH_FIELDS;
use crate::database::models::TradeRecord;

/// Row predicate of a trade listing: exact product and free-text search,
/// both optional and ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterWhere {
    pub product: Option<String>,
    pub search: Option<String>,
}

impl FilterWhere {
    pub fn new(product: Option<String>, search: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        Self {
            product: non_empty(product),
            search: non_empty(search),
        }
    }

    /// SQL condition and its positional text parameters, numbered from `$1`.
    pub fn generate(&self) -> (String, Vec<String>) {
        let mut conditions = vec![];
        let mut params = vec![];

        if let Some(product) = &self.product {
            params.push(product.clone());
            conditions.push(format!("data->>'Product Name' = ${}", params.len()));
        }

        if let Some(search) = &self.search {
            params.push(format!("%{}%", escape_like(search)));
            let placeholder = format!("${}", params.len());
            let any = SEARCH_FIELDS
                .iter()
                .map(|f| format!("data->>{} ILIKE {}", quote_literal(f), placeholder))
                .collect::<Vec<_>>()
                .join(" OR ");
            conditions.push(format!("({})", any));
        }

        let clause = if conditions.is_empty() { "TRUE".to_string() } else { conditions.join(" AND ") };
        (clause, params)
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        if let Some(product) = &self.product {
            if record.field("Product Name") != Some(product.as_str()) {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                SEARCH_FIELDS
                    .iter()
                    .filter_map(|f| record.field(f))
                    .any(|value| value.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Search text is literal; LIKE wildcards in it are escaped.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
