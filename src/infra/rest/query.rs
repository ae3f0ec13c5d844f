//! Query builder rendering PostgREST query-string filters.
//!
//! A [`Query`] only describes *what* to select; the HTTP verb and the table
//! come from the [`TableStore`](super::TableStore) call it is passed to.

use std::fmt::Display;

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Filtered, ordered, paginated selection against one relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    range: Option<(u64, u64)>,
    count_exact: bool,
    returning: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column list (PostgREST select syntax, embeds included).
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("eq.{}", value))
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("gte.{}", value))
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("lt.{}", value))
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("lte.{}", value))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is.null".to_string())
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, "not.is.null".to_string())
    }

    /// Case-insensitive substring match on one column.
    pub fn ilike(self, column: &str, needle: &str) -> Self {
        self.filter(column, format!("ilike.*{}*", needle))
    }

    /// Case-insensitive substring match on any of `columns`.
    pub fn any_ilike(self, columns: &[&str], needle: &str) -> Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = quote_value(&format!("*{}*", needle));
        let clauses = columns
            .iter()
            .map(|column| format!("{}.ilike.{}", column, pattern))
            .collect::<Vec<_>>()
            .join(",");
        self.filter("or", format!("({})", clauses))
    }

    /// Apply `any_ilike` only when a non-blank search term was supplied.
    pub fn search(self, columns: &[&str], term: Option<&str>) -> Self {
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => self.any_ilike(columns, term),
            None => self,
        }
    }

    /// Apply `eq` only when a non-blank value was supplied.
    pub fn eq_opt(self, column: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order.push(format!("{}.{}", column, order.as_str()));
        self
    }

    /// Row window as offset/limit.
    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some((offset, limit));
        self
    }

    /// Ask the store for the exact number of matching rows.
    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Ask writes to return the affected rows.
    pub fn returning(mut self) -> Self {
        self.returning = true;
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn range_window(&self) -> Option<(u64, u64)> {
        self.range
    }

    /// Query-string pairs for the request URL.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 4);
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some((offset, limit)) = self.range {
            params.push(("offset".to_string(), offset.to_string()));
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Value of the `Prefer` header, if any preference applies.
    pub fn prefer_header(&self) -> Option<String> {
        let mut prefs = Vec::new();
        if self.returning {
            prefs.push("return=representation");
        }
        if self.count_exact {
            prefs.push("count=exact");
        }
        (!prefs.is_empty()).then(|| prefs.join(","))
    }

    fn filter(mut self, column: &str, expression: String) -> Self {
        self.filters.push((column.to_string(), expression));
        self
    }
}

/// Wrap values containing PostgREST-reserved characters in double quotes.
fn quote_value(value: &str) -> String {
    const RESERVED: [char; 5] = [',', '(', ')', '.', ':'];
    if value.contains(RESERVED) || value.contains('"') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Parse the total from a `Content-Range` header (`0-9/42`, `*/0`).
pub fn parse_content_range(header: &str) -> Option<u64> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}
