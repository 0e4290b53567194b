//! Typed PostgREST query construction.
//!
//! Column names are `&'static str` so they can only come from code; every
//! value a caller supplies is quoted where the operator needs it and
//! percent-encoded before it reaches the query string.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// The predicates the services are allowed to send to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, String),
    Neq(&'static str, String),
    Gte(&'static str, String),
    Lte(&'static str, String),
    /// Case-insensitive substring match.
    ILike(&'static str, String),
    /// Array column contains every listed element.
    Contains(&'static str, Vec<String>),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Filter::Eq(column, value.to_string())
    }

    pub fn neq(column: &'static str, value: impl ToString) -> Self {
        Filter::Neq(column, value.to_string())
    }

    pub fn gte(column: &'static str, value: impl ToString) -> Self {
        Filter::Gte(column, value.to_string())
    }

    pub fn lte(column: &'static str, value: impl ToString) -> Self {
        Filter::Lte(column, value.to_string())
    }

    pub fn ilike(column: &'static str, term: impl AsRef<str>) -> Self {
        Filter::ILike(column, term.as_ref().to_string())
    }

    pub fn contains<I, S>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Filter::Contains(column, values.into_iter().map(|v| v.to_string()).collect())
    }

    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _)
            | Filter::Neq(c, _)
            | Filter::Gte(c, _)
            | Filter::Lte(c, _)
            | Filter::ILike(c, _)
            | Filter::Contains(c, _) => c,
        }
    }

    fn render_value(&self) -> String {
        match self {
            Filter::Eq(_, v) => format!("eq.{}", encode(v)),
            Filter::Neq(_, v) => format!("neq.{}", encode(v)),
            Filter::Gte(_, v) => format!("gte.{}", encode(v)),
            Filter::Lte(_, v) => format!("lte.{}", encode(v)),
            Filter::ILike(_, term) => {
                // wildcards in user input would widen the match
                let term: String = term.chars().filter(|c| *c != '*' && *c != '%').collect();
                format!("ilike.{}", encode(&format!("*{}*", term)))
            }
            Filter::Contains(_, values) => {
                format!("cs.{}", encode(&format!("{{{}}}", quote_list(values))))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableQuery {
    table: &'static str,
    select: Option<&'static str>,
    filters: Vec<Filter>,
    order: Vec<(&'static str, Direction)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl TableQuery {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn select(mut self, columns: &'static str) -> Self {
        self.select = Some(columns);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds the filter only when a value is present.
    pub fn filter_opt(self, filter: Option<Filter>) -> Self {
        match filter {
            Some(f) => self.filter(f),
            None => self,
        }
    }

    pub fn order(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Renders the request path, e.g. `/rest/v1/hospitals?city=eq.Izmir&order=name.asc`.
    pub fn to_path(&self) -> String {
        let mut parts = Vec::new();

        if let Some(select) = self.select {
            parts.push(format!("select={}", select));
        }

        for filter in &self.filters {
            parts.push(format!("{}={}", filter.column(), filter.render_value()));
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, direction)| format!("{}.{}", column, direction))
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("order={}", order));
        }

        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset={}", offset));
        }

        if parts.is_empty() {
            format!("/rest/v1/{}", self.table)
        } else {
            format!("/rest/v1/{}?{}", self.table, parts.join("&"))
        }
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",")
}
