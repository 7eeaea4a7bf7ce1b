//! Hand-written SQL: declared queries with named parameters and native
//! queries with positional parameters.
//!
//! Placeholders are found by a small scanner that skips quoted strings,
//! quoted identifiers and `::` casts. Statements are rendered in the
//! placeholder style of the connected backend (`$n` for PostgreSQL, `?`
//! otherwise).

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DbBackend, Statement, Value};

use common::{AppError, AppResult};

use crate::page::PageRequest;

/// Sort properties accepted by native paging: `column` or `alias.column`
static SORT_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid sort identifier pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Named(String),
    Positional,
}

/// Split SQL into text and placeholders
fn scan(sql: &str) -> Vec<Segment> {
    let chars: Vec<char> = sql.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                // copy through the closing quote; doubled quotes are escapes
                text.push(c);
                i += 1;
                while i < chars.len() {
                    text.push(chars[i]);
                    if chars[i] == c {
                        if chars.get(i + 1) == Some(&c) {
                            text.push(c);
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            ':' if chars.get(i + 1) == Some(&':') => {
                text.push_str("::");
                i += 2;
            }
            ':' if chars.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Named(chars[start..end].iter().collect()));
                i = end;
            }
            '?' => {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Positional);
                i += 1;
            }
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Accumulates rendered SQL and values in backend placeholder style
struct Renderer {
    backend: DbBackend,
    sql: String,
    values: Vec<Value>,
}

impl Renderer {
    fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            sql: String::new(),
            values: Vec::new(),
        }
    }

    fn push_value(&mut self, value: Value) {
        self.values.push(value);
        match self.backend {
            DbBackend::Postgres => self.sql.push_str(&format!("${}", self.values.len())),
            _ => self.sql.push('?'),
        }
    }

    fn finish(self) -> Statement {
        Statement::from_sql_and_values(self.backend, self.sql, self.values)
    }
}

/// A query that renders to a single SQL statement.
pub trait RawQuery: Send + Sync {
    /// Short label for logs
    fn describe(&self) -> &str;

    /// Render for `backend`, failing on missing or surplus parameters
    fn statement(&self, backend: DbBackend) -> AppResult<Statement>;
}

#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Single(Value),
    List(Vec<Value>),
}

/// SQL with `:name` parameters, bound by name in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredQuery {
    sql: String,
    segments: Vec<Segment>,
    bindings: BTreeMap<String, Binding>,
}

impl DeclaredQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let segments = scan(&sql);
        Self {
            sql,
            segments,
            bindings: BTreeMap::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Distinct parameter names, in order of first appearance
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Named(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn check_parameter(&self, name: &str) -> AppResult<()> {
        if self.parameter_names().contains(&name) {
            Ok(())
        } else {
            Err(AppError::invalid_query(format!(
                "Parameter with that name [{}] did not exist in query: {}",
                name, self.sql
            )))
        }
    }

    /// Bind `value` to `:name`
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> AppResult<Self> {
        self.check_parameter(name)?;
        self.bindings.insert(name.to_string(), Binding::Single(value.into()));
        Ok(self)
    }

    /// Bind a collection to `:name`, rendered as `(v1, v2, ...)`
    pub fn bind_list<V, I>(mut self, name: &str, values: I) -> AppResult<Self>
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.check_parameter(name)?;
        let values = values.into_iter().map(Into::into).collect();
        self.bindings.insert(name.to_string(), Binding::List(values));
        Ok(self)
    }
}

impl RawQuery for DeclaredQuery {
    fn describe(&self) -> &str {
        &self.sql
    }

    fn statement(&self, backend: DbBackend) -> AppResult<Statement> {
        let mut renderer = Renderer::new(backend);

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => renderer.sql.push_str(text),
                Segment::Positional => {
                    return Err(AppError::invalid_query(format!(
                        "Positional parameter in declared query: {}",
                        self.sql
                    )))
                }
                Segment::Named(name) => match self.bindings.get(name) {
                    Some(Binding::Single(value)) => renderer.push_value(value.clone()),
                    Some(Binding::List(values)) if values.is_empty() => renderer.sql.push_str("(NULL)"),
                    Some(Binding::List(values)) => {
                        renderer.sql.push('(');
                        for (index, value) in values.iter().enumerate() {
                            if index > 0 {
                                renderer.sql.push_str(", ");
                            }
                            renderer.push_value(value.clone());
                        }
                        renderer.sql.push(')');
                    }
                    None => {
                        return Err(AppError::invalid_query(format!(
                            "No value bound for parameter [{}] in query: {}",
                            name, self.sql
                        )))
                    }
                },
            }
        }

        Ok(renderer.finish())
    }
}

/// SQL with positional `?` parameters, bound in order.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeQuery {
    sql: String,
    segments: Vec<Segment>,
    values: Vec<Value>,
}

impl NativeQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let segments = scan(&sql);
        Self {
            sql,
            segments,
            values: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind the next positional parameter
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn parameter_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Positional))
            .count()
    }

    /// Append `ORDER BY` / `LIMIT` / `OFFSET` for `request`.
    ///
    /// Sort properties are used as column names verbatim and must be plain
    /// identifiers.
    pub fn paged(&self, request: &PageRequest) -> AppResult<Self> {
        let mut sql = self.sql.trim_end().trim_end_matches(';').to_string();

        let mut keys = Vec::new();
        for order in request.sort().orders() {
            if !SORT_IDENTIFIER.is_match(&order.property) {
                return Err(AppError::invalid_query(format!(
                    "Invalid sort property for native query: {}",
                    order.property
                )));
            }
            let direction = if order.direction.is_descending() { "DESC" } else { "ASC" };
            keys.push(format!("{} {}", order.property, direction));
        }
        if !keys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", request.size(), request.offset()?));

        let mut paged = NativeQuery::new(sql);
        paged.values = self.values.clone();
        Ok(paged)
    }
}

impl RawQuery for NativeQuery {
    fn describe(&self) -> &str {
        &self.sql
    }

    fn statement(&self, backend: DbBackend) -> AppResult<Statement> {
        let expected = self.parameter_count();
        if expected != self.values.len() {
            return Err(AppError::invalid_query(format!(
                "Native query expects {} parameter(s), {} bound: {}",
                expected,
                self.values.len(),
                self.sql
            )));
        }

        let mut renderer = Renderer::new(backend);
        let mut values = self.values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => renderer.sql.push_str(text),
                Segment::Named(name) => {
                    return Err(AppError::invalid_query(format!(
                        "Named parameter [{}] in native query: {}",
                        name, self.sql
                    )))
                }
                Segment::Positional => {
                    if let Some(value) = values.next() {
                        renderer.push_value(value.clone());
                    }
                }
            }
        }

        Ok(renderer.finish())
    }
}

/// A bulk `UPDATE` / `DELETE` that bypasses the identity map.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifying {
    query: DeclaredQuery,
    clear_automatically: bool,
}

impl Modifying {
    pub fn new(query: DeclaredQuery) -> Self {
        Self {
            query,
            clear_automatically: false,
        }
    }

    /// Clear the identity map after the statement runs, so later reads
    /// observe the bulk change
    pub fn clear_automatically(mut self) -> Self {
        self.clear_automatically = true;
        self
    }

    pub fn query(&self) -> &DeclaredQuery {
        &self.query
    }

    pub fn clears_automatically(&self) -> bool {
        self.clear_automatically
    }
}

/// Declared queries registered up front and looked up by name.
#[derive(Debug, Clone, Default)]
pub struct NamedQueries {
    queries: HashMap<String, DeclaredQuery>,
}

impl NamedQueries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.queries.insert(name.into(), DeclaredQuery::new(sql));
        self
    }

    /// Unbound copy of the query registered as `name`
    pub fn get(&self, name: &str) -> AppResult<DeclaredQuery> {
        self.queries
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::invalid_query(format!("No query defined for that name [{}]", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
