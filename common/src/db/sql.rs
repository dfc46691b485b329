// Dynamic clause composition
// Builds WHERE predicates and SET assignments with automatically numbered placeholders

use crate::db::executor::SqlValue;
use crate::errors::RepositoryError;
use crate::models::JobFilter;

/// Ordered list of bound values.
///
/// Each `push` hands back the placeholder for the value it stored, so callers
/// never compute `$n` themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlParams {
    values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its placeholder (`$n`, or `$n::type` when the value needs a cast)
    pub fn push(&mut self, value: impl Into<SqlValue>) -> String {
        let value = value.into();
        let index = self.next_index();
        let placeholder = match value.cast() {
            Some(cast) => format!("${}::{}", index, cast),
            None => format!("${}", index),
        };
        self.values.push(value);
        placeholder
    }

    /// Position the next pushed value will occupy
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Conjunction of predicates plus the values they bind
#[derive(Debug, Clone, Default)]
pub struct FilterClause {
    predicates: Vec<String>,
    params: SqlParams,
}

impl FilterClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate that binds no value
    pub fn push(&mut self, predicate: impl Into<String>) {
        self.predicates.push(predicate.into());
    }

    /// Bind `value` and add the predicate `render` builds around its placeholder
    pub fn push_with(&mut self, value: impl Into<SqlValue>, render: impl FnOnce(&str) -> String) {
        let placeholder = self.params.push(value);
        self.predicates.push(render(&placeholder));
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn params(&self) -> &SqlParams {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// `WHERE p1 AND p2 ...`, or `None` when there is nothing to filter on
    pub fn where_sql(&self) -> Option<String> {
        if self.predicates.is_empty() {
            None
        } else {
            Some(format!("WHERE {}", self.predicates.join(" AND ")))
        }
    }

    pub fn into_parts(self) -> (Option<String>, Vec<SqlValue>) {
        let where_sql = self.where_sql();
        (where_sql, self.params.into_values())
    }
}

/// Compose the job search predicates.
///
/// Order is fixed: minimum salary, equity, title. `has_equity: Some(false)`
/// adds nothing.
pub fn compose_job_filter(filter: &JobFilter) -> FilterClause {
    let mut clause = FilterClause::new();

    if let Some(min_salary) = filter.min_salary {
        clause.push_with(min_salary, |p| format!("salary >= {}", p));
    }

    if filter.has_equity == Some(true) {
        clause.push("equity > 0");
    }

    if let Some(title) = &filter.title {
        clause.push_with(title.as_str(), |p| format!("title ILIKE '%' || {} || '%'", p));
    }

    clause
}

/// Domain key to storage column remapping; keys not listed map to themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap<'a>(&'a [(&'a str, &'a str)]);

impl<'a> ColumnMap<'a> {
    pub const IDENTITY: ColumnMap<'static> = ColumnMap(&[]);

    pub const fn new(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Self(pairs)
    }

    pub fn resolve<'k>(&self, key: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.0
            .iter()
            .find(|(domain, _)| *domain == key)
            .map(|(_, column)| *column)
            .unwrap_or(key)
    }
}

/// Assignment list for a partial update
#[derive(Debug, Clone)]
pub struct SetClause {
    assignments: Vec<String>,
    params: SqlParams,
}

impl SetClause {
    /// Build `"col1"=$1, "col2"=$2 ...` from `changes` in their given order.
    ///
    /// # Errors
    /// `RepositoryError::EmptyUpdate` when `changes` is empty
    pub fn compose<K: AsRef<str>>(
        changes: Vec<(K, SqlValue)>,
        columns: ColumnMap<'_>,
    ) -> Result<Self, RepositoryError> {
        if changes.is_empty() {
            return Err(RepositoryError::EmptyUpdate);
        }

        let mut params = SqlParams::new();
        let assignments = changes
            .into_iter()
            .map(|(key, value)| {
                let column = quote_ident(columns.resolve(key.as_ref()));
                format!("{}={}", column, params.push(value))
            })
            .collect();

        Ok(Self {
            assignments,
            params,
        })
    }

    pub fn sql(&self) -> String {
        self.assignments.join(", ")
    }

    /// Number of values bound by the assignments
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Assignment SQL and the parameter list, ready for the row key to be pushed
    pub fn into_parts(self) -> (String, SqlParams) {
        let sql = self.sql();
        (sql, self.params)
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
