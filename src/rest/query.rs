use std::fmt::Display;

use itertools::Itertools;

/// Placement of `NULL` values in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nulls {
    First,
    Last,
}

/// A PostgREST read: column selection, filters, ordering and paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Query {
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    pub(crate) fn select(columns: &str) -> Self {
        Self {
            select: columns.split_whitespace().join(""),
            ..Self::default()
        }
    }

    /// Filters only, for updates and deletes.
    pub(crate) fn filter() -> Self {
        Self::default()
    }

    fn op(mut self, column: &str, operator: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{operator}.{value}")));
        self
    }

    pub(crate) fn eq(self, column: &str, value: impl Display) -> Self {
        self.op(column, "eq", value)
    }

    pub(crate) fn gte(self, column: &str, value: impl Display) -> Self {
        self.op(column, "gte", value)
    }

    pub(crate) fn lt(self, column: &str, value: impl Display) -> Self {
        self.op(column, "lt", value)
    }

    pub(crate) fn lte(self, column: &str, value: impl Display) -> Self {
        self.op(column, "lte", value)
    }

    /// Case-insensitive substring match.
    pub(crate) fn ilike_contains(self, column: &str, needle: &str) -> Self {
        let needle = needle.replace(['%', '*', '_'], " ");
        self.op(column, "ilike", format!("*{}*", needle.trim()))
    }

    pub(crate) fn in_list<V: Display>(
        self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let list = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.to_string().replace('"', "\\\"")))
            .join(",");
        self.op(column, "in", format!("({list})"))
    }

    pub(crate) fn order(mut self, column: &str, ascending: bool, nulls: Option<Nulls>) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        let nulls = match nulls {
            Some(Nulls::First) => ".nullsfirst",
            Some(Nulls::Last) => ".nullslast",
            None => "",
        };
        self.order.push(format!("{column}.{direction}{nulls}"));
        self
    }

    pub(crate) fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Inclusive row range, `from..=to`, 0-based.
    pub(crate) fn range(mut self, from: usize, to: usize) -> Self {
        self.offset = Some(from);
        self.limit = Some(to.saturating_sub(from).saturating_add(1));
        self
    }

    /// Query-string pairs in a stable order.
    pub(crate) fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        if !self.select.is_empty() {
            pairs.push(("select".to_string(), self.select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        pairs
    }
}
