//! Query expressions for the files listing endpoint.
//!
//! Condition fragments are opaque: they are combined here but never parsed
//! or rewritten. The builders below are the only place caller text is
//! embedded into a fragment, and they quote it for the service grammar.

use crate::filter::MimeFilter;

pub const OWNED_BY_ME: &str = "'me' in owners";
pub const SHARED_WITH_ME: &str = "sharedWithMe";
pub const IN_ROOT: &str = "'root' in parents";
pub const IS_FOLDER: &str = "mimeType='application/vnd.google-apps.folder'";

/// `'<folder_id>' in parents`
pub fn in_parents(folder_id: &str) -> String {
    format!("'{}' in parents", escape_literal(folder_id))
}

/// `name contains '<text>'`
pub fn name_contains(text: &str) -> String {
    format!("name contains '{}'", escape_literal(text))
}

/// Escapes a value for use inside a single-quoted query literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Joins `conditions` with `and` in the given order and, for a non-empty
/// filter, conjoins an `or` group that always keeps folders visible.
///
/// An empty result means "unrestricted".
pub fn compose<S: AsRef<str>>(conditions: &[S], filter: &MimeFilter) -> String {
    let mut expression = conditions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" and ");
    if filter.is_empty() {
        return expression;
    }
    let mut group = format!("({IS_FOLDER}");
    for mime_type in filter.iter() {
        group.push_str(" or mimeType='");
        group.push_str(mime_type);
        group.push('\'');
    }
    group.push(')');
    if !expression.is_empty() {
        expression.push_str(" and ");
    }
    expression.push_str(&group);
    expression
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    conditions: Vec<String>,
    filter: MimeFilter,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_filter(mut self, filter: MimeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn compose(&self) -> String {
        compose(&self.conditions, &self.filter)
    }
}
