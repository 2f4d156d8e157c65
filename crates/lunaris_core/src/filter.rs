//! Builder for the server's boolean filter mini-language.
//!
//! An expression is a conjunction of disjunctions of `field op "value"`
//! triples, e.g. `(AF < "0.01" OR AF > "0.99") AND (impact == "HIGH")`.
//! Rendering is the only supported direction; the server parses it.

use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Match,
    Ne,
    NoMatch,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Match,
        Operator::Ne,
        Operator::NoMatch,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Match => "=~",
            Operator::Ne => "!=",
            Operator::NoMatch => "!=~",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Operators applicable to string-valued fields.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Match | Operator::Ne | Operator::NoMatch
        )
    }

    /// Operators applicable to numeric-valued fields.
    pub fn is_numeric(self) -> bool {
        !self.is_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOperatorError(pub String);

impl fmt::Display for ParseOperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter operator: {}", self.0)
    }
}

impl std::error::Error for ParseOperatorError {}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| ParseOperatorError(s.to_string()))
    }
}

/// One `field op "value"` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTriple {
    pub field: String,
    pub op: Operator,
    pub value: String,
}

impl FilterTriple {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} \"{}\"", self.field, self.op, escape(&self.value))
    }
}

/// A parenthesized disjunction of triples.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterGroup {
    triples: Vec<FilterTriple>,
}

impl FilterGroup {
    pub fn of(triple: FilterTriple) -> Self {
        Self {
            triples: vec![triple],
        }
    }

    pub fn or(mut self, triple: FilterTriple) -> Self {
        self.triples.push(triple);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, triple) in self.triples.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            write!(f, "{triple}")?;
        }
        f.write_str(")")
    }
}

/// A conjunction of groups; the full filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterExpr {
    groups: Vec<FilterGroup>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and_group(mut self, group: FilterGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(FilterGroup::is_empty)
    }

    /// Renders the boolean filter string sent to the server. An empty
    /// expression renders as the empty string; empty groups are skipped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for group in self.groups.iter().filter(|group| !group.is_empty()) {
            if !out.is_empty() {
                out.push_str(" AND ");
            }
            out.push_str(&group.to_string());
        }
        out
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{FilterExpr, FilterGroup, FilterTriple, Operator};

    #[test]
    fn triple_renders_quoted_value() {
        let triple = FilterTriple::new("impact", Operator::Eq, "HIGH");
        assert_eq!(triple.to_string(), "impact == \"HIGH\"");
    }

    #[test]
    fn value_quotes_and_backslashes_are_escaped() {
        let triple = FilterTriple::new("gene", Operator::Match, "a\"b\\c");
        assert_eq!(triple.to_string(), "gene =~ \"a\\\"b\\\\c\"");
    }

    #[test]
    fn expression_is_conjunction_of_disjunctions() {
        let expr = FilterExpr::new()
            .and_group(
                FilterGroup::of(FilterTriple::new("AF", Operator::Lt, "0.01"))
                    .or(FilterTriple::new("AF", Operator::Gt, "0.99")),
            )
            .and_group(FilterGroup::of(FilterTriple::new(
                "impact",
                Operator::Eq,
                "HIGH",
            )));
        assert_eq!(
            expr.render(),
            "(AF < \"0.01\" OR AF > \"0.99\") AND (impact == \"HIGH\")"
        );
    }

    #[test]
    fn empty_expression_and_empty_groups_render_empty() {
        assert_eq!(FilterExpr::new().render(), "");
        let expr = FilterExpr::new()
            .and_group(FilterGroup::default())
            .and_group(FilterGroup::of(FilterTriple::new(
                "pick",
                Operator::Ne,
                "1",
            )));
        assert_eq!(expr.render(), "(pick != \"1\")");
        assert!(!expr.is_empty());
        assert!(FilterExpr::new().and_group(FilterGroup::default()).is_empty());
    }

    #[test]
    fn operator_round_trips_through_symbol() {
        for op in Operator::ALL {
            assert_eq!(op.symbol().parse::<Operator>().unwrap(), op);
        }
        assert!("~=".parse::<Operator>().is_err());
    }

    #[test]
    fn operator_classes_match_the_ui_sets() {
        let strings: Vec<&str> = Operator::ALL
            .into_iter()
            .filter(|op| op.is_string())
            .map(Operator::symbol)
            .collect();
        let numerics: Vec<&str> = Operator::ALL
            .into_iter()
            .filter(|op| op.is_numeric())
            .map(Operator::symbol)
            .collect();
        assert_eq!(strings, ["==", "=~", "!=", "!=~"]);
        assert_eq!(numerics, ["<", "<=", ">", ">="]);
    }
}
