//! Predicate construction and sort specifications for table queries.
//!
//! This module provides typed predicate expressions, sort specifications for indexes,
//! and a visitor trait for evaluating or inspecting expressions.
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides a collection of static methods for building filter expressions:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - String: `starts_with`, `ends_with`, `contains`, `not_contains`
//! - Existence: `exists`, `not_exists`
//! - Array: `any_of`, `none_of`
//! - Logical: `and`, `or`, `not`
//!
//! Expressions can be combined using chainable methods for more complex predicates:
//!
//! ```ignore
//! use tablelayer::query::Filter;
//!
//! let predicate = Filter::gt("rank", 1)
//!     .and(Filter::contains("name", "an"))
//!     .or(Filter::eq("pinned", true));
//! ```
//!
//! Expressions hold property names and literal values only, so the same expression can be
//! evaluated against any record type exposing the referenced properties, and can be
//! serialized with serde.

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Sort direction for an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl From<bool> for SortDirection {
    fn from(ascending: bool) -> Self {
        if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// One `(property, direction)` pair of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// The property to sort by.
    pub property: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
        SortKey { property: property.into(), direction }
    }

    /// Creates an ascending sort key.
    pub fn asc(property: impl Into<String>) -> Self {
        SortKey::new(property, SortDirection::Asc)
    }

    /// Creates a descending sort key.
    pub fn desc(property: impl Into<String>) -> Self {
        SortKey::new(property, SortDirection::Desc)
    }
}

/// An ordered list of sort keys, applied lexicographically.
///
/// The first key is the primary sort key, later keys only break ties.
pub type SortSpec = Vec<SortKey>;

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String or array contains value.
    Contains,
    /// String or array does not contain value.
    NotContains,
    /// String starts with value.
    StartsWith,
    /// String ends with value.
    EndsWith,
    /// Property matches any of the values.
    AnyOf,
    /// Property matches none of the values.
    NoneOf,
}

/// A predicate over the properties of a single record.
///
/// Expressions can be combined using logical operators (`And`, `Or`, `Not`)
/// to build complex predicates.
///
/// # Example
///
/// ```ignore
/// use tablelayer::query::{Expr, Filter};
///
/// // Simple equality check
/// let expr1 = Filter::eq("status", "active");
///
/// // Complex nested expression
/// let expr2 = Filter::and(vec![
///     Filter::eq("status", "active"),
///     Filter::gt("age", 18)
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression (inverts the result).
    Not(Box<Expr>),
    /// Checks if a property has a value or not.
    Exists(String, bool),
    /// Property comparison expression.
    Field {
        /// The property name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The literal value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended
    /// to the list. Otherwise, a new OR expression is created.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression (logical NOT).
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Returns every property name referenced anywhere in this expression, in first-seen order.
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut collector = FieldCollector::default();

        match collector.visit_expr(self) {
            Ok(()) => collector.fields,
            Err(never) => match never {},
        }
    }
}

/// Helper struct for constructing filter expressions.
///
/// Provides static methods to construct common filter expressions in a type-safe manner.
/// All methods accept property names and values as `Into<String>` and `Into<Bson>` for ergonomics.
///
/// # Example
///
/// ```ignore
/// use tablelayer::query::Filter;
///
/// let expr = Filter::eq("name", "Alice")
///     .and(Filter::gt("age", 18));
/// ```
pub struct Filter;

impl Filter {
    /// Creates an equality filter expression.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Creates a not-equal filter expression.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Creates a greater-than filter expression.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Creates a greater-than-or-equal filter expression.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Creates a less-than filter expression.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Creates a less-than-or-equal filter expression.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Creates a string prefix filter expression.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::StartsWith, value.into())
    }

    /// Creates a string suffix filter expression.
    pub fn ends_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::EndsWith, value.into())
    }

    /// Creates a contains filter expression.
    ///
    /// Matches records where the property (string or array) contains the specified value.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// Creates a not-contains filter expression.
    pub fn not_contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NotContains, value.into())
    }

    /// Creates an existence filter expression.
    ///
    /// Matches records where the property has a value (is not null or missing).
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Creates a non-existence filter expression.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    /// Creates a logical AND filter expression.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Creates a logical OR filter expression.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Creates a logical NOT filter expression.
    pub fn not(expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }

    /// Creates a membership filter expression.
    ///
    /// Matches records where the property (or any element of an array property) equals
    /// any of the specified values.
    pub fn any_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::AnyOf, value.into())
    }

    /// Creates an exclusion filter expression.
    pub fn none_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NoneOf, value.into())
    }
}

/// Walks an [`Expr`] tree, producing one output per node.
///
/// Implementors supply the per-variant methods; [`QueryVisitor::visit_expr`] dispatches.
pub trait QueryVisitor {
    type Output;
    type Error: Into<TableError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

/// Collects referenced property names.
#[derive(Default)]
struct FieldCollector {
    fields: Vec<String>,
}

impl FieldCollector {
    fn push(&mut self, field: &str) {
        if !self.fields.iter().any(|seen| seen == field) {
            self.fields.push(field.to_string());
        }
    }
}

impl QueryVisitor for FieldCollector {
    type Output = ();
    type Error = std::convert::Infallible;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        exprs.iter().try_for_each(|expr| self.visit_expr(expr))
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        exprs.iter().try_for_each(|expr| self.visit_expr(expr))
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        self.visit_expr(expr)
    }

    fn visit_exists(&mut self, field: &str, _should_exist: bool) -> Result<Self::Output, Self::Error> {
        self.push(field);
        Ok(())
    }

    fn visit_field(&mut self, field: &str, _op: &FieldOp, _value: &Bson) -> Result<Self::Output, Self::Error> {
        self.push(field);
        Ok(())
    }
}

impl From<std::convert::Infallible> for TableError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_and_flattens_into_one_list() {
        let expr = Filter::gt("rank", 1)
            .and(Filter::lt("rank", 10))
            .and(Filter::exists("name"));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn chained_or_wraps_non_or_expressions() {
        let expr = Filter::and([Filter::eq("a", 1), Filter::eq("b", 2)])
            .or(Filter::eq("c", 3));

        match expr {
            Expr::Or(list) => {
                assert_eq!(list.len(), 2);
                assert!(matches!(list[0], Expr::And(_)));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn referenced_fields_are_deduplicated_in_order() {
        let expr = Filter::or([
            Filter::gt("rank", 1).and(Filter::exists("name")),
            Filter::not(Filter::eq("rank", 7)),
            Filter::starts_with("title", "Dr"),
        ]);

        assert_eq!(expr.referenced_fields(), vec!["rank", "name", "title"]);
    }

    #[test]
    fn sort_direction_from_ascending_flag() {
        assert_eq!(SortDirection::from(true), SortDirection::Asc);
        assert_eq!(SortDirection::from(false), SortDirection::Desc);
        assert_eq!(SortKey::desc("rank"), SortKey::new("rank", false.into()));
    }

    #[test]
    fn expressions_serialize_independently_of_record_types() {
        let expr = Filter::gte("population", 1_000_000_i64).and(Filter::ne("code", "XX"));

        let json = serde_json::to_string(&expr).unwrap();
        let parsed: Expr = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.referenced_fields(), vec!["population", "code"]);
        match parsed {
            Expr::And(list) => assert!(matches!(
                &list[1],
                Expr::Field { op: FieldOp::Ne, value: Bson::String(code), .. } if code == "XX"
            )),
            other => panic!("expected And, got {other:?}"),
        }
    }
}
