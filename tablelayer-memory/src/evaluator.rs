//! Predicate evaluation and value ordering for in-memory records.
//!
//! This module provides the evaluation engine for predicate expressions and the natural
//! ordering used by indexes.

use std::{collections::HashMap, cmp::Ordering};
use bson::{Bson, datetime::DateTime};

use tablelayer_core::{
    query::{QueryVisitor, Expr, FieldOp},
    record::Record,
    error::{TableError, TableResult},
};


/// Type-erased, comparable representation of BSON values.
///
/// This enum wraps BSON values and provides comparison operations for
/// predicates and index ordering. Int32 and Int64 share one exact integer form, and
/// integers compare against doubles without rounding either side.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (Int32 and Int64)
    Integer(i64),
    /// Floating point value
    Double(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON type (binary, object ids, regexes, ...)
    Opaque(&'a Bson),
}

/// The kind of an orderable value, used to reject mixed kinds under one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Bool,
    Number,
    DateTime,
    String,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::DateTime => "datetime",
            ValueKind::String => "string",
        })
    }
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Integer(i64::from(*value)),
            Bson::Int64(value) => Comparable::Integer(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Opaque(other),
        }
    }
}

impl<'a> Comparable<'a> {
    /// Returns the orderable kind of this value.
    ///
    /// `Ok(None)` for null, `Err` with a description for values that have no natural order.
    pub(crate) fn kind(&self) -> Result<Option<ValueKind>, &'static str> {
        match self {
            Comparable::Null => Ok(None),
            Comparable::Bool(_) => Ok(Some(ValueKind::Bool)),
            Comparable::Integer(_) => Ok(Some(ValueKind::Number)),
            Comparable::Double(value) if value.is_nan() => Err("NaN has no natural order"),
            Comparable::Double(_) => Ok(Some(ValueKind::Number)),
            Comparable::DateTime(_) => Ok(Some(ValueKind::DateTime)),
            Comparable::String(_) => Ok(Some(ValueKind::String)),
            Comparable::Array(_) => Err("arrays have no natural order"),
            Comparable::Map(_) => Err("documents have no natural order"),
            Comparable::Opaque(_) => Err("value type has no natural order"),
        }
    }

    /// Total ordering used by indexes. Null sorts before everything else.
    ///
    /// Values of different kinds compare equal; index construction rejects them beforehand.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Null, _) => Ordering::Less,
            (_, Comparable::Null) => Ordering::Greater,
            _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Integer(_) | Comparable::Double(_), Comparable::Integer(_) | Comparable::Double(_)) => {
                self.partial_cmp(other) == Some(Ordering::Equal)
            }
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Opaque(a), Comparable::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => Some(a.cmp(b)),
            (Comparable::Double(a), Comparable::Double(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Double(b)) => cmp_integer_double(*a, *b),
            (Comparable::Double(a), Comparable::Integer(b)) => cmp_integer_double(*b, *a).map(Ordering::reverse),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Compares an integer with a double without rounding the integer. `None` for NaN.
fn cmp_integer_double(integer: i64, double: f64) -> Option<Ordering> {
    if double.is_nan() {
        return None;
    }

    // i64::MIN as f64 is exactly -2^63; i64::MAX as f64 rounds up to 2^63
    if double >= i64::MAX as f64 {
        return Some(Ordering::Less);
    }
    if double < i64::MIN as f64 {
        return Some(Ordering::Greater);
    }

    let whole = double.trunc();
    match integer.cmp(&(whole as i64)) {
        Ordering::Equal if double > whole => Some(Ordering::Less),
        Ordering::Equal if double < whole => Some(Ordering::Greater),
        ordering => Some(ordering),
    }
}

/// Value equality as used by `find_all_by_value` and relationship resolution.
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    Comparable::from(left) == Comparable::from(right)
}


/// Evaluates predicates against a single record.
pub(crate) struct RecordEvaluator<'a, R: Record> {
    record: &'a R,
}

impl<'a, R: Record> RecordEvaluator<'a, R> {
    pub fn new(record: &'a R) -> Self {
        Self { record }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> TableResult<bool> {
        self.visit_expr(expr)
    }

    /// Keeps the records matching `expr`, preserving iteration order.
    pub fn filter_records(
        records: impl IntoIterator<Item = &'a R>,
        expr: &Expr,
    ) -> TableResult<Vec<&'a R>> {
        let mut matched = Vec::new();

        for record in records {
            if RecordEvaluator::new(record).evaluate(expr)? {
                matched.push(record);
            }
        }

        Ok(matched)
    }
}

impl<'a, R: Record> QueryVisitor for RecordEvaluator<'a, R> {
    type Output = bool;
    type Error = TableError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        let exists = self.record
            .get(field)
            .is_some_and(|value| !matches!(Comparable::from(&value), Comparable::Null));

        Ok(exists == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.record.get(field) else {
            return Ok(false);
        };

        let left = Comparable::from(&field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    },
                    None => false,
                }
            },
            FieldOp::Contains => contains(&left, &right),
            FieldOp::NotContains => !contains(&left, &right),
            FieldOp::StartsWith => match (&left, &right) {
                (Comparable::String(left), Comparable::String(right)) => left.starts_with(right),
                _ => false,
            },
            FieldOp::EndsWith => match (&left, &right) {
                (Comparable::String(left), Comparable::String(right)) => left.ends_with(right),
                _ => false,
            },
            FieldOp::AnyOf => any_of(&left, &right),
            FieldOp::NoneOf => !any_of(&left, &right),
        })
    }
}

fn contains(left: &Comparable<'_>, right: &Comparable<'_>) -> bool {
    match (left, right) {
        (Comparable::Array(array), item) => array.iter().any(|element| element == item),
        (Comparable::String(left), Comparable::String(right)) => left.contains(right),
        _ => false,
    }
}

fn any_of(left: &Comparable<'_>, right: &Comparable<'_>) -> bool {
    match (left, right) {
        (Comparable::Array(array), Comparable::Array(values)) => values
            .iter()
            .any(|value| array.iter().any(|item| item == value)),
        (Comparable::Array(array), single_value) => array
            .iter()
            .any(|item| item == single_value),
        (single_value, Comparable::Array(values)) => values
            .iter()
            .any(|value| value == single_value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use tablelayer_core::query::Filter;

    struct Planet {
        name: String,
        moons: i64,
        radius: f64,
        tags: Vec<String>,
        discovered: Option<DateTime>,
    }

    impl Record for Planet {
        fn table_name() -> &'static str {
            "planets"
        }

        fn properties() -> &'static [&'static str] {
            &["name", "moons", "radius", "tags", "discovered"]
        }

        fn get(&self, property: &str) -> Option<Bson> {
            match property {
                "name" => Some(Bson::from(self.name.clone())),
                "moons" => Some(Bson::from(self.moons)),
                "radius" => Some(Bson::from(self.radius)),
                "tags" => Some(Bson::from(self.tags.clone())),
                "discovered" => self.discovered.map(Bson::from),
                _ => None,
            }
        }
    }

    fn neptune() -> Planet {
        Planet {
            name: "Neptune".to_string(),
            moons: 16,
            radius: 24622.0,
            tags: vec!["giant".to_string(), "ice".to_string()],
            discovered: Some(DateTime::from_millis(-4_083_264_000_000)),
        }
    }

    fn matches(planet: &Planet, expr: Expr) -> bool {
        RecordEvaluator::new(planet).evaluate(&expr).unwrap()
    }

    #[test]
    fn numbers_compare_across_integer_and_float_types() {
        let planet = neptune();

        assert!(matches(&planet, Filter::eq("moons", 16)));
        assert!(matches(&planet, Filter::eq("moons", 16.0)));
        assert!(matches(&planet, Filter::gt("radius", 24000)));
        assert!(matches(&planet, Filter::lte("moons", 16_i64)));
        assert!(!matches(&planet, Filter::lt("moons", 16)));
    }

    #[test]
    fn dates_compare_chronologically() {
        let planet = neptune();
        let uranus_discovery = DateTime::from_millis(-5_936_630_400_000);

        assert!(matches(&planet, Filter::gt("discovered", uranus_discovery)));
        assert!(matches(&planet, Filter::exists("discovered")));
    }

    #[test]
    fn string_and_array_operators() {
        let planet = neptune();

        assert!(matches(&planet, Filter::contains("name", "tun")));
        assert!(matches(&planet, Filter::starts_with("name", "Nep")));
        assert!(matches(&planet, Filter::ends_with("name", "une")));
        assert!(matches(&planet, Filter::contains("tags", "ice")));
        assert!(matches(&planet, Filter::not_contains("tags", "rocky")));
        assert!(matches(&planet, Filter::any_of("tags", vec!["rocky", "giant"])));
        assert!(matches(&planet, Filter::none_of("name", vec!["Mars", "Venus"])));
        assert!(!matches(&planet, Filter::any_of("moons", vec![1, 2])));
    }

    #[test]
    fn logical_combinators() {
        let planet = neptune();

        assert!(matches(&planet, Filter::gt("moons", 10).and(Filter::contains("name", "N"))));
        assert!(matches(&planet, Filter::eq("moons", 0).or(Filter::eq("name", "Neptune"))));
        assert!(matches(&planet, Filter::eq("moons", 0).not()));
        assert!(matches(&planet, Filter::and(Vec::new())));
        assert!(!matches(&planet, Filter::or(Vec::new())));
    }

    #[test]
    fn missing_values_never_match_comparisons() {
        let mut planet = neptune();
        planet.discovered = None;

        assert!(!matches(&planet, Filter::exists("discovered")));
        assert!(matches(&planet, Filter::not_exists("discovered")));
        assert!(!matches(&planet, Filter::lt("discovered", DateTime::now())));
        assert!(!matches(&planet, Filter::eq("unknown", 1)));
    }

    #[test]
    fn large_integers_are_not_rounded() {
        let exact = Bson::Int64(1 << 53);
        let next = Bson::Int64((1 << 53) + 1);

        assert!(!values_equal(&exact, &next));
        assert!(values_equal(&exact, &Bson::Double(9_007_199_254_740_992.0)));
        assert!(!values_equal(&next, &Bson::Double(9_007_199_254_740_992.0)));
        assert_eq!(Comparable::from(&next).sort_cmp(&Comparable::from(&exact)), Ordering::Greater);
        assert_eq!(
            Comparable::from(&Bson::Double(9_007_199_254_740_992.0)).partial_cmp(&Comparable::from(&next)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn integers_compare_with_fractional_and_extreme_doubles() {
        let cmp = |integer: i64, double: f64| {
            Comparable::from(&Bson::Int64(integer)).partial_cmp(&Comparable::from(&Bson::Double(double)))
        };

        assert_eq!(cmp(2, 2.5), Some(Ordering::Less));
        assert_eq!(cmp(-2, -2.5), Some(Ordering::Greater));
        assert_eq!(cmp(i64::MAX, 9_223_372_036_854_775_808.0), Some(Ordering::Less));
        assert_eq!(cmp(i64::MIN, -9_223_372_036_854_775_808.0), Some(Ordering::Equal));
        assert_eq!(cmp(0, f64::NAN), None);
        assert!(Comparable::from(&Bson::Double(f64::NAN)).kind().is_err());
    }

    #[test]
    fn sort_cmp_places_null_first() {
        let null = Bson::Null;
        let one = Bson::Int32(1);
        let two = Bson::Double(2.0);

        assert_eq!(Comparable::from(&null).sort_cmp(&Comparable::from(&one)), Ordering::Less);
        assert_eq!(Comparable::from(&two).sort_cmp(&Comparable::from(&one)), Ordering::Greater);
        assert_eq!(Comparable::from(&null).sort_cmp(&Comparable::from(&null)), Ordering::Equal);
    }

    #[test]
    fn kinds_reject_unordered_values() {
        let array = Bson::Array(vec![Bson::Int32(1)]);
        let document = Bson::Document(doc! { "a": 1 });

        assert_eq!(Comparable::from(&Bson::Int64(3)).kind(), Ok(Some(ValueKind::Number)));
        assert_eq!(Comparable::from(&Bson::Null).kind(), Ok(None));
        assert!(Comparable::from(&array).kind().is_err());
        assert!(Comparable::from(&document).kind().is_err());
        assert!(values_equal(&Bson::Int32(7), &Bson::Double(7.0)));
    }
}
