//! Parameter values and their canonical multi-value representation.
//!
//! Every value a parameter can hold is normalized into a
//! [`MultiValueParamData`]: an ordered list of fixed-arity tuples. Absent,
//! singular, multi-valued (`nargs > 1`) and repeated parameters all share this
//! one shape, so reconstruction never needs to special-case them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A present primitive value.
///
/// The [`Display`](fmt::Display) form is the canonical string form used both
/// for comparing against defaults and for emitted command-line tokens.
/// Booleans render as `True`/`False`.
///
/// # Examples
///
/// ```
/// use cmdform_core::Scalar;
///
/// assert_eq!(Scalar::Bool(true).to_string(), "True");
/// assert_eq!(Scalar::Int(42).to_string(), "42");
/// assert_eq!(Scalar::from("hello").to_string(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

scalar_from!(bool => Bool, i64 => Int, f64 => Float, &str => Str, String => Str);

/// A single parameter sub-value: either supplied, or the "not supplied"
/// sentinel.
///
/// `NotSupplied` is distinct from `false`, `0` and `""`: it marks a value the
/// user left blank. It is equal only to itself and sorts after every
/// supplied value (see [`Value::sort_cmp`]). It serializes as `null`.
///
/// # Examples
///
/// ```
/// use cmdform_core::Value;
///
/// assert_eq!(Value::NotSupplied, Value::NotSupplied);
/// assert_ne!(Value::NotSupplied, Value::from(""));
/// assert_ne!(Value::NotSupplied, Value::from(false));
/// assert!(Value::from(0).is_supplied());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A value the user (or a default) provided.
    Supplied(Scalar),
    /// The user left this value blank.
    #[default]
    NotSupplied,
}

impl Value {
    /// Returns `true` unless this is the sentinel.
    pub fn is_supplied(&self) -> bool {
        matches!(self, Self::Supplied(_))
    }

    /// Returns the supplied scalar, if any.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Supplied(s) => Some(s),
            Self::NotSupplied => None,
        }
    }

    /// Canonical string form; `None` for the sentinel.
    pub fn string_form(&self) -> Option<String> {
        self.as_scalar().map(Scalar::to_string)
    }

    /// Interprets the value as a boolean.
    ///
    /// Accepts real booleans and the strings `true`/`false` in any case.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Supplied(Scalar::Bool(b)) => Some(*b),
            Self::Supplied(Scalar::Str(s)) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::Supplied(Scalar::Str(s)) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Total order used when sorting value collections.
    ///
    /// Supplied values compare by string form; the sentinel is equal to
    /// itself and greater than any supplied value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use cmdform_core::Value;
    ///
    /// assert_eq!(Value::NotSupplied.sort_cmp(&Value::from("zzz")), Ordering::Greater);
    /// assert_eq!(Value::from(10).sort_cmp(&Value::from("10")), Ordering::Equal);
    /// ```
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.string_form(), other.string_form()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Supplied(value)
    }
}

macro_rules! value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Supplied(Scalar::from(value))
                }
            }

            impl From<$ty> for RawValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Value::from(value))
                }
            }
        )*
    };
}

value_from!(bool, i32, i64, f64, &str, String);

/// One fixed-arity group of sub-values.
pub type ValueTuple = Vec<Value>;

/// An element of a [`RawValue::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// A lone value, wrapped into a 1-tuple by normalization.
    Single(Value),
    /// An already grouped tuple, kept as is.
    Tuple(Vec<Value>),
}

/// Un-normalized input to [`MultiValueParamData::process`].
///
/// This is the shape a declared default or a widget read-back has before
/// normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// No value at all.
    #[default]
    None,
    /// A single scalar (or sentinel).
    Scalar(Value),
    /// One fixed-arity tuple.
    Tuple(Vec<Value>),
    /// An ordered sequence of values and/or tuples.
    List(Vec<RawItem>),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<Scalar> for RawValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(Value::Supplied(value))
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(|v| RawItem::Single(v.into())).collect())
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::Array(inner) => {
                            RawItem::Tuple(inner.into_iter().map(json_scalar).collect())
                        }
                        other => RawItem::Single(json_scalar(other)),
                    })
                    .collect(),
            ),
            other => Self::Scalar(json_scalar(other)),
        }
    }
}

/// Converts a JSON value into a single [`Value`].
///
/// `null` becomes the sentinel; containers collapse to their JSON text.
pub fn json_scalar(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::NotSupplied,
        serde_json::Value::Bool(b) => Value::from(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::from(s),
        other => Value::from(other.to_string()),
    }
}

/// Canonical parameter value container.
///
/// # Examples
///
/// ```
/// use cmdform_core::{MultiValueParamData, RawItem, RawValue, Value};
///
/// assert!(MultiValueParamData::process(RawValue::None).is_empty());
///
/// let single = MultiValueParamData::process("x");
/// assert_eq!(single.values, vec![vec![Value::from("x")]]);
///
/// let list = MultiValueParamData::process(RawValue::List(vec![
///     RawItem::Single(Value::from(1)),
///     RawItem::Tuple(vec![Value::from(2), Value::from(3)]),
/// ]));
/// assert_eq!(list.values.len(), 2);
/// assert_eq!(list.values[1].len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiValueParamData {
    /// Ordered tuples of sub-values.
    pub values: Vec<ValueTuple>,
}

impl MultiValueParamData {
    /// Wraps already grouped tuples.
    pub fn new(values: Vec<ValueTuple>) -> Self {
        Self { values }
    }

    /// Normalizes a raw value.
    ///
    /// `None` yields no tuples, a tuple becomes a one-element list, a list
    /// wraps each lone element into a 1-tuple (tuples are kept), and a scalar
    /// becomes a single 1-tuple.
    pub fn process(raw: impl Into<RawValue>) -> Self {
        let values = match raw.into() {
            RawValue::None => Vec::new(),
            RawValue::Tuple(tuple) => vec![tuple],
            RawValue::List(items) => items
                .into_iter()
                .map(|item| match item {
                    RawItem::Single(value) => vec![value],
                    RawItem::Tuple(tuple) => tuple,
                })
                .collect(),
            RawValue::Scalar(value) => vec![vec![value]],
        };
        Self { values }
    }

    /// Groups a flat sequence of control values into `nargs`-sized tuples.
    ///
    /// `nargs == 0` yields a single empty tuple, and an unbounded `nargs`
    /// (`-1`) groups one value per tuple. A trailing short group is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::{MultiValueParamData, Value};
    ///
    /// let flat = vec![Value::from("a"), Value::from("b"), Value::from("c"), Value::from("d")];
    /// let grouped = MultiValueParamData::from_flat(flat, 2);
    /// assert_eq!(grouped.values.len(), 2);
    /// assert_eq!(grouped.values[1], vec![Value::from("c"), Value::from("d")]);
    /// ```
    pub fn from_flat(values: Vec<Value>, nargs: i32) -> Self {
        let size = match nargs {
            0 => return Self::new(vec![Vec::new()]),
            n if n < 0 => 1,
            n => usize::try_from(n).unwrap_or(1),
        };
        Self::new(values.chunks(size).map(<[Value]>::to_vec).collect())
    }

    /// Returns `true` when there are no tuples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over every sub-value of every tuple in order.
    pub fn flattened(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().flatten()
    }

    /// Returns `true` if any sub-value is not the sentinel.
    pub fn has_supplied(&self) -> bool {
        self.flattened().any(Value::is_supplied)
    }

    /// Flattened sub-values, sorted, as string forms (`None` = sentinel).
    pub fn sorted_forms(&self) -> Vec<Option<String>> {
        sorted_forms(self.flattened())
    }

    /// Flattened supplied sub-values, sorted, as string forms.
    pub fn supplied_sorted_forms(&self) -> Vec<String> {
        supplied_sorted_forms(self.flattened())
    }
}

impl From<Vec<ValueTuple>> for MultiValueParamData {
    fn from(values: Vec<ValueTuple>) -> Self {
        Self::new(values)
    }
}

/// Sorts values with [`Value::sort_cmp`] and maps them to string forms.
pub fn sorted_forms<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<Option<String>> {
    let mut values: Vec<&Value> = values.into_iter().collect();
    values.sort_by(|a, b| a.sort_cmp(b));
    values.into_iter().map(Value::string_form).collect()
}

/// Like [`sorted_forms`] but drops sentinels first.
pub fn supplied_sorted_forms<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<String> {
    let mut forms: Vec<String> = values.into_iter().filter_map(Value::string_form).collect();
    forms.sort();
    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_tuple_is_wrapped_once() {
        let data = MultiValueParamData::process(RawValue::Tuple(vec![
            Value::from(1),
            Value::from("x"),
        ]));
        assert_eq!(data.values, vec![vec![Value::from(1), Value::from("x")]]);
    }

    #[test]
    fn test_process_json_list_of_scalars_and_tuples() {
        let data = MultiValueParamData::process(serde_json::json!(["a", ["b", 2], null]));
        assert_eq!(
            data.values,
            vec![
                vec![Value::from("a")],
                vec![Value::from("b"), Value::from(2)],
                vec![Value::NotSupplied],
            ]
        );
    }

    #[test]
    fn test_process_json_null_is_empty() {
        assert!(MultiValueParamData::process(serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_sentinel_sorts_last() {
        let values = [Value::NotSupplied, Value::from("b"), Value::from("a")];
        assert_eq!(
            sorted_forms(values.iter()),
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
        assert_eq!(supplied_sorted_forms(values.iter()), vec!["a", "b"]);
    }

    #[test]
    fn test_string_form_ignores_type_identity() {
        let a = MultiValueParamData::process(42_i64);
        let b = MultiValueParamData::process("42");
        assert_eq!(a.sorted_forms(), b.sorted_forms());
    }

    #[test]
    fn test_from_flat_zero_and_unbounded() {
        assert_eq!(
            MultiValueParamData::from_flat(vec![Value::from("a")], 0).values,
            vec![Vec::<Value>::new()]
        );
        let unbounded =
            MultiValueParamData::from_flat(vec![Value::from("a"), Value::from("b")], -1);
        assert_eq!(
            unbounded.values,
            vec![vec![Value::from("a")], vec![Value::from("b")]]
        );
    }

    #[test]
    fn test_as_bool_accepts_strings() {
        assert_eq!(Value::from("TRUE").as_bool(), Some(true));
        assert_eq!(Value::from(false).as_bool(), Some(false));
        assert_eq!(Value::from(1).as_bool(), None);
        assert_eq!(Value::NotSupplied.as_bool(), None);
    }

    #[test]
    fn test_value_serde_sentinel_is_null() {
        let json = serde_json::to_string(&vec![Value::from(1), Value::NotSupplied]).unwrap();
        assert_eq!(json, "[1,null]");
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Value::from(1), Value::NotSupplied]);
    }
}
