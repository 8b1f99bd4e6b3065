use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selector::{PropertyPath, select};
use crate::{Context, Entity};

/// Comparison applied by an [`Assertion`].
///
/// Operator names that are not recognized are kept as [`Operator::Unknown`]
/// so rule tables written for a newer engine still load; such assertions
/// never pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    Contains,
    Without,
    ContainsAll,
    ContainsSome,
    IncludedIn,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Contains => "contains",
            Operator::Without => "without",
            Operator::ContainsAll => "contains-all",
            Operator::ContainsSome => "contains-some",
            Operator::IncludedIn => "included-in",
            Operator::Unknown(name) => name,
        }
    }
}

impl From<String> for Operator {
    fn from(value: String) -> Self {
        match value.as_str() {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "lt" => Operator::Lt,
            "contains" => Operator::Contains,
            "without" => Operator::Without,
            "contains-all" => Operator::ContainsAll,
            "contains-some" => Operator::ContainsSome,
            "included-in" => Operator::IncludedIn,
            _ => Operator::Unknown(value),
        }
    }
}

impl From<Operator> for String {
    fn from(value: Operator) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over session or entity state.
///
/// `property` selects the left-hand side (`context:currentUser.privileges`,
/// `entity:properties.status`, ...). `value` is the right-hand side: a
/// literal, or itself a `context:`/`entity:` selector that is resolved
/// before comparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub property: String,
    #[serde(rename = "type")]
    pub operator: Operator,
    pub value: Value,
}

impl Assertion {
    pub fn new(property: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against the given roots. Anything that cannot be resolved or
    /// compared makes the assertion fail.
    pub fn evaluate(&self, context: &Context, entity: Option<&Entity>) -> bool {
        let Some(actual) = select(&self.property, context, entity) else {
            return false;
        };
        let Some(expected) = self.expected(context, entity) else {
            return false;
        };
        compare(&self.operator, &actual, &expected)
    }

    fn expected(&self, context: &Context, entity: Option<&Entity>) -> Option<Value> {
        match &self.value {
            Value::String(reference) if PropertyPath::parse(reference).is_some() => {
                select(reference, context, entity)
            }
            literal => Some(literal.clone()),
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.property, self.operator, self.value)
    }
}

fn compare(operator: &Operator, actual: &Value, expected: &Value) -> bool {
    match operator {
        Operator::Eq => actual == expected,
        Operator::Neq => actual != expected,
        Operator::Gt => numbers(actual, expected).is_some_and(|(a, e)| a > e),
        Operator::Lt => numbers(actual, expected).is_some_and(|(a, e)| a < e),
        Operator::Contains => actual
            .as_array()
            .is_some_and(|items| items.contains(expected)),
        Operator::Without => actual
            .as_array()
            .is_some_and(|items| !items.contains(expected)),
        Operator::ContainsAll => {
            let required = members(expected);
            let present = members(actual);
            !required.is_empty() && required.iter().all(|item| present.contains(item))
        }
        Operator::ContainsSome => {
            let present = members(actual);
            members(expected).iter().any(|item| present.contains(item))
        }
        Operator::IncludedIn => {
            is_scalar(actual)
                && expected
                    .as_array()
                    .is_some_and(|items| items.contains(actual))
        }
        Operator::Unknown(name) => {
            tracing::debug!(operator = name.as_str(), "unknown assertion operator");
            false
        }
    }
}

/// Treat a value as a set: arrays contribute their items, `null` nothing,
/// anything else itself.
fn members(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

fn numbers(actual: &Value, expected: &Value) -> Option<(f64, f64)> {
    Some((actual.as_f64()?, expected.as_f64()?))
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_) | Value::Null)
}
