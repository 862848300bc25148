//! Declarative query-parameter validation.
//!
//! Each endpoint describes its accepted parameters as a [`QuerySpec`]: plain
//! data (type, required flag, rule, transform, default) consumed by the single
//! generic [`validate`] routine. Validation is pure and never short-circuits:
//! every unexpected name and every per-parameter failure of one request is
//! collected and reported in one [`ApiError`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use paddock_service_shared::params::{validate, ParamSpec, QuerySpec, Rule, Transform};
//!
//! let spec = QuerySpec::new().param(
//!     ParamSpec::string("driver")
//!         .rule(Rule::Alphabetic { len: 3 })
//!         .transform(Transform::Uppercase),
//! );
//!
//! let raw = HashMap::from([("driver".to_string(), "ver".to_string())]);
//! let params = validate(&raw, &spec).unwrap();
//! assert_eq!(params.get_str("driver"), Some("VER"));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Error-map key listing parameter names the query does not declare.
pub const UNEXPECTED_KEY: &str = "unexpected";

/// Message for an absent required parameter.
pub const MISSING_REQUIRED: &str = "Missing required parameter";

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Target type a raw string is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
}

impl ParamType {
    /// Coerce a raw query string; `None` means an invalid type.
    pub fn coerce(self, raw: &str) -> Option<ParamValue> {
        match self {
            Self::Str => Some(ParamValue::Str(raw.to_string())),
            Self::Int => raw.trim().parse().ok().map(ParamValue::Int),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ParamValue::Float),
            Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(ParamValue::Bool(true)),
                "false" | "0" | "no" => Some(ParamValue::Bool(false)),
                _ => None,
            },
        }
    }
}

/// Predicate applied to a coerced value.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Exactly `len` ASCII letters.
    Alphabetic { len: usize },
    /// Integer within `min..=max`.
    IntRange { min: i64, max: i64 },
    /// One of a fixed set of strings (exact match).
    OneOf(&'static [&'static str]),
    Custom(fn(&ParamValue) -> bool),
}

impl Rule {
    pub fn check(&self, value: &ParamValue) -> bool {
        match self {
            Self::Alphabetic { len } => value
                .as_str()
                .is_some_and(|s| s.chars().count() == *len && s.chars().all(|c| c.is_ascii_alphabetic())),
            Self::IntRange { min, max } => value.as_i64().is_some_and(|i| (*min..=*max).contains(&i)),
            Self::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
            Self::Custom(check) => check(value),
        }
    }
}

/// Normalization applied after a value passed validation.
#[derive(Debug, Clone)]
pub enum Transform {
    Uppercase,
    Lowercase,
    Trim,
    Custom(fn(ParamValue) -> ParamValue),
}

impl Transform {
    pub fn apply(&self, value: ParamValue) -> ParamValue {
        match (self, value) {
            (Self::Uppercase, ParamValue::Str(s)) => ParamValue::Str(s.to_uppercase()),
            (Self::Lowercase, ParamValue::Str(s)) => ParamValue::Str(s.to_lowercase()),
            (Self::Trim, ParamValue::Str(s)) => ParamValue::Str(s.trim().to_string()),
            (Self::Custom(f), value) => f(value),
            (_, value) => value,
        }
    }
}

/// Specification of one accepted parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    kind: ParamType,
    required: bool,
    rule: Option<Rule>,
    message: Option<String>,
    invalid_type_message: Option<String>,
    transform: Option<Transform>,
    default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            rule: None,
            message: None,
            invalid_type_message: None,
            transform: None,
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Str)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Bool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Message reported when the rule rejects the value.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message reported when coercion fails.
    pub fn invalid_type_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_type_message = Some(message.into());
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Value used when the parameter is absent. Ignored for required parameters.
    pub fn default_value(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    fn invalid_value(&self) -> String {
        format!("Invalid value for '{}'", self.name)
    }

    /// Evaluate the parameter against an optional raw value.
    ///
    /// `Ok(None)` means the key is omitted from the output.
    fn evaluate(&self, raw: Option<&str>) -> Result<Option<ParamValue>, String> {
        let Some(raw) = raw else {
            if self.required {
                return Err(MISSING_REQUIRED.to_string());
            }
            return Ok(self.default.clone());
        };

        let value = self.kind.coerce(raw).ok_or_else(|| {
            self.invalid_type_message
                .clone()
                .unwrap_or_else(|| self.invalid_value())
        })?;

        if let Some(rule) = &self.rule {
            if !rule.check(&value) {
                return Err(self.message.clone().unwrap_or_else(|| self.invalid_value()));
            }
        }

        Ok(Some(match &self.transform {
            Some(transform) => transform.apply(value),
            None => value,
        }))
    }
}

/// All parameters an endpoint accepts, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    params: Vec<ParamSpec>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. A later parameter with the same name replaces the earlier one.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.retain(|p| p.name != spec.name);
        self.params.push(spec);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }
}

/// Accepted parameters after coercion, validation and transformation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ValidatedParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render every value back to its query-string form.
    pub fn to_raw(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

/// Validate raw query parameters against `spec`.
///
/// Unknown names are reported under `"unexpected"` (sorted); every declared
/// parameter is evaluated even when others failed. Any problem yields a single
/// 400 `invalid_query_params` error whose details hold the full error map.
pub fn validate(
    raw: &HashMap<String, String>,
    spec: &QuerySpec,
) -> Result<ValidatedParams, ApiError> {
    let mut errors = Map::new();
    let mut values = BTreeMap::new();

    let unexpected: BTreeSet<&str> = raw
        .keys()
        .map(String::as_str)
        .filter(|name| !spec.contains(name))
        .collect();
    if !unexpected.is_empty() {
        errors.insert(
            UNEXPECTED_KEY.to_string(),
            Value::from(unexpected.into_iter().collect::<Vec<_>>()),
        );
    }

    for param in spec.iter() {
        match param.evaluate(raw.get(param.name()).map(String::as_str)) {
            Ok(Some(value)) => {
                values.insert(param.name().to_string(), value);
            }
            Ok(None) => {}
            Err(message) => {
                errors.insert(param.name().to_string(), Value::from(message));
            }
        }
    }

    if errors.is_empty() {
        Ok(ValidatedParams { values })
    } else {
        Err(ApiError::invalid_query_params(errors))
    }
}
