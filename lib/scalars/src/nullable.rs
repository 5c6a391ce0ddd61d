use std::fmt;

use bytes::BufMut;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::ScalarError, input::InputValue, writer};

/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An optional scalar that remembers whether it was ever decoded.
///
/// | `set`   | `value`   | meaning                              |
/// |---------|-----------|--------------------------------------|
/// | `false` | `None`    | key absent from the input document   |
/// | `true`  | `None`    | key explicitly sent as `null`        |
/// | `true`  | `Some(_)` | key sent with a concrete value       |
///
/// The schema engine only calls [`Marshaler::unmarshal_input`] for keys that are present,
/// so leaving a field at its [`Default`] is how absence is expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nullable<T> {
    pub value: Option<T>,
    pub set: bool,
}

pub type NullableString = Nullable<String>;
pub type NullableInt = Nullable<i64>;
pub type NullableFloat = Nullable<f64>;
pub type NullableBool = Nullable<bool>;

impl<T> Nullable<T> {
    /// Never decoded.
    pub const fn unset() -> Self {
        Nullable {
            value: None,
            set: false,
        }
    }

    /// Decoded from an explicit `null`.
    pub const fn null() -> Self {
        Nullable {
            value: None,
            set: true,
        }
    }

    pub const fn new(value: T) -> Self {
        Nullable {
            value: Some(value),
            set: true,
        }
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn is_unset(&self) -> bool {
        !self.set
    }

    pub fn is_explicit_null(&self) -> bool {
        self.set && self.value.is_none()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

/// Scalar types that can sit inside a [`Nullable`].
pub trait NullableScalar: Sized {
    /// Name of the wrapper, used as the prefix of decode errors.
    const WRAPPER_NAME: &'static str;
    /// Human readable description of the accepted input.
    const EXPECTED: &'static str;

    /// Coerces a non-null input into the scalar.
    fn coerce(input: InputValue) -> Result<Self, ScalarError>;

    fn write_value<B: BufMut>(&self, buffer: &mut B);

    fn mismatch(input: &InputValue) -> ScalarError {
        ScalarError::TypeMismatch {
            scalar: Self::WRAPPER_NAME,
            expected: Self::EXPECTED,
            found: input.kind(),
        }
    }

    fn conversion_error(value: impl Into<String>, reason: &'static str) -> ScalarError {
        ScalarError::ConversionError {
            scalar: Self::WRAPPER_NAME,
            value: value.into(),
            reason,
        }
    }
}

/// Scalar marshaling contract of the schema engine: a decode hook receiving the raw
/// input and an encode hook receiving the output sink.
pub trait Marshaler {
    fn unmarshal_input(&mut self, input: InputValue) -> Result<(), ScalarError>;

    fn marshal_output<B: BufMut>(&self, buffer: &mut B);
}

impl<T: NullableScalar> Marshaler for Nullable<T> {
    fn unmarshal_input(&mut self, input: InputValue) -> Result<(), ScalarError> {
        self.set = true;
        self.value = None;

        if input.is_null() {
            return Ok(());
        }

        self.value = Some(T::coerce(input)?);
        Ok(())
    }

    fn marshal_output<B: BufMut>(&self, buffer: &mut B) {
        match &self.value {
            Some(value) => value.write_value(buffer),
            None => buffer.put_slice(writer::NULL),
        }
    }
}

impl<T: NullableScalar> Nullable<T> {
    /// Builds a wrapper by decoding `input`, the same way the schema engine would.
    pub fn from_input(input: InputValue) -> Result<Self, ScalarError> {
        let mut nullable = Nullable::unset();
        nullable.unmarshal_input(input)?;
        Ok(nullable)
    }
}

impl<T: NullableScalar> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Vec::with_capacity(16);
        self.marshal_output(&mut buffer);
        f.write_str(&String::from_utf8_lossy(&buffer))
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Goes through the same coercion as [`Marshaler::unmarshal_input`], so `3.0` is a valid
/// `NullableInt` here too. A present key always yields a set wrapper.
impl<'de, T: NullableScalar> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Nullable::from_input(InputValue::from(value)).map_err(D::Error::custom)
    }
}

impl NullableScalar for String {
    const WRAPPER_NAME: &'static str = "NullableString";
    const EXPECTED: &'static str = "a string";

    fn coerce(input: InputValue) -> Result<Self, ScalarError> {
        match input {
            InputValue::String(s) => Ok(s),
            other => Err(Self::mismatch(&other)),
        }
    }

    fn write_value<B: BufMut>(&self, buffer: &mut B) {
        writer::write_and_escape_string(buffer, self);
    }
}

impl NullableScalar for i64 {
    const WRAPPER_NAME: &'static str = "NullableInt";
    const EXPECTED: &'static str = "an int";

    fn coerce(input: InputValue) -> Result<Self, ScalarError> {
        match input {
            InputValue::Int(i) => Ok(i64::from(i)),
            InputValue::Int64(i) => Ok(i),
            InputValue::Float(f) => integral_from_f64::<Self>(f, || f.to_string()),
            InputValue::Number(token) => match token.parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) => {
                    let f = token
                        .parse::<f64>()
                        .map_err(|_| Self::conversion_error(token.as_str(), "not a number"))?;
                    integral_from_f64::<Self>(f, || token.clone())
                }
            },
            other => Err(Self::mismatch(&other)),
        }
    }

    fn write_value<B: BufMut>(&self, buffer: &mut B) {
        writer::write_i64(buffer, *self);
    }
}

/// Accepts a float as an integer only when nothing is lost on the way.
fn integral_from_f64<S: NullableScalar>(
    f: f64,
    display: impl FnOnce() -> String,
) -> Result<i64, ScalarError> {
    if !f.is_finite() {
        return Err(S::conversion_error(display(), "not a finite number"));
    }
    if f.fract() != 0.0 {
        return Err(S::conversion_error(display(), "not an integer"));
    }
    if f.abs() > MAX_SAFE_INTEGER {
        return Err(S::conversion_error(display(), "out of range"));
    }
    Ok(f as i64)
}

impl NullableScalar for f64 {
    const WRAPPER_NAME: &'static str = "NullableFloat";
    const EXPECTED: &'static str = "a number";

    fn coerce(input: InputValue) -> Result<Self, ScalarError> {
        match input {
            InputValue::Float(f) if f.is_finite() => Ok(f),
            InputValue::Float(f) => {
                Err(Self::conversion_error(f.to_string(), "not a finite number"))
            }
            InputValue::Int(i) => Ok(f64::from(i)),
            InputValue::Int64(i) => Ok(i as f64),
            InputValue::Number(token) => {
                if let Ok(i) = token.parse::<i64>() {
                    return Ok(i as f64);
                }
                match token.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(f),
                    Ok(_) => Err(Self::conversion_error(token, "not a finite number")),
                    Err(_) => Err(Self::conversion_error(token, "not a number")),
                }
            }
            other => Err(Self::mismatch(&other)),
        }
    }

    fn write_value<B: BufMut>(&self, buffer: &mut B) {
        writer::write_f64(buffer, *self);
    }
}

impl NullableScalar for bool {
    const WRAPPER_NAME: &'static str = "NullableBool";
    const EXPECTED: &'static str = "a bool";

    fn coerce(input: InputValue) -> Result<Self, ScalarError> {
        match input {
            InputValue::Boolean(b) => Ok(b),
            other => Err(Self::mismatch(&other)),
        }
    }

    fn write_value<B: BufMut>(&self, buffer: &mut B) {
        writer::write_bool(buffer, *self);
    }
}
