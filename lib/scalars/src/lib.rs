//! Nullable scalars that keep apart the three states an optional GraphQL input can be in:
//! the key was missing from the document, the key was sent as `null`, or the key carried a value.
//!
//! Decoding goes through [`InputValue`], a closed set of the raw representations the
//! schema engine hands over, and encoding writes straight into a [`bytes::BufMut`].
pub mod error;
pub mod input;
pub mod nullable;
pub mod writer;

pub use error::ScalarError;
pub use input::InputValue;
pub use nullable::{
    Marshaler, Nullable, NullableBool, NullableFloat, NullableInt, NullableScalar,
    NullableString,
};
