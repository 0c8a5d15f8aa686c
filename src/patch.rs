//! Nullable PATCH fields. A field is `None` when absent from the body and
//! keeps its stored value, `Some(None)` when sent as `null` and is cleared,
//! and `Some(Some(v))` when it carries a new value.
//!
//! Declare such fields as
//! `#[serde(default, deserialize_with = "crate::patch::nullable")] Option<Option<T>>`
//! and write them with `col = CASE WHEN $n THEN $n+1 ELSE col END`, binding
//! the pair from [`parts`].

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// `(present, value)` for binding into a `CASE WHEN` update.
pub fn parts(field: &Option<Option<String>>) -> (bool, Option<&str>) {
    (field.is_some(), value(field))
}

/// The new value, if any; absent and `null` both read as `None`.
pub fn value(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(|v| v.as_deref())
}
