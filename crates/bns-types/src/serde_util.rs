//! Serde helpers for server payloads.

use serde::{Deserialize, Deserializer};

/// Deserialize an `Option<T>` whose key must be present but whose value may
/// be `null`.
///
/// Use with `#[serde(deserialize_with = "required_nullable")]`: a missing key
/// is an error, while a plain `Option` field would silently become `None`.
pub fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Deserialize an optional field that may be missing but never `null`.
///
/// Use with `#[serde(default, deserialize_with = "non_null")]`. A missing
/// key is `None`; an explicit `null` is an error instead of being folded
/// into `None` and lost on re-serialization.
pub fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize a field that may be missing, `null`, or set.
///
/// Use on an `Option<Option<T>>` with `#[serde(default, deserialize_with =
/// "explicit_nullable", skip_serializing_if = "Option::is_none")]`: a
/// missing key is `None`, `null` is `Some(None)`, and each re-serializes as
/// it arrived.
pub fn explicit_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
