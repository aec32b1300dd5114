//! Wire types for the fitplan API.

pub mod exercise;
pub mod user;
pub mod workout_plan;

pub use exercise::*;
pub use user::*;
pub use workout_plan::*;

use serde::{Deserialize, Deserializer};

/// Read `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
