//! Typed endpoint bindings.
//!
//! Each binding borrows the [`SessionManager`](crate::session::SessionManager)
//! and goes through its `request` path, so every call gets the bearer token
//! and the one-shot refresh.

pub mod exercises;
pub mod users;
pub mod workout_plans;

pub use exercises::ExercisesApi;
pub use users::UsersApi;
pub use workout_plans::WorkoutPlansApi;
