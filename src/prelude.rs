//! Convenience re-exports for common use.

pub use crate::auth::{AuthError, CredentialStore, FileCredentialStore, MemoryCredentialStore, Session};
pub use crate::config::FitplanConfig;
pub use crate::error::{FitplanError, Result};
pub use crate::session::{Route, RouteDecision, RouteGuard, SessionEvent, SessionManager};
pub use crate::types::{Exercise, NewExercise, PlanExercise, User, WorkoutPlan, WorkoutPlanInput};
