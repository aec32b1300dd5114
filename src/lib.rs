//! fitplan: client SDK for the fitplan workout-planning API.
//!
//! The heart of the crate is [`session::SessionManager`]: it owns the
//! credential store, attaches the access token to every call, and on a 401
//! refreshes the token once and retries the call once. Typed bindings for
//! users, exercises and workout plans hang off the manager.
//!
//! # Quick Start
//!
//! ```no_run
//! use fitplan::prelude::*;
//!
//! # async fn example() -> fitplan::error::Result<()> {
//! let session = SessionManager::from_config(&FitplanConfig::from_env())?;
//! session.login("alice", "pw").await?;
//! for plan in session.workout_plans().list().await? {
//!     println!("{}", plan.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
