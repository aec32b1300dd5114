//! CLI entry point for fitplan.

pub mod auth;
pub mod exercises;
pub mod plans;

use clap::{Args, Parser, Subcommand};

use crate::auth::AuthError;
use crate::error::Result;
use crate::session::{Route, RouteDecision, RouteGuard, SessionManager};

/// fitplan workout-planning CLI
#[derive(Parser, Debug)]
#[command(name = "fitplan", version, about = "Workout plans from the terminal")]
pub struct Cli {
    /// API base URL (overrides FITPLAN_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Browse and add catalog exercises
    Exercises(ExercisesArgs),
    /// Manage workout plans
    Plans(PlansArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in and store tokens
    Login(LoginArgs),
    /// Create an account
    Register(RegisterArgs),
    /// Forget stored tokens
    Logout,
    /// Show whether a session is stored
    Status,
    /// Show the server's view of the logged-in user
    Whoami,
}

/// Arguments for `fitplan auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    pub username: String,

    /// Password; prompted for when omitted
    #[arg(long, env = "FITPLAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for `fitplan auth register`.
#[derive(Parser, Debug)]
pub struct RegisterArgs {
    pub username: String,

    #[arg(long)]
    pub email: String,

    /// Password; prompted for when omitted
    #[arg(long, env = "FITPLAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the `exercises` subcommand group.
#[derive(Parser, Debug)]
pub struct ExercisesArgs {
    #[command(subcommand)]
    pub command: ExerciseCommands,
}

/// Exercise subcommands.
#[derive(Subcommand, Debug)]
pub enum ExerciseCommands {
    /// List the catalog
    List {
        /// Only show exercises whose name or muscle group contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one exercise
    Show { id: i64 },
    /// Add an exercise to the catalog
    Create(NewExerciseArgs),
}

#[derive(Args, Debug)]
pub struct NewExerciseArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub muscle_group: String,
    #[arg(long)]
    pub sets: u32,
    #[arg(long)]
    pub reps: u32,
    #[arg(long, default_value = "")]
    pub description: String,
}

/// Arguments for the `plans` subcommand group.
#[derive(Parser, Debug)]
pub struct PlansArgs {
    #[command(subcommand)]
    pub command: PlanCommands,
}

/// Workout plan subcommands.
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// List your plans
    List,
    /// Show a plan and its exercises
    Show { id: i64 },
    /// Create a plan
    Create(PlanFormArgs),
    /// Rename or re-describe a plan
    Update {
        id: i64,
        #[command(flatten)]
        form: PlanUpdateArgs,
    },
    /// Delete a plan
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct PlanFormArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Catalog exercise id to include (repeatable)
    #[arg(long = "exercise")]
    pub exercises: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct PlanUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Replace the plan's exercises (repeatable)
    #[arg(long = "exercise")]
    pub exercises: Vec<i64>,
}

/// Dispatch a parsed command.
pub async fn run(command: Commands, session: &SessionManager) -> Result<()> {
    match command {
        Commands::Auth(args) => match args.command {
            AuthCommands::Login(args) => auth::handle_login(session, args).await,
            AuthCommands::Register(args) => auth::handle_register(session, args).await,
            AuthCommands::Logout => auth::handle_logout(session),
            AuthCommands::Status => auth::handle_status(session),
            AuthCommands::Whoami => auth::handle_whoami(session).await,
        },
        Commands::Exercises(args) => exercises::handle(session, args.command).await,
        Commands::Plans(args) => plans::handle(session, args.command).await,
    }
}

/// Refuse to run a protected command without a session.
pub(crate) fn require_session(session: &SessionManager) -> Result<()> {
    match RouteGuard.check(session, Route::Protected) {
        RouteDecision::Render => Ok(()),
        RouteDecision::Redirect { .. } => Err(AuthError::NotLoggedIn.into()),
    }
}
