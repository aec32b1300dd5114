use crate::error::Result;
use crate::session::SessionManager;
use crate::types::{filter_exercises, Exercise, NewExercise};

/// `exercises/` catalog endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ExercisesApi<'a> {
    session: &'a SessionManager,
}

impl<'a> ExercisesApi<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> Result<Vec<Exercise>> {
        self.session.get("exercises/").await
    }

    /// Fetch the catalog and keep entries whose name or muscle group
    /// contains `term`. Filtering happens client-side.
    pub async fn search(&self, term: &str) -> Result<Vec<Exercise>> {
        let all = self.list().await?;
        Ok(filter_exercises(&all, term).into_iter().cloned().collect())
    }

    pub async fn get(&self, id: i64) -> Result<Exercise> {
        self.session.get(&format!("exercises/{id}/")).await
    }

    pub async fn create(&self, exercise: &NewExercise) -> Result<Exercise> {
        self.session.post("exercises/", exercise).await
    }
}

impl SessionManager {
    pub fn exercises(&self) -> ExercisesApi<'_> {
        ExercisesApi::new(self)
    }
}
