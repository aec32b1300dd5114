use tracing::debug;

use crate::error::Result;
use crate::session::SessionManager;
use crate::types::{WorkoutPlan, WorkoutPlanInput};

/// `workout-plans/` CRUD endpoints. All require a session.
#[derive(Debug, Clone, Copy)]
pub struct WorkoutPlansApi<'a> {
    session: &'a SessionManager,
}

impl<'a> WorkoutPlansApi<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> Result<Vec<WorkoutPlan>> {
        self.session.get("workout-plans/").await
    }

    pub async fn get(&self, id: i64) -> Result<WorkoutPlan> {
        self.session.get(&plan_path(id)).await
    }

    pub async fn create(&self, plan: &WorkoutPlanInput) -> Result<WorkoutPlan> {
        let created: WorkoutPlan = self.session.post("workout-plans/", plan).await?;
        debug!(id = created.id, "Created workout plan");
        Ok(created)
    }

    pub async fn update(&self, id: i64, plan: &WorkoutPlanInput) -> Result<WorkoutPlan> {
        self.session.put(&plan_path(id), plan).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.session.delete::<Option<serde_json::Value>>(&plan_path(id)).await?;
        debug!(id, "Deleted workout plan");
        Ok(())
    }
}

fn plan_path(id: i64) -> String {
    format!("workout-plans/{id}/")
}

impl SessionManager {
    pub fn workout_plans(&self) -> WorkoutPlansApi<'_> {
        WorkoutPlansApi::new(self)
    }
}
