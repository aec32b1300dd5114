//! Workout plans and their exercise lists.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exercise::Exercise;

/// A named plan made of exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub exercises: Vec<PlanExercise>,
}

impl WorkoutPlan {
    /// Edit body carrying the current name and description only, leaving
    /// the exercise list as it is on the server.
    pub fn to_input(&self) -> WorkoutPlanInput {
        WorkoutPlanInput {
            name: self.name.clone(),
            description: self.description.clone(),
            exercises: None,
        }
    }
}

/// An exercise as it appears inside a plan, optionally overriding the
/// catalog's sets and reps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExercise {
    pub id: i64,
    pub exercise: Exercise,
    #[serde(default)]
    pub custom_sets: Option<u32>,
    #[serde(default)]
    pub custom_reps: Option<u32>,
}

impl PlanExercise {
    /// Sets to perform; a missing or zero override falls back to the
    /// catalog default.
    pub fn effective_sets(&self) -> u32 {
        self.custom_sets
            .filter(|&sets| sets > 0)
            .unwrap_or(self.exercise.sets)
    }

    pub fn effective_reps(&self) -> u32 {
        self.custom_reps
            .filter(|&reps| reps > 0)
            .unwrap_or(self.exercise.reps)
    }
}

/// Reference to a catalog exercise when creating a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExerciseRef {
    pub exercise_id: i64,
}

/// Create/update body for `workout-plans/`.
///
/// `exercises: None` omits the field, which the update endpoint treats as
/// "leave the exercise list alone".
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlanInput {
    #[builder(into)]
    pub name: String,
    #[builder(into, default)]
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<PlanExerciseRef>>,
}

impl WorkoutPlanInput {
    /// Replace the exercise list with the given catalog ids, dropping
    /// duplicates but keeping first-seen order.
    pub fn with_exercise_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        let mut refs: Vec<PlanExerciseRef> = Vec::new();
        for exercise_id in ids {
            if !refs.iter().any(|r| r.exercise_id == exercise_id) {
                refs.push(PlanExerciseRef { exercise_id });
            }
        }
        self.exercises = Some(refs);
        self
    }
}
