//! Exercise catalog entries.

use bon::Builder;
use serde::{Deserialize, Serialize};

/// One exercise from the catalog, with its default prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    pub muscle_group: String,
    pub sets: u32,
    pub reps: u32,
}

impl Exercise {
    /// Case-insensitive substring match on name or muscle group.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.muscle_group.to_lowercase().contains(&term)
    }

    /// `sets x reps`, e.g. `3x10`.
    pub fn prescription(&self) -> String {
        format!("{}x{}", self.sets, self.reps)
    }
}

/// Keep only the exercises matching `term`.
pub fn filter_exercises<'a>(exercises: &'a [Exercise], term: &str) -> Vec<&'a Exercise> {
    exercises.iter().filter(|e| e.matches(term)).collect()
}

/// `exercises/` create body.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewExercise {
    #[builder(into)]
    pub name: String,
    #[builder(into, default)]
    #[serde(default)]
    pub description: String,
    #[builder(into)]
    pub muscle_group: String,
    pub sets: u32,
    pub reps: u32,
}
