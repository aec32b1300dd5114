//! `fitplan exercises` handlers.

use crate::error::Result;
use crate::session::SessionManager;
use crate::types::{Exercise, NewExercise};

use super::{ExerciseCommands, NewExerciseArgs};

pub async fn handle(session: &SessionManager, command: ExerciseCommands) -> Result<()> {
    match command {
        ExerciseCommands::List { search } => {
            let exercises = match search.as_deref() {
                Some(term) => session.exercises().search(term).await?,
                None => session.exercises().list().await?,
            };
            if exercises.is_empty() {
                println!("No exercises found.");
            }
            for exercise in &exercises {
                println!("{}", summary_line(exercise));
            }
            Ok(())
        }
        ExerciseCommands::Show { id } => {
            let exercise = session.exercises().get(id).await?;
            println!("{}", summary_line(&exercise));
            if !exercise.description.is_empty() {
                println!("\n{}", exercise.description);
            }
            Ok(())
        }
        ExerciseCommands::Create(args) => {
            let created = session.exercises().create(&new_exercise(args)).await?;
            println!("✅ Created exercise #{}: {}", created.id, created.name);
            Ok(())
        }
    }
}

fn new_exercise(args: NewExerciseArgs) -> NewExercise {
    NewExercise::builder()
        .name(args.name)
        .muscle_group(args.muscle_group)
        .sets(args.sets)
        .reps(args.reps)
        .description(args.description)
        .build()
}

fn summary_line(exercise: &Exercise) -> String {
    format!(
        "#{:<4} {:<28} {:<12} {}",
        exercise.id,
        exercise.name,
        exercise.muscle_group,
        exercise.prescription()
    )
}
