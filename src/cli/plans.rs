//! `fitplan plans` handlers. Every command here needs a session.

use crate::error::Result;
use crate::session::SessionManager;
use crate::types::{WorkoutPlan, WorkoutPlanInput};

use super::{require_session, PlanCommands, PlanFormArgs, PlanUpdateArgs};

/// Number of exercise names previewed per plan in `plans list`.
const PREVIEW_EXERCISES: usize = 3;

pub async fn handle(session: &SessionManager, command: PlanCommands) -> Result<()> {
    require_session(session)?;
    let plans = session.workout_plans();

    match command {
        PlanCommands::List => {
            let all = plans.list().await?;
            if all.is_empty() {
                println!("No workout plans yet. Create one with `fitplan plans create`.");
            }
            for plan in &all {
                print_list_entry(plan);
            }
        }
        PlanCommands::Show { id } => print_detail(&plans.get(id).await?),
        PlanCommands::Create(form) => {
            let created = plans.create(&create_input(form)).await?;
            println!("✅ Created plan #{}: {}", created.id, created.name);
        }
        PlanCommands::Update { id, form } => {
            let current = plans.get(id).await?;
            let updated = plans.update(id, &update_input(&current, form)).await?;
            println!("✅ Updated plan #{}", updated.id);
            print_detail(&updated);
        }
        PlanCommands::Delete { id } => {
            plans.delete(id).await?;
            println!("🗑️  Deleted plan #{id}");
        }
    }
    Ok(())
}

fn create_input(form: PlanFormArgs) -> WorkoutPlanInput {
    WorkoutPlanInput::builder()
        .name(form.name)
        .description(form.description)
        .build()
        .with_exercise_ids(form.exercises)
}

fn update_input(current: &WorkoutPlan, form: PlanUpdateArgs) -> WorkoutPlanInput {
    let mut input = current.to_input();
    if let Some(name) = form.name {
        input.name = name;
    }
    if let Some(description) = form.description {
        input.description = description;
    }
    if !form.exercises.is_empty() {
        input = input.with_exercise_ids(form.exercises);
    }
    input
}

fn print_list_entry(plan: &WorkoutPlan) {
    let description = if plan.description.is_empty() {
        "No description"
    } else {
        plan.description.as_str()
    };
    println!("#{} {}", plan.id, plan.name);
    println!("   {description}");
    if let Some(created) = plan.created_at {
        println!("   Created: {}", created.format("%Y-%m-%d"));
    }
    if !plan.exercises.is_empty() {
        let mut names: Vec<String> = plan
            .exercises
            .iter()
            .take(PREVIEW_EXERCISES)
            .map(|pe| pe.exercise.name.clone())
            .collect();
        let more = plan.exercises.len().saturating_sub(PREVIEW_EXERCISES);
        if more > 0 {
            names.push(format!("+{more}"));
        }
        println!("   {}", names.join(", "));
    }
}

fn print_detail(plan: &WorkoutPlan) {
    println!("{}", plan.name);
    if !plan.description.is_empty() {
        println!("{}", plan.description);
    }
    println!("\nExercises in this plan:");
    if plan.exercises.is_empty() {
        println!("  No exercises in this plan yet.");
        return;
    }
    for pe in &plan.exercises {
        println!(
            "  - {} | Sets: {} | Reps: {}",
            pe.exercise.name,
            pe.effective_sets(),
            pe.effective_reps()
        );
    }
}
