//! peakform - Adaptive training periodization engine

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::warn;

use peakform::analysis::{PerformanceReporter, apply_analysis};
use peakform::config::EngineConfig;
use peakform::db::{Database, Training};
use peakform::exercises::{Equipment, MuscleGroup, find_exercise};
use peakform::landmarks::LandmarkTable;
use peakform::metrics::{OneRmFormula, estimate_one_rm};
use peakform::periodization::{Effort, PlanRequest, SetTarget, build_macrocycle};
use peakform::profile::{ExperienceLevel, Goal, RecoveryCapacity, RecoveryProfile, TrainingProfile};
use peakform::templates::{Split, TemplateGenerator, TemplateRequest, TrainingFrequency, Variant};

const DB_PATH: &str = "peakform.db";

#[derive(Parser)]
#[command(name = "peakform")]
#[command(author, version, about = "Adaptive training periodization engine")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "PEAKFORM_DB", default_value = DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate one-rep max from a set
    OneRm {
        weight: f64,
        reps: u32,

        /// brzycki, epley, lander, lombardi, mayhew, oconner, wathan
        #[arg(short, long)]
        formula: Option<String>,

        /// Show every formula
        #[arg(short, long)]
        all: bool,
    },

    /// Show weekly volume landmarks
    Landmarks {
        /// Use a stored profile instead of --age/--capacity
        #[arg(short, long)]
        user: Option<String>,

        /// Training age in years
        #[arg(long, default_value = "2")]
        age: f64,

        /// Recovery capacity 1-10
        #[arg(long, default_value = "5")]
        capacity: u8,

        /// Priority muscle groups, highest first (e.g. "chest,calves")
        #[arg(short, long, value_delimiter = ',')]
        priority: Vec<MuscleGroup>,
    },

    /// Create or update a training profile
    Profile {
        user: String,

        #[arg(short, long, default_value = "intermediate")]
        level: ExperienceLevel,

        /// Training age in years
        #[arg(short, long, default_value = "2")]
        age: f64,

        #[arg(short, long, default_value = "hypertrophy")]
        goal: Goal,

        #[arg(long, default_value = "6")]
        sleep: u8,

        #[arg(long, default_value = "5")]
        stress: u8,

        #[arg(long, default_value = "6")]
        nutrition: u8,

        /// Available equipment; omit for a full gym, "none" for bodyweight only
        #[arg(short, long, value_delimiter = ',')]
        equipment: Vec<String>,

        /// Known 1RMs as exercise=kg (e.g. "back_squat=150")
        #[arg(short, long, value_parser = parse_strength)]
        strength: Vec<(String, f64)>,
    },

    /// Log a set block
    Log {
        user: String,

        /// Exercise id (e.g. "back_squat", "barbell_bench_press")
        exercise: String,

        #[arg(short, long, default_value = "3")]
        sets: u32,

        #[arg(short, long, default_value = "10")]
        reps: u32,

        #[arg(short, long, default_value = "0")]
        weight: f64,

        #[arg(long)]
        rpe: Option<f32>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Build and populate a periodized plan
    Plan {
        user: String,

        #[arg(short, long, default_value = "12")]
        weeks: u32,

        /// Training days per week: 5, 6 or 7
        #[arg(short, long, default_value = "6")]
        frequency: TrainingFrequency,

        #[arg(long, default_value = "push_pull_legs")]
        split: Split,

        #[arg(long, default_value = "standard")]
        variant: Variant,

        /// First day of the plan (defaults to next Monday)
        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(short, long, value_delimiter = ',')]
        priority: Vec<MuscleGroup>,

        /// Print the full plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyse recent training and store the report
    Analyze {
        user: String,

        /// Last day of the window (defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Write new 1RM estimates and fatigue back to the profile
        #[arg(long)]
        apply: bool,

        #[arg(long)]
        json: bool,
    },
}

fn parse_strength(s: &str) -> Result<(String, f64), String> {
    let (exercise, kg) = s.split_once('=').ok_or_else(|| format!("expected exercise=kg, got {s:?}"))?;
    let kg: f64 = kg.trim().parse().map_err(|_| format!("invalid weight in {s:?}"))?;
    Ok((exercise.trim().to_string(), kg))
}

fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = (7 - today.weekday().num_days_from_monday() as i64) % 7;
    today + Duration::days(days)
}

fn describe_set(set: &SetTarget) -> String {
    let weight = set.weight_kg.map(|w| format!(" @ {w} kg")).unwrap_or_default();
    let effort = match set.effort {
        Effort::Rpe(rpe) => format!("RPE {rpe}"),
        Effort::Rir(rir) => format!("{rir} RIR"),
    };
    format!("{} reps{} ({})", set.reps, weight, effort)
}

fn load_profile(db: &Database, user: &str) -> Result<TrainingProfile> {
    db.get_profile(user)?
        .with_context(|| format!("No profile for {user:?}; create one with `peakform profile {user}`"))
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;

    match cli.command {
        Commands::OneRm { weight, reps, formula, all } => {
            if all {
                for f in OneRmFormula::all() {
                    println!("{:10} {:.1} kg", f.name(), estimate_one_rm(weight, reps, *f));
                }
            } else {
                let formula = formula.map(|name| OneRmFormula::from_name(&name)).unwrap_or(config.one_rm_formula);
                println!("{:.1} kg ({})", estimate_one_rm(weight, reps, formula), formula);
            }
        }

        Commands::Landmarks { user, age, capacity, priority } => {
            let table = match user {
                Some(user) => {
                    let db = Database::open(&cli.db)?;
                    LandmarkTable::for_profile(&load_profile(&db, &user)?, &priority)
                }
                None => LandmarkTable::new(age, RecoveryCapacity::new(capacity)?, &priority),
            };

            println!("{:12} {:>14} {:>10} {:>8} {:>4}", "group", "sets min/opt/max", "freq", "recover", "prio");
            println!("{:-<54}", "");
            for landmark in table.landmarks.values() {
                let sets = landmark.weekly_sets;
                let freq = landmark.weekly_frequency;
                println!(
                    "{:12} {:>5}/{:>3}/{:>3} {:>5}/{}/{} {:>7.0}h {:>4}",
                    landmark.muscle_group,
                    sets.minimum,
                    sets.optimal,
                    sets.maximum,
                    freq.minimum,
                    freq.optimal,
                    freq.maximum,
                    landmark.recovery_hours,
                    landmark.priority
                );
            }
        }

        Commands::Profile { user, level, age, goal, sleep, stress, nutrition, equipment, strength } => {
            let db = Database::open(&cli.db)?;
            let mut profile = match db.get_profile(&user)? {
                Some(existing) => existing,
                None => TrainingProfile::new(user.clone(), level, age),
            };
            profile.experience = level;
            profile.training_age_years = age;
            profile.primary_goal = goal;
            profile.recovery = RecoveryProfile { sleep_quality: sleep, stress_level: stress, nutrition_quality: nutrition };
            profile.recovery.validate()?;
            if !equipment.is_empty() {
                profile.equipment = equipment
                    .iter()
                    .filter(|e| e.as_str() != "none")
                    .map(|e| e.parse::<Equipment>())
                    .collect::<Result<_, _>>()?;
            }
            profile.strength.extend(strength);

            db.upsert_profile(&profile)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            println!("Recovery capacity: {}", profile.recovery_capacity().value());
        }

        Commands::Log { user, exercise, sets, reps, weight, rpe, notes } => {
            if find_exercise(&exercise).is_none() {
                bail!("Unknown exercise {:?}", exercise);
            }
            if rpe.is_some_and(|r| !(1.0..=10.0).contains(&r)) {
                bail!("RPE must be between 1 and 10");
            }

            let db = Database::open(&cli.db)?;
            let training = Training {
                id: None,
                user_id: user,
                date: Utc::now(),
                exercise: exercise.clone(),
                sets,
                reps,
                weight_kg: weight,
                rpe,
                notes,
            };
            let id = db.add_training(&training)?;
            println!(
                "Logged: {} - {}x{} @ {} kg, e1RM {:.1} kg (id: {})",
                exercise,
                sets,
                reps,
                weight,
                estimate_one_rm(weight, reps, config.one_rm_formula),
                id
            );
        }

        Commands::Plan { user, weeks, frequency, split, variant, start, priority, json } => {
            let db = Database::open(&cli.db)?;
            let profile = load_profile(&db, &user)?;
            let start = start.unwrap_or_else(|| next_monday(Local::now().date_naive()));

            let mut request = PlanRequest::for_profile(&profile, start, weeks, frequency);
            if let Some(cadence) = config.deload_cadence_weeks {
                request.deload_cadence_weeks = cadence;
            }
            request.embed_deload = config.embed_deload;

            let (mut plan, warnings) = build_macrocycle(&request).context("Unable to generate this plan")?;
            for warning in &warnings {
                warn!("Mesocycle {}: {}", warning.mesocycle, warning.message);
            }

            let table = LandmarkTable::for_profile(&profile, &priority);
            let template = TemplateRequest {
                split,
                variant,
                priority_groups: priority,
                ..TemplateRequest::for_profile(&profile, frequency)
            };
            TemplateGenerator::new(&table)
                .with_strength(&profile.strength)
                .populate_macrocycle(&template, &mut plan)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            println!("{} ({} - {})", plan.name, plan.start_date, plan.end_date());
            println!("{:-<60}", "");
            for meso in &plan.mesocycles {
                println!(
                    "{:28} {} | {} wk | volume {} intensity {}{}",
                    meso.name,
                    meso.start_date,
                    meso.duration_weeks,
                    meso.volume_level,
                    meso.intensity_level,
                    if meso.includes_deload { " | deload" } else { "" }
                );
            }

            if let Some(week) = plan.microcycles().next() {
                println!();
                println!("Week {} ({}):", week.week, week.start_date);
                for session in &week.sessions {
                    println!("  {} {} - {} min", session.day, session.name, session.estimated_duration_minutes);
                    for exercise in &session.exercises {
                        let first = exercise.sets.first().map(describe_set).unwrap_or_default();
                        println!(
                            "    {:28} {} x {} | rest {}s{}",
                            exercise.exercise_name,
                            exercise.sets.len(),
                            first,
                            exercise.rest_seconds,
                            exercise.technique.as_ref().map(|t| format!(" | {t:?}")).unwrap_or_default()
                        );
                    }
                    for substitution in &session.substitutions {
                        println!("    note: {}", substitution.note);
                    }
                }
            }
            for warning in warnings {
                println!("warning: {}", warning.message);
            }
        }

        Commands::Analyze { user, end, apply, json } => {
            let db = Database::open(&cli.db)?;
            let profile = load_profile(&db, &user)?;
            let trainings = db.get_trainings(&user)?;
            let end = end.unwrap_or_else(|| Local::now().date_naive());

            let analysis = PerformanceReporter::new(&config).analyze(&profile, &trainings, end, None);
            db.append_analysis(&analysis)?;
            if apply {
                db.upsert_profile(&apply_analysis(&profile, &analysis))?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            println!("Performance {} - {}", analysis.period_start, analysis.period_end);
            println!("{:-<60}", "");
            for (name, metric) in &analysis.metrics {
                println!("{:32} {:>10.2} {:>+10.2} {:?}", name, metric.value, metric.change, metric.trend);
            }
            for (exercise, fit) in &analysis.progressions {
                println!("{:32} {:>+8.2} kg/week (R2 {:.2})", exercise, fit.slope_per_week, fit.r2);
            }
            println!();
            println!(
                "Fatigue {:.1} ({}){}",
                analysis.fatigue.current_level,
                analysis.fatigue.recovery_status,
                if analysis.fatigue.deload_recommended { " - deload recommended" } else { "" }
            );
            for recommendation in &analysis.fatigue.recommendations {
                println!("  - {}", recommendation);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strength() {
        assert_eq!(parse_strength("back_squat=150").unwrap(), ("back_squat".to_string(), 150.0));
        assert!(parse_strength("back_squat").is_err());
        assert!(parse_strength("back_squat=heavy").is_err());
    }

    #[test]
    fn test_next_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(next_monday(wednesday), NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        assert_eq!(next_monday(monday), monday);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["peakform", "plan", "alice", "--frequency", "5", "--priority", "chest,calves"]).unwrap();
        match cli.command {
            Commands::Plan { frequency, priority, .. } => {
                assert_eq!(frequency.days(), 5);
                assert_eq!(priority, vec![MuscleGroup::Chest, MuscleGroup::Calves]);
            }
            _ => panic!("expected plan"),
        }
    }
}
