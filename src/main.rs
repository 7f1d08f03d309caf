// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym session command-line client.
//!
//! Drives the stores and the live workout session from a terminal. Session
//! state lives in the state directory, so consecutive invocations continue
//! the same workout.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gym_session_client::{
    config::Config,
    models::{Gender, NewUser, SetInput},
    routes, ClientContext,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gym-session")]
#[command(author, version, about = "Gym workout tracker client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login { email: String, password: String },

    /// Create an account, then log in
    Register {
        username: String,
        email: String,
        password: String,
        #[arg(long, default_value = "male")]
        gender: String,
        /// YYYY-MM-DD
        #[arg(long)]
        birthdate: NaiveDate,
    },

    /// Forget the stored session
    Logout,

    /// List your workout plans
    Workouts,

    /// Search the exercise catalog
    Search { query: String },

    /// Show the dashboard
    Dashboard,

    /// Load today's workout into the live session
    Today,

    /// Start the loaded workout
    Start,

    /// Rest for the current exercise's rest duration
    Rest,

    /// Log the current set and move on
    Log {
        #[arg(short, long)]
        reps: u32,
        #[arg(short, long, default_value = "0")]
        weight: f64,
    },

    /// Skip the rest, or skip the current set
    Skip,

    /// Move to the next exercise
    NextExercise,

    /// Abandon the live session
    Stop,

    /// Retry backlogged set logs
    Flush,

    /// Show the live session
    Status,

    /// Show where a path would navigate
    Route { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "Starting gym session client");

    let ctx = ClientContext::new(config)?;
    ctx.live.validate_todays_workout().await;

    run(&ctx, cli.command).await?;

    ctx.shutdown().await;
    Ok(())
}

async fn run(ctx: &ClientContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = ctx.auth.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.username, user.email);
        }
        Commands::Register {
            username,
            email,
            password,
            gender,
            birthdate,
        } => {
            let gender: Gender = serde_json::from_value(serde_json::Value::String(gender))
                .context("gender must be 'male' or 'female'")?;
            let user = ctx
                .auth
                .register(NewUser {
                    username,
                    email,
                    password,
                    gender,
                    birthdate,
                    height_cm: None,
                    weight_kg: None,
                    body_fat_percentage: None,
                    activity_level: None,
                    goal: None,
                })
                .await?;
            println!("Registered and logged in as {}", user.username);
        }
        Commands::Logout => {
            ctx.live.stop_workout();
            ctx.auth.logout()?;
            println!("Logged out");
        }
        Commands::Workouts => {
            ctx.workouts.fetch_workouts().await;
            for workout in ctx.workouts.workouts() {
                println!(
                    "#{} {} ({} exercises)",
                    workout.id,
                    workout.name,
                    workout.workout_exercises.len()
                );
            }
        }
        Commands::Search { query } => {
            ctx.exercises.search(&query).await;
            for exercise in ctx.exercises.results() {
                println!(
                    "{} {}",
                    exercise.id.map(|id| format!("#{}", id)).unwrap_or_default(),
                    exercise.name
                );
            }
        }
        Commands::Dashboard => {
            ctx.dashboard.fetch().await;
            match ctx.dashboard.data() {
                Some(data) => {
                    match data.todays_workout {
                        Some(w) => println!("Today: {}", w.name),
                        None => println!("Rest day"),
                    }
                    if data.yesterday_skipped {
                        println!("Yesterday's workout was skipped");
                    }
                }
                None => println!("Dashboard unavailable"),
            }
        }
        Commands::Today => {
            let status = ctx.live.fetch_todays_workout().await;
            println!("{:?}", status);
            print_status(ctx);
        }
        Commands::Start => {
            ctx.live.start_workout()?;
            print_status(ctx);
        }
        Commands::Rest => {
            ctx.live.start_rest()?;
            while ctx.live.is_counting_down() {
                let remaining = ctx.live.snapshot().rest_timer;
                println!("Rest: {}s", remaining);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            println!("Rest over");
        }
        Commands::Log { reps, weight } => {
            ctx.live
                .save_log_and_continue(SetInput { reps, weight })
                .await?;
            print_status(ctx);
        }
        Commands::Skip => {
            ctx.live.skip_to_next().await?;
            print_status(ctx);
        }
        Commands::NextExercise => {
            ctx.live.next_exercise_now()?;
            print_status(ctx);
        }
        Commands::Stop => {
            ctx.live.stop_workout();
            println!("Workout stopped");
        }
        Commands::Flush => {
            let sent = ctx.live.flush_logs().await?;
            println!("Sent {} backlogged logs", sent);
        }
        Commands::Status => print_status(ctx),
        Commands::Route { path } => {
            let target = routes::resolve(&path, ctx.auth.is_authenticated());
            println!("{} -> {}", path, target);
        }
    }
    Ok(())
}

fn print_status(ctx: &ClientContext) {
    let session = ctx.live.snapshot();
    let workout = session
        .workout
        .as_ref()
        .map(|w| w.name.as_str())
        .unwrap_or("none");
    println!("Workout: {}  Status: {:?}", workout, session.status);

    if let Some(entry) = session.current_exercise() {
        println!(
            "Exercise {}: {}  set {}/{}",
            session.current_exercise_index + 1,
            entry.exercise.name,
            session.current_set_index + 1,
            entry.set_count()
        );
    }
    if !session.logs.is_empty() {
        println!("{} set logs waiting to be sent", session.logs.len());
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(format)
        .init();
}

/// `RUST_LOG` plus debug for this crate and info for everything else.
fn log_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(
            "gym_session_client=debug"
                .parse()
                .expect("static directive is valid"),
        )
        .add_directive("info".parse().expect("static directive is valid"))
}
