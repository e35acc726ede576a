//! NoorNest - Ramadan Companion
//!
//! Command line entry point.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use noornest::content::{CategoryFilter, ContentKind, RemoteContentStore};
use noornest::gamification::{LedgerEvent, CATALOG};
use noornest::progress::{HabitKey, ResetConfirmation};
use noornest::storage::config::load_config;
use noornest::{AppConfig, Journey, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "noornest", version, about = "Ramadan habit and Quran tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show progress, points and level
    Status,
    /// Toggle a habit on a day (1-30)
    Habit { day: u8, habit: HabitKey },
    /// Toggle a Juz as read (1-30)
    Juz { number: u8 },
    /// Replace the reflection notes of a Juz
    Note { number: u8, text: String },
    /// Record the current streak in days
    Streak { days: u32 },
    /// Clear all habit and Quran progress
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// List badges and whether they are unlocked
    Badges,
    /// List printables or traditions
    Content {
        kind: ContentKind,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::debug!("Starting NoorNest v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Status) {
        Command::Content { kind, category } => show_content(&config.remote, kind, category).await?,
        Command::Status => print_status(&open_journey(&config)?),
        Command::Habit { day, habit } => {
            let mut journey = open_journey(&config)?;
            let Some(outcome) = journey.toggle_habit(day, habit) else {
                bail!("day must be between 1 and 30");
            };
            let checked = journey
                .habits()
                .document()
                .day(day)
                .is_some_and(|d| d.habits.get(habit));
            println!(
                "Day {}: {} {}",
                day,
                habit.label(),
                if checked { "done" } else { "cleared" }
            );
            if outcome.should_celebrate() {
                println!("🎉 Perfect day! Every habit on day {} is complete.", day);
            }
            print_events(&outcome.events);
        }
        Command::Juz { number } => {
            let mut journey = open_journey(&config)?;
            let Some(outcome) = journey.toggle_juz(number) else {
                bail!("Juz number must be between 1 and 30");
            };
            if outcome.should_celebrate() {
                println!("🎉 Juz {} complete!", number);
            } else {
                println!("Juz {} marked unread", number);
            }
            print_events(&outcome.events);
        }
        Command::Note { number, text } => {
            if !open_journey(&config)?.set_juz_notes(number, text) {
                bail!("Juz number must be between 1 and 30");
            }
            println!("Notes for Juz {} saved", number);
        }
        Command::Streak { days } => {
            let events = open_journey(&config)?.set_streak(days);
            println!("Streak: {} days", days);
            print_events(&events);
        }
        Command::Reset { yes } => {
            let confirmation = if yes {
                ResetConfirmation::Confirmed
            } else {
                ResetConfirmation::Declined
            };
            if open_journey(&config)?.reset_all(confirmation) {
                println!("All habit and Quran progress cleared");
            } else {
                println!("Nothing changed. Pass --yes to confirm the reset.");
            }
        }
        Command::Badges => {
            let journey = open_journey(&config)?;
            let stats = journey.ledger().stats();
            for badge in CATALOG.iter() {
                let mark = if stats.has_badge(badge.id) { "✔" } else { " " };
                println!("[{}] {} {}: {}", mark, badge.icon, badge.name, badge.description);
            }
        }
    }

    Ok(())
}

/// Open the local store and load every progress document.
fn open_journey(config: &AppConfig) -> anyhow::Result<Journey> {
    let store = SqliteStore::open(&config.database_path()).context("failed to open local store")?;
    Ok(Journey::open(Arc::new(store), config.rewards.clone()))
}

fn print_status(journey: &Journey) {
    let habits = journey.habits().stats();
    let quran = journey.quran().stats();
    let stats = journey.ledger().stats();

    println!(
        "Habits:  {:.0}% ({} acts, {} perfect days)",
        habits.overall_progress_percent, habits.total_acts_completed, habits.perfect_day_count
    );
    println!(
        "Quran:   {}/30 Juz ({:.0}%)",
        quran.completed_juz_count, quran.completion_percent
    );
    println!(
        "Level {}: {} points ({:.0}% to next level)",
        stats.level,
        stats.points,
        stats.level_progress_percent()
    );
    println!("Streak:  {} days, {} badges", stats.streak, stats.badges.len());
}

fn print_events(events: &[LedgerEvent]) {
    for event in events {
        match event {
            LedgerEvent::PointsAwarded { amount, total } => {
                println!("+{} points ({} total)", amount, total)
            }
            LedgerEvent::LevelUp { to, .. } => println!("Level up! You reached level {}", to),
            LedgerEvent::BadgeUnlocked(id) => {
                let badge = id.definition();
                println!("Badge unlocked: {} {}", badge.icon, badge.name)
            }
        }
    }
}

async fn show_content(
    settings: &noornest::storage::RemoteSettings,
    kind: ContentKind,
    category: CategoryFilter,
) -> anyhow::Result<()> {
    let store = RemoteContentStore::from_settings(settings)?;
    if let Err(e) = store.refresh(kind).await {
        tracing::warn!("Showing cached {}: {}", kind, e);
    }

    match kind {
        ContentKind::Printables => {
            for item in store.printables_in(category) {
                let premium = if item.is_premium { " [premium]" } else { "" };
                println!(
                    "{} ({}){}: {}",
                    item.title,
                    item.category.as_str(),
                    premium,
                    item.description
                );
            }
        }
        ContentKind::Traditions => {
            for item in store.traditions() {
                println!("{} {}: {}", item.icon, item.title, item.description);
            }
        }
    }

    store.close();
    Ok(())
}
