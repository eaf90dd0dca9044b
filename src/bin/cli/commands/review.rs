use anyhow::{Context, Result};
use chrono::Utc;

use lexicard_lib::review::{format_interval, pick_next, PoolFilter};

use crate::app::App;
use crate::render::terminal::{heatmap_row, paint, progress_bar, word_line, Color};
use crate::OutputFormat;

#[allow(clippy::too_many_arguments)]
pub fn run_due(
    app: &App,
    language: Option<&str>,
    retake: bool,
    missed: bool,
    list: Option<String>,
    after: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let language = app.language(language);
    let settings = app.lexicon.settings.load();
    let filter = PoolFilter {
        retake,
        missed_today_only: missed || settings.missed_today_only_for(&language),
        list_id: list.or_else(|| settings.study_list_for(&language).map(str::to_string)),
    };

    let pool = app.lexicon.review.due_pool(&language, &filter);
    let next = pick_next(&pool, after);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "language": language,
                "count": pool.len(),
                "next": next,
                "words": pool,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let Some(next) = next else {
                println!("All caught up for {}.", language);
                let reviewed = app.lexicon.review.reviewed_today_count(&language);
                if !retake && reviewed > 0 {
                    println!("{} word(s) reviewed today; use --retake to go again.", reviewed);
                }
                return Ok(());
            };
            println!("{} due for {}", pool.len(), language);
            println!(
                "Next: {}",
                paint(&format!("{} ({})", next.word, next.id), Color::BOLD, use_color)
            );
            if let Some(hint) = &next.hint {
                println!("Hint: {}", hint);
            }
            println!();
            let now = Utc::now();
            for word in &pool {
                println!("  {}", word_line(word, now, use_color));
            }
        }
    }

    Ok(())
}

pub fn run_answer(
    app: &App,
    id: &str,
    correct: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = app
        .lexicon
        .answer(id, correct)
        .with_context(|| format!("Word '{}' not found or store unavailable", id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&word)?),
        OutputFormat::Plain => {
            let (verdict, color) = if correct {
                ("correct", Color::GREEN)
            } else {
                ("wrong", Color::RED)
            };
            let days = word
                .next_review
                .map(|next| (next - Utc::now()).num_hours().max(0) / 24)
                .unwrap_or(0);
            println!(
                "{}: {}, difficulty {:.1}, next review {}",
                word.word,
                paint(verdict, color, use_color),
                word.difficulty,
                format_interval(days)
            );
        }
    }

    Ok(())
}

pub fn run_stats(
    app: &App,
    language: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let language = app.language(language);
    let settings = app.lexicon.settings.load();
    let stats = app.lexicon.review.dashboard(&language, settings.daily_goal);
    let heatmap = app.lexicon.activity.heatmap();
    let recent = app.lexicon.activity.recent_sessions();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "heatmap": heatmap,
                "recentSessions": recent,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint(&language, Color::BOLD, use_color));
            println!("  Words:     {} ({} learned)", stats.total, stats.learned);
            println!("  Accuracy:  {}%", stats.accuracy);
            println!("  Due:       {}", stats.due);
            println!(
                "  Today:     {}/{} {} {}%",
                stats.goal.done,
                stats.goal.goal,
                progress_bar(stats.goal.percent, 20),
                stats.goal.percent
            );
            println!(
                "  Streak:    {} day(s), longest {}, {} session(s) this week",
                stats.streak.streak, stats.streak.longest, stats.streak.this_week
            );
            println!("  Activity:  {}", heatmap_row(&heatmap, use_color));
            if !recent.is_empty() {
                println!();
                println!("Recent sessions");
                for act in &recent {
                    println!(
                        "  {}  {} session(s), {} word(s), {} min",
                        paint(&act.date.to_string(), Color::CYAN, use_color),
                        act.sessions,
                        act.words,
                        act.minutes
                    );
                }
            }
        }
    }

    Ok(())
}
