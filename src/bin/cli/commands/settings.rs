use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_show(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let settings = app.lexicon.settings.load();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        OutputFormat::Plain => {
            println!("Data directory: {}", app.data_dir.display());
            println!("Daily goal:     {} words", settings.daily_goal);
            println!("Languages:");
            for lang in &settings.languages {
                let active = lang.id == settings.active_language;
                let line = format!("{}{} ({})", if active { "* " } else { "  " }, lang.label, lang.id);
                let line = if active { paint(&line, Color::BOLD, use_color) } else { line };
                println!("  {}", line);
                if let Some(list) = settings.study_list_for(&lang.id) {
                    println!("      reviewing list {}", list);
                }
            }
        }
    }

    Ok(())
}

pub fn run_goal(app: &App, goal: u32) -> Result<()> {
    let goal = app.lexicon.settings.set_daily_goal(goal)?;
    println!("Daily goal set to {} words.", goal);
    Ok(())
}

pub fn run_language(app: &App, id: &str) -> Result<()> {
    app.lexicon.settings.set_active_language(id)?;
    println!("Active language is now {}.", id);
    Ok(())
}

pub fn run_add_language(app: &App, id: &str, label: &str) -> Result<()> {
    let language = app.lexicon.settings.add_language(id, label)?;
    println!("Added {} ({}).", language.label, language.id);
    Ok(())
}

pub fn run_remove_language(app: &App, id: &str) -> Result<()> {
    app.lexicon.settings.remove_language(id)?;
    println!("Removed {}. Its words are kept.", id);
    Ok(())
}

pub fn run_show_archived(app: &App, language: Option<&str>, show: bool) -> Result<()> {
    let language = app.language(language);
    app.lexicon.settings.set_show_archived(&language, show)?;
    println!("Archived words {} for {}.", if show { "shown" } else { "hidden" }, language);
    Ok(())
}

pub fn run_missed_only(app: &App, language: Option<&str>, only: bool) -> Result<()> {
    let language = app.language(language);
    app.lexicon.settings.set_missed_today_only(&language, only)?;
    println!(
        "Reviewing {} for {}.",
        if only { "only words missed today" } else { "all due words" },
        language
    );
    Ok(())
}

pub fn run_study_list(app: &App, list: Option<&str>, language: Option<&str>) -> Result<()> {
    let language = app.language(language);
    if let Some(list_id) = list {
        let known = app.lexicon.lists.get(list_id).is_some_and(|l| l.belongs_to(&language));
        if !known {
            anyhow::bail!("No list '{}' for {}", list_id, language);
        }
    }
    app.lexicon.settings.set_study_list_filter(&language, list)?;
    match list {
        Some(id) => println!("Reviewing list {} for {}.", id, language),
        None => println!("Reviewing all lists for {}.", language),
    }
    Ok(())
}

pub fn run_reset(app: &App, confirmed: bool) -> Result<()> {
    if !confirmed {
        anyhow::bail!("This deletes all words, lists and activity; pass --yes to confirm");
    }
    if !app.lexicon.settings.reset_all() {
        anyhow::bail!("Reset was only partially written");
    }
    println!("All data reset.");
    Ok(())
}
