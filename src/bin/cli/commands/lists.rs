use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_list(
    app: &App,
    language: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let language = app.language(language);
    let lists = app.lexicon.lists.list_for_language(&language);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lists)?),
        OutputFormat::Plain => {
            if lists.is_empty() {
                println!("No lists for {}.", language);
                return Ok(());
            }
            for list in &lists {
                let marker = if list.is_default() { " [default]" } else { "" };
                println!(
                    "{}  {} ({} words){}",
                    paint(&list.id, Color::GRAY, use_color),
                    paint(&list.name, Color::CYAN, use_color),
                    list.word_ids.len(),
                    marker
                );
            }
        }
    }

    Ok(())
}

pub fn run_create(
    app: &App,
    name: &str,
    language: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let language = app.language(language);
    let list = app
        .lexicon
        .lists
        .create_list(&language, name)
        .context("Study lists are unavailable right now")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Plain => println!("Created {} ({}).", list.name, list.id),
    }
    Ok(())
}

pub fn run_rename(app: &App, id: &str, name: &str) -> Result<()> {
    let list = app.lexicon.lists.rename_list(id, name)?;
    println!("List {} is now named {}.", list.id, list.name);
    Ok(())
}

pub fn run_delete(app: &App, id: &str) -> Result<()> {
    app.lexicon.lists.delete_list(id)?;
    println!("Deleted list {}.", id);
    Ok(())
}

pub fn run_assign(app: &App, list_id: &str, word_id: &str, member: bool) -> Result<()> {
    if member && app.lexicon.words.get(word_id).is_none() {
        anyhow::bail!("Word '{}' not found", word_id);
    }
    let changed = app.lexicon.lists.set_membership(list_id, word_id, member)?;
    let action = match (member, changed) {
        (true, true) => "Added",
        (false, true) => "Removed",
        _ => "Unchanged:",
    };
    println!("{} {} {} {}.", action, word_id, if member { "to" } else { "from" }, list_id);
    Ok(())
}
