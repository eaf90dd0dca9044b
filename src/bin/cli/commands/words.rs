use anyhow::Result;
use chrono::Utc;

use lexicard_lib::words::WordEdit;

use crate::app::App;
use crate::render::terminal::word_line;
use crate::OutputFormat;

pub fn run_list(
    app: &App,
    language: Option<&str>,
    include_archived: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let language = app.language(language);
    let settings = app.lexicon.settings.load();
    let include_archived = include_archived || settings.show_archived_for(&language);
    let words = app.lexicon.words.list(&language, include_archived);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&words)?),
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("No words for {}.", language);
                return Ok(());
            }
            let now = Utc::now();
            for word in &words {
                let lists: Vec<String> = app
                    .lexicon
                    .lists
                    .lists_containing(&word.id)
                    .into_iter()
                    .map(|l| l.name)
                    .collect();
                let mut line = word_line(word, now, use_color);
                if !lists.is_empty() {
                    line.push_str(&format!("  ({})", lists.join(", ")));
                }
                println!("{}", line);
            }
        }
    }

    Ok(())
}

pub fn run_archive(app: &App, ids: &[String], archived: bool) -> Result<()> {
    let changed = app.lexicon.words.set_archived(ids, archived);
    let verb = if archived { "Archived" } else { "Unarchived" };
    println!("{} {} word(s).", verb, changed);
    Ok(())
}

pub fn run_delete(app: &App, id: &str) -> Result<()> {
    app.lexicon.words.delete(id)?;
    println!("Deleted {}.", id);
    Ok(())
}

pub fn run_edit(app: &App, id: &str, edit: WordEdit, format: &OutputFormat) -> Result<()> {
    let word = app.lexicon.words.edit(id, edit)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&word)?),
        OutputFormat::Plain => println!("Updated {} ({}).", word.word, word.id),
    }
    Ok(())
}
