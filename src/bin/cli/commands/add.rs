use anyhow::{bail, Result};

use lexicard_lib::capture::EntryFields;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    text: &str,
    language: Option<&str>,
    fields: EntryFields,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let language = app.language(language);

    let entry = match app.lexicon.create_entry(text, &language, fields) {
        Ok(entry) => entry,
        Err(rejection) => {
            let message = format!("Not added: {}", rejection);
            eprintln!("{}", paint(&message, Color::RED, use_color));
            bail!(rejection);
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputFormat::Plain => {
            println!(
                "Added {} ({}) as {}",
                paint(&entry.word, Color::BOLD, use_color),
                entry.language,
                paint(&entry.id, Color::GRAY, use_color)
            );
        }
    }

    Ok(())
}
