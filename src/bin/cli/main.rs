mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lexicard-cli", about = "Vocabulary capture and spaced repetition", version)]
struct Cli {
    /// Directory holding the record files (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/lexicard.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word
    Add {
        /// Word or phrase
        text: String,
        /// Language id (default: active language)
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long, short)]
        translation: Option<String>,
        #[arg(long)]
        pronunciation: Option<String>,
        /// Link to a source or dictionary entry
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        hint: Option<String>,
    },

    /// Show words due for review
    Due {
        #[arg(long, short)]
        language: Option<String>,
        /// Words reviewed today instead of due words
        #[arg(long)]
        retake: bool,
        /// Only words answered wrong today (default: saved preference)
        #[arg(long)]
        missed: bool,
        /// Restrict to a study list (default: saved preference)
        #[arg(long)]
        list: Option<String>,
        /// Prefer a word other than this id for the next card
        #[arg(long)]
        after: Option<String>,
    },

    /// Record a review answer
    Answer {
        /// Word id
        id: String,
        /// The answer was wrong
        #[arg(long)]
        wrong: bool,
    },

    /// Dashboard statistics
    Stats {
        #[arg(long, short)]
        language: Option<String>,
    },

    /// Give every word a unique id and fix list references
    Migrate,

    /// Remove repeated and stale ids from study lists
    Repair,

    /// Word maintenance
    #[command(subcommand)]
    Words(WordsCommand),

    /// Study list maintenance
    #[command(subcommand)]
    Lists(ListsCommand),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum WordsCommand {
    /// List words of a language
    List {
        #[arg(long, short)]
        language: Option<String>,
        /// Include archived words
        #[arg(long)]
        archived: bool,
    },
    /// Archive words
    Archive { ids: Vec<String> },
    /// Unarchive words
    Unarchive { ids: Vec<String> },
    /// Delete a word and remove it from every list
    Delete { id: String },
    /// Edit a word; blank optional fields are cleared
    Edit {
        id: String,
        #[arg(long)]
        word: Option<String>,
        #[arg(long)]
        translation: Option<String>,
        #[arg(long)]
        pronunciation: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        hint: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListsCommand {
    /// Lists of a language
    List {
        #[arg(long, short)]
        language: Option<String>,
    },
    /// Create a custom list
    Create {
        name: String,
        #[arg(long, short)]
        language: Option<String>,
    },
    Rename { id: String, name: String },
    Delete { id: String },
    /// Add a word to a list
    Assign { list: String, word: String },
    /// Remove a word from a list
    Unassign { list: String, word: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    /// Set the daily goal (0 resets to the default)
    Goal { goal: u32 },
    /// Set the active language
    Language { id: String },
    AddLanguage { id: String, label: String },
    RemoveLanguage { id: String },
    /// Show archived words in `words list` by default
    ShowArchived {
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// Review only words missed today by default
    MissedOnly {
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// Review one study list by default (omit the id to clear)
    StudyList {
        list: Option<String>,
        #[arg(long, short)]
        language: Option<String>,
    },
    /// Delete all words, lists and activity
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir.as_deref(), cli.config.as_deref())?;
    let format = &cli.format;

    match cli.command {
        Command::Add {
            text,
            language,
            translation,
            pronunciation,
            reference,
            hint,
        } => {
            let fields = lexicard_lib::capture::EntryFields {
                translation,
                pronunciation,
                reference,
                hint,
            };
            commands::add::run(&app, &text, language.as_deref(), fields, format, use_color)?;
        }
        Command::Due {
            language,
            retake,
            missed,
            list,
            after,
        } => {
            commands::review::run_due(
                &app,
                language.as_deref(),
                retake,
                missed,
                list,
                after.as_deref(),
                format,
                use_color,
            )?;
        }
        Command::Answer { id, wrong } => {
            commands::review::run_answer(&app, &id, !wrong, format, use_color)?;
        }
        Command::Stats { language } => {
            commands::review::run_stats(&app, language.as_deref(), format, use_color)?;
        }
        Command::Migrate => commands::maintenance::run_migrate(&app, format)?,
        Command::Repair => commands::maintenance::run_repair(&app, format)?,
        Command::Words(subcmd) => match subcmd {
            WordsCommand::List { language, archived } => {
                commands::words::run_list(&app, language.as_deref(), archived, format, use_color)?;
            }
            WordsCommand::Archive { ids } => commands::words::run_archive(&app, &ids, true)?,
            WordsCommand::Unarchive { ids } => commands::words::run_archive(&app, &ids, false)?,
            WordsCommand::Delete { id } => commands::words::run_delete(&app, &id)?,
            WordsCommand::Edit {
                id,
                word,
                translation,
                pronunciation,
                reference,
                hint,
            } => {
                let edit = lexicard_lib::words::WordEdit {
                    word,
                    translation,
                    pronunciation,
                    reference,
                    hint,
                };
                commands::words::run_edit(&app, &id, edit, format)?;
            }
        },
        Command::Lists(subcmd) => match subcmd {
            ListsCommand::List { language } => {
                commands::lists::run_list(&app, language.as_deref(), format, use_color)?;
            }
            ListsCommand::Create { name, language } => {
                commands::lists::run_create(&app, &name, language.as_deref(), format)?;
            }
            ListsCommand::Rename { id, name } => commands::lists::run_rename(&app, &id, &name)?,
            ListsCommand::Delete { id } => commands::lists::run_delete(&app, &id)?,
            ListsCommand::Assign { list, word } => {
                commands::lists::run_assign(&app, &list, &word, true)?;
            }
            ListsCommand::Unassign { list, word } => {
                commands::lists::run_assign(&app, &list, &word, false)?;
            }
        },
        Command::Settings(subcmd) => match subcmd {
            SettingsCommand::Show => commands::settings::run_show(&app, format, use_color)?,
            SettingsCommand::Goal { goal } => commands::settings::run_goal(&app, goal)?,
            SettingsCommand::Language { id } => commands::settings::run_language(&app, &id)?,
            SettingsCommand::AddLanguage { id, label } => {
                commands::settings::run_add_language(&app, &id, &label)?;
            }
            SettingsCommand::RemoveLanguage { id } => {
                commands::settings::run_remove_language(&app, &id)?;
            }
            SettingsCommand::ShowArchived { language, off } => {
                commands::settings::run_show_archived(&app, language.as_deref(), !off)?;
            }
            SettingsCommand::MissedOnly { language, off } => {
                commands::settings::run_missed_only(&app, language.as_deref(), !off)?;
            }
            SettingsCommand::StudyList { list, language } => {
                commands::settings::run_study_list(&app, list.as_deref(), language.as_deref())?;
            }
            SettingsCommand::Reset { yes } => commands::settings::run_reset(&app, yes)?,
        },
    }

    Ok(())
}
