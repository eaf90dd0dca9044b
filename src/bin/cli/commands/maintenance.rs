use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run_migrate(app: &App, format: &OutputFormat) -> Result<()> {
    let migration = app.lexicon.migrate();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "changed": migration.changed,
                "assigned": migration.assigned,
                "splits": migration.splits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if !migration.changed {
                println!("All word ids are unique.");
                return Ok(());
            }
            println!("Assigned {} missing id(s).", migration.assigned);
            for (old_id, new_ids) in &migration.splits {
                println!("Split {} -> {}", old_id, new_ids.join(", "));
            }
        }
    }

    Ok(())
}

pub fn run_repair(app: &App, format: &OutputFormat) -> Result<()> {
    // Lists can only be pruned reliably once ids are unique
    app.lexicon.migrate();
    let repair = app.lexicon.lists.repair();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "deduplicated": repair.deduplicated,
                "pruned": repair.pruned,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Removed {} repeated and {} stale list entr{}.",
                repair.deduplicated,
                repair.pruned,
                if repair.pruned == 1 { "y" } else { "ies" }
            );
        }
    }

    Ok(())
}
