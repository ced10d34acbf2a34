//! History command handler.

use vidgrab_core::ports::HistoryStorePort;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// Execute the history command.
pub fn execute(ctx: &CliContext, limit: usize, json: bool) -> Result<(), CliError> {
    let history = ctx.history();
    let rows = history.recent(limit);

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::Io(format!("Failed to encode history: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if rows.is_empty() {
        println!("No downloads recorded yet.");
        return Ok(());
    }

    println!("{:<19}  {:<40}  {:<12}  URL", "WHEN", "TITLE", "FORMAT");
    print_separator(100);
    for entry in &rows {
        println!(
            "{:<19}  {:<40}  {:<12}  {}",
            entry.timestamp,
            truncate_string(&entry.title, 40),
            truncate_string(&entry.format_id, 12),
            entry.url
        );
    }
    print_separator(100);
    println!(
        "Showing {} of {} entries ({})",
        rows.len(),
        history.load().len(),
        history.path().display()
    );
    Ok(())
}
