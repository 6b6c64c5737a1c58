//! JSONL file I/O for tickets.
//!
//! Each line in the JSONL file is one complete `Ticket`.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Result, TicketError};
use crate::model::Ticket;

/// Load tickets from a JSONL file.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `JsonlParse` if any line is invalid.
pub fn load(path: &Path) -> Result<Vec<Ticket>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TicketError::FileNotFound(path.to_path_buf())
        } else {
            TicketError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);

    let mut tickets = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let ticket: Ticket =
            serde_json::from_str(trimmed).map_err(|e| TicketError::JsonlParse {
                line: line_num + 1,
                reason: e.to_string(),
            })?;
        tickets.push(ticket);
    }

    Ok(tickets)
}

/// Save tickets to a JSONL file with atomic write.
///
/// Uses write-to-temp + rename for atomicity.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save(path: &Path, tickets: &[&Ticket]) -> Result<()> {
    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = fs::File::create(&tmp_path)?;

    for ticket in tickets {
        let json = serde_json::to_string(ticket)?;
        writeln!(file, "{json}")?;
    }

    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    Ok(())
}
