//! Export of the response list
//!
//! Two read-only renderings of the stored responses:
//! - a delimited table with one column per configured slot
//! - a plain-text dump listing each response's own slots

use crate::error::ExportError;
use qnr_model::Response;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated table with a header row
    Csv,
    /// Human-readable dump
    Text,
}

impl ExportFormat {
    /// Pick the format from a file extension (`.csv` → table, else text)
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Text,
        }
    }
}

/// Render the delimited table
///
/// Columns are `Participant Number`, `Rating 1..N`, `Open Answer 1..M` where
/// `N`/`M` are the configured slot counts. Slots missing from a response are
/// written as empty cells.
#[must_use]
pub fn render_csv(responses: &[Response], rating_slots: usize, open_slots: usize) -> String {
    let mut header = vec!["Participant Number".to_string()];
    header.extend((1..=rating_slots).map(|i| format!("Rating {i}")));
    header.extend((1..=open_slots).map(|i| format!("Open Answer {i}")));

    let mut out = String::new();
    push_row(&mut out, &header);

    for response in responses {
        let mut row = Vec::with_capacity(header.len());
        row.push(response.participant_number.clone());
        row.extend(
            (0..rating_slots).map(|slot| response.rating(slot).map(ToString::to_string).unwrap_or_default()),
        );
        row.extend(
            (0..open_slots).map(|slot| response.open_answer(slot).unwrap_or_default().to_string()),
        );
        push_row(&mut out, &row);
    }
    out
}

fn push_row(out: &mut String, cells: &[String]) {
    let line = cells
        .iter()
        .map(|cell| csv_escape(cell))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the plain-text dump
///
/// Lists every slot actually stored in each response, in stored order.
#[must_use]
pub fn render_text(responses: &[Response]) -> String {
    let mut out = String::new();
    for response in responses {
        let _ = writeln!(out, "Participant: {}", response.participant_number);
        out.push_str("Ratings:\n");
        for (key, value) in &response.ratings {
            let _ = writeln!(out, "  {key}: {value}");
        }
        out.push_str("Open Answers:\n");
        for (key, value) in &response.open_answers {
            let _ = writeln!(out, "  {key}: {value}");
        }
        out.push_str(&"-".repeat(40));
        out.push('\n');
    }
    out
}

/// Write responses to `path` in the format implied by its extension
///
/// # Errors
/// - `ExportError::NoResponses` when `responses` is empty
/// - `ExportError::Io` if the file cannot be written
pub fn export_to_path(
    responses: &[Response],
    path: &Path,
    rating_slots: usize,
    open_slots: usize,
) -> Result<ExportFormat, ExportError> {
    if responses.is_empty() {
        return Err(ExportError::NoResponses);
    }

    let format = ExportFormat::from_path(path);
    let rendered = match format {
        ExportFormat::Csv => render_csv(responses, rating_slots, open_slots),
        ExportFormat::Text => render_text(responses),
    };

    fs::write(path, rendered).map_err(|e| ExportError::io_error(path, e))?;
    tracing::info!("Exported {} responses to {}", responses.len(), path.display());
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qnr_model::RatingValue;

    fn sample() -> Vec<Response> {
        vec![
            Response::new(
                "a1",
                [RatingValue::Score(4), RatingValue::empty()],
                ["likes it, mostly".to_string()],
            ),
            Response::new("b2", [RatingValue::from("n/a")], ["said \"no\"".to_string()]),
        ]
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out.txt")), ExportFormat::Text);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Text);
    }

    #[test]
    fn csv_uses_configured_columns() {
        let csv = render_csv(&sample(), 2, 1);
        assert_eq!(
            csv,
            "Participant Number,Rating 1,Rating 2,Open Answer 1\r\n\
             a1,4,,\"likes it, mostly\"\r\n\
             b2,n/a,,\"said \"\"no\"\"\"\r\n"
        );
    }

    #[test]
    fn text_dump_lists_stored_slots() {
        let text = render_text(&sample()[..1]);
        assert_eq!(
            text,
            "Participant: a1\n\
             Ratings:\n  rating_1: 4\n  rating_2: \n\
             Open Answers:\n  open_1: likes it, mostly\n\
             ----------------------------------------\n"
        );
    }

    #[test]
    fn export_rejects_empty_list() {
        let result = export_to_path(&[], Path::new("unused.csv"), 1, 1);
        assert!(matches!(result, Err(ExportError::NoResponses)));
    }
}
