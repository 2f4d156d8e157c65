use std::collections::HashMap;

use lunaris_core::{AppViewModel, LocalId, SubmissionRowView};

/// Prints status lines as they change, one line per submission, mirroring
/// the per-job status paragraphs of the original web front end.
#[derive(Default)]
pub struct StatusPrinter {
    last_lines: HashMap<LocalId, String>,
    last_field_count: Option<usize>,
    last_schema_error: Option<String>,
}

impl StatusPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) {
        if view.schema_error != self.last_schema_error {
            if let Some(message) = &view.schema_error {
                println!("Unable to load available fields: {message}");
            }
            self.last_schema_error = view.schema_error.clone();
        }
        if view.field_count != self.last_field_count {
            if let Some(count) = view.field_count {
                println!("Loaded {count} field names.");
            }
            self.last_field_count = view.field_count;
        }
        for row in &view.rows {
            let line = compose(row);
            if self.last_lines.get(&row.local_id) != Some(&line) {
                println!("{line}");
                self.last_lines.insert(row.local_id, line);
            }
        }
    }

    pub fn summary(&self, view: &AppViewModel) {
        let done = view.rows.iter().filter(|row| row.completed).count();
        let succeeded = view.rows.iter().filter(|row| row.succeeded).count();
        println!(
            "All jobs finished: {} completed, {} succeeded, {} failed.",
            done,
            succeeded,
            view.rows.len() - succeeded
        );
    }
}

fn compose(row: &SubmissionRowView) -> String {
    let mut line = row.line.clone();
    if let Some(path) = &row.result_path {
        line.push_str(&format!(" Results saved to {path}."));
    }
    if row.completed && !row.succeeded {
        for snag in &row.snag_messages {
            line.push_str(&format!("\n  snag: {snag}"));
        }
    }
    line
}
