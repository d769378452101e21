//*** START FILE: src/parsing/csv_loader.rs ***//
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::corpus::{Candidate, SourceSentence};

/// Splits one CSV line into fields.
///
/// A double quote toggles a quoted region in which commas are literal. The
/// quote characters themselves are dropped.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Parses corpus CSV text: `id, source sentence, translation, translation, ...`.
///
/// The first non-blank line is the header and names each translation column.
/// Rows with fewer than three fields are skipped, blank translations are
/// dropped, and a repeated id keeps its first row.
pub fn parse_csv_to_corpus(csv_text: &str) -> Result<Vec<SourceSentence>> {
    let lines: Vec<&str> = csv_text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(Error::InputFormat(
            "CSV must have a header row and at least one data row".to_string(),
        ));
    }

    let header_fields = split_csv_line(lines[0]);
    let translation_headers: Vec<&str> = header_fields.iter().skip(2).map(|h| h.trim()).collect();

    let mut corpus = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line_no, line) in lines.iter().enumerate().skip(1) {
        let fields = split_csv_line(line);
        if fields.len() < 3 {
            debug!("Skipping CSV line {} with {} fields", line_no + 1, fields.len());
            continue;
        }

        let id = fields[0].trim().to_string();
        if !seen_ids.insert(id.clone()) {
            warn!("Duplicate sentence id '{}' on CSV line {}; keeping the first", id, line_no + 1);
            continue;
        }

        let translations = fields[2..]
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| {
                let header = match translation_headers.get(index) {
                    Some(h) if !h.is_empty() => h.to_string(),
                    _ => format!("Col{}", index + 2),
                };
                Candidate::from_corpus(text.trim(), &header, index)
            })
            .collect();

        corpus.push(SourceSentence {
            id,
            source_text: fields[1].trim().to_string(),
            translations,
        });
    }

    if corpus.is_empty() {
        return Err(Error::InputFormat(
            "no valid rows; expected: ID, sentence, translation1, translation2, ...".to_string(),
        ));
    }

    Ok(corpus)
}

//*** END FILE: src/parsing/csv_loader.rs ***//
