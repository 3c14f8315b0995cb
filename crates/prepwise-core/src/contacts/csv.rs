// ── Contact CSV parsing ──
//
// Minimal RFC-4180-style reader: double-quoted fields, `""` for an
// embedded quote, split on unquoted commas, cells trimmed. Records never
// span lines. The first non-blank line is the header; columns are mapped
// by name so their order does not matter.

use crate::error::CoreError;
use crate::model::{ContactKind, ContactPatch};

/// Split one line into trimmed cells.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    cells.push(cur);

    cells.into_iter().map(|c| c.trim().to_owned()).collect()
}

#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    kind: Option<usize>,
    phone: Option<usize>,
    email: Option<usize>,
    address: Option<usize>,
    hours: Option<usize>,
    website: Option<usize>,
    notes: Option<usize>,
    favorite: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let mut cols = Self::default();
        for (i, h) in header.iter().enumerate() {
            let slot = match h.to_ascii_lowercase().as_str() {
                "name" => &mut cols.name,
                "type" => &mut cols.kind,
                "phone" => &mut cols.phone,
                "email" => &mut cols.email,
                "address" => &mut cols.address,
                "hours" => &mut cols.hours,
                "website" => &mut cols.website,
                "notes" => &mut cols.notes,
                "favorite" => &mut cols.favorite,
                _ => continue,
            };
            slot.get_or_insert(i);
        }
        cols
    }
}

/// Cell for a column that exists in the header. Short rows read as empty.
fn cell(row: &[String], col: Option<usize>) -> Option<String> {
    col.map(|i| row.get(i).cloned().unwrap_or_default())
}

fn row_to_patch(row: &[String], cols: &Columns) -> ContactPatch {
    ContactPatch {
        name: cell(row, cols.name),
        kind: cell(row, cols.kind).map(|k| {
            if k.is_empty() {
                ContactKind::Police
            } else {
                ContactKind::from_wire(Some(&k))
            }
        }),
        phone: cell(row, cols.phone),
        email: cell(row, cols.email),
        address: cell(row, cols.address),
        hours: cell(row, cols.hours),
        website: cell(row, cols.website),
        notes: cell(row, cols.notes),
        favorite: cell(row, cols.favorite).map(|f| f.eq_ignore_ascii_case("true")),
    }
}

/// Parse CSV text into patches. Only columns named in the header become
/// present fields. Blank lines are skipped. Text without a data row is a
/// validation error.
pub fn parse_contacts(text: &str) -> Result<Vec<ContactPatch>, CoreError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .map(parse_line)
        .ok_or_else(|| CoreError::validation("CSV input is empty"))?;
    let cols = Columns::from_header(&header);
    if cols.name.is_none() {
        return Err(CoreError::validation("CSV header has no `name` column"));
    }

    let patches: Vec<ContactPatch> = lines
        .map(|line| row_to_patch(&parse_line(line), &cols))
        .collect();
    if patches.is_empty() {
        return Err(CoreError::validation("CSV input has a header but no rows"));
    }
    Ok(patches)
}
