// ── Contact export formats ──

use std::fmt::Write as _;

use crate::error::CoreError;
use crate::model::Contact;

pub const CSV_HEADER: [&str; 9] = [
    "name", "type", "phone", "email", "address", "hours", "website", "notes", "favorite",
];

pub fn to_json(contacts: &[Contact]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(contacts).map_err(|e| CoreError::Internal(e.to_string()))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Header row plus one row per contact, every cell quoted.
pub fn to_csv(contacts: &[Contact]) -> String {
    let mut lines = Vec::with_capacity(contacts.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for c in contacts {
        let kind = c.kind.to_string();
        let favorite = c.favorite.to_string();
        let cells = [
            c.name.as_str(),
            kind.as_str(),
            c.phone.as_str(),
            c.email.as_str(),
            c.address.as_str(),
            c.hours.as_str(),
            c.website.as_str(),
            c.notes.as_str(),
            favorite.as_str(),
        ];
        lines.push(cells.map(quote).join(","));
    }
    lines.join("\n")
}

/// A vCard 3.0 card. Empty fields are left out; line breaks inside values
/// become spaces.
pub fn to_vcard(contact: &Contact) -> String {
    fn flat(s: &str) -> String {
        s.replace(['\r', '\n'], " ")
    }

    let mut out = String::from("BEGIN:VCARD\nVERSION:3.0\n");
    let _ = writeln!(out, "FN:{}", flat(&contact.name));
    let optional = [
        ("TEL;TYPE=CELL:", &contact.phone),
        ("EMAIL:", &contact.email),
        ("ADR;TYPE=HOME:;;", &contact.address),
        ("URL:", &contact.website),
        ("NOTE:", &contact.notes),
    ];
    for (prefix, value) in optional {
        if !value.is_empty() {
            let _ = writeln!(out, "{prefix}{}", flat(value));
        }
    }
    out.push_str("END:VCARD");
    out
}

/// Suggested file name for a contact's card.
pub fn vcard_file_name(contact: &Contact) -> String {
    let base = if contact.name.trim().is_empty() {
        "contact".to_owned()
    } else {
        contact.name.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!("{base}.vcf")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ContactId, ContactKind, ContactPatch};
    use pretty_assertions::assert_eq;

    fn contact() -> Contact {
        ContactPatch {
            name: Some("Fire & Rescue".into()),
            kind: Some(ContactKind::Fire),
            phone: Some("101".into()),
            notes: Some("Say \"fire\"\nthen address".into()),
            favorite: Some(true),
            ..ContactPatch::default()
        }
        .into_contact(ContactId::from("c1".to_owned()))
    }

    #[test]
    fn csv_quotes_every_cell() {
        let csv = to_csv(&[contact()]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,type,phone,email,address,hours,website,notes,favorite"
        );
        assert_eq!(
            csv.split_once('\n').unwrap().1,
            "\"Fire & Rescue\",\"fire\",\"101\",\"\",\"\",\"\",\"\",\"Say \"\"fire\"\"\nthen address\",\"true\""
        );
    }

    #[test]
    fn vcard_skips_empty_fields() {
        let card = to_vcard(&contact());
        assert_eq!(
            card,
            "BEGIN:VCARD\nVERSION:3.0\nFN:Fire & Rescue\nTEL;TYPE=CELL:101\nNOTE:Say \"fire\" then address\nEND:VCARD"
        );
        assert_eq!(vcard_file_name(&contact()), "Fire_&_Rescue.vcf");
    }

    #[test]
    fn json_export_uses_type_key() {
        let json = to_json(&[contact()]).unwrap();
        assert!(json.contains("\"type\": \"fire\""));
        assert!(json.contains("\"id\": \"c1\""));
    }
}
