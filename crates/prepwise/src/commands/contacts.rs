//! Contact directory command handlers.

use std::path::Path;

use tabled::Tabled;

use prepwise_api::BackendClient;
use prepwise_core::contacts::export;
use prepwise_core::{Contact, ContactBook, ContactMode, ContactPatch, ContactView, ImportReport};

use crate::cli::{
    ContactFields, ContactsArgs, ContactsCommand, ExportFormat, GlobalOpts, ImportFormat,
};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "★")]
    favorite: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Contact> for ContactRow {
    fn from(c: &Contact) -> Self {
        Self {
            favorite: if c.favorite { "★" } else { "" }.into(),
            name: c.name.clone(),
            kind: c.kind.to_string(),
            phone: util::or_dash(&c.phone).to_owned(),
            hours: util::or_dash(&c.hours).to_owned(),
            id: c.id.to_string(),
        }
    }
}

fn detail(c: &Contact) -> String {
    [
        format!("ID:       {}", c.id),
        format!("Name:     {}", c.name),
        format!("Type:     {}", c.kind),
        format!("Phone:    {}", util::or_dash(&c.phone)),
        format!("Email:    {}", util::or_dash(&c.email)),
        format!("Address:  {}", util::or_dash(&c.address)),
        format!("Hours:    {}", util::or_dash(&c.hours)),
        format!("Website:  {}", util::or_dash(&c.website)),
        format!("Notes:    {}", util::or_dash(&c.notes)),
        format!("Favorite: {}", c.favorite),
    ]
    .join("\n")
}

fn report_line(report: &ImportReport) -> String {
    format!(
        "Imported: {} new, {} merged, {} skipped",
        report.inserted, report.merged, report.skipped
    )
}

fn patch_from(
    name: Option<String>,
    phone: Option<String>,
    fields: ContactFields,
) -> Result<ContactPatch, CliError> {
    Ok(ContactPatch {
        name,
        phone,
        kind: fields
            .kind
            .as_deref()
            .map(util::parse_contact_kind)
            .transpose()?,
        email: fields.email,
        address: fields.address,
        hours: fields.hours,
        website: fields.website,
        notes: fields.notes,
        favorite: fields.favorite,
    })
}

fn resolve(book: &ContactBook, query: &str) -> Result<Contact, CliError> {
    book.resolve(query)
        .cloned()
        .ok_or_else(|| CliError::not_found("contact", query, "contacts list"))
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    ctx: &Context,
    args: ContactsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cache = ctx.profile.contact_cache();
    let backend: Option<&BackendClient> = (!args.offline).then(|| ctx.portal.backend());

    let mut book = match backend {
        Some(_) => ctx.portal.open_contacts(cache).await,
        None => ContactBook::open_local(cache),
    };
    if book.mode() == ContactMode::Local && !args.offline {
        output::note("Server unreachable: working from the local directory.", global.quiet);
    }

    match args.command {
        ContactsCommand::List { search, kind } => {
            let view = ContactView {
                search,
                kind: kind.as_deref().map(util::parse_contact_kind).transpose()?,
            };
            let contacts = match backend {
                Some(backend) => book.search(backend, &view).await,
                None => book.view(&view).into_iter().cloned().collect(),
            };
            let out = output::render_list(
                &global.output,
                &contacts,
                |c| ContactRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContactsCommand::Show { contact } => {
            let contact = resolve(&book, &contact)?;
            let out =
                output::render_single(&global.output, &contact, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContactsCommand::Add {
            name,
            phone,
            fields,
        } => {
            let patch = patch_from(Some(name), Some(phone), fields)?;
            let saved = book.save(backend, patch, None).await?;
            output::note(
                &format!("Saved {} ({}, {})", saved.name, saved.id, book.mode()),
                global.quiet,
            );
            Ok(())
        }

        ContactsCommand::Edit {
            contact,
            name,
            phone,
            fields,
        } => {
            let existing = resolve(&book, &contact)?;
            let mut patch = patch_from(name, phone, fields)?;
            // Unset fields keep their current values.
            patch.name.get_or_insert_with(|| existing.name.clone());
            patch.phone.get_or_insert_with(|| existing.phone.clone());
            patch.email.get_or_insert_with(|| existing.email.clone());
            let saved = book.save(backend, patch, Some(&existing.id)).await?;
            output::note(&format!("Updated {}", saved.name), global.quiet);
            Ok(())
        }

        ContactsCommand::Remove { contact } => {
            let existing = resolve(&book, &contact)?;
            if !util::confirm(&format!("Remove {}?", existing.name), global.yes)? {
                return Ok(());
            }
            let removed = book.remove(backend, &existing.id).await?;
            output::note(&format!("Removed {}", removed.name), global.quiet);
            Ok(())
        }

        ContactsCommand::Favorite { contact } => {
            let existing = resolve(&book, &contact)?;
            let favorite = book.toggle_favorite(backend, &existing.id).await?;
            let state = if favorite { "added to" } else { "removed from" };
            output::note(&format!("{} {state} favorites", existing.name), global.quiet);
            Ok(())
        }

        ContactsCommand::Import { file, format } => {
            let text = std::fs::read_to_string(&file)?;
            let report = match format.map_or_else(|| detect_format(&file), Ok)? {
                ImportFormat::Json => book.import_json(&text)?,
                ImportFormat::Csv => book.import_csv(&text)?,
            };
            let out = output::render_single(&global.output, &report, report_line, |r| {
                (r.inserted + r.merged).to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContactsCommand::Export {
            format,
            contact,
            out,
        } => {
            let selected: Vec<Contact> = match contact {
                Some(query) => vec![resolve(&book, &query)?],
                None => book.directory().contacts().to_vec(),
            };
            let (text, suggested) = match format {
                ExportFormat::Json => (export::to_json(&selected)?, None),
                ExportFormat::Csv => (export::to_csv(&selected), None),
                ExportFormat::Vcard => {
                    let [single] = selected.as_slice() else {
                        return Err(CliError::validation(
                            "contact",
                            "vcard export needs exactly one --contact",
                        ));
                    };
                    (
                        export::to_vcard(single),
                        Some(export::vcard_file_name(single)),
                    )
                }
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    output::note(&format!("Wrote {}", path.display()), global.quiet);
                }
                None => {
                    if let Some(name) = suggested {
                        output::note(&format!("Suggested file name: {name}"), global.quiet);
                    }
                    output::print_output(&text, global.quiet);
                }
            }
            Ok(())
        }

        ContactsCommand::Seed => {
            let added = book.seed_defaults()?;
            output::note(
                &format!("Added {added} built-in emergency contacts"),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn detect_format(path: &Path) -> Result<ImportFormat, CliError> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Ok(ImportFormat::Json),
        Some("csv") => Ok(ImportFormat::Csv),
        _ => Err(CliError::validation(
            "format",
            format!(
                "cannot tell the format of {}; pass --format json|csv",
                path.display()
            ),
        )),
    }
}
