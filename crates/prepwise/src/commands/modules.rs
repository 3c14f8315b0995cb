//! Learning module command handlers.

use tabled::Tabled;

use prepwise_core::modules::{find_module, modules_in};
use prepwise_core::{LearningModule, ModuleTab};

use crate::cli::{GlobalOpts, ModulesArgs, ModulesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ModuleRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Lessons")]
    lessons: String,
    #[tabled(rename = "Points")]
    points: u32,
    #[tabled(rename = "Badge")]
    badge: String,
}

impl From<&LearningModule> for ModuleRow {
    fn from(m: &LearningModule) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            duration: m.duration_label.clone(),
            progress: if m.locked {
                "locked".into()
            } else {
                format!("{}%", m.progress)
            },
            lessons: format!("{}/{}", m.completed_lessons(), m.lessons.len()),
            points: m.points(),
            badge: m.badge().map_or_else(|| "-".into(), |b| b.to_string()),
        }
    }
}

fn detail(m: &LearningModule) -> String {
    let mut lines = vec![
        format!("{} ({})", m.title, m.duration_label),
        m.description.clone(),
        String::new(),
        format!("Progress: {}%  Points: {}", m.progress, m.points()),
    ];
    if m.locked {
        lines.push("Locked: finish earlier modules to unlock.".into());
    }
    for lesson in &m.lessons {
        let mark = if lesson.completed { "x" } else { " " };
        lines.push(format!(
            "[{mark}] {}. {} ({}, {})",
            lesson.id, lesson.title, lesson.kind, lesson.duration_label
        ));
    }
    lines.join("\n")
}

pub fn handle(args: ModulesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ModulesCommand::List { tab } => {
            let tab: ModuleTab = tab.trim().parse().map_err(|_| {
                CliError::validation(
                    "tab",
                    format!("unknown tab '{tab}' (all, in-progress, completed, locked)"),
                )
            })?;
            let modules = modules_in(tab);
            let out = output::render_list(
                &global.output,
                &modules,
                |m| ModuleRow::from(m),
                |m| m.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ModulesCommand::Show { module } => {
            let found = find_module(&module)
                .ok_or_else(|| CliError::not_found("module", &module, "modules list"))?;
            let out = output::render_single(&global.output, &found, detail, |m| m.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
