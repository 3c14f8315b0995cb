//! Backend status and admin dashboard handlers.

use prepwise_api::backend::models::AdminStatsRecord;
use prepwise_core::SystemStatus;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

fn status_detail(status: &SystemStatus, backend: &str) -> String {
    let reachable = if status.reachable { "reachable" } else { "unreachable" };
    [
        format!("Backend:  {backend} ({reachable})"),
        format!("Database: {}", status.database),
    ]
    .join("\n")
}

pub async fn status(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let status = ctx.portal.system_status().await;
    let backend = ctx.portal.config().backend_url.to_string();
    let out = output::render_single(
        &global.output,
        &status,
        |s| status_detail(s, &backend),
        |s| s.database.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

/// Pretty-print a free-form breakdown returned by the dashboard.
fn breakdown(title: &str, value: Option<&serde_json::Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let mut lines = vec![String::new(), format!("{title}:")];
    match value {
        serde_json::Value::Object(map) => {
            lines.extend(map.iter().map(|(k, v)| format!("  {k}: {v}")));
        }
        serde_json::Value::Array(items) => {
            lines.extend(items.iter().map(|item| {
                let name = item
                    .get("title")
                    .or_else(|| item.get("name"))
                    .or_else(|| item.get("_id"))
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| item.to_string(), str::to_owned);
                match item.get("count").or_else(|| item.get("enrollments")) {
                    Some(n) => format!("  {name}: {n}"),
                    None => format!("  {name}"),
                }
            }));
        }
        other => lines.push(format!("  {other}")),
    }
    lines
}

fn stats_detail(stats: &AdminStatsRecord) -> String {
    let mut lines = vec![
        format!("Users:         {}", count(stats.overview.total_users)),
        format!("Modules:       {}", count(stats.overview.total_modules)),
        format!("Drills:        {}", count(stats.overview.total_drills)),
        format!("Active alerts: {}", count(stats.active_alerts)),
    ];
    lines.extend(breakdown("Users by role", stats.users_by_role.as_ref()));
    lines.extend(breakdown("Popular modules", stats.popular_modules.as_ref()));
    lines.join("\n")
}

pub async fn admin_stats(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = ctx.portal.admin_stats().await?;
    let out = output::render_single(&global.output, &stats, stats_detail, |s| {
        count(s.overview.total_users)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_handles_objects_and_arrays() {
        let roles = serde_json::json!({ "student": 40, "teacher": 3 });
        let lines = breakdown("Users by role", Some(&roles));
        assert!(lines.contains(&"  student: 40".to_owned()));

        let popular = serde_json::json!([{ "title": "Flood Preparedness", "count": 12 }]);
        let lines = breakdown("Popular modules", Some(&popular));
        assert!(lines.contains(&"  Flood Preparedness: 12".to_owned()));

        assert!(breakdown("Empty", None).is_empty());
    }

    #[test]
    fn unreachable_status_detail() {
        let status = SystemStatus {
            reachable: false,
            database: "unknown".into(),
        };
        let text = status_detail(&status, "http://localhost:5000/api");
        assert!(text.contains("unreachable"));
        assert!(text.contains("Database: unknown"));
    }
}
