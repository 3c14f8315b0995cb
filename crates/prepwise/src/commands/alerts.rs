//! Alert command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;

use prepwise_core::{Alert, AlertDraft, AlertFilter, AlertId, HazardKind, LoadOutcome, Portal};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "Active")]
    active: String,
}

fn row(a: &Arc<Alert>, color: bool) -> AlertRow {
    AlertRow {
        id: a.id.to_string(),
        severity: output::severity_label(a.severity, color),
        kind: a.kind.to_string(),
        title: a.title.clone(),
        location: a.location.clone(),
        issued: util::format_time(a.issued_at),
        active: if a.active { "yes" } else { "no" }.into(),
    }
}

fn detail(a: &Alert, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", a.id),
        format!("Title:       {}", a.title),
        format!("Severity:    {}", output::severity_label(a.severity, color)),
        format!("Type:        {}", a.kind),
        format!("Location:    {}", a.location),
        format!(
            "Coordinates: {:.4}, {:.4}",
            a.coordinates.lat, a.coordinates.lng
        ),
        format!("Issued:      {}", util::format_time(a.issued_at)),
        format!("Expires:     {}", util::format_time(a.expires_at)),
        format!("Source:      {}", util::or_dash(&a.source)),
        format!("Active:      {}", a.active),
    ];
    if !a.description.is_empty() {
        lines.push(String::new());
        lines.push(a.description.clone());
    }
    if a.id.is_local() {
        lines.push(String::new());
        lines.push(output::dim("(created on this machine, not published)", color));
    }
    lines.join("\n")
}

fn print_list(alerts: &[Arc<Alert>], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        alerts,
        |a| row(a, color),
        |a| a.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn load_failed(portal: &Portal) -> CliError {
    let reason = portal
        .feed()
        .last_sync_error()
        .unwrap_or_else(|| "unknown error".into());
    CliError::ApiError {
        message: format!("could not load alerts: {reason}"),
        status: None,
    }
}

fn ensure_loaded(portal: &Portal, outcome: LoadOutcome) -> Result<(), CliError> {
    match outcome {
        LoadOutcome::Applied { .. } | LoadOutcome::Stale => Ok(()),
        LoadOutcome::Failed => Err(load_failed(portal)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let portal = &ctx.portal;

    match args.command {
        AlertsCommand::List { filter } => {
            let filter = util::alert_filter(&filter)?;
            ensure_loaded(portal, portal.refresh_alerts().await)?;
            print_list(&portal.feed().project(&filter), global);
            Ok(())
        }

        AlertsCommand::Near {
            location,
            radius,
            filter,
        } => {
            let filter = util::alert_filter(&filter)?;
            let center = util::location(&location)?;
            ensure_loaded(portal, portal.refresh_nearby(center, radius).await)?;
            let viewport = portal.feed().viewport();
            output::note(
                &format!(
                    "Alerts within {} km of {:.4}, {:.4}",
                    radius.unwrap_or(portal.config().alert_radius_km),
                    viewport.lat,
                    viewport.lng
                ),
                global.quiet,
            );
            print_list(&portal.feed().project(&filter), global);
            Ok(())
        }

        AlertsCommand::Show { id } => {
            let alert = portal.alert(&AlertId::from(id)).await?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &alert,
                |a| detail(a, color),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Ack { id } => {
            let id = AlertId::from(id);
            portal.acknowledge(&id).await?;
            output::note(&format!("Acknowledged alert {id}"), global.quiet);
            Ok(())
        }

        AlertsCommand::Create {
            title,
            description,
            location,
            kind,
            severity,
        } => {
            let draft = AlertDraft {
                kind: HazardKind::from(kind.trim()),
                severity: util::parse_severity(&severity)?,
                ..AlertDraft::new(title, description, location)
            };
            let alert = portal.create_alert(&draft).await?;
            if alert.id.is_local() {
                output::note(
                    "Recorded locally: publishing needs a teacher or admin login.",
                    global.quiet,
                );
            } else {
                output::note(&format!("Published alert {}", alert.id), global.quiet);
            }
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                alert.as_ref(),
                |a| detail(a, color),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Watch { filter } => {
            let filter = util::alert_filter(&filter)?;
            watch(portal, &filter, global).await
        }
    }
}

// ── Live watch ──────────────────────────────────────────────────────

async fn watch(portal: &Portal, filter: &AlertFilter, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_loaded(portal, portal.refresh_alerts().await)?;
    let initial = portal.feed().project(filter);
    print_list(&initial, global);

    let mut alerts = portal.feed().subscribe();
    let mut notifications = portal.start_live().await?;
    output::note("Watching for new alerts (Ctrl-C to stop)...", global.quiet);
    let color = output::should_color(&global.color);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            msg = notifications.recv() => match msg {
                Ok(message) => output::note(&message, global.quiet),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "notification stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            arrived = alerts.arrivals() => {
                let Some(arrived) = arrived else { break };
                // Oldest first so the newest ends up at the bottom.
                for alert in arrived.iter().rev().filter(|a| filter.matches(a)) {
                    let line = format!(
                        "{}  [{}] {} ({})",
                        util::format_time(alert.issued_at),
                        output::severity_label(alert.severity, color),
                        alert.title,
                        alert.location
                    );
                    output::print_output(&line, global.quiet);
                }
            }
        }
    }

    portal.stop_live().await;
    Ok(())
}
