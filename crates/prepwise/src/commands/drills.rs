//! Drill command handlers, including the interactive runner.

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;
use tokio::io::{AsyncBufReadExt, BufReader};

use prepwise_core::drill::{find_drill, stock_drills};
use prepwise_core::{Drill, DrillPhase, DrillRunner, DrillSession, StepOutcome};

use crate::cli::{DrillsArgs, DrillsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DrillRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Steps")]
    steps: usize,
    #[tabled(rename = "Last score")]
    score: String,
}

impl From<&Drill> for DrillRow {
    fn from(d: &Drill) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            kind: d.kind.to_string(),
            difficulty: d.difficulty.to_string(),
            duration: d.duration_label.clone(),
            steps: d.step_count(),
            score: match (d.completed, d.score) {
                (true, Some(score)) => format!("{score}%"),
                (true, None) => "done".into(),
                _ => "-".into(),
            },
        }
    }
}

fn detail(d: &Drill) -> String {
    let mut lines = vec![
        format!("{} ({})", d.title, d.duration_label),
        format!("{} · {}", d.kind, d.difficulty),
    ];
    if !d.description.is_empty() {
        lines.push(d.description.clone());
    }
    lines.push(String::new());
    for (i, step) in d.steps.iter().enumerate() {
        lines.push(format!("{:>2}. {step}", i + 1));
    }
    lines.join("\n")
}

fn lookup(query: &str) -> Result<Drill, CliError> {
    find_drill(query).ok_or_else(|| CliError::not_found("drill", query, "drills list"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DrillsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DrillsCommand::List => {
            let drills = stock_drills();
            let out = output::render_list(
                &global.output,
                &drills,
                |d| DrillRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DrillsCommand::Show { drill } => {
            let drill = lookup(&drill)?;
            let out = output::render_single(&global.output, &drill, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DrillsCommand::Run { drill } => run(lookup(&drill)?, global).await,
    }
}

// ── Interactive runner ──────────────────────────────────────────────

const KEYS: &str = "[enter] start/pause  [n] next  [b] back  [r] reset  [q] quit";
const AFTER_COMPLETE: &str = "[r] run again  [q] quit";

fn countdown_bar(total_secs: u32) -> ProgressBar {
    let bar = ProgressBar::new(u64::from(total_secs));
    bar.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:30.cyan/blue}] {msg}")
            .expect("static template")
            .progress_chars("=> "),
    );
    bar
}

fn clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn render(bar: &ProgressBar, session: &DrillSession) {
    let total = session.drill().duration().seconds();
    bar.set_position(u64::from(total.saturating_sub(session.remaining_secs())));
    bar.set_prefix(clock(session.remaining_secs()));
    if session.is_completed() {
        bar.set_message(format!("complete ({} steps)", session.step_count()));
        return;
    }
    let state = if session.is_running() { "" } else { " (paused)" };
    bar.set_message(format!(
        "step {}/{}{state}",
        session.index() + 1,
        session.step_count()
    ));
}

/// Print above the bar; works whether or not the bar is drawn.
fn say(bar: &ProgressBar, message: &str) {
    bar.suspend(|| eprintln!("{message}"));
}

fn announce_step(bar: &ProgressBar, session: &DrillSession) {
    if let Some(step) = session.current_step() {
        say(bar, &format!("Step {}: {step}", session.index() + 1));
    }
}

/// What the interactive loop does after one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Quiet,
    Say(String),
    Quit,
}

fn apply_key(runner: &DrillRunner, key: &str) -> Reply {
    let completed = runner.phase() == DrillPhase::Completed;
    match key {
        "" | "s" | "p" if completed => Reply::Say(AFTER_COMPLETE.into()),
        "" | "s" | "p" => {
            if runner.session().is_some_and(|s| s.is_running()) {
                runner.pause();
            } else {
                runner.start();
            }
            Reply::Quiet
        }
        "n" => match runner.advance() {
            StepOutcome::Completed { score } => {
                Reply::Say(format!("Drill complete. Score: {score}%\n{AFTER_COMPLETE}"))
            }
            StepOutcome::Ignored if completed => Reply::Say(AFTER_COMPLETE.into()),
            StepOutcome::Advanced { .. } | StepOutcome::Ignored => Reply::Quiet,
        },
        "b" => {
            runner.back();
            Reply::Quiet
        }
        "r" => {
            runner.reset();
            Reply::Say("Drill reset.".into())
        }
        "q" => Reply::Quit,
        other => Reply::Say(format!("Unknown key '{other}'. {KEYS}")),
    }
}

async fn run(drill: Drill, global: &GlobalOpts) -> Result<(), CliError> {
    let runner = DrillRunner::new();
    let title = drill.title.clone();
    runner.select(drill)?;

    let mut updates = runner.subscribe();
    let bar = if global.quiet {
        ProgressBar::hidden()
    } else {
        countdown_bar(runner.session().map_or(0, |s| s.drill().duration().seconds()))
    };

    say(&bar, &format!("{title}\n{KEYS}"));
    if let Some(session) = runner.session() {
        announce_step(&bar, &session);
        render(&bar, &session);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_index = 0;
    let mut timed_out = false;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let Some(session) = snapshot else { break };
                if session.index() != last_index {
                    last_index = session.index();
                    announce_step(&bar, &session);
                }
                render(&bar, &session);
                let expired = session.remaining_secs() == 0;
                if expired && !timed_out {
                    say(&bar, "Time is up. Finish the remaining steps or press r to retry.");
                }
                timed_out = expired;
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match apply_key(&runner, line.trim()) {
                    Reply::Quiet => {}
                    Reply::Say(message) => say(&bar, &message),
                    Reply::Quit => break,
                }
            }
        }
    }

    runner.close();
    bar.finish_and_clear();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn runner_for(query: &str) -> DrillRunner {
        let runner = DrillRunner::new();
        runner.select(lookup(query).unwrap()).unwrap();
        runner
    }

    #[tokio::test]
    async fn completed_drill_can_be_reset_from_the_keyboard() {
        let runner = runner_for("1");
        assert_eq!(apply_key(&runner, ""), Reply::Quiet);
        let steps = runner.session().unwrap().step_count();
        for _ in 1..steps {
            assert_eq!(apply_key(&runner, "n"), Reply::Quiet);
        }
        match apply_key(&runner, "n") {
            Reply::Say(message) => assert!(message.contains("Score: 92%")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(runner.phase(), DrillPhase::Completed);

        // Still accepting input after completion.
        assert_eq!(apply_key(&runner, "n"), Reply::Say(AFTER_COMPLETE.into()));
        assert_eq!(apply_key(&runner, ""), Reply::Say(AFTER_COMPLETE.into()));

        assert_eq!(apply_key(&runner, "r"), Reply::Say("Drill reset.".into()));
        let session = runner.session().unwrap();
        assert_eq!(runner.phase(), DrillPhase::Ready);
        assert_eq!(session.index(), 0);
        assert_eq!(session.remaining_secs(), 600);

        assert_eq!(apply_key(&runner, "q"), Reply::Quit);
    }

    #[tokio::test]
    async fn unknown_key_lists_the_keys() {
        let runner = runner_for("1");
        match apply_key(&runner, "x") {
            Reply::Say(message) => assert!(message.contains("[n] next")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(600), "10:00");
        assert_eq!(clock(59), "00:59");
        assert_eq!(clock(0), "00:00");
    }

    #[test]
    fn completed_drill_row_shows_score() {
        let drills = stock_drills();
        let rows: Vec<DrillRow> = drills.iter().map(DrillRow::from).collect();
        assert_eq!(rows[0].score, "95%");
        assert_eq!(rows[1].score, "-");
    }
}
