//! Command dispatch: bridges CLI args -> portal calls -> output formatting.

pub mod alerts;
pub mod auth;
pub mod config_cmd;
pub mod contacts;
pub mod drills;
pub mod modules;
pub mod services;
pub mod system;
pub mod util;

use prepwise_core::Portal;

use crate::cli::{Command, GlobalOpts};
use crate::config::ActiveProfile;
use crate::error::CliError;

/// Everything a portal-bound command needs.
pub struct Context {
    pub portal: Portal,
    pub profile: ActiveProfile,
}

/// Dispatch a portal-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Alerts(args) => alerts::handle(ctx, args, global).await,
        Command::Drills(args) => drills::handle(args, global).await,
        Command::Contacts(args) => contacts::handle(ctx, args, global).await,
        Command::Modules(args) => modules::handle(args, global),
        Command::Weather(args) => services::weather(ctx, &args, global).await,
        Command::Forecast(args) => services::forecast(ctx, &args, global).await,
        Command::Ask(args) => services::ask(ctx, &args, global).await,
        Command::Design(args) => services::design(ctx, args, global).await,
        Command::Images(args) => services::images(ctx, &args, global).await,
        Command::Air(args) => services::air(ctx, &args, global).await,
        Command::Status => system::status(ctx, global).await,
        Command::AdminStats => system::admin_stats(ctx, global).await,
        Command::Login(args) => auth::login(ctx, args, global).await,
        Command::Logout => auth::logout(ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
