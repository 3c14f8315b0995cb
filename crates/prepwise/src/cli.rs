//! Clap derive structures for the `prepwise` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! workspace crates so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// prepwise -- disaster preparedness from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "prepwise",
    version,
    about = "Disaster preparedness portal client: alerts, drills and emergency contacts",
    long_about = "Follow live hazard alerts, rehearse evacuation drills with a countdown,\n\
        and keep an emergency contact directory that works offline.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Portal profile to use
    #[arg(long, short = 'p', env = "PREPWISE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API root (overrides profile)
    #[arg(long, short = 'b', env = "PREPWISE_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PREPWISE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PREPWISE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PREPWISE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Hazard alerts: list, inspect, publish and watch
    #[command(alias = "a")]
    Alerts(AlertsArgs),

    /// Practice drills with a live countdown
    #[command(alias = "d")]
    Drills(DrillsArgs),

    /// Emergency contact directory
    #[command(alias = "c")]
    Contacts(ContactsArgs),

    /// Learning modules and progress
    #[command(alias = "m")]
    Modules(ModulesArgs),

    /// Current weather at a location
    Weather(LocationArgs),

    /// Five-day forecast at a location
    Forecast(LocationArgs),

    /// Ask the assistant a preparedness question
    Ask(AskArgs),

    /// Generate a poster or infographic design
    Design(DesignArgs),

    /// Search for reference images
    Images(ImagesArgs),

    /// Air quality and health recommendations
    Air(LocationArgs),

    /// Backend reachability and database state
    Status,

    /// Administrator dashboard figures
    AdminStats,

    /// Sign in to the portal
    Login(LoginArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Optional coordinates; the profile's home location fills the gaps.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,
}

/// Projection filters over the alert feed.
#[derive(Debug, Args)]
pub struct AlertFilterArgs {
    /// Hazard kind (earthquake, flood, fire, cyclone, heatwave, warning, all)
    #[arg(long, short = 't', default_value = "all")]
    pub kind: String,

    /// Severity (low, medium, high, critical, all)
    #[arg(long, short = 's', default_value = "all")]
    pub severity: String,

    /// Only alerts that are still active
    #[arg(long)]
    pub active: bool,
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List current alerts
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: AlertFilterArgs,
    },

    /// List alerts around a location
    Near {
        #[command(flatten)]
        location: LocationArgs,

        /// Search radius in kilometres
        #[arg(long, short = 'r')]
        radius: Option<u32>,

        #[command(flatten)]
        filter: AlertFilterArgs,
    },

    /// Show one alert in detail
    Show {
        /// Alert id
        id: String,
    },

    /// Acknowledge an alert
    Ack {
        /// Alert id
        id: String,
    },

    /// Publish an alert (teachers and admins) or record a local one
    Create {
        /// Short headline
        #[arg(long)]
        title: String,

        /// What is happening and what to do
        #[arg(long)]
        description: String,

        /// Where it applies
        #[arg(long)]
        location: String,

        /// Hazard kind
        #[arg(long, short = 't', default_value = "warning")]
        kind: String,

        /// Severity
        #[arg(long, short = 's', default_value = "medium")]
        severity: String,
    },

    /// Stream alerts as they are pushed
    Watch {
        #[command(flatten)]
        filter: AlertFilterArgs,
    },
}

// ── Drills ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DrillsArgs {
    #[command(subcommand)]
    pub command: DrillsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DrillsCommand {
    /// List available drills
    #[command(alias = "ls")]
    List,

    /// Show a drill and its steps
    Show {
        /// Drill id or title
        drill: String,
    },

    /// Run a drill interactively
    Run {
        /// Drill id or title
        drill: String,
    },
}

// ── Contacts ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ContactsArgs {
    /// Work on the local directory only, never the server
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: ContactsCommand,
}

/// Contact fields for add/edit. Unset fields are left alone on edit.
#[derive(Debug, Args)]
pub struct ContactFields {
    /// Contact type (police, fire, ambulance, hospital, disaster_management, rescue, ngo)
    #[arg(long, short = 't')]
    pub kind: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Availability, e.g. "24x7"
    #[arg(long)]
    pub hours: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Mark as favorite
    #[arg(long)]
    pub favorite: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List contacts, favorites first
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text search
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only this contact type
        #[arg(long, short = 't')]
        kind: Option<String>,
    },

    /// Show one contact
    Show {
        /// Contact id or name
        contact: String,
    },

    /// Add a contact (merges with an existing one of the same name and phone)
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[command(flatten)]
        fields: ContactFields,
    },

    /// Edit a contact
    Edit {
        /// Contact id or name
        contact: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[command(flatten)]
        fields: ContactFields,
    },

    /// Remove a contact
    #[command(alias = "rm")]
    Remove {
        /// Contact id or name
        contact: String,
    },

    /// Toggle a contact's favorite flag
    #[command(alias = "fav")]
    Favorite {
        /// Contact id or name
        contact: String,
    },

    /// Import contacts from a JSON array or CSV file
    Import {
        /// File to read
        file: PathBuf,

        /// Input format (detected from the extension when omitted)
        #[arg(long, short = 'f')]
        format: Option<ImportFormat>,
    },

    /// Export contacts
    Export {
        /// Output format
        #[arg(long, short = 'f', default_value = "json")]
        format: ExportFormat,

        /// Single contact (required for vcard)
        #[arg(long)]
        contact: Option<String>,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Add the built-in emergency numbers that are missing
    Seed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Vcard,
}

// ── Modules ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModulesArgs {
    #[command(subcommand)]
    pub command: ModulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ModulesCommand {
    /// List learning modules
    #[command(alias = "ls")]
    List {
        /// Tab: all, in-progress, completed, locked
        #[arg(long, default_value = "all")]
        tab: String,
    },

    /// Show a module and its lessons
    Show {
        /// Module id or title
        module: String,
    },
}

// ── Assistant & services ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Question text
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DesignArgs {
    /// What the design should show
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// Save inline image data to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImagesArgs {
    /// Search query
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Number of results (1-10)
    #[arg(long, short = 'n', default_value = "6")]
    pub num: u32,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from this variable instead of prompting
    #[arg(long, default_value = "PREPWISE_PASSWORD")]
    pub password_env: String,

    /// Keep the session across restarts
    #[arg(long, short = 'r')]
    pub remember: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store a service API key
    SetKey {
        /// Service: weather, gemini, search, maps
        service: String,

        /// Write the key into the config file instead of the keyring
        #[arg(long)]
        plaintext: bool,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
