//! Clap derive structures for the `clientele` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use clientele_core::Gender;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// clientele -- admin client for customer records
#[derive(Debug, Parser)]
#[command(
    name = "clientele",
    version,
    about = "Manage customer records from the command line",
    long_about = "An administrative client for the customer API.\n\n\
        Sign in once with `clientele login`; the access token is kept per\n\
        profile in a file or the OS keyring and reused by later commands.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "CLIENTELE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "CLIENTELE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLIENTELE_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "CLIENTELE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: none)
    #[arg(long, env = "CLIENTELE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Sign in and store the access token
    Login(LoginArgs),

    /// Register a new customer and sign in as them
    Signup(SignupArgs),

    /// Forget the stored access token
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Manage customer records
    #[command(alias = "c")]
    Customers(CustomersArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email address to sign in with (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

/// Fields of a new customer record.
#[derive(Debug, Args)]
pub struct NewCustomerArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Email address (also the login username)
    #[arg(long)]
    pub email: String,

    /// Age in years (16-100)
    #[arg(long)]
    pub age: u32,

    /// Gender
    #[arg(long, value_parser = parse_gender)]
    pub gender: Gender,

    /// Password (read from CLIENTELE_PASSWORD or prompted when omitted)
    #[arg(long, hide = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[command(flatten)]
    pub customer: NewCustomerArgs,
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    raw.parse()
        .map_err(|_| format!("expected MALE or FEMALE, got '{raw}'"))
}

// ── Customers ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CustomersArgs {
    #[command(subcommand)]
    pub command: CustomersCommand,
}

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    /// List all customers
    #[command(alias = "ls")]
    List,

    /// Show one customer
    Get {
        /// Customer ID
        id: String,
    },

    /// Create a customer
    Create(NewCustomerArgs),

    /// Update a customer's name, email, or age
    Update {
        /// Customer ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        age: Option<u32>,
    },

    /// Delete a customer
    #[command(alias = "rm")]
    Delete {
        /// Customer ID
        id: String,
    },
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

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
