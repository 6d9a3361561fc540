use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Read repositories from this mirror configuration instead of the configured one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub mirror_config: Option<String>,

    /// Store file lists in this directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub cache_path: Option<String>,

    /// Architecture substituted for $arch
    #[arg(long, global = true)]
    pub arch: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(required = false, long, global = true)]
    pub timeout: Option<u64>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download and unpack the file lists of all repositories
    #[clap(name = "sync", visible_alias = "S")]
    Sync {
        /// Only sync these repositories
        #[arg(required = false)]
        repos: Vec<String>,
    },

    /// List repositories from the mirror configuration
    #[clap(name = "repos", visible_alias = "ls")]
    Repos {
        /// Show the download URL of every server
        #[arg(required = false, short, long)]
        expand: bool,
    },

    /// Print the effective configuration to stdout
    Config,
}
