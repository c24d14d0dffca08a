use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use streampay::core::YearMonth;
use streampay::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Login {
    /// User ID
    #[arg(short, long)]
    user: String,

    /// Password
    #[arg(short, long, env = "STREAMPAY_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Preview take-home pay for today's revenue without saving
    Calc {
        #[command(flatten)]
        login: Login,
        /// Today's revenue in the source currency, e.g. 200
        amount: String,
    },
    /// Save today's earnings and show your history
    Save {
        #[command(flatten)]
        login: Login,
        /// Today's revenue in the source currency, e.g. 200
        amount: String,
    },
    /// Show earnings history, goal progress and the activity calendar
    History {
        #[command(flatten)]
        login: Login,
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
}

impl From<Commands> for streampay::AppCommand {
    fn from(cmd: Commands) -> streampay::AppCommand {
        match cmd {
            Commands::Calc { login, amount } => streampay::AppCommand::Calc {
                user: login.user,
                password: login.password,
                amount,
            },
            Commands::Save { login, amount } => streampay::AppCommand::Save {
                user: login.user,
                password: login.password,
                amount,
            },
            Commands::History { login, month } => streampay::AppCommand::History {
                user: login.user,
                password: login.password,
                month,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => streampay::cli::setup::setup_at_path(path),
            None => streampay::cli::setup::setup(),
        },
        Some(cmd) => streampay::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
