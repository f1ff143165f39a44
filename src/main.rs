// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, LevelFilter, Level, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use wabulk::app_config::{self, Config};
use wabulk::markup::{load_message, translate};
use wabulk::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect the WhatsApp session, showing a QR code until it is scanned
    Login,

    /// Send a message to every contact of a CSV file
    Send {
        /// CSV file with the contacts
        #[arg(short = 'C', long, value_name = "CSV")]
        contacts: PathBuf,

        /// Message file (HTML, or a JSON rich-text tree with a .json extension)
        #[arg(short = 'M', long, value_name = "FILE")]
        message: PathBuf,
    },

    /// Print the WhatsApp markup a message file translates to
    Preview {
        /// Message file (HTML, or a JSON rich-text tree with a .json extension)
        #[arg(short = 'M', long, value_name = "FILE")]
        message: PathBuf,
    },

    /// Generate shell completions for wabulk
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Messaging backend URL
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Session identity file
    #[arg(long, global = true)]
    identity_file: Option<PathBuf>,
}

/// wabulk - WhatsApp bulk sender
///
/// Connects a WhatsApp session through the messaging backend and sends one
/// formatted message to a list of contacts.
#[derive(Parser, Debug)]
#[command(name = "wabulk")]
#[command(version)]
#[command(about = "WhatsApp bulk message sender")]
#[command(long_about = "wabulk connects a WhatsApp session through a messaging backend and sends a formatted message to a list of contacts.

EXAMPLES:
    wabulk login                                        # Scan the QR code and connect
    wabulk send -C contacts.csv -M message.html         # Send message.html to every contact
    wabulk preview -M message.html                      # Show the WhatsApp markup only
    wabulk -e http://10.0.0.5:5000 login                # Use another backend
    wabulk completions bash > wabulk.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through log::set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "wabulk", &mut std::io::stdout());
            Ok(())
        }
        Commands::Preview { message } => {
            let tree = load_message(&message)?;
            println!("{}", translate(&tree));
            Ok(())
        }
        Commands::Login => {
            let config = load_config(&cli.global)?;
            let controller = Controller::with_config(config)?;
            controller.authenticate().await?;
            info!("Session {} is ready", controller.identity());
            Ok(())
        }
        Commands::Send { contacts, message } => {
            let config = load_config(&cli.global)?;
            let tree = load_message(&message)?;

            let controller = Controller::with_config(config)?;
            controller.authenticate().await?;

            let contacts = controller.upload_contacts(&contacts).await?;
            let report = controller
                .send(contacts, &tree)
                .await
                .context("Failed to send messages")?;

            println!("Messages sent to {} contacts!", report.count);
            Ok(())
        }
    }
}

/// Load the configuration file and apply command line overrides
fn load_config(args: &GlobalArgs) -> Result<Config> {
    // Apply a command line log level right away so config loading is logged at that level
    if let Some(cmd_log_level) = &args.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&args.config_path)?;

    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(endpoint) = &args.endpoint {
        config.backend.endpoint = endpoint.clone();
    }

    if let Some(identity_file) = &args.identity_file {
        config.session.identity_file = Some(identity_file.clone());
    }

    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}
