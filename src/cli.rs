use std::path::PathBuf;

mod authorizer;
mod create;
mod edit;
mod export;
mod extract;
mod info;
mod init;
mod lifecycle;
mod list;
mod show;
mod status;
mod terminal;

use clap::ArgAction;
use rolematrix::Status as RequestStatus;

/// Parse a status from its display string or a short alias.
fn parse_status(s: &str) -> Result<RequestStatus, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding config.toml and the data files
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(status::Command::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show request counts per status (default)
    Status(status::Command),

    /// Write a default config.toml and create the data files
    Init(init::Command),

    /// Create a conformity request for one or more network groups
    ///
    /// Authorizers are looked up from the application codes found in the
    /// group names unless given explicitly.
    Create(create::Command),

    /// List requests
    List(list::Command),

    /// Show a single request
    Show(show::Command),

    /// Escalate a request to the helpdesk
    Helpdesk(lifecycle::Helpdesk),

    /// Record that the helpdesk attended a request
    Attend(lifecycle::Attend),

    /// Close a request
    Close(lifecycle::Close),

    /// Reopen a closed request
    Reopen(lifecycle::Reopen),

    /// Move a request back to waiting for conformity
    Revert(lifecycle::Revert),

    /// Edit the status, ticket or notes of a request in place
    Edit(edit::Command),

    /// Export every request to a CSV file
    Export(export::Command),

    /// Print the application codes found in network group names
    Extract(extract::Command),

    /// Describe the data files
    Info(info::Command),

    /// Manage the authorizer directory
    #[command(subcommand)]
    Authorizer(authorizer::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(&root)?,
            Self::Create(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Helpdesk(command) => command.run(root)?,
            Self::Attend(command) => command.run(root)?,
            Self::Close(command) => command.run(root)?,
            Self::Reopen(command) => command.run(root)?,
            Self::Revert(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
            Self::Extract(command) => command.run(),
            Self::Info(command) => command.run(root)?,
            Self::Authorizer(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Asks for confirmation on the terminal. Anything but "yes" aborts.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
