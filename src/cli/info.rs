use std::path::PathBuf;

use clap::ValueEnum;
use rolematrix::Workspace;
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let store = workspace.requests.info();
        let directory = workspace.authorizers.info();

        if self.output == OutputFormat::Json {
            let output = json!({
                "requests": store,
                "authorizers": directory,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let yes_no = |flag: bool| if flag { "yes".success() } else { "no".warning() };

        println!("{}", "Requests".dim());
        println!("  File:          {}", store.path.display());
        println!("  Exists:        {}", yes_no(store.exists));
        let readable = if store.readable {
            "yes".success()
        } else {
            "no, see the log for the parse error".error()
        };
        println!("  Readable:      {readable}");
        println!("  Size:          {} bytes", store.size_bytes);
        println!("  Requests:      {}", store.total);
        if let Some(modified) = store.last_modified {
            println!("  Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("  Daily backup:  {}", yes_no(store.daily_backup));

        println!();
        println!("{}", "Authorizers".dim());
        println!("  File:          {}", directory.path.display());
        println!(
            "  Entries:       {} ({} active)",
            directory.total, directory.active
        );
        if !directory.codes.is_empty() {
            println!("  Codes:         {}", directory.codes.join(", "));
        }

        Ok(())
    }
}
