use std::path::PathBuf;

use clap::Parser;
use rolematrix::{Stats, Status, Workspace};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow, status_label};

#[derive(Debug, Parser, Default)]
#[command(about = "Show request counts per status")]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let stats = workspace.requests.stats();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            OutputFormat::Table if self.quiet => output_quiet(&stats),
            OutputFormat::Table if stats.total == 0 => {
                println!("No requests found yet. Create one with 'rmx create'.");
            }
            OutputFormat::Table => output_table(&stats),
        }

        Ok(())
    }
}

fn output_quiet(stats: &Stats) {
    println!(
        "total={} submitted={} helpdesk={} attended={} closed={}",
        stats.total, stats.submitted, stats.in_helpdesk, stats.attended, stats.closed
    );
}

fn output_table(stats: &Stats) {
    println!("Request counts");
    println!("{}", "──────────────".dim());

    if is_narrow() {
        for status in Status::ALL {
            println!("{}: {}", status_label(status), stats.count(status));
        }
        println!("Total: {}", stats.total);
    } else {
        for status in Status::ALL {
            let padding = 32_usize.saturating_sub(status.as_str().chars().count());
            println!(
                "{}{}{}",
                status_label(status),
                " ".repeat(padding),
                stats.count(status)
            );
        }
        println!("{:<32}{}", "Total", stats.total);
    }

    let open = stats.total - stats.closed;
    if open > 0 {
        println!();
        println!("{}", format!("{open} request(s) still open").dim());
    }
}
