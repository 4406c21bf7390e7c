use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use rolematrix::Workspace;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Where to write the CSV file.
    ///
    /// Defaults to `solicitudes_<YYYYMMDD_HHMMSS>.csv` in the workspace root.
    #[arg(long, short)]
    file: Option<PathBuf>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let path = self.file.unwrap_or_else(|| {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            workspace.root().join(format!("solicitudes_{stamp}.csv"))
        });

        workspace
            .requests
            .export_csv(&path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;

        println!(
            "Exported {} request(s) to {}",
            workspace.requests.all().len(),
            path.display().to_string().success()
        );
        Ok(())
    }
}
