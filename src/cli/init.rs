use std::path::Path;

use rolematrix::{Config, Workspace, storage::CONFIG_FILE};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Start with an empty authorizer directory instead of the sample entries
    #[arg(long)]
    empty: bool,

    /// Do not take a daily backup of the requests file
    #[arg(long)]
    no_backup: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            anyhow::bail!(
                "Workspace already initialized (found existing {})",
                config_path.display()
            );
        }

        std::fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        let mut config = Config::default();
        config.seed_authorizers = !self.empty;
        config.daily_backup = !self.no_backup;
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

        let workspace = Workspace::open(root)?;

        println!("Initialized conformity workspace in {}", root.display());
        println!("  Created: {CONFIG_FILE}");
        println!("  Created: {}", workspace.config().requests_file());
        println!(
            "  Created: {} ({} authorizers)",
            workspace.config().authorizers_file(),
            workspace.authorizers.len()
        );
        println!();
        println!("Next steps:");
        println!("  rmx create --group APF2_QASD1_SSSS_CASD1_");

        Ok(())
    }
}
