use std::path::PathBuf;

use clap::ValueEnum;
use rolematrix::{AuthorizerRecord, Workspace};
use tracing::instrument;

use super::{
    confirm,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// List every authorizer
    List(List),

    /// Show the authorizer for an application code
    Show(Show),

    /// Add an authorizer, replacing any existing entry for the code
    Add(Add),

    /// Change the details of an existing authorizer
    Update(Update),

    /// Remove an authorizer
    Remove(Remove),
}

impl Command {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root),
            Self::Show(command) => command.run(root),
            Self::Add(command) => command.run(root),
            Self::Update(command) => command.run(root),
            Self::Remove(command) => command.run(root),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let records: Vec<_> = workspace.authorizers.all().collect();

        if self.output == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No authorizers yet. Add one with 'rmx authorizer add'.");
            return Ok(());
        }

        let narrow = is_narrow();
        if !narrow {
            println!("{:<6} {:<28} {:<34} {}", "Code", "Authorizer", "Email", "Area");
        }
        for record in records {
            let code = if record.active {
                record.code.clone()
            } else {
                record.code.dim()
            };
            if narrow {
                println!("{code}  {} <{}>", record.name, record.email);
            } else {
                println!(
                    "{code:<6} {:<28} {:<34} {}",
                    record.name, record.email, record.area
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Show {
    /// The application code
    code: String,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let Some(record) = workspace.authorizers.get(&self.code) else {
            anyhow::bail!("No authorizer for {}", self.code.to_uppercase());
        };

        println!("# {}", record.code);
        println!("{}\n", record.application_name);
        println!("  Authorizer: {}", record.name);
        println!("  Email:      {}", record.email);
        if !record.phone.is_empty() {
            println!("  Phone:      {}", record.phone);
        }
        if !record.area.is_empty() {
            println!("  Area:       {}", record.area);
        }
        let active = if record.active {
            "yes".success()
        } else {
            "no".warning()
        };
        println!("  Active:     {active}");
        println!(
            "  Updated:    {}",
            record.last_updated.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The application code, e.g. APF2
    code: String,

    /// The authorizer's full name
    #[arg(long)]
    name: String,

    /// The authorizer's email address
    #[arg(long)]
    email: String,

    /// The application name (default: "Sistema <CODE>")
    #[arg(long)]
    application: Option<String>,

    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// The business area the application belongs to
    #[arg(long)]
    area: Option<String>,

    /// Record the authorizer as inactive
    #[arg(long)]
    inactive: bool,
}

impl Add {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;

        let mut record = AuthorizerRecord::new(&self.code, self.name, self.email);
        if let Some(application) = self.application {
            record.application_name = application;
        }
        record.phone = self.phone.unwrap_or_default();
        record.area = self.area.unwrap_or_default();
        record.active = !self.inactive;
        warn_on_email(&record);

        let replacing = workspace.authorizers.get(&record.code).is_some();
        let code = record.code.clone();
        workspace.authorizers.add(&code, record)?;

        if replacing {
            println!("Replaced authorizer for {}", code.success());
        } else {
            println!("Added authorizer for {}", code.success());
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Update {
    /// The application code
    code: String,

    /// New full name for the authorizer
    #[arg(long)]
    name: Option<String>,

    /// New email address
    #[arg(long)]
    email: Option<String>,

    /// New application name
    #[arg(long)]
    application: Option<String>,

    /// New contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// New business area
    #[arg(long)]
    area: Option<String>,

    /// Mark the authorizer active or inactive
    #[arg(long)]
    active: Option<bool>,
}

impl Update {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let Some(existing) = workspace.authorizers.get(&self.code) else {
            anyhow::bail!(
                "No authorizer for {}; use 'rmx authorizer add' to create one",
                self.code.to_uppercase()
            );
        };

        let mut record = existing.clone();
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(application) = self.application {
            record.application_name = application;
        }
        if let Some(phone) = self.phone {
            record.phone = phone;
        }
        if let Some(area) = self.area {
            record.area = area;
        }
        if let Some(active) = self.active {
            record.active = active;
        }
        warn_on_email(&record);

        let code = record.code.clone();
        workspace.authorizers.update(&code, record)?;
        println!("Updated authorizer for {}", code.success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// The application code
    code: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let Some(record) = workspace.authorizers.get(&self.code) else {
            anyhow::bail!("No authorizer for {}", self.code.to_uppercase());
        };

        if !self.yes {
            let prompt = format!("Remove {} ({})?", record.code, record.name);
            if !confirm(&prompt)? {
                println!("Cancelled");
                return Ok(());
            }
        }

        workspace.authorizers.remove(&self.code)?;
        println!("Removed authorizer for {}", self.code.to_uppercase());
        Ok(())
    }
}

fn warn_on_email(record: &AuthorizerRecord) {
    if !record.has_plausible_email() {
        eprintln!(
            "{}",
            format!("⚠️  '{}' does not look like an email address", record.email).warning()
        );
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn add(code: &str, name: &str) -> Add {
        Add {
            code: code.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            application: None,
            phone: None,
            area: Some("Pruebas".to_string()),
            inactive: false,
        }
    }

    #[test]
    fn add_update_remove() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        add("newc", "Nadia").run(root.clone()).unwrap();
        Update {
            code: "NEWC".to_string(),
            name: None,
            email: None,
            application: Some("Nuevo Sistema".to_string()),
            phone: None,
            area: None,
            active: Some(false),
        }
        .run(root.clone())
        .unwrap();

        let workspace = Workspace::open(root.clone()).unwrap();
        let record = workspace.authorizers.get("NEWC").unwrap();
        assert_eq!(record.name, "Nadia");
        assert_eq!(record.area, "Pruebas");
        assert_eq!(record.application_name, "Nuevo Sistema");
        assert!(!record.active);

        Remove {
            code: "newc".to_string(),
            yes: true,
        }
        .run(root.clone())
        .unwrap();

        let workspace = Workspace::open(root).unwrap();
        assert!(workspace.authorizers.get("NEWC").is_none());
    }

    #[test]
    fn every_flag_has_help_text() {
        use clap::CommandFactory;

        for command in [Add::command(), Update::command()] {
            for arg in command.get_arguments() {
                assert!(
                    arg.get_help().is_some(),
                    "{} --{} has no help",
                    command.get_name(),
                    arg.get_id()
                );
            }
        }
    }

    #[test]
    fn update_of_unknown_code_fails() {
        let tmp = tempdir().unwrap();

        let result = Update {
            code: "ZZZZ".to_string(),
            name: Some("Z".to_string()),
            email: None,
            application: None,
            phone: None,
            area: None,
            active: None,
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
    }

    #[test]
    fn remove_of_unknown_code_fails() {
        let tmp = tempdir().unwrap();

        let result = Remove {
            code: "ZZZZ".to_string(),
            yes: true,
        }
        .run(tmp.path().to_path_buf());

        assert!(result.is_err());
    }
}
