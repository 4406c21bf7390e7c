use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use nonempty::NonEmpty;
use rolematrix::{AuthorizerAssignment, Workspace, extract_codes};
use tracing::instrument;

use crate::cli::terminal::Colorize;

/// Parse a `CODE:NAME:EMAIL` authorizer assignment.
fn parse_assignment(s: &str) -> Result<AuthorizerAssignment, String> {
    let mut parts = s.splitn(3, ':').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(name), Some(email))
            if !code.is_empty() && !name.is_empty() && !email.is_empty() =>
        {
            Ok(AuthorizerAssignment::new(code, name, email))
        }
        _ => Err(format!("expected CODE:NAME:EMAIL, got '{s}'")),
    }
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// A network group to request access for (repeatable)
    #[arg(long, short, required = true, value_name = "GROUP")]
    group: Vec<String>,

    /// Assign an authorizer explicitly, overriding the directory
    /// (repeatable)
    #[arg(long, short, value_name = "CODE:NAME:EMAIL", value_parser = parse_assignment)]
    authorizer: Vec<AuthorizerAssignment>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;

        let groups: Vec<String> = self
            .group
            .iter()
            .map(|group| group.trim().to_string())
            .filter(|group| !group.is_empty())
            .collect();
        let groups = NonEmpty::from_vec(groups).context("At least one network group is required")?;

        let codes = extract_codes(groups.iter());
        let mut explicit: BTreeMap<String, AuthorizerAssignment> = self
            .authorizer
            .into_iter()
            .map(|assignment| (assignment.code.clone(), assignment))
            .collect();

        let to_look_up: Vec<&String> = codes
            .iter()
            .filter(|code| !explicit.contains_key(*code))
            .collect();
        let found: BTreeMap<String, AuthorizerAssignment> = workspace
            .authorizers
            .get_many(&to_look_up)
            .into_iter()
            .map(|record| (record.code.clone(), record.assignment()))
            .collect();
        let missing: Vec<&String> = to_look_up
            .into_iter()
            .filter(|code| !found.contains_key(*code))
            .collect();

        let mut assignments = Vec::new();
        for code in &codes {
            if let Some(assignment) = explicit.remove(code).or_else(|| found.get(code).cloned()) {
                assignments.push(assignment);
            }
        }
        // explicit assignments for codes that no group mentions
        assignments.extend(explicit.into_values());

        let request = workspace.requests.create(groups, assignments)?;

        println!("Created {}", request.id().success());
        if request.authorizers().is_empty() {
            println!("  {}", "No authorizers assigned".warning());
        }
        for assignment in request.authorizers() {
            println!(
                "  {}  {} <{}>",
                assignment.code,
                assignment.name,
                assignment.email.dim()
            );
        }

        if codes.is_empty() {
            eprintln!(
                "{}",
                "No application codes found in the group names".warning()
            );
        }
        if !missing.is_empty() {
            let missing = missing
                .iter()
                .map(|code| code.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            eprintln!("{}", format!("⚠️  No authorizer for: {missing}").warning());
            eprintln!(
                "{}",
                "Add one with 'rmx authorizer add' or pass --authorizer CODE:NAME:EMAIL".dim()
            );
        }

        Ok(())
    }
}
