//! Commands that move a request through its lifecycle.
//!
//! Each command is checked against the transition policy before anything is
//! written.

use std::path::PathBuf;

use rolematrix::{Ticket, Workspace};
use tracing::instrument;

use super::terminal::status_label;

fn report(workspace: &Workspace, id: &str) {
    if let Some(request) = workspace.requests.get(id) {
        println!("{id}: {}", status_label(request.status()));
    }
}

#[derive(Debug, clap::Parser)]
pub struct Helpdesk {
    /// The request identifier
    id: String,

    /// The helpdesk ticket reference
    ticket: Ticket,

    /// Notes to record, replacing any previous notes
    #[arg(long, short)]
    notes: Option<String>,
}

impl Helpdesk {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        workspace
            .requests
            .send_to_helpdesk(&self.id, &self.ticket, self.notes)?;
        report(&workspace, &self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Attend {
    /// The request identifier
    id: String,

    /// Notes to record, replacing any previous notes
    #[arg(long, short)]
    notes: Option<String>,
}

impl Attend {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        workspace.requests.mark_attended(&self.id, self.notes)?;
        report(&workspace, &self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Close {
    /// The request identifier
    id: String,

    /// The helpdesk ticket the request was resolved under
    ticket: Ticket,

    /// Notes to record, replacing any previous notes
    #[arg(long, short)]
    notes: Option<String>,
}

impl Close {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        workspace
            .requests
            .close(&self.id, &self.ticket, self.notes)?;
        report(&workspace, &self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Reopen {
    /// The request identifier
    id: String,

    /// Why the request is being reopened
    #[arg(long)]
    reason: String,
}

impl Reopen {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        workspace.requests.reopen(&self.id, &self.reason)?;
        report(&workspace, &self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Revert {
    /// The request identifier
    id: String,

    /// Notes to record; existing notes are kept if omitted
    #[arg(long, short)]
    notes: Option<String>,
}

impl Revert {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        workspace
            .requests
            .submit_for_conformity(&self.id, self.notes)?;
        report(&workspace, &self.id);
        Ok(())
    }
}
