use std::path::PathBuf;

use rolematrix::{Field, Status, Ticket, Workspace, domain::validate::validate_inline_edit};
use tracing::instrument;

use super::terminal::{Colorize, status_label};

/// Edits single fields of a request in place.
///
/// Every value is validated before anything is written. The ticket is applied
/// first so that a status change to closed can use it, and notes last so that
/// they replace the note a status change records.
#[derive(Debug, clap::Parser)]
#[command(group(clap::ArgGroup::new("field").required(true).multiple(true)))]
pub struct Command {
    /// The request identifier
    id: String,

    /// New status (display string or alias such as 'closed')
    #[arg(long, short, group = "field")]
    status: Option<String>,

    /// New helpdesk ticket; an empty value clears it
    #[arg(long, short, group = "field")]
    ticket: Option<String>,

    /// New notes; an empty value clears them
    #[arg(long, short, group = "field")]
    notes: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let Some(request) = workspace.requests.get(&self.id) else {
            anyhow::bail!("Request {} not found", self.id);
        };

        let ticket = match self.ticket.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(value) => {
                validate_inline_edit(request, Field::Ticket, value)?;
                Some(Some(Ticket::new(value)?))
            }
        };
        let status = match self.status.as_deref() {
            None => None,
            Some(value) => {
                validate_inline_edit(request, Field::Status, value)?;
                Some(value.parse::<Status>()?)
            }
        };
        let notes = match self.notes {
            None => None,
            Some(value) => {
                validate_inline_edit(request, Field::Notes, &value)?;
                Some(Some(value).filter(|notes| !notes.is_empty()))
            }
        };

        if let Some(ticket) = ticket {
            workspace.requests.set_ticket(&self.id, ticket.as_ref())?;
        }
        if let Some(status) = status {
            workspace.requests.edit_status(&self.id, status)?;
        }
        if let Some(notes) = notes {
            workspace.requests.set_notes(&self.id, notes)?;
        }

        if let Some(request) = workspace.requests.get(&self.id) {
            println!("Updated {}", request.id().success());
            println!("  Status: {}", status_label(request.status()));
            println!("  Ticket: {}", request.helpdesk_ticket().unwrap_or("–"));
            println!("  Notes:  {}", request.notes().unwrap_or("–"));
        }

        Ok(())
    }
}
