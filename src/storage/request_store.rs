//! A JSON-file backed collection of conformity requests.
//!
//! The [`RequestStore`] keeps every request in memory and rewrites the whole
//! backing file after each mutation. The file is the single source of truth:
//! [`RequestStore::reload`] discards the in-memory list and reads it again.
//!
//! The store assumes it is the only writer. Two processes writing the same
//! file race on identifier generation and the last full rewrite wins.

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, NaiveDateTime};
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Action, AuthorizerAssignment, ConformityRequest, Status, Ticket, ValidationError,
        validate::{validate_action, validate_notes},
        validate_transition,
    },
    storage::{
        csv,
        json_file::{self, LoadError, SaveError},
    },
};

const FORMAT_VERSION: &str = "1.0";

/// The on-disk shape, borrowed for writing.
#[derive(Serialize)]
struct StoreFileRef<'a> {
    metadata: Metadata,
    #[serde(rename = "solicitudes")]
    requests: &'a [ConformityRequest],
}

/// The on-disk shape, owned for reading. Metadata is informational and
/// ignored on load.
#[derive(Deserialize)]
struct StoreFile {
    #[serde(rename = "solicitudes", default)]
    requests: Vec<ConformityRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    version: String,
    #[serde(rename = "ultima_actualizacion")]
    last_updated: NaiveDateTime,
    #[serde(rename = "total_solicitudes")]
    total: usize,
}

/// Request counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// All requests.
    pub total: usize,
    /// Requests waiting for conformity.
    #[serde(rename = "en_solicitud")]
    pub submitted: usize,
    /// Requests escalated to the helpdesk.
    #[serde(rename = "en_helpdesk")]
    pub in_helpdesk: usize,
    /// Requests attended by the helpdesk.
    #[serde(rename = "atendido")]
    pub attended: usize,
    /// Closed requests.
    #[serde(rename = "cerrado")]
    pub closed: usize,
}

impl Stats {
    /// The count for a single status.
    #[must_use]
    pub const fn count(&self, status: Status) -> usize {
        match status {
            Status::SubmittedForConformity => self.submitted,
            Status::InHelpdesk => self.in_helpdesk,
            Status::Attended => self.attended,
            Status::Closed => self.closed,
        }
    }
}

/// A description of the backing file, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    /// Where the requests are stored.
    pub path: PathBuf,
    /// Whether the file exists.
    pub exists: bool,
    /// Whether the file currently parses.
    pub readable: bool,
    /// File size.
    pub size_bytes: u64,
    /// Requests held in memory.
    pub total: usize,
    /// Last modification of the file.
    pub last_modified: Option<DateTime<Local>>,
    /// Whether today's backup exists.
    pub daily_backup: bool,
}

/// Why a lifecycle operation did not apply.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// No request has the given identifier.
    #[error("request {0} not found")]
    NotFound(String),
    /// The operation is not allowed for the request as it stands.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    /// The change was applied in memory but could not be persisted.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// A JSON-file backed collection of conformity requests.
#[derive(Debug)]
pub struct RequestStore {
    path: PathBuf,
    requests: Vec<ConformityRequest>,
}

impl RequestStore {
    /// Opens the store backed by the file at `path`.
    ///
    /// A missing file is created empty straight away, so later loads always
    /// find a well-formed file. An unreadable file is copied aside and the
    /// store starts empty; see [`reload`](Self::reload).
    ///
    /// # Errors
    ///
    /// Returns an error only if a missing file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let mut store = Self {
            path: path.into(),
            requests: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory list with the contents of the backing file.
    ///
    /// Load failures are not propagated: the store degrades to empty and logs
    /// a warning. A file that does not parse is first moved to
    /// `<stem>.corrupt-<timestamp>.json` and replaced by an empty one, so the
    /// next open starts clean instead of setting aside another copy. If the
    /// move fails the file is left alone and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, or was moved aside, and the
    /// empty replacement cannot be created.
    pub fn reload(&mut self) -> Result<(), SaveError> {
        tracing::debug!("Loading requests from {}", self.path.display());

        match json_file::read::<StoreFile>(&self.path) {
            Ok(Some(file)) => {
                self.requests = file.requests;
                tracing::debug!("Loaded {} requests", self.requests.len());
            }
            Ok(None) => {
                tracing::info!(
                    "No request file at {}, creating an empty one",
                    self.path.display()
                );
                self.requests.clear();
                self.save()?;
            }
            Err(e) => {
                tracing::warn!("{e}; starting with no requests");
                self.requests.clear();
                if matches!(e, LoadError::Parse { .. }) {
                    match json_file::quarantine(&self.path) {
                        Ok(moved) => {
                            tracing::warn!("Unreadable file moved to {}", moved.display());
                            self.save()?;
                        }
                        Err(e) => tracing::warn!("Could not move the unreadable file aside: {e}"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrites the backing file from the in-memory list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The in-memory list is
    /// left as it is.
    pub fn save(&self) -> Result<(), SaveError> {
        let file = StoreFileRef {
            metadata: Metadata {
                version: FORMAT_VERSION.to_string(),
                last_updated: Local::now().naive_local(),
                total: self.requests.len(),
            },
            requests: &self.requests,
        };
        json_file::write(&self.path, &file).inspect_err(|e| tracing::error!("{e}"))
    }

    /// The identifier the next created request will get.
    ///
    /// `SOL_<YYYYMMDD_HHMMSS>_<NNN>` where the sequence is the current number
    /// of requests plus one.
    #[must_use]
    pub fn next_id(&self) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("SOL_{timestamp}_{:03}", self.requests.len() + 1)
    }

    /// Creates a request in [`Status::SubmittedForConformity`] and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The request stays in
    /// memory regardless.
    pub fn create(
        &mut self,
        groups: NonEmpty<String>,
        authorizers: Vec<AuthorizerAssignment>,
    ) -> Result<ConformityRequest, SaveError> {
        let request = ConformityRequest::new(
            self.next_id(),
            Local::now().naive_local(),
            groups.into(),
            authorizers,
        );
        tracing::debug!(
            "Creating {} with {} groups and {} authorizers",
            request.id(),
            request.network_groups().len(),
            request.authorizers().len()
        );

        self.requests.push(request.clone());
        self.save()?;

        tracing::info!("Created request {}", request.id());
        Ok(request)
    }

    /// Every request, in creation order.
    #[must_use]
    pub fn all(&self) -> &[ConformityRequest] {
        &self.requests
    }

    /// Looks up a request by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConformityRequest> {
        self.requests.iter().find(|request| request.id() == id)
    }

    /// The requests currently in `status`.
    pub fn filter_by_status(&self, status: Status) -> impl Iterator<Item = &ConformityRequest> {
        self.requests
            .iter()
            .filter(move |request| request.status() == status)
    }

    /// Counts requests by status.
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = Stats {
            total: self.requests.len(),
            ..Stats::default()
        };
        for request in &self.requests {
            match request.status() {
                Status::SubmittedForConformity => stats.submitted += 1,
                Status::InHelpdesk => stats.in_helpdesk += 1,
                Status::Attended => stats.attended += 1,
                Status::Closed => stats.closed += 1,
            }
        }
        stats
    }

    /// Sets the status of a request, with optional ticket and notes.
    ///
    /// This is the unchecked, general-purpose update: the transition policy
    /// is not consulted. Returns `Ok(false)` if no request has that id.
    ///
    /// Closing needs a non-blank ticket. Without one the call still succeeds
    /// and rewrites the file, but the request is left unchanged. Prefer
    /// [`close`](Self::close), which makes the ticket mandatory.
    ///
    /// For any other status, blank notes leave the existing notes alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update_status(
        &mut self,
        id: &str,
        status: Status,
        ticket: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, SaveError> {
        let Some(request) = self.find_mut(id) else {
            return Ok(false);
        };

        if status == Status::Closed {
            match ticket.filter(|t| !t.trim().is_empty()) {
                Some(ticket) => request.close(ticket.to_string(), notes.map(str::to_string)),
                None => tracing::warn!("{id}: closing requires a ticket, status left unchanged"),
            }
        } else {
            request.set_status(status);
            if let Some(notes) = notes.filter(|n| !n.is_empty()) {
                request.set_notes(Some(notes.to_string()));
            }
        }

        self.save()?;
        Ok(true)
    }

    /// Moves a request back to [`Status::SubmittedForConformity`].
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist, the transition is not allowed,
    /// the notes are invalid, or the file cannot be written.
    pub fn submit_for_conformity(
        &mut self,
        id: &str,
        notes: Option<String>,
    ) -> Result<(), TransitionError> {
        self.apply(id, Status::SubmittedForConformity, None, notes, |request, notes| {
            request.submit_for_conformity(notes);
        })
    }

    /// Escalates a request to the helpdesk under `ticket`.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or is closed, the transition is
    /// not allowed, the notes are invalid, or the file cannot be written.
    pub fn send_to_helpdesk(
        &mut self,
        id: &str,
        ticket: &Ticket,
        notes: Option<String>,
    ) -> Result<(), TransitionError> {
        self.apply(
            id,
            Status::InHelpdesk,
            Some(Action::SendToHelpdesk),
            notes,
            |request, notes| request.send_to_helpdesk(ticket.to_string(), notes),
        )
    }

    /// Records that the helpdesk attended a request.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or is closed, the transition is
    /// not allowed, the notes are invalid, or the file cannot be written.
    pub fn mark_attended(&mut self, id: &str, notes: Option<String>) -> Result<(), TransitionError> {
        self.apply(
            id,
            Status::Attended,
            Some(Action::MarkAttended),
            notes,
            ConformityRequest::mark_attended,
        )
    }

    /// Closes a request under `ticket`, stamping the closing time.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or is already closed, the notes are
    /// invalid, or the file cannot be written.
    pub fn close(
        &mut self,
        id: &str,
        ticket: &Ticket,
        notes: Option<String>,
    ) -> Result<(), TransitionError> {
        self.apply(
            id,
            Status::Closed,
            Some(Action::Close),
            notes,
            |request, notes| request.close(ticket.to_string(), notes),
        )
    }

    /// Reopens a closed request. The notes become `Reabierta: <reason>`.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or is not closed, or the file
    /// cannot be written.
    pub fn reopen(&mut self, id: &str, reason: &str) -> Result<(), TransitionError> {
        self.apply(
            id,
            Status::SubmittedForConformity,
            Some(Action::Reopen),
            Some(reason.to_string()),
            |request, _| request.reopen(reason),
        )
    }

    /// Changes only the status, as an in-place edit.
    ///
    /// Setting the current status is a no-op that does not touch the file.
    /// Closing this way reuses the ticket already recorded on the request.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist, the transition is not allowed,
    /// closing is attempted without a recorded ticket, or the file cannot be
    /// written.
    pub fn edit_status(&mut self, id: &str, status: Status) -> Result<(), TransitionError> {
        let request = self
            .get(id)
            .ok_or_else(|| TransitionError::NotFound(id.to_string()))?;
        if request.status() == status {
            return Ok(());
        }
        validate_transition(request.status(), status).map_err(ValidationError::from)?;

        let notes = Some(format!("Estado cambiado a {status} via edición inline"));
        if status == Status::Closed {
            let ticket = request
                .helpdesk_ticket()
                .map(str::to_string)
                .ok_or(ValidationError::TicketRequired)?;
            self.modify(id, |request| request.close(ticket, notes))
        } else {
            self.modify(id, |request| {
                request.set_status(status);
                request.set_notes(notes);
            })
        }
    }

    /// Replaces the helpdesk ticket without changing the status.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist or the file cannot be written.
    pub fn set_ticket(&mut self, id: &str, ticket: Option<&Ticket>) -> Result<(), TransitionError> {
        let ticket = ticket.map(ToString::to_string);
        self.modify(id, |request| request.set_ticket(ticket))
    }

    /// Replaces the notes without changing the status.
    ///
    /// # Errors
    ///
    /// Fails if the request does not exist, the notes are invalid, or the file
    /// cannot be written.
    pub fn set_notes(&mut self, id: &str, notes: Option<String>) -> Result<(), TransitionError> {
        if let Some(notes) = &notes {
            validate_notes(notes)?;
        }
        self.modify(id, |request| request.set_notes(notes))
    }

    /// Writes every request to a CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn export_csv(&self, path: &Path) -> io::Result<()> {
        csv::export(path, &self.requests)
            .inspect(|_| {
                tracing::info!(
                    "Exported {} requests to {}",
                    self.requests.len(),
                    path.display()
                );
            })
            .inspect_err(|e| tracing::warn!("Failed to export to {}: {e}", path.display()))
    }

    /// Describes the backing file.
    #[must_use]
    pub fn info(&self) -> StoreInfo {
        let metadata = std::fs::metadata(&self.path).ok();
        StoreInfo {
            path: self.path.clone(),
            exists: metadata.is_some(),
            readable: json_file::read::<serde_json::Value>(&self.path)
                .is_ok_and(|value| value.is_some()),
            size_bytes: metadata.as_ref().map_or(0, std::fs::Metadata::len),
            total: self.requests.len(),
            last_modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
            daily_backup: self.daily_backup_path().exists(),
        }
    }

    /// Where today's backup of the backing file lives.
    #[must_use]
    pub fn daily_backup_path(&self) -> PathBuf {
        let date = Local::now().format("%Y%m%d");
        self.path
            .with_file_name(format!("backup_solicitudes_{date}.json"))
    }

    /// Copies the backing file to today's backup, unless that exists already.
    ///
    /// Returns the backup path if a copy was made. Failures are logged and
    /// reported as `None`.
    pub fn backup_if_needed(&self) -> Option<PathBuf> {
        let backup = self.daily_backup_path();
        if !self.path.exists() || backup.exists() {
            return None;
        }
        match std::fs::copy(&self.path, &backup) {
            Ok(_) => {
                tracing::info!("Created daily backup {}", backup.display());
                Some(backup)
            }
            Err(e) => {
                tracing::warn!("Could not create backup {}: {e}", backup.display());
                None
            }
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ConformityRequest> {
        self.requests.iter_mut().find(|request| request.id() == id)
    }

    /// Checks a lifecycle operation against the policy, then applies it.
    fn apply(
        &mut self,
        id: &str,
        target: Status,
        action: Option<Action>,
        notes: Option<String>,
        change: impl FnOnce(&mut ConformityRequest, Option<String>),
    ) -> Result<(), TransitionError> {
        let request = self
            .get(id)
            .ok_or_else(|| TransitionError::NotFound(id.to_string()))?;
        if let Some(action) = action {
            validate_action(request, action)?;
        }
        validate_transition(request.status(), target).map_err(ValidationError::from)?;
        if let Some(notes) = &notes {
            validate_notes(notes)?;
        }

        self.modify(id, |request| change(request, notes))?;
        tracing::info!("{id}: status is now '{target}'");
        Ok(())
    }

    fn modify(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut ConformityRequest),
    ) -> Result<(), TransitionError> {
        let request = self
            .find_mut(id)
            .ok_or_else(|| TransitionError::NotFound(id.to_string()))?;
        change(request);
        self.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nonempty::nonempty;
    use regex::Regex;
    use tempfile::TempDir;

    use super::*;

    fn setup_store() -> (TempDir, RequestStore) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let store = RequestStore::open(tmp.path().join("requests.json")).unwrap();
        (tmp, store)
    }

    fn create_sample(store: &mut RequestStore) -> ConformityRequest {
        store
            .create(
                nonempty!["APF2_QASD1_SSSS_CASD1_".to_string()],
                vec![AuthorizerAssignment::new("APF2", "A", "a@x.com")],
            )
            .unwrap()
    }

    fn ticket(s: &str) -> Ticket {
        Ticket::new(s).unwrap()
    }

    #[test]
    fn opening_missing_file_creates_empty_file() {
        let (tmp, store) = setup_store();
        let path = tmp.path().join("requests.json");

        assert!(path.exists());
        assert!(store.all().is_empty());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["metadata"]["version"], "1.0");
        assert_eq!(raw["metadata"]["total_solicitudes"], 0);
        assert!(raw["solicitudes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn created_request_is_submitted_and_retrievable() {
        let (_tmp, mut store) = setup_store();
        let created = create_sample(&mut store);

        assert_eq!(created.status(), Status::SubmittedForConformity);

        let found = store.get(created.id()).unwrap();
        assert_eq!(found.network_groups(), ["APF2_QASD1_SSSS_CASD1_"]);
        assert_eq!(found.authorizers().len(), 1);
    }

    #[test]
    fn ids_follow_format_and_sequence() {
        let (_tmp, mut store) = setup_store();
        let pattern = Regex::new(r"^SOL_\d{8}_\d{6}_\d{3}$").unwrap();

        let first = create_sample(&mut store);
        let second = create_sample(&mut store);

        assert!(pattern.is_match(first.id()));
        assert!(first.id().ends_with("_001"));
        assert!(second.id().ends_with("_002"));
    }

    #[test]
    fn save_then_reload_round_trips() {
        let (tmp, mut store) = setup_store();
        create_sample(&mut store);
        let second = create_sample(&mut store);
        store
            .close(second.id(), &ticket("HD-100"), Some("done".to_string()))
            .unwrap();

        let reopened = RequestStore::open(tmp.path().join("requests.json")).unwrap();

        assert_eq!(reopened.all(), store.all());
    }

    #[test]
    fn corrupt_file_degrades_to_empty_and_is_kept_aside() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("requests.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let store = RequestStore::open(&path).unwrap();

        assert!(store.all().is_empty());
        let kept = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(kept);
    }

    #[test]
    fn corrupt_file_is_set_aside_only_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("requests.json");
        std::fs::write(&path, "{ broken").unwrap();

        RequestStore::open(&path).unwrap();
        let reopened = RequestStore::open(&path).unwrap();

        let copies: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(std::fs::read_to_string(&copies[0]).unwrap(), "{ broken");
        assert!(reopened.all().is_empty());
        assert!(reopened.info().readable);
    }

    #[test]
    fn stats_on_empty_store_are_zero() {
        let (_tmp, store) = setup_store();
        let stats = store.stats();

        assert_eq!(stats, Stats::default());
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({
                "total": 0,
                "en_solicitud": 0,
                "en_helpdesk": 0,
                "atendido": 0,
                "cerrado": 0,
            })
        );
    }

    #[test]
    fn stats_count_each_status() {
        let (_tmp, mut store) = setup_store();
        let a = create_sample(&mut store);
        let b = create_sample(&mut store);
        create_sample(&mut store);
        store.send_to_helpdesk(a.id(), &ticket("HD-1"), None).unwrap();
        store.close(b.id(), &ticket("HD-2"), None).unwrap();

        let stats = store.stats();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.in_helpdesk, 1);
        assert_eq!(stats.attended, 0);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.count(Status::Closed), 1);
        assert_eq!(store.filter_by_status(Status::InHelpdesk).count(), 1);
    }

    #[test]
    fn update_status_closed_without_ticket_leaves_status_unchanged() {
        let (_tmp, mut store) = setup_store();
        let created = create_sample(&mut store);

        let applied = store
            .update_status(created.id(), Status::Closed, None, None)
            .unwrap();

        assert!(applied);
        let stored = store.get(created.id()).unwrap();
        assert_eq!(stored.status(), Status::SubmittedForConformity);
        assert!(stored.closed_at().is_none());
    }

    #[test]
    fn update_status_closed_with_ticket_closes() {
        let (_tmp, mut store) = setup_store();
        let created = create_sample(&mut store);

        assert!(
            store
                .update_status(created.id(), Status::Closed, Some("HD-5"), Some("ok"))
                .unwrap()
        );

        let stored = store.get(created.id()).unwrap();
        assert_eq!(stored.status(), Status::Closed);
        assert_eq!(stored.helpdesk_ticket(), Some("HD-5"));
        assert_eq!(stored.notes(), Some("ok"));
        assert!(stored.closed_at().is_some());
    }

    #[test]
    fn update_status_ignores_policy_and_keeps_notes_when_blank() {
        let (_tmp, mut store) = setup_store();
        let created = create_sample(&mut store);
        store
            .update_status(created.id(), Status::Attended, None, Some("first"))
            .unwrap();

        // Attended -> Submitted is not in the policy table, but this path does not check it.
        store
            .update_status(created.id(), Status::SubmittedForConformity, None, Some(""))
            .unwrap();

        let stored = store.get(created.id()).unwrap();
        assert_eq!(stored.status(), Status::SubmittedForConformity);
        assert_eq!(stored.notes(), Some("first"));
    }

    #[test]
    fn update_status_unknown_id_is_false() {
        let (_tmp, mut store) = setup_store();
        assert!(!store.update_status("SOL_X", Status::Attended, None, None).unwrap());
    }

    #[test]
    fn lifecycle_operations_follow_policy() {
        let (_tmp, mut store) = setup_store();
        let id = create_sample(&mut store).id().to_string();

        store.send_to_helpdesk(&id, &ticket("HD-9"), Some("sent".to_string())).unwrap();
        store.mark_attended(&id, None).unwrap();
        assert!(matches!(
            store.submit_for_conformity(&id, None),
            Err(TransitionError::Rejected(ValidationError::Transition(_)))
        ));

        store.close(&id, &ticket("HD-9"), Some("done".to_string())).unwrap();
        assert!(matches!(
            store.mark_attended(&id, None),
            Err(TransitionError::Rejected(ValidationError::AlreadyClosed { .. }))
        ));

        store.reopen(&id, "wrong group").unwrap();
        let stored = store.get(&id).unwrap();
        assert_eq!(stored.status(), Status::SubmittedForConformity);
        assert!(stored.closed_at().is_none());
        assert_eq!(stored.notes(), Some("Reabierta: wrong group"));
    }

    #[test]
    fn reopen_requires_closed_request() {
        let (_tmp, mut store) = setup_store();
        let id = create_sample(&mut store).id().to_string();

        assert!(matches!(
            store.reopen(&id, "why"),
            Err(TransitionError::Rejected(ValidationError::NotClosed))
        ));
    }

    #[test]
    fn lifecycle_operations_report_missing_request() {
        let (_tmp, mut store) = setup_store();
        assert!(matches!(
            store.mark_attended("SOL_NOPE", None),
            Err(TransitionError::NotFound(id)) if id == "SOL_NOPE"
        ));
    }

    #[test]
    fn edit_status_to_closed_needs_recorded_ticket() {
        let (_tmp, mut store) = setup_store();
        let id = create_sample(&mut store).id().to_string();

        assert!(matches!(
            store.edit_status(&id, Status::Closed),
            Err(TransitionError::Rejected(ValidationError::TicketRequired))
        ));

        store.set_ticket(&id, Some(&ticket("HD-3"))).unwrap();
        store.edit_status(&id, Status::Closed).unwrap();

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.status(), Status::Closed);
        assert!(stored.closed_at().is_some());
    }

    #[test]
    fn edit_status_rejects_forbidden_transition() {
        let (_tmp, mut store) = setup_store();
        let id = create_sample(&mut store).id().to_string();
        store.mark_attended(&id, None).unwrap();

        assert!(store.edit_status(&id, Status::SubmittedForConformity).is_err());
        assert!(store.edit_status(&id, Status::Attended).is_ok());
        store.edit_status(&id, Status::InHelpdesk).unwrap();
        assert_eq!(store.get(&id).unwrap().status(), Status::InHelpdesk);
    }

    #[test]
    fn set_notes_overwrites_and_validates() {
        let (_tmp, mut store) = setup_store();
        let id = create_sample(&mut store).id().to_string();

        store.set_notes(&id, Some("one".to_string())).unwrap();
        store.set_notes(&id, Some("two".to_string())).unwrap();
        assert_eq!(store.get(&id).unwrap().notes(), Some("two"));

        assert!(store.set_notes(&id, Some("bad\u{0}".to_string())).is_err());
        assert_eq!(store.get(&id).unwrap().notes(), Some("two"));
    }

    #[test]
    fn export_csv_writes_one_row_per_request() {
        let (tmp, mut store) = setup_store();
        create_sample(&mut store);
        create_sample(&mut store);
        let path = tmp.path().join("export.csv");

        store.export_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("ID Solicitud,Fecha Creación,Estado"));
    }

    #[test]
    fn export_csv_to_missing_directory_fails() {
        let (tmp, store) = setup_store();
        assert!(store.export_csv(&tmp.path().join("no/such/dir.csv")).is_err());
    }

    #[test]
    fn daily_backup_is_taken_once() {
        let (_tmp, mut store) = setup_store();
        create_sample(&mut store);

        let backup = store.backup_if_needed().unwrap();
        assert!(backup.exists());
        assert!(store.backup_if_needed().is_none());
        assert!(store.info().daily_backup);
    }

    #[test]
    fn info_describes_backing_file() {
        let (_tmp, mut store) = setup_store();
        create_sample(&mut store);

        let info = store.info();

        assert!(info.exists);
        assert!(info.readable);
        assert!(info.size_bytes > 0);
        assert_eq!(info.total, 1);
        assert!(info.last_modified.is_some());
    }
}
