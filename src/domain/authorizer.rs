use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::AuthorizerAssignment;

/// A directory entry: who approves access for one application code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerRecord {
    /// Upper-case application code. Also the directory key.
    #[serde(rename = "codigo")]
    pub code: String,
    /// Human-readable application name.
    #[serde(rename = "nombre_aplicacion", default)]
    pub application_name: String,
    /// The authorizer's full name.
    #[serde(rename = "autorizador")]
    pub name: String,
    /// The authorizer's email address.
    #[serde(rename = "correo")]
    pub email: String,
    /// Contact phone number, free text.
    #[serde(rename = "telefono", default)]
    pub phone: String,
    /// The business area the application belongs to.
    #[serde(default)]
    pub area: String,
    /// Informational only; inactive authorizers are still returned by lookups.
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    /// Refreshed on every write to the directory.
    #[serde(rename = "fecha_actualizacion", default = "now")]
    pub last_updated: NaiveDateTime,
}

impl AuthorizerRecord {
    /// Creates an active record with the given contact details.
    #[must_use]
    pub fn new(code: &str, name: impl Into<String>, email: impl Into<String>) -> Self {
        let code = normalize_code(code);
        Self {
            application_name: format!("Sistema {code}"),
            code,
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            area: String::new(),
            active: true,
            last_updated: now(),
        }
    }

    /// The `{code, name, email}` triple stored on a conformity request.
    #[must_use]
    pub fn assignment(&self) -> AuthorizerAssignment {
        AuthorizerAssignment::new(&self.code, self.name.clone(), self.email.clone())
    }

    /// Whether the email address looks deliverable.
    ///
    /// The directory does not enforce this; callers decide what to do.
    #[must_use]
    pub fn has_plausible_email(&self) -> bool {
        self.email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty())
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = now();
    }
}

/// Upper-cases and trims an application code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

const fn default_active() -> bool {
    true
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
