//! JSON-file persistence for requests and authorizers.

/// The persisted collection of conformity requests.
pub mod request_store;
pub use request_store::{RequestStore, Stats, StoreInfo, TransitionError};

/// The persisted application-code to authorizer lookup.
pub mod authorizer_directory;
pub use authorizer_directory::{AuthorizerDirectory, DirectoryInfo, Seed, default_authorizers};

mod csv;
pub use csv::HEADERS as CSV_HEADERS;

mod json_file;
pub use json_file::{LoadError, SaveError};

mod workspace;
pub use workspace::{CONFIG_FILE, Workspace};
