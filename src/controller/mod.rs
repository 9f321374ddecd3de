//! Selection and enrichment flow for the client profile panel
//!
//! The controller owns the session state of the selected client and the
//! lifecycle of the client list. Views are rendered from state snapshots.

pub mod profile;
pub mod state;
pub mod view;

pub use profile::{ClientProfileController, SelectOutcome};
pub use state::{DirectoryState, LoadPhase, SessionState};
pub use view::{AccountSummary, AccountsSection, DisplayViewModel, EnrichmentStatus, ProfileView};
