pub mod collaborators;
pub mod coordinator;
pub mod error;
pub mod identity;
mod pipeline;
pub mod state;
pub mod status;

#[cfg(test)]
mod tests;

pub use collaborators::{LookupContext, OverlayPresenter, PermissionStatus, PointerTracker};
pub use coordinator::LookupCoordinator;
pub use error::LookupError;
pub use identity::{IdentityGate, LookupGuard, LookupIdentity};
pub use state::AppState;
pub use status::LookupStats;
