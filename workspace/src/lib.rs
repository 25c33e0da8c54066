//! Trellis Workspace
//!
//! Wires the model graph, identifier registry and constraint engine
//! together behind one owner, and drives the constraint scan.

mod driver;
mod error;
mod options;
mod workspace;

pub use driver::drive_scan;
pub use error::{WorkspaceError, WorkspaceResult};
pub use options::WorkspaceOptions;
pub use workspace::Workspace;
