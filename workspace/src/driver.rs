//! Cooperative scan driver.
//!
//! The scan runs one chunk per step and yields to the runtime in between,
//! so edits made by other tasks on the same thread land between chunks. An
//! edit that commits restarts the pass from the first root.

use crate::Workspace;
use std::cell::RefCell;
use trellis_constraint::ScanStatus;

/// Drive pending scans until the checker is idle.
///
/// The workspace is only borrowed for the duration of a single chunk.
/// Returns `Finished` when at least one pass completed, `Idle` otherwise.
pub async fn drive_scan(workspace: &RefCell<Workspace>) -> ScanStatus {
    let mut result = ScanStatus::Idle;
    loop {
        let status = workspace.borrow_mut().step();
        match status {
            ScanStatus::Idle => return result,
            ScanStatus::Finished => result = ScanStatus::Finished,
            ScanStatus::Yielded => {}
        }
        tokio::task::yield_now().await;
    }
}
