//! Trellis Scenario Test Framework
//!
//! Provides a fluent API for writing integration tests against a Trellis
//! workspace.
//!
//! # Structure
//!
//! - **metamodel** - Class and feature definitions (JSON)
//! - **seed** - Optional starting records (JSON)
//! - **steps** - An action from [`operations`] plus the assertions that
//!   must hold once the constraint scan settled
//!
//! # Example
//!
//! ```ignore
//! use trellis_tests::prelude::*;
//!
//! Scenario::new("rename")
//!     .metamodel(PACKAGE_METAMODEL)
//!     .step("create", create_root(class("Foo")), |a| a.identifiers(&["/Foo"]))
//!     .step("rename", set_value("/Foo", "name", "Bar"), |a| a.unbound("/Foo"))
//!     .run()
//!     .unwrap();
//! ```

mod assertion;
mod error;
pub mod operations;

pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use runner::Runner;
pub use scenario::{Scenario, Step};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::fixtures::*;
    pub use crate::operations::*;
    pub use crate::scenario::Scenario;
}
