//! Trellis Identifiers
//!
//! Qualified-name computation for model elements, the reverse
//! identifier index, and read-only lookup into externally indexed modules.

mod binding;
mod external;
mod options;
mod registry;

pub use binding::{Binding, BindingIndex};
pub use external::{
    ElementInfo, ExternalElement, ExternalIdentifierProvider, ExternalIndexError, IndexEntry, IndexModule,
    IndexedExternalProvider,
};
pub use options::{IdentifierOptions, NameFragment};
pub use registry::{IdentifierChangeListener, IdentifierRegistry, SharedIdentifierListener};
