//! The workspace: single owner of a model and its derived state.
//!
//! All mutation goes through the workspace, so the registry and the checker
//! always see one consistent model between notifications.

use crate::{WorkspaceError, WorkspaceOptions, WorkspaceResult};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use trellis_constraint::{
    AttributeOptions, CheckContext, ConstraintChecker, FeatureConstraint, Problem, ScanStatus,
};
use trellis_core::{ClassId, ElementId, FeatureId, Record, RecordBatch, ValueId};
use trellis_graph::{ElementAnchor, ElementStore, Elements, Model, SharedListener, SlotRef, ValueAnchor};
use trellis_ident::{
    Binding, ExternalIdentifierProvider, IdentifierRegistry, NameFragment, SharedIdentifierListener,
};
use trellis_metamodel::{FeatureDef, Metamodel};

/// A model with its identifier registry and constraint checker attached.
pub struct Workspace {
    model: Model,
    registry: Rc<RefCell<IdentifierRegistry>>,
    checker: Rc<RefCell<ConstraintChecker>>,
    external: Option<Rc<dyn ExternalIdentifierProvider>>,
    options: WorkspaceOptions,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new(metamodel: Arc<Metamodel>, options: WorkspaceOptions) -> WorkspaceResult<Self> {
        let registry = IdentifierRegistry::new(options.identifiers.clone());
        Self::with_registry(metamodel, options, registry)
    }

    /// Create an empty workspace naming elements with a custom fragment function.
    pub fn with_name_fragment(
        metamodel: Arc<Metamodel>,
        options: WorkspaceOptions,
        fragment: NameFragment,
    ) -> WorkspaceResult<Self> {
        let registry = IdentifierRegistry::with_fragment(options.identifiers.clone(), fragment);
        Self::with_registry(metamodel, options, registry)
    }

    fn with_registry(
        metamodel: Arc<Metamodel>,
        options: WorkspaceOptions,
        registry: IdentifierRegistry,
    ) -> WorkspaceResult<Self> {
        let checker = ConstraintChecker::new(Arc::clone(&metamodel), options.checker.clone())?;
        let registry = Rc::new(RefCell::new(registry));
        let checker = Rc::new(RefCell::new(checker));

        let mut model = Model::new(metamodel);
        model.add_model_change_listener(registry.clone());
        model.add_model_change_listener(checker.clone());

        tracing::debug!(classes = model.metamodel().class_count(), "workspace created");
        Ok(Self {
            model,
            registry,
            checker,
            external: None,
            options,
        })
    }

    /// Attach a read-only index of elements in other modules.
    pub fn set_external_provider(&mut self, provider: Rc<dyn ExternalIdentifierProvider>) {
        self.external = Some(provider);
        self.checker.borrow_mut().update_all_problems();
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    pub fn metamodel(&self) -> &Metamodel {
        self.model.metamodel()
    }

    pub fn store(&self) -> &ElementStore {
        self.model.store()
    }

    pub fn elements(&self) -> Elements<'_> {
        self.model.elements()
    }

    // ==================== Mutation ====================

    pub fn create_element(
        &mut self,
        anchor: ElementAnchor,
        data: impl Into<RecordBatch>,
    ) -> WorkspaceResult<Vec<ElementId>> {
        Ok(self.model.create_element(anchor, data)?)
    }

    pub fn remove_element(&mut self, elements: &[ElementId]) -> WorkspaceResult<usize> {
        Ok(self.model.remove_element(elements)?)
    }

    pub fn create_value(&mut self, anchor: ValueAnchor, text: impl Into<String>) -> WorkspaceResult<ValueId> {
        Ok(self.model.create_value(anchor, text)?)
    }

    pub fn change_value(&mut self, value: ValueId, text: impl Into<String>) -> WorkspaceResult<()> {
        Ok(self.model.change_value(value, text)?)
    }

    pub fn remove_value(&mut self, value: ValueId) -> WorkspaceResult<()> {
        Ok(self.model.remove_value(value)?)
    }

    /// Run several mutations as one logical operation with a single commit.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Model) -> trellis_core::ModelResult<T>) -> WorkspaceResult<T> {
        Ok(self.model.batch(f)?)
    }

    pub fn extract_model(&self, element: ElementId) -> WorkspaceResult<Record> {
        Ok(self.model.extract_model(element)?)
    }

    pub fn export_model(&self) -> WorkspaceResult<Vec<Record>> {
        Ok(self.model.export_model()?)
    }

    pub fn import_model(&mut self, data: impl Into<RecordBatch>) -> WorkspaceResult<Vec<ElementId>> {
        Ok(self.model.import_model(data)?)
    }

    /// Export all root elements as JSON text.
    pub fn export_json(&self) -> WorkspaceResult<String> {
        Ok(Record::to_json(&self.export_model()?)?)
    }

    /// Replace the model by records parsed from JSON text.
    pub fn import_json(&mut self, text: &str) -> WorkspaceResult<Vec<ElementId>> {
        let records = Record::parse_batch(text)?;
        self.import_model(records)
    }

    pub fn add_model_change_listener(&mut self, listener: SharedListener) {
        self.model.add_model_change_listener(listener);
    }

    // ==================== Identifiers ====================

    pub fn get_identifier(&self, element: ElementId) -> Option<String> {
        self.registry.borrow().get_identifier(element).map(str::to_string)
    }

    pub fn get_element(&self, identifier: &str) -> Option<Binding> {
        self.registry.borrow().get_element(identifier).cloned()
    }

    /// All bound identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.registry.borrow().identifiers().map(str::to_string).collect();
        identifiers.sort();
        identifiers
    }

    pub fn add_identifier_change_listener(&mut self, listener: SharedIdentifierListener) {
        self.registry.borrow_mut().add_identifier_change_listener(listener);
    }

    // ==================== Checking ====================

    pub fn add_constraint(&mut self, constraint: FeatureConstraint) -> WorkspaceResult<()> {
        self.checker.borrow_mut().add_constraint(constraint)?;
        self.checker.borrow_mut().update_all_problems();
        Ok(())
    }

    pub fn set_automatic_checking(&mut self, automatic: bool) {
        self.checker.borrow_mut().set_automatic_checking(automatic);
    }

    /// Schedule a full scan regardless of automatic checking.
    pub fn update_all_problems(&mut self) {
        self.checker.borrow_mut().update_all_problems();
    }

    pub fn scan_pending(&self) -> bool {
        self.checker.borrow().scan_pending()
    }

    /// Check one chunk of the pending scan.
    pub fn step(&mut self) -> ScanStatus {
        let registry = self.registry.borrow();
        let ctx = CheckContext {
            store: self.model.store(),
            identifiers: &registry,
            external: self.external.as_deref(),
        };
        let status = self.checker.borrow_mut().step(&ctx);
        status
    }

    /// Run the pending scan to completion without yielding.
    pub fn settle(&mut self) -> ScanStatus {
        let mut status = self.step();
        while status == ScanStatus::Yielded {
            status = self.step();
        }
        status
    }

    pub fn element_problems(&self, element: ElementId) -> Vec<String> {
        self.checker.borrow().problems().element_problems(element).to_vec()
    }

    pub fn feature_problems(&self, element: ElementId, feature: &str) -> WorkspaceResult<Vec<String>> {
        let feature = self.feature_of(element, feature)?;
        Ok(self
            .checker
            .borrow()
            .problems()
            .feature_problems(element, feature)
            .to_vec())
    }

    /// All problems, ordered by element then feature.
    pub fn problems(&self) -> Vec<Problem> {
        self.checker.borrow().problems().all()
    }

    pub fn problem_count(&self) -> usize {
        self.checker.borrow().problems().len()
    }

    /// No scan pending and no problems recorded.
    pub fn is_valid(&self) -> bool {
        !self.scan_pending() && self.problem_count() == 0
    }

    // ==================== Editing Helpers ====================

    /// Identifiers a reference of type `class` may point to, local first.
    pub fn reference_options(&self, class: &str) -> WorkspaceResult<Vec<String>> {
        let class = self.class_id(class)?;
        let registry = self.registry.borrow();
        let checker = self.checker.borrow();

        let mut options: Vec<String> = self
            .model
            .elements()
            .filter(|element| {
                self.store()
                    .class_of(*element)
                    .is_some_and(|element_class| checker.is_valid_instance(class, element_class))
            })
            .filter_map(|element| registry.get_identifier(element).map(str::to_string))
            .collect();
        if let Some(external) = &self.external {
            options.extend(external.identifiers(self.metamodel().class_name(class)));
        }
        options.retain(|identifier| !identifier.is_empty());
        Ok(options)
    }

    /// Names of the classes that can be created in a slot.
    pub fn element_options(&self, slot: SlotRef) -> Vec<String> {
        self.checker
            .borrow()
            .element_options(slot)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Values the named attribute of a class accepts.
    pub fn attribute_options(&self, class: &str, feature: &str) -> WorkspaceResult<AttributeOptions> {
        let class_id = self.class_id(class)?;
        let def = self.feature_def(class_id, class, feature)?;
        Ok(self.checker.borrow().attribute_options(def))
    }

    /// Whether one more element fits into a container.
    pub fn can_add_element(&self, slot: SlotRef) -> bool {
        let Some(count) = self.store().slot_elements(slot).map(<[ElementId]>::len) else {
            return false;
        };
        let limit = match slot {
            SlotRef::Root => self.options.max_root_elements,
            SlotRef::Feature { feature, .. } => self.metamodel().feature(feature).upper_limit,
        };
        limit.map_or(true, |limit| count < limit)
    }

    // ==================== Lookup ====================

    fn class_id(&self, name: &str) -> WorkspaceResult<ClassId> {
        self.metamodel()
            .class_id(name)
            .ok_or_else(|| WorkspaceError::unknown_class(name))
    }

    fn feature_def(&self, class: ClassId, class_name: &str, feature: &str) -> WorkspaceResult<&FeatureDef> {
        self.metamodel()
            .feature_by_name(class, feature)
            .ok_or_else(|| WorkspaceError::unknown_feature(class_name, feature))
    }

    /// Resolve a feature name on an element's class.
    pub fn feature_of(&self, element: ElementId, feature: &str) -> WorkspaceResult<FeatureId> {
        let class = self
            .store()
            .class_of(element)
            .ok_or(trellis_core::ModelError::ElementNotFound(element))?;
        let class_name = self.metamodel().class_name(class);
        Ok(self.feature_def(class, class_name, feature)?.id)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("elements", &self.model.store().len())
            .field("external", &self.external.is_some())
            .field("options", &self.options)
            .finish()
    }
}
