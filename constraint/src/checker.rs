//! Constraint checking.
//!
//! Two independent axes per element: element-level checks (placement,
//! abstractness, duplicate identifiers) and feature-level checks per slot
//! (multiplicity, value types, reference resolution, custom constraints).

use crate::attribute::{attribute_options, AttributeOptions, ValueValidator};
use crate::custom::{ConstraintSet, FeatureConstraint, Target};
use crate::problems::{ElementProblems, ProblemStore};
use crate::scan::{ScanState, ScanStatus};
use crate::{CheckerOptions, ConstraintError, ConstraintResult};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use trellis_core::{messages, ClassId, ElementId, FeatureId, ValueId};
use trellis_graph::{ElementStore, ModelChangeListener, SlotRef};
use trellis_ident::{Binding, ExternalIdentifierProvider, IdentifierRegistry};
use trellis_metamodel::{FeatureDef, FeatureKind, Metamodel};

/// Read-only state a check needs besides the checker itself.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub store: &'a ElementStore,
    pub identifiers: &'a IdentifierRegistry,
    pub external: Option<&'a dyn ExternalIdentifierProvider>,
}

/// What a reference value resolved to.
enum ReferenceTarget {
    Local(ElementId),
    External(ClassId),
}

/// The Constraint Engine.
#[derive(Debug)]
pub struct ConstraintChecker {
    metamodel: Arc<Metamodel>,
    options: CheckerOptions,
    root_classes: Option<BTreeSet<ClassId>>,
    allow_duplicates: BTreeSet<ClassId>,
    constraints: ConstraintSet,
    validator: ValueValidator,
    problems: ProblemStore,
    scan: ScanState,
    automatic: bool,
}

impl ConstraintChecker {
    /// Create a checker, resolving the class names of `options`.
    pub fn new(metamodel: Arc<Metamodel>, options: CheckerOptions) -> ConstraintResult<Self> {
        let resolve = |names: &[String]| -> ConstraintResult<BTreeSet<ClassId>> {
            names
                .iter()
                .map(|name| metamodel.class_id(name).ok_or_else(|| ConstraintError::unknown_class(name)))
                .collect()
        };
        let root_classes = options.root_classes.as_deref().map(resolve).transpose()?;
        let allow_duplicates = resolve(&options.allow_duplicates)?;

        Ok(Self {
            automatic: options.automatic_checking,
            metamodel: Arc::clone(&metamodel),
            options,
            root_classes,
            allow_duplicates,
            constraints: ConstraintSet::new(),
            validator: ValueValidator::new()?,
            problems: ProblemStore::new(),
            scan: ScanState::new(),
        })
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Register a custom constraint.
    pub fn add_constraint(&mut self, constraint: FeatureConstraint) -> ConstraintResult<()> {
        self.constraints.add(&self.metamodel, constraint)
    }

    pub fn problems(&self) -> &ProblemStore {
        &self.problems
    }

    // ==================== Scheduling ====================

    pub fn automatic_checking(&self) -> bool {
        self.automatic
    }

    pub fn set_automatic_checking(&mut self, automatic: bool) {
        self.automatic = automatic;
    }

    /// Schedule a full scan on demand.
    pub fn update_all_problems(&mut self) {
        let generation = self.scan.request();
        tracing::debug!(generation, "scan requested");
    }

    pub fn scan_pending(&self) -> bool {
        self.scan.is_pending()
    }

    pub fn scan_generation(&self) -> u64 {
        self.scan.generation()
    }

    /// Check at most one chunk of elements.
    pub fn step(&mut self, ctx: &CheckContext<'_>) -> ScanStatus {
        if !self.scan.prepare(ctx.store) {
            return ScanStatus::Idle;
        }

        let chunk_size = self.options.chunk_size.max(1);
        for _ in 0..chunk_size {
            match self.scan.next(ctx.store) {
                Some(element) => self.update_element_problems(ctx, element),
                None => {
                    let visited = self.scan.finish();
                    tracing::info!(visited, problems = self.problems.len(), "scan finished");
                    return ScanStatus::Finished;
                }
            }
        }
        tracing::debug!(chunk_size, generation = self.scan.generation(), "scan chunk done");
        ScanStatus::Yielded
    }

    /// Run the pending scan to completion.
    pub fn finish_scan(&mut self, ctx: &CheckContext<'_>) -> ScanStatus {
        let mut status = self.step(ctx);
        while status == ScanStatus::Yielded {
            status = self.step(ctx);
        }
        status
    }

    // ==================== Queries ====================

    /// Whether an element of `class` may stand where `target` is expected.
    pub fn is_valid_instance(&self, target: ClassId, class: ClassId) -> bool {
        self.metamodel.is_subtype(class, target)
    }

    pub fn is_valid_value(&self, feature: &FeatureDef, text: &str) -> bool {
        self.validator.is_valid_value(feature, text)
    }

    pub fn attribute_options(&self, feature: &FeatureDef) -> AttributeOptions {
        attribute_options(feature)
    }

    /// Names of the non-abstract classes that may be created in a slot.
    pub fn element_options(&self, slot: SlotRef) -> Vec<&str> {
        let candidates: Vec<ClassId> = match slot {
            SlotRef::Root => match &self.root_classes {
                Some(classes) => classes.iter().copied().collect(),
                None => self.metamodel.classes().map(|class| class.id).collect(),
            },
            SlotRef::Feature { feature, .. } => match self.metamodel.feature(feature).target_class() {
                Some(target) => self.metamodel.allowed_types(target).collect(),
                None => Vec::new(),
            },
        };
        candidates
            .into_iter()
            .map(|id| self.metamodel.class(id))
            .filter(|class| !class.is_abstract)
            .map(|class| class.name.as_str())
            .collect()
    }

    // ==================== Checks ====================

    /// Recheck one element and replace its stored problems.
    pub fn update_element_problems(&mut self, ctx: &CheckContext<'_>, element: ElementId) {
        let Some(class) = ctx.store.class_of(element) else {
            self.problems.clear_element(element);
            return;
        };
        let mut found = ElementProblems {
            element: self.check_element(ctx, element),
            ..Default::default()
        };
        for feature in self.metamodel.all_features(class) {
            let problems = self.check_feature(ctx, element, *feature);
            if !problems.is_empty() {
                found.features.insert(*feature, problems);
            }
        }
        self.problems.replace(element, found);
    }

    /// Element-level problems: placement, abstractness, duplicate identifier.
    pub fn check_element(&self, ctx: &CheckContext<'_>, element: ElementId) -> Vec<String> {
        let mut problems = Vec::new();
        let Some(data) = ctx.store.element(element) else {
            return problems;
        };
        let class = self.metamodel.class(data.class);

        let allowed = match data.owner {
            SlotRef::Root => self
                .root_classes
                .as_ref()
                .map_or(true, |classes| classes.contains(&class.id)),
            SlotRef::Feature { feature, .. } => self
                .metamodel
                .feature(feature)
                .target_class()
                .is_some_and(|target| self.is_valid_instance(target, class.id)),
        };
        if !allowed {
            problems.push(messages::element_not_allowed(&class.name));
        }
        if class.is_abstract {
            problems.push(messages::class_is_abstract(&class.name));
        }

        if !self.allow_duplicates.contains(&class.id) {
            if let Some(identifier) = ctx.identifiers.get_identifier(element) {
                if ctx.identifiers.get_element(identifier).is_some_and(Binding::is_collision) {
                    problems.push(messages::duplicate_identifier(identifier));
                } else if let Some(info) = ctx
                    .external
                    .and_then(|external| external.element_info(identifier, self.options.external_module.as_deref()))
                {
                    problems.push(messages::duplicate_identifier_external(identifier, Some(&info.module)));
                }
            }
        }

        problems
    }

    /// Feature-level problems of one slot, deduplicated in order.
    pub fn check_feature(&self, ctx: &CheckContext<'_>, element: ElementId, feature: FeatureId) -> Vec<String> {
        let mut problems = Vec::new();
        let Some(class) = ctx.store.class_of(element) else {
            return problems;
        };
        let def = self.metamodel.feature(feature);
        let count = ctx.store.filled_count(element, feature);

        if let Some(upper) = def.upper_limit.filter(|_| def.exceeds_upper(count)) {
            if upper == 1 {
                problems.push(match def.kind {
                    FeatureKind::Containment => messages::only_one_element(&def.name),
                    _ => messages::only_one_value(&def.name),
                });
            }
            problems.push(messages::above_upper_limit(upper));
        }
        if def.lower_limit > 0 && count < def.lower_limit {
            if def.lower_limit == 1 {
                problems.push(messages::must_be_specified(&def.name));
            } else {
                problems.push(messages::below_lower_limit(def.lower_limit));
            }
        }

        let constraints = self.constraints.get(class, feature);
        match def.kind {
            FeatureKind::Containment => {
                for child in ctx.store.children(element, feature) {
                    apply_constraints(constraints, ctx.store, element, Target::Element(*child), &mut problems);
                }
            }
            FeatureKind::Reference => {
                for text in ctx.store.value_texts(element, feature) {
                    self.check_reference(ctx, element, def, text, constraints, &mut problems);
                }
            }
            FeatureKind::Attribute => {
                for text in ctx.store.value_texts(element, feature) {
                    if self.validator.is_valid_value(def, text) {
                        apply_constraints(constraints, ctx.store, element, Target::Text(text), &mut problems);
                    } else {
                        problems.push(messages::VALUE_NOT_ALLOWED.to_string());
                    }
                }
            }
        }

        dedup_in_order(problems)
    }

    fn check_reference(
        &self,
        ctx: &CheckContext<'_>,
        element: ElementId,
        feature: &FeatureDef,
        text: &str,
        constraints: &[FeatureConstraint],
        problems: &mut Vec<String>,
    ) {
        let mut targets: Vec<ReferenceTarget> = ctx
            .identifiers
            .get_element(text)
            .map(|binding| binding.elements().iter().copied().map(ReferenceTarget::Local).collect())
            .unwrap_or_default();
        // a class the local metamodel does not know is not a target
        if let Some(class) = ctx
            .external
            .and_then(|external| external.element_info(text, self.options.external_module.as_deref()))
            .and_then(|info| self.metamodel.class_id(&info.class_name))
        {
            targets.push(ReferenceTarget::External(class));
        }

        let target = match targets.as_slice() {
            [] => {
                problems.push(messages::REFERENCE_UNRESOLVED.to_string());
                return;
            }
            [target] => target,
            _ => {
                problems.push(messages::REFERENCE_AMBIGUOUS.to_string());
                return;
            }
        };

        let (class, local) = match target {
            ReferenceTarget::Local(id) => match ctx.store.class_of(*id) {
                Some(class) => (class, Some(*id)),
                None => {
                    problems.push(messages::REFERENCE_UNRESOLVED.to_string());
                    return;
                }
            },
            ReferenceTarget::External(class) => (*class, None),
        };

        let allowed = feature
            .target_class()
            .is_some_and(|expected| self.is_valid_instance(expected, class));
        if !allowed {
            problems.push(messages::reference_not_allowed(self.metamodel.class_name(class)));
        } else if let Some(target) = local {
            apply_constraints(constraints, ctx.store, element, Target::Element(target), problems);
        }
    }
}

fn apply_constraints(
    constraints: &[FeatureConstraint],
    store: &ElementStore,
    element: ElementId,
    target: Target<'_>,
    problems: &mut Vec<String>,
) {
    for constraint in constraints {
        if !constraint.check(store, element, target) {
            problems.push(constraint.message(store, element, target));
        }
    }
}

fn dedup_in_order(problems: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    problems
        .into_iter()
        .filter(|problem| seen.insert(problem.clone()))
        .collect()
}

impl ModelChangeListener for ConstraintChecker {
    fn element_added(&mut self, _: &ElementStore, _: ElementId) {}

    fn element_removed(&mut self, store: &ElementStore, element: ElementId) {
        for id in store.subtree(element) {
            self.problems.clear_element(id);
        }
    }

    fn value_added(&mut self, _: &ElementStore, _: ElementId, _: FeatureId, _: ValueId) {}

    fn value_removed(&mut self, _: &ElementStore, _: ElementId, _: FeatureId, _: ValueId) {}

    fn value_changed(&mut self, _: &ElementStore, _: ElementId, _: FeatureId, _: ValueId, _: &str, _: &str) {}

    fn commit_changes(&mut self, _: &ElementStore) {
        if self.automatic {
            let generation = self.scan.request();
            tracing::debug!(generation, "scan scheduled after commit");
        }
    }
}
