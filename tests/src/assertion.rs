//! Assertion types and builders for verifying step results.

use trellis_workspace::Workspace;

use crate::error::{ScenarioError, ScenarioResult};
use crate::operations::resolve_all;

type Check = Box<dyn Fn(&Workspace) -> bool>;

/// A complete assertion for a step.
#[derive(Default)]
pub struct Assertion {
    // Error assertions
    pub error: Option<String>,
    pub error_pattern: Option<String>,

    // Identifier assertions
    pub identifiers: Option<Vec<String>>,
    pub bound: Vec<(String, usize)>,

    // Problem assertions
    pub problem_count: Option<usize>,
    pub element_problems: Vec<(String, Vec<String>)>,
    pub feature_problems: Vec<(String, String, Vec<String>)>,

    // Model assertions
    pub roots: Option<usize>,

    pub custom: Option<Check>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("error", &self.error)
            .field("error_pattern", &self.error_pattern)
            .field("identifiers", &self.identifiers)
            .field("bound", &self.bound)
            .field("problem_count", &self.problem_count)
            .field("element_problems", &self.element_problems)
            .field("feature_problems", &self.feature_problems)
            .field("roots", &self.roots)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a step outcome and the settled workspace.
    pub fn verify(&self, step: &str, result: &ScenarioResult<()>, ws: &Workspace) -> ScenarioResult<()> {
        let fail = |message: String| Err(ScenarioError::assertion_failed(step, message));

        if let Some(expected) = &self.error {
            match result {
                Err(e) if e.to_string().contains(expected.as_str()) => {}
                Err(e) => return fail(format!("expected error containing '{expected}', got: {e}")),
                Ok(()) => return fail(format!("expected error containing '{expected}', but step succeeded")),
            }
        } else if let Some(pattern) = &self.error_pattern {
            let re = regex_lite::Regex::new(pattern)
                .map_err(|e| ScenarioError::assertion_failed(step, format!("invalid regex pattern: {e}")))?;
            match result {
                Err(e) if re.is_match(&e.to_string()) => {}
                Err(e) => return fail(format!("expected error matching '{pattern}', got: {e}")),
                Ok(()) => return fail(format!("expected error matching '{pattern}', but step succeeded")),
            }
        } else if let Err(e) = result {
            return fail(format!("step failed: {e}"));
        }

        if let Some(expected) = &self.identifiers {
            let actual = ws.identifiers();
            if &actual != expected {
                return fail(format!("expected identifiers {expected:?}, got {actual:?}"));
            }
        }

        for (identifier, expected) in &self.bound {
            let actual = ws
                .get_element(identifier)
                .map_or(0, |binding| binding.elements().len());
            if actual != *expected {
                return fail(format!(
                    "expected '{identifier}' bound to {expected} element(s), got {actual}"
                ));
            }
        }

        if let Some(expected) = self.problem_count {
            let actual = ws.problem_count();
            if actual != expected {
                return fail(format!(
                    "expected {expected} problem(s), got {actual}: {:?}",
                    ws.problems()
                ));
            }
        }

        for (identifier, expected) in &self.element_problems {
            for element in resolve_all(ws, identifier)? {
                let actual = ws.element_problems(element);
                if &actual != expected {
                    return fail(format!(
                        "expected problems {expected:?} on '{identifier}' ({element}), got {actual:?}"
                    ));
                }
            }
        }

        for (identifier, feature, expected) in &self.feature_problems {
            for element in resolve_all(ws, identifier)? {
                let actual = ws.feature_problems(element, feature)?;
                if &actual != expected {
                    return fail(format!(
                        "expected problems {expected:?} on '{identifier}.{feature}', got {actual:?}"
                    ));
                }
            }
        }

        if let Some(expected) = self.roots {
            let actual = ws.store().roots().len();
            if actual != expected {
                return fail(format!("expected {expected} root element(s), got {actual}"));
            }
        }

        if let Some(check) = &self.custom {
            if !check(ws) {
                return fail("custom assertion failed".to_string());
            }
        }

        Ok(())
    }
}

/// Fluent builder for an [`Assertion`].
#[derive(Debug, Default)]
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect the step to fail with an error containing `message`.
    pub fn error(mut self, message: &str) -> Self {
        self.assertion.error = Some(message.to_string());
        self
    }

    /// Expect the step to fail with an error matching a regex.
    pub fn error_matches(mut self, pattern: &str) -> Self {
        self.assertion.error_pattern = Some(pattern.to_string());
        self
    }

    /// Expect exactly these identifiers to be bound, in sorted order.
    pub fn identifiers(mut self, identifiers: &[&str]) -> Self {
        self.assertion.identifiers = Some(identifiers.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Expect an identifier to be bound to `count` elements.
    pub fn bound(mut self, identifier: &str, count: usize) -> Self {
        self.assertion.bound.push((identifier.to_string(), count));
        self
    }

    pub fn unbound(self, identifier: &str) -> Self {
        self.bound(identifier, 0)
    }

    /// Expect the total number of problems.
    pub fn problems(mut self, count: usize) -> Self {
        self.assertion.problem_count = Some(count);
        self
    }

    pub fn clean(self) -> Self {
        self.problems(0)
    }

    /// Expect the element-level problems of every element bound to `identifier`.
    pub fn element_problems(mut self, identifier: &str, messages: &[&str]) -> Self {
        self.assertion
            .element_problems
            .push((identifier.to_string(), to_strings(messages)));
        self
    }

    /// Expect the problems of one feature slot of every element bound to `identifier`.
    pub fn feature_problems(mut self, identifier: &str, feature: &str, messages: &[&str]) -> Self {
        self.assertion
            .feature_problems
            .push((identifier.to_string(), feature.to_string(), to_strings(messages)));
        self
    }

    pub fn roots(mut self, count: usize) -> Self {
        self.assertion.roots = Some(count);
        self
    }

    pub fn custom(mut self, check: impl Fn(&Workspace) -> bool + 'static) -> Self {
        self.assertion.custom = Some(Box::new(check));
        self
    }

    pub fn build(self) -> Assertion {
        self.assertion
    }
}

fn to_strings(messages: &[&str]) -> Vec<String> {
    messages.iter().map(|message| message.to_string()).collect()
}
