//! Experiment definitions.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use fathom_syntax::{
    EditSession, Frontend, Occurrence, Pattern, RewriteRule, SexpFrontend, SyntaxError,
};

use crate::policy::Policy;

/// Edit callback invoked for each selected occurrence.
///
/// An error aborts the candidate being rendered.
pub type EditFn =
    dyn Fn(&mut EditSession<'_>, &Occurrence<'_>) -> Result<(), SyntaxError> + Send + Sync;

/// A named experimental rewrite: what to match, how to edit it, and how to
/// judge the result.
pub struct Experiment {
    name: String,
    pattern: Pattern,
    edit: Box<EditFn>,
    policy: Box<dyn Policy>,
    frontend: Arc<dyn Frontend>,
    lookup: Vec<PathBuf>,
}

impl Experiment {
    /// Creates an experiment using the S-expression front-end.
    #[must_use]
    pub fn new<E, P>(name: impl Into<String>, pattern: Pattern, edit: E, policy: P) -> Self
    where
        E: Fn(&mut EditSession<'_>, &Occurrence<'_>) -> Result<(), SyntaxError>
            + Send
            + Sync
            + 'static,
        P: Policy + 'static,
    {
        Self {
            name: name.into(),
            pattern,
            edit: Box::new(edit),
            policy: Box::new(policy),
            frontend: Arc::new(SexpFrontend),
            lookup: Vec::new(),
        }
    }

    /// Creates an experiment replacing each selected occurrence with the
    /// rule's template.
    ///
    /// Rendering fails with [`SyntaxError::MissingSpan`] when a selected
    /// node has no source span.
    #[must_use]
    pub fn from_rule<P>(name: impl Into<String>, rule: RewriteRule, policy: P) -> Self
    where
        P: Policy + 'static,
    {
        let pattern = rule.pattern().clone();
        Self::new(
            name,
            pattern,
            move |session: &mut EditSession<'_>, occurrence: &Occurrence<'_>| {
                let node = occurrence.node();
                let span = node.span().ok_or_else(|| SyntaxError::missing_span(node.tag()))?;
                let text = rule.render(occurrence, session.source());
                session.replace(span, text);
                Ok(())
            },
            policy,
        )
    }

    /// Replaces the front-end used to parse files.
    #[must_use]
    pub fn with_frontend(mut self, frontend: Arc<dyn Frontend>) -> Self {
        self.frontend = frontend;
        self
    }

    /// Adds files or directories to search for candidates.
    #[must_use]
    pub fn with_lookup<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        self.lookup.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Returns the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the acceptance policy.
    #[must_use]
    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Returns the front-end used to parse files.
    #[must_use]
    pub fn frontend(&self) -> &dyn Frontend {
        self.frontend.as_ref()
    }

    /// Returns the configured lookup paths.
    #[must_use]
    pub fn lookup(&self) -> &[PathBuf] {
        &self.lookup
    }

    pub(crate) fn edit(
        &self,
        session: &mut EditSession<'_>,
        occurrence: &Occurrence<'_>,
    ) -> Result<(), SyntaxError> {
        (self.edit)(session, occurrence)
    }
}

impl fmt::Debug for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.name)
            .field("pattern", &self.pattern.source())
            .field("lookup", &self.lookup)
            .finish_non_exhaustive()
    }
}
