//! Acceptance policies for candidate files.
//!
//! A [`Policy`] decides whether a rewritten candidate is acceptable. Closures
//! over a path are policies, [`CommandPolicy`] runs an external program, and
//! [`ParsesPolicy`] guards another policy with a front-end parse.

use std::fs;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fathom_syntax::Frontend;
use tracing::{debug, warn};

use crate::error::ExperimentError;

/// Tracing target for policy evaluation.
const POLICY_TARGET: &str = "fathom_experiment::policy";

/// Placeholder substituted with the candidate path in command arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Decides whether a candidate file is acceptable.
pub trait Policy: Send + Sync {
    /// Evaluates the candidate at `candidate`.
    ///
    /// A rejection is `Ok(false)`; errors mean the policy itself could not
    /// run.
    ///
    /// # Errors
    ///
    /// Returns an [`ExperimentError`] when evaluation could not complete.
    fn evaluate(&self, candidate: &Path) -> Result<bool, ExperimentError>;
}

impl<F> Policy for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn evaluate(&self, candidate: &Path) -> Result<bool, ExperimentError> {
        Ok(self(candidate))
    }
}

/// Accepts a candidate when an external command exits successfully.
///
/// Every `{file}` in the arguments is replaced by the candidate path; when no
/// argument mentions it, the path is appended.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::time::Duration;
/// use fathom_experiment::{CommandPolicy, Policy};
///
/// let policy = CommandPolicy::new("ruby", ["-c", "{file}"])
///     .with_timeout(Duration::from_secs(30));
/// let accepted = policy.evaluate(Path::new("experiment_1_app.rb"))?;
/// # Ok::<(), fathom_experiment::ExperimentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPolicy {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandPolicy {
    /// Creates a policy running `program` with `args`.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    /// Builds a policy from a command line split into words.
    ///
    /// Returns `None` for an empty command line.
    #[must_use]
    pub fn from_command_line(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Kills the command and rejects the candidate after `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the program this policy runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the arguments with the candidate path substituted.
    #[must_use]
    pub fn arguments_for(&self, candidate: &Path) -> Vec<String> {
        let path = candidate.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &path))
            .collect();
        if !self.args.iter().any(|arg| arg.contains(FILE_PLACEHOLDER)) {
            args.push(path);
        }
        args
    }

    fn spawn(&self, candidate: &Path) -> Result<Child, ExperimentError> {
        Command::new(&self.program)
            .args(self.arguments_for(candidate))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| ExperimentError::PolicySpawn {
                program: self.program.clone(),
                source: Arc::new(err),
            })
    }

    fn wait_error(&self, err: std::io::Error) -> ExperimentError {
        ExperimentError::PolicyWait {
            program: self.program.clone(),
            source: Arc::new(err),
        }
    }

    /// Polls the child until it exits or the timeout elapses.
    fn wait_with_timeout(&self, child: &mut Child, timeout: Duration) -> Result<bool, ExperimentError> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(50);
        loop {
            if let Some(status) = child.try_wait().map_err(|err| self.wait_error(err))? {
                return Ok(status.success());
            }
            if start.elapsed() > timeout {
                warn!(
                    target: POLICY_TARGET,
                    program = %self.program,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "policy timed out, killing process"
                );
                drop(child.kill());
                drop(child.wait());
                return Ok(false);
            }
            std::thread::sleep(poll_interval);
        }
    }
}

impl Policy for CommandPolicy {
    fn evaluate(&self, candidate: &Path) -> Result<bool, ExperimentError> {
        debug!(
            target: POLICY_TARGET,
            program = %self.program,
            candidate = %candidate.display(),
            "running policy command"
        );
        let mut child = self.spawn(candidate)?;
        let accepted = match self.timeout {
            Some(timeout) => self.wait_with_timeout(&mut child, timeout)?,
            None => child
                .wait()
                .map_err(|err| self.wait_error(err))?
                .success(),
        };
        debug!(
            target: POLICY_TARGET,
            program = %self.program,
            accepted,
            "policy command finished"
        );
        Ok(accepted)
    }
}

/// Rejects candidates that no longer parse, then defers to `inner`.
pub struct ParsesPolicy<P> {
    inner: P,
    frontend: Arc<dyn Frontend>,
}

impl<P: Policy> ParsesPolicy<P> {
    /// Wraps `inner`, parsing candidates with `frontend` first.
    #[must_use]
    pub fn new(inner: P, frontend: Arc<dyn Frontend>) -> Self {
        Self { inner, frontend }
    }

    /// Returns the wrapped policy.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Policy> Policy for ParsesPolicy<P> {
    fn evaluate(&self, candidate: &Path) -> Result<bool, ExperimentError> {
        let text = fs::read_to_string(candidate).map_err(|err| ExperimentError::read(candidate, err))?;
        if let Err(err) = self.frontend.parse(&text) {
            debug!(
                target: POLICY_TARGET,
                candidate = %candidate.display(),
                error = %err,
                "candidate no longer parses"
            );
            return Ok(false);
        }
        self.inner.evaluate(candidate)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fathom_syntax::SexpFrontend;
    use mockall::mock;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    mock! {
        Inner {}
        impl Policy for Inner {
            fn evaluate(&self, candidate: &Path) -> Result<bool, ExperimentError>;
        }
    }

    fn candidate(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("candidate.sexp");
        fs::write(&path, contents).expect("write candidate");
        path
    }

    #[test]
    fn closures_are_policies() {
        let policy = |path: &Path| path.ends_with("keep.sexp");
        assert!(policy.evaluate(Path::new("/tmp/keep.sexp")).expect("evaluate"));
        assert!(!policy.evaluate(Path::new("/tmp/drop.sexp")).expect("evaluate"));
    }

    #[rstest]
    #[case(vec!["-c", "{file}"], vec!["-c", "/w/a.sexp"])]
    #[case(vec!["--check"], vec!["--check", "/w/a.sexp"])]
    #[case(vec!["--path={file}", "{file}"], vec!["--path=/w/a.sexp", "/w/a.sexp"])]
    fn substitutes_candidate_path(#[case] args: Vec<&str>, #[case] expected: Vec<&str>) {
        let policy = CommandPolicy::new("check", args);
        assert_eq!(policy.arguments_for(Path::new("/w/a.sexp")), expected);
    }

    #[test]
    fn command_exit_status_decides() {
        let dir = TempDir::new().expect("temp dir");
        let path = candidate(&dir, "(keep)");
        let grep = |pattern: &str| CommandPolicy::new("grep", ["-q", pattern, FILE_PLACEHOLDER]);
        assert!(grep("keep").evaluate(&path).expect("evaluate"));
        assert!(!grep("absent").evaluate(&path).expect("evaluate"));
    }

    #[test]
    fn slow_commands_are_rejected_after_timeout() {
        let dir = TempDir::new().expect("temp dir");
        let path = candidate(&dir, "(int 1)");
        let policy = CommandPolicy::new("sh", ["-c", "sleep 5", "policy"])
            .with_timeout(Duration::from_millis(100));
        let start = Instant::now();
        assert!(!policy.evaluate(&path).expect("evaluate"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_an_error() {
        let policy = CommandPolicy::new("fathom-policy-that-does-not-exist", Vec::<String>::new());
        let err = policy.evaluate(Path::new("x.sexp")).expect_err("should fail");
        assert!(matches!(err, ExperimentError::PolicySpawn { .. }), "{err}");
    }

    #[test]
    fn empty_command_line_has_no_policy() {
        assert!(CommandPolicy::from_command_line(&[]).is_none());
        let words = vec![String::from("make"), String::from("check")];
        let policy = CommandPolicy::from_command_line(&words).expect("policy");
        assert_eq!(policy.program(), "make");
    }

    #[test]
    fn unparsable_candidates_skip_the_inner_policy() {
        let dir = TempDir::new().expect("temp dir");
        let path = candidate(&dir, "(int 1");
        let mut inner = MockInner::new();
        inner.expect_evaluate().never();
        let policy = ParsesPolicy::new(inner, Arc::new(SexpFrontend));
        assert!(!policy.evaluate(&path).expect("evaluate"));
    }

    #[test]
    fn parsable_candidates_reach_the_inner_policy() {
        let dir = TempDir::new().expect("temp dir");
        let path = candidate(&dir, "(int 1)");
        let mut inner = MockInner::new();
        inner.expect_evaluate().once().returning(|_| Ok(true));
        let policy = ParsesPolicy::new(inner, Arc::new(SexpFrontend));
        assert!(policy.evaluate(&path).expect("evaluate"));
    }
}
