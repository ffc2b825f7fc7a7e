//! Drives experiments over files.
//!
//! For each file the runner counts occurrences, then walks the
//! [`CombinationSearch`] rounds: every candidate combination is rewritten
//! into a sibling file named `experiment_<indices>_<name>`, judged by the
//! policy and removed again. The best accepted combination is written back
//! over the original. Files are independent and may run on worker threads;
//! the search within one file is sequential.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use fathom_syntax::{RewriteResult, Rewriter, SyntaxNode};
use tracing::{debug, info, warn};

use crate::config::ExperimentConfig;
use crate::error::{ExperimentError, SearchError};
use crate::experiment::Experiment;
use crate::search::{Combination, CombinationSearch, combination_label};

/// Tracing target for experiment runs.
const RUNNER_TARGET: &str = "fathom_experiment::runner";

/// Cooperative cancellation shared between a runner and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How processing one file ended.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum FileStatus {
    /// The pattern does not occur in the file.
    NoOccurrences,
    /// The fragment's rewrite replaced the original file.
    Committed {
        /// Occurrence indices rewritten.
        fragment: Combination,
    },
    /// No candidate passed the policy; the file is untouched.
    Unchanged,
    /// A round exceeded the combination budget; the file is untouched.
    BudgetExceeded(SearchError),
    /// Cancellation was requested; the file is untouched.
    Cancelled,
    /// Processing failed; the file is untouched.
    Failed(ExperimentError),
}

impl FileStatus {
    /// Returns whether the original file was rewritten.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Result of running an experiment over one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    path: PathBuf,
    occurrences: usize,
    rounds: usize,
    candidates_tested: usize,
    status: FileStatus,
}

impl FileOutcome {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            occurrences: 0,
            rounds: 0,
            candidates_tested: 0,
            status: FileStatus::Unchanged,
        }
    }

    fn finish(mut self, status: FileStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns how many occurrences the file held.
    #[must_use]
    pub const fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Returns how many rounds proposed candidates.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    /// Returns how many candidates were judged by the policy.
    #[must_use]
    pub const fn candidates_tested(&self) -> usize {
        self.candidates_tested
    }

    /// Returns how processing ended.
    #[must_use]
    pub const fn status(&self) -> &FileStatus {
        &self.status
    }
}

/// Runs experiments according to an [`ExperimentConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExperimentRunner {
    config: ExperimentConfig,
    cancel: CancellationFlag,
}

impl ExperimentRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            cancel: CancellationFlag::new(),
        }
    }

    /// Shares `flag` with the caller for cooperative cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Returns the runner configuration.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs `experiment` over every file in its lookup paths.
    ///
    /// Outcomes are returned in lookup order regardless of worker count.
    ///
    /// # Errors
    ///
    /// Returns [`ExperimentError::Read`] when a lookup path cannot be
    /// listed. Failures while processing a file are reported in its outcome.
    pub fn run(&self, experiment: &Experiment) -> Result<Vec<FileOutcome>, ExperimentError> {
        let files = self.collect_files(experiment.lookup())?;
        info!(
            target: RUNNER_TARGET,
            experiment = experiment.name(),
            files = files.len(),
            jobs = self.config.jobs(),
            "starting experiment"
        );
        Ok(self.run_files(experiment, &files))
    }

    /// Runs `experiment` over one file.
    #[must_use]
    pub fn run_file(&self, experiment: &Experiment, path: &Path) -> FileOutcome {
        let mut outcome = FileOutcome::new(path);
        if self.cancel.is_cancelled() {
            return outcome.finish(FileStatus::Cancelled);
        }
        let status = match self.search_file(experiment, path, &mut outcome) {
            Ok(status) => status,
            Err(err) => {
                warn!(
                    target: RUNNER_TARGET,
                    path = %path.display(),
                    error = %err,
                    "experiment failed for file"
                );
                FileStatus::Failed(err)
            }
        };
        outcome.finish(status)
    }

    fn run_files(&self, experiment: &Experiment, files: &[PathBuf]) -> Vec<FileOutcome> {
        let workers = self.config.jobs().min(files.len());
        if workers <= 1 {
            return files
                .iter()
                .map(|path| self.run_file(experiment, path))
                .collect();
        }

        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..workers {
                let worker_sender = sender.clone();
                let cursor = &next;
                scope.spawn(move || {
                    loop {
                        let position = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(path) = files.get(position) else {
                            break;
                        };
                        if worker_sender
                            .send((position, self.run_file(experiment, path)))
                            .is_err()
                        {
                            break;
                        }
                    }
                });
            }
        });
        drop(sender);

        let mut results: Vec<(usize, FileOutcome)> = receiver.into_iter().collect();
        results.sort_by_key(|(position, _)| *position);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn search_file(
        &self,
        experiment: &Experiment,
        path: &Path,
        outcome: &mut FileOutcome,
    ) -> Result<FileStatus, ExperimentError> {
        let source = fs::read_to_string(path).map_err(|err| ExperimentError::read(path, err))?;
        let tree = experiment
            .frontend()
            .parse(&source)
            .map_err(|err| ExperimentError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?;
        outcome.occurrences = experiment.pattern().search(&tree).len();
        if outcome.occurrences == 0 {
            return Ok(FileStatus::NoOccurrences);
        }
        debug!(
            target: RUNNER_TARGET,
            path = %path.display(),
            occurrences = outcome.occurrences,
            "searching combinations"
        );

        let candidate = CandidateBuilder {
            experiment,
            path,
            source: &source,
            tree: &tree,
        };
        let mut search = CombinationSearch::new(outcome.occurrences, self.config.max_combinations());
        loop {
            if self.cancel.is_cancelled() {
                return Ok(FileStatus::Cancelled);
            }
            let round = match search.next_round() {
                Ok(round) => round,
                Err(err) => {
                    warn!(
                        target: RUNNER_TARGET,
                        path = %path.display(),
                        error = %err,
                        "combination budget exceeded, leaving file unchanged"
                    );
                    return Ok(FileStatus::BudgetExceeded(err));
                }
            };
            if round.is_empty() {
                break;
            }
            outcome.rounds = round.number();
            for combination in round.candidates() {
                if self.cancel.is_cancelled() {
                    return Ok(FileStatus::Cancelled);
                }
                let passed = candidate.evaluate(combination)?;
                outcome.candidates_tested = outcome.candidates_tested.saturating_add(1);
                debug!(
                    target: RUNNER_TARGET,
                    path = %path.display(),
                    round = round.number(),
                    combination = %combination_label(combination),
                    passed,
                    "candidate evaluated"
                );
                search.record(combination, passed);
            }
        }

        let Some(fragment) = search.best().cloned() else {
            return Ok(FileStatus::Unchanged);
        };
        let text = candidate.render(&fragment)?;
        fs::write(path, text).map_err(|err| ExperimentError::write(path, err))?;
        info!(
            target: RUNNER_TARGET,
            path = %path.display(),
            fragment = %combination_label(&fragment),
            "committed accepted combination"
        );
        Ok(FileStatus::Committed { fragment })
    }

    fn collect_files(&self, lookup: &[PathBuf]) -> Result<Vec<PathBuf>, ExperimentError> {
        let mut files = Vec::new();
        for path in lookup {
            if path.is_dir() {
                self.walk(path, &mut files)?;
            } else {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ExperimentError> {
        let entries = fs::read_dir(dir).map_err(|err| ExperimentError::read(dir, err))?;
        let mut paths = entries
            .map(|entry| entry.map(|found| found.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ExperimentError::read(dir, err))?;
        paths.sort();
        for path in paths {
            if path.is_dir() {
                self.walk(&path, files)?;
            } else if self.is_candidate_source(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_candidate_source(&self, path: &Path) -> bool {
        let is_leftover = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(CANDIDATE_PREFIX));
        !is_leftover
            && path
                .extension()
                .is_some_and(|ext| ext == self.config.extension())
    }
}

/// File name prefix of candidate files.
const CANDIDATE_PREFIX: &str = "experiment_";

/// Renders and judges candidates for one file.
struct CandidateBuilder<'a> {
    experiment: &'a Experiment,
    path: &'a Path,
    source: &'a str,
    tree: &'a SyntaxNode,
}

impl CandidateBuilder<'_> {
    /// Rewrites only the occurrences in `combination`.
    fn render(&self, combination: &Combination) -> Result<String, ExperimentError> {
        Rewriter::new(self.experiment.pattern())
            .try_rewrite(self.tree, self.source, |session, occurrence| {
                if combination.contains(&session.match_index()) {
                    self.experiment.edit(session, occurrence)?;
                }
                Ok(())
            })
            .map(RewriteResult::into_output)
            .map_err(|err| ExperimentError::Rewrite {
                path: self.path.to_path_buf(),
                source: err,
            })
    }

    /// Writes the candidate beside the original, runs the policy, and
    /// removes the candidate again.
    fn evaluate(&self, combination: &Combination) -> Result<bool, ExperimentError> {
        let text = self.render(combination)?;
        let file = CandidateFile::create(self.path, combination, &text)?;
        self.experiment.policy().evaluate(file.path())
    }
}

/// A candidate file removed on drop.
struct CandidateFile {
    path: PathBuf,
}

impl CandidateFile {
    fn create(original: &Path, combination: &Combination, text: &str) -> Result<Self, ExperimentError> {
        let name = original
            .file_name()
            .map(|found| found.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = original.with_file_name(format!(
            "{CANDIDATE_PREFIX}{}_{name}",
            combination_label(combination)
        ));
        fs::write(&path, text).map_err(|err| ExperimentError::write(&path, err))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CandidateFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            debug!(
                target: RUNNER_TARGET,
                path = %self.path.display(),
                error = %err,
                "failed to remove candidate file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use fathom_syntax::{
        EditSession, Frontend, Occurrence, Pattern, RewriteRule, SyntaxError, Value,
    };
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::policy::Policy;

    const FIVE_LITERALS: &str = "(begin (lit 1) (lit 2) (lit 3) (lit 4) (lit 5))";

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write source");
        path
    }

    /// Rewrites `(lit N)` into `(changed N)`.
    fn literal_experiment(policy: impl Policy + 'static) -> Experiment {
        let pattern = Pattern::compile("(lit $_)").expect("pattern");
        Experiment::new(
            "change-literals",
            pattern,
            |session: &mut EditSession<'_>, occurrence: &Occurrence<'_>| {
                let Some(span) = occurrence.node().span() else {
                    return Ok(());
                };
                let original = session.source().get(span.range()).unwrap_or_default();
                session.replace(span, original.replace("(lit", "(changed"));
                Ok(())
            },
            policy,
        )
    }

    /// Rejects any rewrite of occurrence 2 and rewriting 1 alongside 4.
    fn scenario_policy(path: &Path) -> bool {
        let text = fs::read_to_string(path).expect("candidate");
        !text.contains("(changed 2)") && !(text.contains("(changed 1)") && text.contains("(changed 4)"))
    }

    fn leftovers(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(CANDIDATE_PREFIX))
            .collect();
        names.sort();
        names
    }

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    #[rstest]
    fn commits_the_largest_accepted_combination(dir: TempDir) {
        let path = write(&dir, "program.sexp", FIVE_LITERALS);
        let experiment = literal_experiment(scenario_policy);
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);

        assert_eq!(outcome.occurrences(), 5);
        assert!(outcome.status().is_committed(), "{:?}", outcome.status());
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "(begin (lit 1) (lit 2) (changed 3) (changed 4) (changed 5))"
        );
        assert!(leftovers(&dir).is_empty());
    }

    #[rstest]
    fn candidate_files_sit_beside_the_original(dir: TempDir) {
        let path = write(&dir, "program.sexp", "(begin (lit 1) (lit 2))");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let experiment = literal_experiment(move |candidate: &Path| {
            let name = candidate
                .file_name()
                .map(|found| found.to_string_lossy().into_owned())
                .unwrap_or_default();
            recorder.lock().expect("lock").push(name);
            candidate.exists()
        });
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);

        assert!(outcome.status().is_committed());
        assert_eq!(
            *seen.lock().expect("lock"),
            [
                "experiment_1_program.sexp",
                "experiment_2_program.sexp",
                "experiment_1_2_program.sexp",
            ]
        );
        assert!(leftovers(&dir).is_empty());
    }

    #[rstest]
    fn files_without_occurrences_are_skipped(dir: TempDir) {
        let path = write(&dir, "plain.sexp", "(begin (int 1))");
        let experiment = literal_experiment(|_: &Path| true);
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);
        assert!(matches!(outcome.status(), FileStatus::NoOccurrences));
        assert_eq!(outcome.candidates_tested(), 0);
    }

    #[rstest]
    fn rejected_candidates_leave_the_file_alone(dir: TempDir) {
        let path = write(&dir, "program.sexp", FIVE_LITERALS);
        let experiment = literal_experiment(|_: &Path| false);
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);
        assert!(matches!(outcome.status(), FileStatus::Unchanged));
        assert_eq!(outcome.candidates_tested(), 5);
        assert_eq!(fs::read_to_string(&path).expect("read back"), FIVE_LITERALS);
        assert!(leftovers(&dir).is_empty());
    }

    #[rstest]
    fn oversized_rounds_leave_the_file_alone(dir: TempDir) {
        let path = write(&dir, "program.sexp", FIVE_LITERALS);
        let experiment = literal_experiment(|_: &Path| true);
        let runner = ExperimentRunner::new(ExperimentConfig::default().with_max_combinations(3));
        let outcome = runner.run_file(&experiment, &path);
        assert!(matches!(outcome.status(), FileStatus::BudgetExceeded(_)));
        assert_eq!(fs::read_to_string(&path).expect("read back"), FIVE_LITERALS);
    }

    #[rstest]
    fn cancellation_stops_before_the_next_candidate(dir: TempDir) {
        let path = write(&dir, "program.sexp", FIVE_LITERALS);
        let flag = CancellationFlag::new();
        let trigger = flag.clone();
        let experiment = literal_experiment(move |_: &Path| {
            trigger.cancel();
            true
        });
        let runner = ExperimentRunner::default().with_cancellation(flag);
        let outcome = runner.run_file(&experiment, &path);
        assert!(matches!(outcome.status(), FileStatus::Cancelled));
        assert_eq!(outcome.candidates_tested(), 1);
        assert_eq!(fs::read_to_string(&path).expect("read back"), FIVE_LITERALS);
    }

    struct BrokenPolicy;

    impl Policy for BrokenPolicy {
        fn evaluate(&self, _candidate: &Path) -> Result<bool, ExperimentError> {
            Err(ExperimentError::policy("checker crashed"))
        }
    }

    #[rstest]
    fn policy_errors_abort_the_file(dir: TempDir) {
        let path = write(&dir, "program.sexp", FIVE_LITERALS);
        let outcome = ExperimentRunner::default().run_file(&literal_experiment(BrokenPolicy), &path);
        let FileStatus::Failed(error) = outcome.status() else {
            panic!("expected failure, got {:?}", outcome.status());
        };
        assert_eq!(error.to_string(), "policy failed: checker crashed");
        assert_eq!(fs::read_to_string(&path).expect("read back"), FIVE_LITERALS);
        assert!(leftovers(&dir).is_empty());
    }

    #[rstest]
    fn unparsable_files_are_reported(dir: TempDir) {
        let path = write(&dir, "broken.sexp", "(begin (lit 1)");
        let experiment = literal_experiment(|_: &Path| true);
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);
        assert!(matches!(
            outcome.status(),
            FileStatus::Failed(ExperimentError::Parse { .. })
        ));
    }

    /// Parses every file into `(begin (lit 1))` without source spans.
    struct SpanlessFrontend;

    impl Frontend for SpanlessFrontend {
        fn parse(&self, _source: &str) -> Result<SyntaxNode, SyntaxError> {
            let literal = SyntaxNode::new("lit", vec![Value::int(1)]);
            Ok(SyntaxNode::new("begin", vec![Value::Node(literal)]))
        }
    }

    #[rstest]
    fn rule_rewrites_of_spanless_nodes_fail(dir: TempDir) {
        let path = write(&dir, "program.sexp", "(begin (lit 1))");
        let pattern = Pattern::compile("(lit $_)").expect("pattern");
        let rule = RewriteRule::new(pattern, "(changed $1)").expect("rule");
        let experiment = Experiment::from_rule("spanless", rule, |_: &Path| true)
            .with_frontend(Arc::new(SpanlessFrontend));
        let outcome = ExperimentRunner::default().run_file(&experiment, &path);

        let FileStatus::Failed(ExperimentError::Rewrite { source, .. }) = outcome.status() else {
            panic!("expected rewrite failure, got {:?}", outcome.status());
        };
        assert!(matches!(source, SyntaxError::MissingSpan { tag } if tag == "lit"), "{source}");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "(begin (lit 1))");
        assert!(leftovers(&dir).is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    fn directories_are_walked_in_order(dir: TempDir, #[case] jobs: usize) {
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("nested dir");
        write(&dir, "b.sexp", "(begin (lit 1))");
        write(&dir, "a.sexp", "(begin (lit 1) (lit 2))");
        write(&dir, "notes.txt", "(lit 1)");
        fs::write(nested.join("c.sexp"), "(begin (int 1))").expect("write nested");

        let experiment = literal_experiment(|_: &Path| true).with_lookup([dir.path()]);
        let runner = ExperimentRunner::new(ExperimentConfig::default().with_jobs(jobs));
        let outcomes = runner.run(&experiment).expect("run");

        let names: Vec<String> = outcomes
            .iter()
            .map(|outcome| {
                outcome
                    .path()
                    .strip_prefix(dir.path())
                    .expect("inside dir")
                    .display()
                    .to_string()
            })
            .collect();
        assert_eq!(names, ["a.sexp", "b.sexp", "nested/c.sexp"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.sexp")).expect("read back"),
            "(begin (changed 1) (changed 2))"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).expect("read back"),
            "(lit 1)"
        );
    }
}
