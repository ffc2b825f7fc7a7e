//! Runtime tests driven through [`run_with_loader`](crate::run_with_loader).

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use fathom_config::Config;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::config::{ConfigLoader, OrthoConfigLoader};
use crate::errors::AppError;
use crate::run_with_loader;

const PROGRAM: &str = "(begin (send nil :puts (int 1))\n  (send nil :puts (int 2)))\n";

/// Loader returning a fixed configuration and recording its arguments.
#[derive(Default)]
struct StubLoader {
    config: Config,
    seen: std::cell::RefCell<Vec<OsString>>,
}

impl ConfigLoader for StubLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().extend(args.iter().cloned());
        Ok(self.config.clone())
    }
}

struct Workspace {
    dir: TempDir,
    program: PathBuf,
}

impl Workspace {
    /// Runs the CLI and returns the exit code plus captured streams, with
    /// the temporary directory replaced by `<dir>`.
    fn run<L: ConfigLoader>(&self, loader: &L, args: &[&str]) -> (ExitCode, String, String) {
        let argv = std::iter::once("fathom")
            .chain(args.iter().copied())
            .map(OsString::from);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_with_loader(argv, &mut stdout, &mut stderr, loader);
        let dir = self.dir.path().display().to_string();
        let clean = |bytes: Vec<u8>| {
            String::from_utf8(bytes)
                .expect("utf-8 output")
                .replace(&dir, "<dir>")
        };
        (code, clean(stdout), clean(stderr))
    }

    fn program_arg(&self) -> String {
        self.program.display().to_string()
    }
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let program = dir.path().join("program.sexp");
    fs::write(&program, PROGRAM).expect("write program");
    Workspace { dir, program }
}

#[rstest]
fn search_lists_positions(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, stderr) =
        workspace.run(&StubLoader::default(), &["search", "(send nil puts _)", program.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS, "{stderr}");
    insta::assert_snapshot!(stdout, @r"
    <dir>/program.sexp:1:8: (send nil :puts (int 1))
    <dir>/program.sexp:2:3: (send nil :puts (int 2))
    ");
}

#[rstest]
fn capture_emits_json(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, _) = workspace.run(
        &StubLoader::default(),
        &["capture", "(send nil puts $_)", program.as_str(), "--format", "json"],
    );
    assert_eq!(code, ExitCode::SUCCESS);
    insta::assert_snapshot!(stdout, @r#"
    [
      {
        "path": "<dir>/program.sexp",
        "captures": [
          "(int 1)",
          "(int 2)"
        ]
      }
    ]
    "#);
}

#[rstest]
fn rewrite_prints_the_selected_occurrence(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, _) = workspace.run(
        &StubLoader::default(),
        &["rewrite", "(int $_)", "(float $1.0)", program.as_str(), "--only", "2"],
    );
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        stdout,
        "(begin (send nil :puts (int 1))\n  (send nil :puts (float 2.0)))\n"
    );
    assert_eq!(fs::read_to_string(&workspace.program).expect("read"), PROGRAM);
}

#[rstest]
fn rewrite_can_write_in_place(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, _) = workspace.run(
        &StubLoader::default(),
        &["rewrite", "(int $_)", "(float $1.0)", program.as_str(), "--write"],
    );
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(stdout.is_empty());
    assert_eq!(
        fs::read_to_string(&workspace.program).expect("read"),
        "(begin (send nil :puts (float 1.0))\n  (send nil :puts (float 2.0)))\n"
    );
}

#[rstest]
fn experiment_commits_accepted_rewrites(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, stderr) = workspace.run(
        &StubLoader::default(),
        &[
            "experiment",
            "(int $_)",
            "(float $1.0)",
            program.as_str(),
            "--policy",
            "sh",
            "-c",
            "! grep -q 'float 2' \"$1\"",
            "policy",
            "{file}",
        ],
    );
    assert_eq!(code, ExitCode::SUCCESS, "{stderr}");
    assert_eq!(stdout, "<dir>/program.sexp: rewrote occurrences 1 of 2\n");
    assert_eq!(
        fs::read_to_string(&workspace.program).expect("read"),
        "(begin (send nil :puts (float 1.0))\n  (send nil :puts (int 2)))\n"
    );
}

#[rstest]
fn zero_timeout_flag_disables_the_configured_limit(workspace: Workspace) {
    let program = workspace.program_arg();
    let loader = StubLoader {
        config: Config {
            policy_timeout_secs: 1,
            ..Config::default()
        },
        ..StubLoader::default()
    };
    let (code, stdout, stderr) = workspace.run(
        &loader,
        &[
            "experiment",
            "(int $_)",
            "(float $1.0)",
            program.as_str(),
            "--timeout",
            "0",
            "--policy",
            "sh",
            "-c",
            "grep -q 'float 2' \"$1\" && exit 1; sleep 2",
            "policy",
            "{file}",
        ],
    );
    assert_eq!(code, ExitCode::SUCCESS, "{stderr}");
    assert_eq!(stdout, "<dir>/program.sexp: rewrote occurrences 1 of 2\n");
}

#[rstest]
fn default_configuration_loads_without_flags(workspace: Workspace) {
    let program = workspace.program_arg();
    let (code, stdout, stderr) =
        workspace.run(&OrthoConfigLoader, &["search", "(int _)", program.as_str()]);
    assert_eq!(code, ExitCode::SUCCESS, "{stderr}");
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
}

#[rstest]
fn config_flags_reach_the_loader(workspace: Workspace) {
    let program = workspace.program_arg();
    let loader = StubLoader::default();
    let (code, _, _) = workspace.run(
        &loader,
        &["--log-filter", "debug", "search", "(int _)", program.as_str()],
    );
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        *loader.seen.borrow(),
        ["fathom", "--log-filter", "debug"].map(OsString::from)
    );
}

#[rstest]
#[case(&["search", "(int", "x.sexp"], "invalid pattern")]
#[case(&["search", "(int _)", "missing.sexp"], "failed to read")]
#[case(&["rewrite", "(int _)", "$1", "x.sexp"], "invalid template")]
fn operational_failures_exit_with_one(
    workspace: Workspace,
    #[case] args: &[&str],
    #[case] message: &str,
) {
    let (code, stdout, stderr) = workspace.run(&StubLoader::default(), args);
    assert_eq!(code, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains(message), "{stderr}");
}

#[rstest]
fn usage_errors_exit_with_two(workspace: Workspace) {
    let (code, _, stderr) = workspace.run(&StubLoader::default(), &["search"]);
    assert_eq!(code, ExitCode::from(2));
    assert!(stderr.contains("Usage"), "{stderr}");
}

#[rstest]
fn help_goes_to_stdout(workspace: Workspace) {
    let (code, stdout, _) = workspace.run(&StubLoader::default(), &["--help"]);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(stdout.contains("experiment"), "{stdout}");
}
