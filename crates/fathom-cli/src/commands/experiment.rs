use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use fathom_config::Config;
use fathom_experiment::{
    CommandPolicy, Experiment, ExperimentConfig, ExperimentRunner, FileOutcome, FileStatus,
    ParsesPolicy, combination_label,
};
use fathom_syntax::{RewriteRule, SexpFrontend};

use super::compile;
use crate::cli::ExperimentArgs;
use crate::errors::AppError;

pub(super) fn experiment<W: Write>(
    args: &ExperimentArgs,
    config: &Config,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    let pattern = compile(&args.pattern)?;
    let rule = RewriteRule::new(pattern, args.template.as_str()).map_err(AppError::Template)?;

    let base_command =
        CommandPolicy::from_command_line(&args.policy).ok_or(AppError::MissingPolicy)?;
    let command = match policy_timeout(args.timeout, config) {
        Some(limit) => base_command.with_timeout(limit),
        None => base_command,
    };
    let policy = ParsesPolicy::new(command, Arc::new(SexpFrontend));
    let experiment = Experiment::from_rule("cli", rule, policy).with_lookup(args.paths.iter());

    let runner = ExperimentRunner::new(
        ExperimentConfig::default()
            .with_max_combinations(config.max_combinations())
            .with_jobs(config.jobs())
            .with_extension(config.experiment_extension()),
    );
    let outcomes = runner.run(&experiment)?;

    let mut failed = false;
    for outcome in &outcomes {
        failed |= matches!(outcome.status(), FileStatus::Failed(_));
        writeln!(stdout, "{}", describe(outcome)).map_err(AppError::Output)?;
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Resolves the policy timeout; a flag of zero disables it outright.
const fn policy_timeout(flag: Option<u64>, config: &Config) -> Option<Duration> {
    match flag {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.policy_timeout(),
    }
}

fn describe(outcome: &FileOutcome) -> String {
    let path = outcome.path().display();
    match outcome.status() {
        FileStatus::NoOccurrences => format!("{path}: no occurrences"),
        FileStatus::Committed { fragment } => format!(
            "{path}: rewrote occurrences {} of {}",
            combination_label(fragment),
            outcome.occurrences()
        ),
        FileStatus::Unchanged => format!(
            "{path}: unchanged after {} candidates",
            outcome.candidates_tested()
        ),
        FileStatus::BudgetExceeded(error) => format!("{path}: unchanged, {error}"),
        FileStatus::Cancelled => format!("{path}: cancelled"),
        FileStatus::Failed(error) => format!("{path}: failed, {error}"),
        _ => format!("{path}: {:?}", outcome.status()),
    }
}
