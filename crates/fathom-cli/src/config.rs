//! Configuration loading helpers.
//!
//! Configuration flags precede the subcommand. They are split off and handed
//! to `ortho-config`; everything from the first other token onwards goes to
//! the command parser.

use std::ffi::{OsStr, OsString};

use fathom_config::Config;
use ortho_config::OrthoConfig;

use crate::errors::AppError;

/// Flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`fathom_config::Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--max-combinations",
    "--jobs",
    "--policy-timeout-secs",
    "--experiment-extension",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name plus configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !has_inline_value,
        };
    }
    FlagAction::Skip
}

#[derive(Debug)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Separates leading configuration flags from the command line.
///
/// Both halves keep the program name so each parser sees a full argv.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut consumed = 0usize;
    let mut pending_value = false;
    for argument in rest {
        if pending_value {
            pending_value = false;
        } else if let FlagAction::Include { needs_value } = classify(argument) {
            pending_value = needs_value;
        } else {
            break;
        }
        config_arguments.push(argument.clone());
        consumed = consumed.saturating_add(1);
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(rest.iter().skip(consumed).cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
