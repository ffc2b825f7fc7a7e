//! Experimental rewrites judged by an external policy.
//!
//! An [`Experiment`] pairs a structural pattern with an edit callback and an
//! acceptance [`Policy`]. The [`ExperimentRunner`] applies the edit to
//! growing combinations of occurrences in each file, keeps the largest
//! combination the policy accepts, and writes it back.
//!
//! ```no_run
//! use fathom_experiment::{CommandPolicy, Experiment, ExperimentRunner};
//! use fathom_syntax::{Pattern, RewriteRule};
//!
//! let rule = RewriteRule::new(Pattern::compile("(send nil :puts $_)")?, "(log $1)")?;
//! let policy = CommandPolicy::new("make", ["check"]);
//! let experiment = Experiment::from_rule("puts-to-log", rule, policy).with_lookup(["src"]);
//! for outcome in ExperimentRunner::default().run(&experiment)? {
//!     println!("{}: {:?}", outcome.path().display(), outcome.status());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod experiment;
mod policy;
mod registry;
mod runner;
mod search;

pub use config::{DEFAULT_EXTENSION, ExperimentConfig};
pub use error::{ExperimentError, RegistryError, SearchError};
pub use experiment::{EditFn, Experiment};
pub use policy::{CommandPolicy, FILE_PLACEHOLDER, ParsesPolicy, Policy};
pub use registry::ExperimentRegistry;
pub use runner::{CancellationFlag, ExperimentRunner, FileOutcome, FileStatus};
pub use search::{Combination, CombinationSearch, DEFAULT_MAX_COMBINATIONS, Round, combination_label};
