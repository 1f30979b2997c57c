mod cli;
mod context;
mod definition;
mod executor;
mod init;
mod monitor;
mod progress;
mod run;
mod shutdown;
mod stages;
mod types;

pub mod prelude {
    pub use crate::cli::{GustScenarioCli, ReporterOpt};
    pub use crate::context::{RunnerContext, UserContext, UserValuesConstraint};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::executor::Executor;
    pub use crate::run::run;
    pub use crate::stages::{LoadProfile, LoadStage};
    pub use crate::types::GustResult;

    /// Re-export of the core types so hooks can name the shutdown and bail errors without an
    /// extra dependency.
    pub use gust_core::prelude::*;

    /// Re-export of the instruments used from hooks.
    pub use gust_instruments::{CheckRecord, OperationRecord, ReportConfig, Reporter};
}
