use crate::cli::GustScenarioCli;
use clap::Parser;

/// Initialise logging and the CLI for a scenario binary.
pub(crate) fn init() -> GustScenarioCli {
    env_logger::init();

    GustScenarioCli::parse()
}
