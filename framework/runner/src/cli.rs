use clap::{Parser, ValueEnum};

/// Run-level options for a scenario binary.
///
/// The workload itself is declared in the scenario: the target base URL and the staged load
/// profile are code, not flags. The CLI only carries overrides and output options for a single
/// run.
#[derive(Debug, Parser)]
#[command(about, long_about = None)]
pub struct GustScenarioCli {
    /// Override the number of virtual users to run.
    ///
    /// Replaces the scenario's staged load profile with a constant profile. If `--duration` is
    /// not also given, the scenario's total staged duration is kept.
    #[clap(long)]
    pub vus: Option<usize>,

    /// Override the number of seconds to run the scenario for.
    ///
    /// Replaces the scenario's staged load profile with a constant profile. If `--vus` is not
    /// also given, the scenario's peak stage target is kept.
    #[clap(long)]
    pub duration: Option<u64>,

    /// Run this scenario as a soak test, holding the final user count and continuing to run
    /// until stopped.
    #[clap(long, default_value = "false")]
    pub soak: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at
    /// by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// The reporter to collect run output with.
    #[clap(long, value_enum, default_value_t = ReporterOpt::Summary)]
    pub reporter: ReporterOpt,

    /// An identifier for this run. A short random id is generated when not provided.
    #[clap(long)]
    pub run_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ReporterOpt {
    /// Print summary tables of operations and checks when the run finishes.
    #[default]
    Summary,
    /// Discard all records.
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_level_overrides() {
        let cli =
            GustScenarioCli::parse_from(["scenario", "--vus", "50", "--duration", "600"]);

        assert_eq!(cli.vus, Some(50));
        assert_eq!(cli.duration, Some(600));
        assert!(!cli.soak);
        assert!(!cli.no_progress);
        assert!(matches!(cli.reporter, ReporterOpt::Summary));
        assert!(cli.run_id.is_none());
    }

    #[test]
    fn defaults_leave_the_scenario_configuration_alone() {
        let cli = GustScenarioCli::parse_from(["scenario"]);

        assert_eq!(cli.vus, None);
        assert_eq!(cli.duration, None);
    }

    #[test]
    fn reporter_can_be_disabled() {
        let cli = GustScenarioCli::parse_from(["scenario", "--reporter", "noop"]);

        assert!(matches!(cli.reporter, ReporterOpt::Noop));
    }
}
