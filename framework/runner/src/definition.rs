use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::cli::{GustScenarioCli, ReporterOpt};
use crate::context::{RunnerContext, UserContext, UserValuesConstraint};
use crate::stages::{LoadProfile, LoadStage};

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type GlobalHook<RV> = fn(Arc<RunnerContext<RV>>) -> HookResult;
pub type UserHookMut<RV, V> = fn(&mut UserContext<RV, V>) -> HookResult;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario binary to declare the workload that you want to
/// run: the target base URL, the staged load profile and the hooks.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint, V: UserValuesConstraint> {
    /// The name of the scenario, which should be unique within the test suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: GustScenarioCli,
    /// The base URL of the service under test. Required; substituting the real deployment here
    /// is the one edit a scenario needs before it can be pointed at another environment.
    target: Option<String>,
    /// The scenario's default load stages. Run-level `--vus`/`--duration` overrides replace
    /// these with a constant profile.
    stages: Vec<LoadStage>,
    /// Global setup hook for this scenario. It will be run once, before any virtual users are
    /// started.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// Setup hook for a virtual user, run once as that user starts.
    setup_user_fn: Option<UserHookMut<RV, V>>,
    /// The iteration body for this scenario, run repeatedly by every virtual user until the
    /// user is retired or the run stops.
    iteration_fn: Option<UserHookMut<RV, V>>,
    /// Teardown hook for a virtual user, run once as that user stops. Best effort.
    teardown_user_fn: Option<UserHookMut<RV, V>>,
    /// Global teardown hook, run once after all virtual users have stopped. Best effort.
    teardown_fn: Option<GlobalHook<RV>>,
}

/// A scenario definition resolved against the run-level CLI, ready to be run.
#[derive(Debug)]
pub(crate) struct ScenarioDefinition<RV: UserValuesConstraint, V: UserValuesConstraint> {
    pub name: String,
    pub target: String,
    pub profile: LoadProfile,
    pub soak: bool,
    pub no_progress: bool,
    pub reporter_opt: ReporterOpt,
    pub run_id: String,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub setup_user_fn: Option<UserHookMut<RV, V>>,
    pub iteration_fn: Option<UserHookMut<RV, V>>,
    pub teardown_user_fn: Option<UserHookMut<RV, V>>,
    pub teardown_fn: Option<GlobalHook<RV>>,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> ScenarioDefinitionBuilder<RV, V> {
    /// Initialise a new scenario definition from the scenario name, parsing the command line
    /// and initialising logging. See [ScenarioDefinitionBuilder::name] for more information
    /// about the name.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, crate::init::init())
    }

    /// Initialise a new scenario definition from the scenario name and an already-parsed CLI.
    pub fn new(name: &str, cli: GustScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            target: None,
            stages: Vec::new(),
            setup_fn: None,
            setup_user_fn: None,
            iteration_fn: None,
            teardown_user_fn: None,
            teardown_fn: None,
        }
    }

    /// Set the base URL of the service under test.
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// Set the scenario's default load stages.
    pub fn with_default_stages(mut self, stages: Vec<LoadStage>) -> Self {
        self.stages = stages;
        self
    }

    /// Set the global setup hook [ScenarioDefinitionBuilder::setup_fn] for this scenario.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the virtual user setup hook [ScenarioDefinitionBuilder::setup_user_fn] for this
    /// scenario.
    pub fn use_user_setup(mut self, setup_user_fn: UserHookMut<RV, V>) -> Self {
        self.setup_user_fn = Some(setup_user_fn);
        self
    }

    /// Set the iteration body [ScenarioDefinitionBuilder::iteration_fn] for this scenario.
    pub fn use_iteration(mut self, iteration_fn: UserHookMut<RV, V>) -> Self {
        self.iteration_fn = Some(iteration_fn);
        self
    }

    /// Set the virtual user teardown hook [ScenarioDefinitionBuilder::teardown_user_fn] for
    /// this scenario.
    pub fn use_user_teardown(mut self, teardown_user_fn: UserHookMut<RV, V>) -> Self {
        self.teardown_user_fn = Some(teardown_user_fn);
        self
    }

    /// Set the global teardown hook [ScenarioDefinitionBuilder::teardown_fn] for this scenario.
    pub fn use_teardown(mut self, teardown_fn: GlobalHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV, V>> {
        let target = self
            .target
            .context("No target set for this scenario, call `with_target` with the base URL of the service under test")?;
        url::Url::parse(&target)
            .with_context(|| format!("Scenario target '{}' is not a valid URL", target))?;

        let profile = Self::resolve_profile(&self.cli, self.stages);
        anyhow::ensure!(
            !profile.is_empty(),
            "Scenario has no load profile, declare stages with `with_default_stages` or pass --vus/--duration"
        );

        let run_id = self
            .cli
            .run_id
            .clone()
            .unwrap_or_else(|| nanoid::nanoid!(8));

        Ok(ScenarioDefinition {
            name: self.name,
            target,
            profile,
            soak: self.cli.soak,
            no_progress: self.cli.no_progress,
            reporter_opt: self.cli.reporter,
            run_id,
            setup_fn: self.setup_fn,
            setup_user_fn: self.setup_user_fn,
            iteration_fn: self.iteration_fn,
            teardown_user_fn: self.teardown_user_fn,
            teardown_fn: self.teardown_fn,
        })
    }

    /// Run-level overrides replace the staged profile with a constant one. A missing side keeps
    /// the scenario's configured peak target or total staged duration.
    fn resolve_profile(cli: &GustScenarioCli, stages: Vec<LoadStage>) -> LoadProfile {
        match (cli.vus, cli.duration) {
            (None, None) => LoadProfile::new(stages),
            (vus, duration) => {
                let configured = LoadProfile::new(stages);
                LoadProfile::constant(
                    vus.unwrap_or_else(|| configured.peak()),
                    duration
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| configured.total_duration()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct NoValues {}

    impl UserValuesConstraint for NoValues {}

    fn sample_cli() -> GustScenarioCli {
        GustScenarioCli {
            vus: None,
            duration: None,
            soak: false,
            no_progress: true,
            reporter: ReporterOpt::Noop,
            run_id: None,
        }
    }

    fn sample_stages() -> Vec<LoadStage> {
        vec![
            LoadStage::new(Duration::from_secs(30), 100),
            LoadStage::new(Duration::from_secs(90), 150),
            LoadStage::new(Duration::from_secs(300), 250),
        ]
    }

    fn builder(cli: GustScenarioCli) -> ScenarioDefinitionBuilder<NoValues, NoValues> {
        ScenarioDefinitionBuilder::new("definition_tests", cli)
            .with_target("http://localhost:8080")
            .with_default_stages(sample_stages())
    }

    #[test]
    fn stages_become_the_profile_when_no_overrides_are_given() {
        let definition = builder(sample_cli()).build().unwrap();

        assert_eq!(definition.profile, LoadProfile::new(sample_stages()));
        assert_eq!(definition.profile.total_duration(), Duration::from_secs(420));
    }

    #[test]
    fn vus_and_duration_replace_the_staged_profile() {
        let mut cli = sample_cli();
        cli.vus = Some(50);
        cli.duration = Some(600);

        let definition = builder(cli).build().unwrap();

        assert_eq!(
            definition.profile,
            LoadProfile::constant(50, Duration::from_secs(600))
        );
    }

    #[test]
    fn vus_override_keeps_the_configured_total_duration() {
        let mut cli = sample_cli();
        cli.vus = Some(10);

        let definition = builder(cli).build().unwrap();

        assert_eq!(
            definition.profile,
            LoadProfile::constant(10, Duration::from_secs(420))
        );
    }

    #[test]
    fn duration_override_keeps_the_configured_peak() {
        let mut cli = sample_cli();
        cli.duration = Some(60);

        let definition = builder(cli).build().unwrap();

        assert_eq!(
            definition.profile,
            LoadProfile::constant(250, Duration::from_secs(60))
        );
    }

    #[test]
    fn a_target_is_required() {
        let result = ScenarioDefinitionBuilder::<NoValues, NoValues>::new(
            "definition_tests",
            sample_cli(),
        )
        .with_default_stages(sample_stages())
        .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("with_target"));
    }

    #[test]
    fn an_unparseable_target_is_rejected() {
        let result = ScenarioDefinitionBuilder::<NoValues, NoValues>::new(
            "definition_tests",
            sample_cli(),
        )
        .with_target("not a url")
        .with_default_stages(sample_stages())
        .build();

        assert!(result.is_err());
    }

    #[test]
    fn a_load_profile_is_required() {
        let result = ScenarioDefinitionBuilder::<NoValues, NoValues>::new(
            "definition_tests",
            sample_cli(),
        )
        .with_target("http://localhost:8080")
        .build();

        assert!(result.is_err());
    }

    #[test]
    fn an_explicit_run_id_is_kept() {
        let mut cli = sample_cli();
        cli.run_id = Some("run-1".to_string());

        let definition = builder(cli).build().unwrap();

        assert_eq!(definition.run_id, "run-1");
    }
}
