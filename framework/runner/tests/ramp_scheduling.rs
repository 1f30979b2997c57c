use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use gust_core::prelude::UserBailError;
use gust_runner::prelude::{
    run, GustScenarioCli, HookResult, LoadStage, ReporterOpt, ScenarioDefinitionBuilder,
    UserContext, UserValuesConstraint,
};

#[derive(Default, Debug)]
struct RunnerContextValue {}

impl UserValuesConstraint for RunnerContextValue {}

#[derive(Default, Debug)]
struct UserContextValue {}

impl UserValuesConstraint for UserContextValue {}

fn sample_cli_cfg() -> GustScenarioCli {
    GustScenarioCli {
        vus: None,
        duration: None,
        soak: false,
        no_progress: true,
        reporter: ReporterOpt::Noop,
        run_id: None,
    }
}

fn scenario(
    cli: GustScenarioCli,
    name: &str,
    stages: Vec<LoadStage>,
) -> ScenarioDefinitionBuilder<RunnerContextValue, UserContextValue> {
    ScenarioDefinitionBuilder::new(name, cli)
        .with_target("http://localhost:8080")
        .with_default_stages(stages)
}

#[test]
fn runs_as_many_users_as_the_profile_asks_for() {
    static SEEN_USERS: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

    fn iteration(ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        SEEN_USERS
            .lock()
            .unwrap()
            .insert(ctx.user_name().to_string());
        std::thread::sleep(Duration::from_millis(10));
        Ok(())
    }

    let result = run(scenario(
        sample_cli_cfg(),
        "runs_as_many_users_as_the_profile_asks_for",
        vec![
            LoadStage::new(Duration::ZERO, 3),
            LoadStage::new(Duration::from_millis(600), 3),
        ],
    )
    .use_iteration(iteration));

    assert!(result.is_ok());
    let seen = SEEN_USERS.lock().unwrap();
    assert_eq!(
        *seen,
        BTreeSet::from(["user-0".to_string(), "user-1".to_string(), "user-2".to_string()])
    );
}

#[test]
fn run_level_overrides_replace_the_staged_profile() {
    static SEEN_USERS: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

    fn iteration(ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        SEEN_USERS
            .lock()
            .unwrap()
            .insert(ctx.user_name().to_string());
        std::thread::sleep(Duration::from_millis(10));
        Ok(())
    }

    let mut cli = sample_cli_cfg();
    cli.vus = Some(2);
    cli.duration = Some(1);

    // The staged profile would only ever run one user, the overrides must win
    let result = run(scenario(
        cli,
        "run_level_overrides_replace_the_staged_profile",
        vec![
            LoadStage::new(Duration::ZERO, 1),
            LoadStage::new(Duration::from_secs(120), 1),
        ],
    )
    .use_iteration(iteration));

    assert!(result.is_ok());
    let seen = SEEN_USERS.lock().unwrap();
    assert_eq!(seen.len(), 2);
}

#[test]
fn users_that_bail_are_not_respawned() {
    static SPAWNED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

    fn iteration(ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        SPAWNED.lock().unwrap().insert(ctx.user_name().to_string());
        Err(UserBailError::default().into())
    }

    let result = run(scenario(
        sample_cli_cfg(),
        "users_that_bail_are_not_respawned",
        vec![
            LoadStage::new(Duration::ZERO, 2),
            LoadStage::new(Duration::from_millis(600), 2),
        ],
    )
    .use_iteration(iteration));

    assert!(result.is_ok());
    // Both users bailed on their first iteration; the scheduler must leave them retired rather
    // than replacing them for the rest of the run.
    assert_eq!(SPAWNED.lock().unwrap().len(), 2);
}

#[test]
fn every_user_is_torn_down_when_the_profile_completes() {
    static STARTED: AtomicUsize = AtomicUsize::new(0);
    static TORN_DOWN: AtomicUsize = AtomicUsize::new(0);

    fn user_setup(_ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        STARTED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn iteration(_ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        std::thread::sleep(Duration::from_millis(10));
        Ok(())
    }

    fn user_teardown(_ctx: &mut UserContext<RunnerContextValue, UserContextValue>) -> HookResult {
        TORN_DOWN.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    let result = run(scenario(
        sample_cli_cfg(),
        "every_user_is_torn_down_when_the_profile_completes",
        vec![
            LoadStage::new(Duration::ZERO, 2),
            LoadStage::new(Duration::from_millis(500), 2),
        ],
    )
    .use_user_setup(user_setup)
    .use_iteration(iteration)
    .use_user_teardown(user_teardown));

    assert!(result.is_ok());
    assert_eq!(STARTED.load(Ordering::SeqCst), 2);
    assert_eq!(TORN_DOWN.load(Ordering::SeqCst), 2);
}
