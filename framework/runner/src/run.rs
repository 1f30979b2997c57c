use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use gust_core::prelude::{ShutdownHandle, ShutdownSignalError, UserBailError};
use gust_instruments::ReportConfig;

use crate::cli::ReporterOpt;
use crate::context::{RunnerContext, UserContext, UserValuesConstraint};
use crate::definition::{ScenarioDefinition, ScenarioDefinitionBuilder};
use crate::executor::Executor;
use crate::monitor::start_monitor;
use crate::progress::start_progress;
use crate::shutdown::start_shutdown_listener;

/// How often the scheduler compares the live virtual user count against the load profile.
const RECONCILE_TICK: Duration = Duration::from_millis(100);

struct UserHandle {
    name: String,
    stop: ShutdownHandle,
    join: JoinHandle<()>,
}

pub fn run<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV, V>,
) -> anyhow::Result<()> {
    let definition = definition.build()?;

    log::info!(
        "Running scenario {} [run {}] against {}",
        definition.name,
        definition.run_id,
        definition.target
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime)?;
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));

    let report_config = ReportConfig::new(definition.name.clone(), definition.run_id.clone());
    let reporter = Arc::new(match definition.reporter_opt {
        ReporterOpt::Summary => report_config.enable_summary().init(),
        ReporterOpt::Noop => report_config.init(),
    });

    let mut runner_context = RunnerContext::new(
        executor,
        reporter,
        shutdown_handle.clone(),
        definition.run_id.clone(),
        definition.target.clone(),
    );

    if let Some(setup_fn) = &definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let current_users = Arc::new(AtomicUsize::new(0));

    // A soak run has no planned end, so there is no progress to show for it
    if !definition.no_progress && !definition.soak {
        start_progress(
            definition.profile.total_duration(),
            current_users.clone(),
            shutdown_handle.new_listener(),
        );
    }

    let runner_context = Arc::new(runner_context);
    let runner_context_for_teardown = runner_context.clone();

    // Ready to start spawning virtual users, so start the resource monitor to report generator
    // saturation that might lead to a misleading outcome.
    start_monitor(shutdown_handle.new_listener());

    let outcome = drive_load(&definition, runner_context, &shutdown_handle, &current_users);

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't crash the runner if the teardown fails. We still want the reporting and runner
        // shutdown to happen cleanly. The hook is documented as 'best effort'
        if let Err(e) = teardown_fn(runner_context_for_teardown.clone()) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    runner_context_for_teardown.reporter().finalize();

    outcome
}

/// Follow the load profile until it completes or the run is stopped.
///
/// On every tick the live virtual user count is reconciled against the profile: missing users
/// are spawned, excess users are retired newest-first. Retirement takes effect between
/// iterations, an in-flight iteration is left to complete. Users that end on their own (a
/// failed user setup or a [UserBailError]) stay gone and reduce the load accordingly.
fn drive_load<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: &ScenarioDefinition<RV, V>,
    runner_context: Arc<RunnerContext<RV>>,
    shutdown_handle: &ShutdownHandle,
    current_users: &AtomicUsize,
) -> anyhow::Result<()> {
    let mut cycle_listener = shutdown_handle.new_listener();
    let started = Instant::now();

    let mut users: Vec<UserHandle> = Vec::new();
    let mut finished: Vec<UserHandle> = Vec::new();
    let mut spawned_total = 0usize;
    let mut ended_early = 0usize;

    loop {
        if cycle_listener.should_shutdown() {
            log::info!("Run stopped before the load profile completed");
            break;
        }

        let elapsed = started.elapsed();
        if !definition.soak && elapsed >= definition.profile.total_duration() {
            log::info!("Load profile complete");
            break;
        }

        // Reap users whose thread ended on its own, they stay gone
        let mut index = 0;
        while index < users.len() {
            if users[index].join.is_finished() {
                let user = users.remove(index);
                log::debug!("User {} ended early", user.name);
                finished.push(user);
                ended_early += 1;
            } else {
                index += 1;
            }
        }

        let desired = definition
            .profile
            .users_at(elapsed)
            .saturating_sub(ended_early);

        while users.len() < desired {
            let user = spawn_user(definition, &runner_context, shutdown_handle, spawned_total)?;
            spawned_total += 1;
            users.push(user);
        }

        // Newest users retire first so that long-lived users keep their connections
        while users.len() > desired {
            let Some(user) = users.pop() else { break };
            log::debug!("Retiring user {}", user.name);
            user.stop.shutdown();
            finished.push(user);
        }

        current_users.store(users.len(), Ordering::Relaxed);
        std::thread::sleep(RECONCILE_TICK);
    }

    shutdown_handle.shutdown();
    current_users.store(0, Ordering::Relaxed);

    for user in users.into_iter().chain(finished) {
        user.join
            .join()
            .map_err(|e| anyhow::anyhow!("Error joining thread for user {}: {:?}", user.name, e))?;
    }

    Ok(())
}

fn spawn_user<RV: UserValuesConstraint, V: UserValuesConstraint>(
    definition: &ScenarioDefinition<RV, V>,
    runner_context: &Arc<RunnerContext<RV>>,
    shutdown_handle: &ShutdownHandle,
    index: usize,
) -> anyhow::Result<UserHandle> {
    let user_name = format!("user-{}", index);

    // For the user loop to notice that it has been individually retired
    let stop = ShutdownHandle::new();
    let mut retire_listener = stop.new_listener();
    // For the user loop to check if the whole run is stopping between iterations
    let mut cycle_listener = shutdown_handle.new_listener();
    // For the hook implementations to listen for shutdown and respond appropriately
    let delegated_listener = shutdown_handle.new_listener();

    let runner_context = runner_context.clone();
    let setup_user_fn = definition.setup_user_fn;
    let iteration_fn = definition.iteration_fn;
    let teardown_user_fn = definition.teardown_user_fn;

    let thread_user_name = user_name.clone();
    let join = std::thread::Builder::new()
        .name(user_name.clone())
        .spawn(move || {
            let mut context =
                UserContext::new(thread_user_name.clone(), runner_context, delegated_listener);

            if let Some(setup_user_fn) = setup_user_fn {
                if let Err(e) = setup_user_fn(&mut context) {
                    log::error!("User setup failed for {}: {:?}", thread_user_name, e);
                    return;
                }
            }

            if let Some(iteration_fn) = iteration_fn {
                loop {
                    if cycle_listener.should_shutdown() || retire_listener.should_shutdown() {
                        log::debug!("Stopping user {}", thread_user_name);
                        break;
                    }

                    match iteration_fn(&mut context) {
                        Ok(()) => {}
                        Err(e) if e.is::<ShutdownSignalError>() => {
                            // Expected when the run shuts down with an iteration in flight. The
                            // check at the top of the loop will catch this and break out.
                        }
                        Err(e) if e.is::<UserBailError>() => {
                            log::info!("User {} is bailing", thread_user_name);
                            break;
                        }
                        Err(e) => {
                            log::error!("Iteration failed for user {}: {:?}", thread_user_name, e);
                        }
                    }
                }
            }

            if let Some(teardown_user_fn) = teardown_user_fn {
                if let Err(e) = teardown_user_fn(&mut context) {
                    log::error!("User teardown failed for {}: {:?}", thread_user_name, e);
                }
            }
        })
        .with_context(|| format!("Failed to spawn thread for user {}", user_name))?;

    log::debug!("Started user {}", user_name);

    Ok(UserHandle {
        name: user_name,
        stop,
        join,
    })
}
