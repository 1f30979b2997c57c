use std::{fmt::Debug, sync::Arc};

use gust_core::prelude::{DelegatedShutdownListener, ShutdownHandle};
use gust_instruments::Reporter;

use crate::executor::Executor;

/// Constraint on the user-defined values carried by the runner and virtual user contexts.
pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

/// Shared, run-wide context. Created once per run and shared read-only between all virtual
/// users; scenario-owned state lives in the `RV` value populated by the setup hook.
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    run_id: String,
    target: String,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        run_id: String,
        target: String,
    ) -> Self {
        Self {
            executor,
            reporter,
            shutdown_handle,
            run_id,
            target,
            value: Default::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    pub fn get_run_id(&self) -> &str {
        &self.run_id
    }

    /// The base URL of the service under test, exactly as the scenario declared it.
    pub fn get_target(&self) -> &str {
        &self.target
    }

    /// Stop the whole run early, as though the configured load profile had completed.
    pub fn force_stop_scenario(&self) {
        self.shutdown_handle.shutdown();
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}

/// Per virtual user context, owned by the user's thread for the user's lifetime. Nothing in it
/// is shared with other users apart from the read-only runner context.
pub struct UserContext<RV: UserValuesConstraint, V: UserValuesConstraint> {
    user_name: String,
    runner_context: Arc<RunnerContext<RV>>,
    shutdown_listener: DelegatedShutdownListener,
    value: V,
}

impl<RV: UserValuesConstraint, V: UserValuesConstraint> UserContext<RV, V> {
    pub(crate) fn new(
        user_name: String,
        runner_context: Arc<RunnerContext<RV>>,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            user_name,
            runner_context,
            shutdown_listener,
            value: Default::default(),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    pub fn shutdown_listener(&mut self) -> &mut DelegatedShutdownListener {
        &mut self.shutdown_listener
    }

    pub fn get_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn get(&self) -> &V {
        &self.value
    }
}
