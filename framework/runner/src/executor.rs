use std::future::Future;

use gust_core::prelude::{ShutdownHandle, ShutdownSignalError};

/// Runs async code on behalf of virtual user hooks, which are plain synchronous functions.
///
/// There is one executor per run, backed by a single shared tokio runtime. Each virtual user
/// thread blocks on it for the duration of its own calls, so an HTTP request suspends only the
/// user that issued it.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
    shutdown_handle: ShutdownHandle,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime, shutdown_handle: ShutdownHandle) -> Self {
        Self {
            runtime,
            shutdown_handle,
        }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// Note that the future will be cancelled if the run is shut down. You do not need to do
    /// anything special to handle this, but you should be aware that submitting a future which
    /// does not support cancelling may prevent the run from shutting down.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        let mut shutdown_listener = self.shutdown_handle.new_listener();
        self.runtime.block_on(async move {
            tokio::select! {
                result = fut => result,
                _ = shutdown_listener.wait_for_shutdown() => {
                    Err(anyhow::anyhow!(ShutdownSignalError::default()))
                },
            }
        })
    }

    /// Submit async code to be run in the background.
    ///
    /// Note that the future will not be cancelled if the run is shut down. It is also not
    /// guaranteed that the runner will wait for the future to complete before shutting down.
    ///
    /// In iteration hooks you should use [Executor::execute_in_place] instead so that your
    /// future completes before the iteration completes and is scheduled again.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }
}
