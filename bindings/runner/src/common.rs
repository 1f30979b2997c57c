use std::time::Duration;

use anyhow::Context;
use gust_runner::prelude::{
    CheckRecord, GustResult, HookResult, RunnerContext, UserContext,
};
use http_client_instrumented::prelude::{HttpClientInstrumented, InstrumentedResponse};
use url::Url;

use crate::context::HttpUserContext;
use crate::runner_context::HttpRunnerContext;

/// Parses the scenario's target into the base [Url] that every virtual user requests against.
///
/// Call this function in your scenario `setup` hook:
/// ```rust
/// use http_gust_runner::prelude::{configure_base_url, HookResult, HttpRunnerContext, RunnerContext};
///
/// fn setup(ctx: &mut RunnerContext<HttpRunnerContext>) -> HookResult {
///     configure_base_url(ctx)?;
///     Ok(())
/// }
/// ```
///
/// After calling this function you will be able to use `base_url` in your user hooks.
pub fn configure_base_url(ctx: &mut RunnerContext<HttpRunnerContext>) -> HookResult {
    let target = ctx.get_target().to_string();

    let base_url = Url::parse(&target)
        .with_context(|| format!("Target '{}' is not a valid base URL", target))?;
    ctx.get_mut().base_url = Some(base_url);

    Ok(())
}

/// Builds this virtual user's HTTP client against the run's base URL.
///
/// Call this function in your user setup hook:
/// ```rust
/// use http_gust_runner::prelude::{connect_client, HookResult, HttpRunnerContext, HttpUserContext, UserContext};
///
/// fn user_setup(ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>) -> HookResult {
///     connect_client(ctx)?;
///     Ok(())
/// }
/// ```
///
/// The client pools connections for the lifetime of the user that owns it; nothing is shared
/// between users.
pub fn connect_client(ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>) -> HookResult {
    let base_url = ctx.runner_context().get().base_url();
    let reporter = ctx.runner_context().reporter();

    let client = HttpClientInstrumented::new(base_url, reporter)?;
    ctx.get_mut().client = Some(client);

    Ok(())
}

/// Issue one GET request against `path`, resolved relative to the run's base URL.
///
/// Blocks this virtual user until a response arrives or the transport fails; no other user is
/// affected. A transport failure fails the iteration that made the request, nothing is retried.
pub fn http_get(
    ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>,
    path: &str,
) -> GustResult<InstrumentedResponse> {
    let client = ctx.get().client();

    ctx.runner_context()
        .executor()
        .execute_in_place(async move { client.get(path).await })
}

/// Evaluate a named check against a response and record the outcome.
///
/// Checks are advisory: the outcome is tallied for the end-of-run summary and returned to the
/// caller, but a failed check does not abort the iteration and nothing is retried.
pub fn check<F>(
    ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>,
    response: &InstrumentedResponse,
    name: &str,
    predicate: F,
) -> bool
where
    F: FnOnce(&InstrumentedResponse) -> bool,
{
    let passed = predicate(response);

    ctx.runner_context()
        .reporter()
        .add_check(CheckRecord::new(name, passed));

    if !passed {
        log::debug!("Check '{}' failed for user {}", name, ctx.user_name());
    }

    passed
}

/// Pause this virtual user before its next iteration.
///
/// The pause races the run's shutdown signal, so stopping the run is never delayed by think
/// time.
pub fn pace(
    ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>,
    duration: Duration,
) -> HookResult {
    ctx.runner_context()
        .executor()
        .execute_in_place(async move {
            tokio::time::sleep(duration).await;
            Ok(())
        })
}
