use http_gust_runner::prelude::*;
use std::time::Duration;

// Replace with your actual application URL
const BASE_URL: &str = "http://goapp.YOUR_DOMAIN.com";

fn setup(ctx: &mut RunnerContext<HttpRunnerContext>) -> HookResult {
    configure_base_url(ctx)?;
    Ok(())
}

fn user_setup(ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>) -> HookResult {
    connect_client(ctx)?;
    Ok(())
}

fn iteration(ctx: &mut UserContext<HttpRunnerContext, HttpUserContext>) -> HookResult {
    let response = http_get(ctx, "/")?;

    check(ctx, &response, "status was 200", status_was_200);
    check(ctx, &response, "response time < 500ms", response_time_under_500ms);

    // Pause for 1 second between iterations
    pace(ctx, Duration::from_secs(1))?;

    Ok(())
}

fn status_was_200(response: &InstrumentedResponse) -> bool {
    response.status() == 200
}

fn response_time_under_500ms(response: &InstrumentedResponse) -> bool {
    response.duration() < Duration::from_millis(500)
}

fn main() -> GustResult<()> {
    let builder = ScenarioDefinitionBuilder::<HttpRunnerContext, HttpUserContext>::new_with_init(
        env!("CARGO_PKG_NAME"),
    )
    .with_target(BASE_URL)
    .with_default_stages(vec![
        LoadStage::new(Duration::from_secs(30), 100),
        LoadStage::new(Duration::from_secs(90), 150),
        LoadStage::new(Duration::from_secs(300), 250),
    ])
    .use_setup(setup)
    .use_user_setup(user_setup)
    .use_iteration(iteration);

    run(builder)?;

    Ok(())
}
