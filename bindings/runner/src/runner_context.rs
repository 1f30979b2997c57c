use gust_runner::prelude::UserValuesConstraint;
use url::Url;

/// Run-wide values for HTTP scenarios.
///
/// Populated by [crate::common::configure_base_url] in the scenario setup hook.
#[derive(Default, Debug)]
pub struct HttpRunnerContext {
    pub base_url: Option<Url>,
}

impl UserValuesConstraint for HttpRunnerContext {}

impl HttpRunnerContext {
    pub fn base_url(&self) -> Url {
        self.base_url
            .clone()
            .expect("base_url is not set, did you call `configure_base_url` in your scenario setup?")
    }
}
