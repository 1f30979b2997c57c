use gust_runner::prelude::UserValuesConstraint;
use http_client_instrumented::prelude::HttpClientInstrumented;

/// Per virtual user values for HTTP scenarios.
///
/// Populated by [crate::common::connect_client] in the user setup hook.
#[derive(Default, Debug)]
pub struct HttpUserContext {
    pub client: Option<HttpClientInstrumented>,
}

impl UserValuesConstraint for HttpUserContext {}

impl HttpUserContext {
    pub fn client(&self) -> HttpClientInstrumented {
        self.client
            .clone()
            .expect("client is not set, did you call `connect_client` in your user setup?")
    }
}
