mod report;

pub use report::{ReportCollector, ReportConfig, Reporter};

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One timed operation performed against the target service.
///
/// A record is created just before the operation starts and finished with the operation's result,
/// which captures the elapsed wall-clock time and whether the operation failed at the transport
/// level. Attributes carry extra dimensions, such as the response status for an HTTP request.
#[derive(Clone, Debug)]
pub struct OperationRecord {
    operation_id: String,
    started: Instant,
    elapsed: Option<Duration>,
    is_error: bool,
    attr: HashMap<String, String>,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
            attr: HashMap::new(),
        }
    }

    /// Capture the elapsed time since the record was created and whether the operation failed.
    pub fn finish<T, E>(mut self, result: &Result<T, E>) -> Self {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = result.is_err();
        self
    }

    /// Override the measured elapsed time. Intended for tests that need known durations.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr.insert(name.into(), value.into());
        self
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn attr(&self) -> &HashMap<String, String> {
        &self.attr
    }
}

/// The outcome of one named check evaluated against one response.
///
/// Checks are advisory. They are tallied for the end-of-run summary and never influence the
/// iteration that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckRecord {
    name: String,
    passed: bool,
}

impl CheckRecord {
    pub fn new(name: impl Into<String>, passed: bool) -> Self {
        Self {
            name: name.into(),
            passed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}
