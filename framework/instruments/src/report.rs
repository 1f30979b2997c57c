mod summary_reporter;

pub use summary_reporter::SummaryReporter;

use crate::{CheckRecord, OperationRecord};
use parking_lot::Mutex;

/// A sink for the records produced during a run.
///
/// Collectors receive every operation and check as it happens and are given one chance to emit
/// their output when the run finishes.
pub trait ReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord);

    fn add_check(&mut self, check_record: &CheckRecord);

    fn finalize(&self);
}

/// Configuration for the reporting done during a run, built by the runner from the scenario
/// definition and CLI.
pub struct ReportConfig {
    scenario_name: String,
    run_id: String,
    enable_summary: bool,
}

impl ReportConfig {
    pub fn new(scenario_name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            run_id: run_id.into(),
            enable_summary: false,
        }
    }

    /// Print summary tables of operations and checks when the run finishes.
    pub fn enable_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors: Vec<Box<dyn ReportCollector + Send>> = Vec::new();

        if self.enable_summary {
            collectors.push(Box::new(SummaryReporter::new(
                self.scenario_name.clone(),
                self.run_id.clone(),
            )));
        }

        Reporter {
            collectors: Mutex::new(collectors),
        }
    }
}

/// The facade the runner, clients and hooks report through.
///
/// Shared behind an `Arc` between every virtual user, so all methods take `&self` and lock
/// internally. With no collectors configured this is a no-op sink.
pub struct Reporter {
    collectors: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn add_operation(&self, operation_record: OperationRecord) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_operation(&operation_record);
        }
    }

    pub fn add_check(&self, check_record: CheckRecord) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_check(&check_record);
        }
    }

    pub fn finalize(&self) {
        for collector in self.collectors.lock().iter() {
            collector.finalize();
        }
    }
}
