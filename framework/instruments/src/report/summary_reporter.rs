mod checks_table;
mod operations_table;

use crate::report::summary_reporter::checks_table::check_rows;
use crate::report::summary_reporter::operations_table::operation_rows;
use crate::report::ReportCollector;
use crate::{CheckRecord, OperationRecord};
use chrono::{DateTime, Local};
use tabled::settings::Style;
use tabled::Table;

/// Keeps every record in memory and prints summary tables when the run finishes.
///
/// This is the default reporting for a run: an operations table with request counts and latency
/// aggregates, and a checks table with pass/fail tallies per named check.
pub struct SummaryReporter {
    scenario_name: String,
    run_id: String,
    started_at: DateTime<Local>,
    operation_records: Vec<OperationRecord>,
    check_records: Vec<CheckRecord>,
}

impl SummaryReporter {
    pub fn new(scenario_name: String, run_id: String) -> Self {
        Self {
            scenario_name,
            run_id,
            started_at: Local::now(),
            operation_records: Vec::new(),
            check_records: Vec::new(),
        }
    }

    fn print_summary(&self) {
        println!(
            "\nScenario {} [run {}] started at {}",
            self.scenario_name,
            self.run_id,
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
        );

        println!("\nSummary of operations");
        if self.operation_records.is_empty() {
            println!("No operations were recorded");
        } else {
            let mut table = Table::new(operation_rows(&self.operation_records));
            table.with(Style::modern());
            println!("{table}");
        }

        println!("\nSummary of checks");
        if self.check_records.is_empty() {
            println!("No checks were recorded");
        } else {
            let mut table = Table::new(check_rows(&self.check_records));
            table.with(Style::modern());
            println!("{table}");
        }
    }
}

impl ReportCollector for SummaryReporter {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        self.operation_records.push(operation_record.clone());
    }

    fn add_check(&mut self, check_record: &CheckRecord) {
        self.check_records.push(check_record.clone());
    }

    fn finalize(&self) {
        self.print_summary();
    }
}
