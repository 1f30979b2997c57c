use crate::OperationRecord;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Tabled)]
pub struct OperationRow {
    pub operation_id: String,
    pub total_operations: usize,
    pub failed_operations: usize,
    #[tabled(display = "float2")]
    pub avg_time_ms: f64,
    #[tabled(display = "float2")]
    pub min_time_ms: f64,
    #[tabled(display = "float2")]
    pub max_time_ms: f64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// Fold records into one row per operation id, ordered by id so the output is stable.
///
/// Latency aggregates only cover operations that completed without a transport error. A row whose
/// operations all failed reports zeroed latencies alongside its failure count.
pub(super) fn operation_rows(records: &[OperationRecord]) -> Vec<OperationRow> {
    records
        .iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, Vec<_>>, record| {
            acc.entry(record.operation_id().to_string())
                .or_default()
                .push(record);
            acc
        })
        .into_iter()
        .map(|(operation_id, operations)| {
            let total_operations = operations.len();
            let failed_operations = operations.iter().filter(|op| op.is_error()).count();

            let timed_micros = operations
                .iter()
                .filter(|op| !op.is_error())
                .filter_map(|op| op.elapsed())
                .map(|elapsed| elapsed.as_micros())
                .collect::<Vec<_>>();

            let (avg, min, max) =
                match (timed_micros.iter().min(), timed_micros.iter().max()) {
                    (Some(min), Some(max)) => {
                        let total: u128 = timed_micros.iter().sum();
                        (
                            total as f64 / timed_micros.len() as f64 / 1000.0,
                            *min as f64 / 1000.0,
                            *max as f64 / 1000.0,
                        )
                    }
                    _ => (0.0, 0.0, 0.0),
                };

            OperationRow {
                operation_id,
                total_operations,
                failed_operations,
                avg_time_ms: avg,
                min_time_ms: min,
                max_time_ms: max,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(id: &str, millis: u64, is_error: bool) -> OperationRecord {
        let result: Result<(), ()> = if is_error { Err(()) } else { Ok(()) };
        OperationRecord::new(id)
            .finish(&result)
            .with_elapsed(Duration::from_millis(millis))
    }

    #[test]
    fn aggregates_by_operation_id() {
        let rows = operation_rows(&[
            record("get /", 100, false),
            record("get /", 300, false),
            record("get /health", 20, false),
        ]);

        assert_eq!(rows.len(), 2);

        // BTreeMap ordering puts "get /" before "get /health"
        assert_eq!(rows[0].operation_id, "get /");
        assert_eq!(rows[0].total_operations, 2);
        assert_eq!(rows[0].failed_operations, 0);
        assert_eq!(rows[0].avg_time_ms, 200.0);
        assert_eq!(rows[0].min_time_ms, 100.0);
        assert_eq!(rows[0].max_time_ms, 300.0);

        assert_eq!(rows[1].operation_id, "get /health");
        assert_eq!(rows[1].total_operations, 1);
    }

    #[test]
    fn failed_operations_are_counted_but_not_timed() {
        let rows = operation_rows(&[
            record("get /", 100, false),
            record("get /", 5000, true),
        ]);

        assert_eq!(rows[0].total_operations, 2);
        assert_eq!(rows[0].failed_operations, 1);
        assert_eq!(rows[0].max_time_ms, 100.0);
    }

    #[test]
    fn all_failed_row_reports_zeroed_latencies() {
        let rows = operation_rows(&[record("get /", 5000, true)]);

        assert_eq!(rows[0].failed_operations, 1);
        assert_eq!(rows[0].avg_time_ms, 0.0);
        assert_eq!(rows[0].min_time_ms, 0.0);
        assert_eq!(rows[0].max_time_ms, 0.0);
    }
}
