use crate::CheckRecord;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Tabled)]
pub struct CheckRow {
    pub check: String,
    pub passes: usize,
    pub fails: usize,
    pub pass_rate: String,
}

#[derive(Default)]
struct Tally {
    passes: usize,
    fails: usize,
}

/// Fold check records into one row per check name, ordered by name.
pub(super) fn check_rows(records: &[CheckRecord]) -> Vec<CheckRow> {
    records
        .iter()
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, Tally>, record| {
            let tally = acc.entry(record.name().to_string()).or_default();
            if record.passed() {
                tally.passes += 1;
            } else {
                tally.fails += 1;
            }
            acc
        })
        .into_iter()
        .map(|(check, tally)| {
            let total = tally.passes + tally.fails;
            CheckRow {
                check,
                passes: tally.passes,
                fails: tally.fails,
                pass_rate: format!("{:.2}%", tally.passes as f64 * 100.0 / total as f64),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tallies_by_check_name() {
        let rows = check_rows(&[
            CheckRecord::new("status was 200", true),
            CheckRecord::new("status was 200", true),
            CheckRecord::new("status was 200", false),
            CheckRecord::new("response time < 500ms", true),
        ]);

        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].check, "response time < 500ms");
        assert_eq!(rows[0].passes, 1);
        assert_eq!(rows[0].fails, 0);
        assert_eq!(rows[0].pass_rate, "100.00%");

        assert_eq!(rows[1].check, "status was 200");
        assert_eq!(rows[1].passes, 2);
        assert_eq!(rows[1].fails, 1);
        assert_eq!(rows[1].pass_rate, "66.67%");
    }

    #[test]
    fn all_failing_check_has_zero_pass_rate() {
        let rows = check_rows(&[
            CheckRecord::new("response time < 500ms", false),
            CheckRecord::new("response time < 500ms", false),
        ]);

        assert_eq!(rows[0].passes, 0);
        assert_eq!(rows[0].fails, 2);
        assert_eq!(rows[0].pass_rate, "0.00%");
    }
}
