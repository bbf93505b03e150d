use crate::analyzers::utility::{mean, pct, round1, round2};
use crate::dataset::{Dataset, ValueKey};
use crate::resolve::ColumnRoles;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Pass threshold: the minimum grade counted as passing.
pub const PASS_THRESHOLD: f64 = 3.0;
/// Quality threshold: the minimum grade counted as high-quality performance.
pub const QUALITY_THRESHOLD: f64 = 4.0;

/// Aggregated academic metrics for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub class_name: String,
    /// Distinct student values within the class.
    pub total_students: usize,
    /// Rows with grade >= 3.
    pub passed_count: usize,
    /// Rows with grade >= 4.
    pub quality_count: usize,
    /// Mean of all row grades, two decimals.
    pub average_score: f64,
    /// passed_count / total_students, percent, one decimal.
    pub success_rate: f64,
    /// quality_count / total_students, percent, one decimal.
    pub quality_rate: f64,
}

struct ClassAccumulator {
    class_name: String,
    students: HashSet<ValueKey>,
    passed: usize,
    quality: usize,
    grades: Vec<f64>,
}

/// Groups rows by the raw class value and computes per-class counts and
/// rates.
///
/// Class values compare by exact equality: no whitespace or case
/// normalization, and a numeric spreadsheet cell never equals its textual
/// form. Rows whose class cell is empty or absent belong to no class and are
/// skipped. Report order is first-seen class order, so identical input
/// always yields an identical report.
///
/// The rates divide a row-count numerator by a distinct-student denominator;
/// a student with several grade rows can push a rate past 100%.
pub fn aggregate(dataset: &Dataset, roles: &ColumnRoles) -> Vec<ClassReport> {
    let mut order: Vec<ValueKey> = Vec::new();
    let mut groups: HashMap<ValueKey, ClassAccumulator> = HashMap::new();

    for row in &dataset.rows {
        let Some(class_cell) = row.get(roles.class) else {
            continue;
        };
        let Some(class_key) = class_cell.value_key() else {
            continue;
        };
        let Some(grade) = row.get(roles.grade).and_then(|cell| cell.as_number()) else {
            continue;
        };

        let acc = groups.entry(class_key.clone()).or_insert_with(|| {
            order.push(class_key);
            ClassAccumulator {
                class_name: class_cell.display(),
                students: HashSet::new(),
                passed: 0,
                quality: 0,
                grades: Vec::new(),
            }
        });

        if let Some(student_key) = row.get(roles.student).and_then(|cell| cell.value_key()) {
            acc.students.insert(student_key);
        }
        if grade >= PASS_THRESHOLD {
            acc.passed += 1;
        }
        if grade >= QUALITY_THRESHOLD {
            acc.quality += 1;
        }
        acc.grades.push(grade);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|acc| {
            let total = acc.students.len();
            ClassReport {
                class_name: acc.class_name,
                total_students: total,
                passed_count: acc.passed,
                quality_count: acc.quality,
                average_score: round2(mean(&acc.grades)),
                success_rate: round1(pct(acc.passed, total)),
                quality_rate: round1(pct(acc.quality, total)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CellValue;

    fn roles() -> ColumnRoles {
        ColumnRoles {
            class: 0,
            student: 1,
            grade: 2,
        }
    }

    fn row(class: &str, student: &str, grade: f64) -> Vec<CellValue> {
        vec![
            CellValue::Text(class.into()),
            CellValue::Text(student.into()),
            CellValue::Number(grade),
        ]
    }

    fn dataset(rows: Vec<Vec<CellValue>>) -> Dataset {
        Dataset {
            columns: vec!["class".into(), "student".into(), "grade".into()],
            rows,
        }
    }

    #[test]
    fn test_two_class_metrics() {
        let ds = dataset(vec![
            row("A", "Ivanov", 5.0),
            row("A", "Petrov", 4.0),
            row("A", "Sidorov", 2.0),
            row("B", "Kuznetsov", 3.0),
            row("B", "Orlov", 3.0),
        ]);

        let reports = aggregate(&ds, &roles());
        assert_eq!(reports.len(), 2);

        let a = &reports[0];
        assert_eq!(a.class_name, "A");
        assert_eq!(a.total_students, 3);
        assert_eq!(a.passed_count, 2);
        assert_eq!(a.quality_count, 1);
        assert_eq!(a.average_score, 3.67);
        assert_eq!(a.success_rate, 66.7);
        assert_eq!(a.quality_rate, 33.3);

        let b = &reports[1];
        assert_eq!(b.class_name, "B");
        assert_eq!(b.total_students, 2);
        assert_eq!(b.passed_count, 2);
        assert_eq!(b.quality_count, 0);
        assert_eq!(b.average_score, 3.0);
        assert_eq!(b.success_rate, 100.0);
        assert_eq!(b.quality_rate, 0.0);
    }

    #[test]
    fn test_quality_never_exceeds_passed() {
        let ds = dataset(vec![
            row("A", "a", 2.0),
            row("A", "b", 3.0),
            row("A", "c", 4.0),
            row("A", "d", 5.0),
        ]);
        let reports = aggregate(&ds, &roles());
        assert!(reports[0].quality_count <= reports[0].passed_count);
    }

    #[test]
    fn test_duplicate_student_rows_count_once_for_total() {
        // Two grade rows for the same student: one distinct student, both
        // rows feed passed/quality/average, so the rate exceeds 100%.
        let ds = dataset(vec![row("A", "Ivanov", 5.0), row("A", "Ivanov", 4.0)]);

        let reports = aggregate(&ds, &roles());
        let a = &reports[0];
        assert_eq!(a.total_students, 1);
        assert_eq!(a.passed_count, 2);
        assert_eq!(a.success_rate, 200.0);
        assert_eq!(a.average_score, 4.5);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let ds = dataset(vec![row("A", "a", 3.0), row("A", "b", 4.0)]);
        let reports = aggregate(&ds, &roles());
        assert_eq!(reports[0].passed_count, 2);
        assert_eq!(reports[0].quality_count, 1);
    }

    #[test]
    fn test_class_names_are_not_normalized() {
        let ds = dataset(vec![
            row("A", "a", 4.0),
            row(" A", "b", 4.0),
            row("a", "c", 4.0),
        ]);
        let reports = aggregate(&ds, &roles());
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_rows_without_class_value_are_skipped() {
        let ds = dataset(vec![
            row("A", "a", 4.0),
            vec![
                CellValue::Absent,
                CellValue::Text("b".into()),
                CellValue::Number(5.0),
            ],
        ]);
        let reports = aggregate(&ds, &roles());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].passed_count, 1);
    }

    #[test]
    fn test_absent_students_guard_against_zero_denominator() {
        let ds = dataset(vec![vec![
            CellValue::Text("A".into()),
            CellValue::Absent,
            CellValue::Number(5.0),
        ]]);
        let reports = aggregate(&ds, &roles());
        assert_eq!(reports[0].total_students, 0);
        assert_eq!(reports[0].success_rate, 0.0);
        assert_eq!(reports[0].quality_rate, 0.0);
    }

    #[test]
    fn test_empty_dataset_yields_empty_report() {
        let ds = dataset(vec![]);
        assert!(aggregate(&ds, &roles()).is_empty());
    }

    #[test]
    fn test_report_order_is_first_seen() {
        let ds = dataset(vec![
            row("Z", "a", 4.0),
            row("A", "b", 4.0),
            row("Z", "c", 4.0),
        ]);
        let reports = aggregate(&ds, &roles());
        let names: Vec<&str> = reports.iter().map(|r| r.class_name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A"]);
    }
}
