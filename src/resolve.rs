//! Heuristic column discovery.
//!
//! Source files name their columns inconsistently ("class" vs "класс" vs
//! "group"), so each required role carries a table of accepted header
//! aliases. Matching lowercases the header and compares exactly; the
//! earliest column in schema order wins.

use crate::dataset::Dataset;
use crate::error::AnalysisError;
use std::fmt;

/// A column role the pipeline needs before it can aggregate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Class,
    Student,
    Grade,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Class => "class",
            Role::Student => "student",
            Role::Grade => "grade",
        };
        f.write_str(name)
    }
}

/// Accepted lowercase header names for each role.
static CLASS_ALIASES: &[&str] = &["class", "класс", "grade_class", "group"];
static STUDENT_ALIASES: &[&str] = &["student", "ученик", "fio", "name"];
static GRADE_ALIASES: &[&str] = &["grade", "оценка", "балл", "mark", "score"];

/// Alias tables driving the heuristic.
///
/// The defaults cover the known source locales; tests and future locales can
/// extend them. Entries must be lowercase.
#[derive(Debug, Clone)]
pub struct AliasConfig {
    pub class: Vec<String>,
    pub student: Vec<String>,
    pub grade: Vec<String>,
}

impl Default for AliasConfig {
    fn default() -> Self {
        let owned = |aliases: &[&str]| aliases.iter().map(|a| a.to_string()).collect();
        AliasConfig {
            class: owned(CLASS_ALIASES),
            student: owned(STUDENT_ALIASES),
            grade: owned(GRADE_ALIASES),
        }
    }
}

/// Resolved column indices for the three roles.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRoles {
    pub class: usize,
    pub student: usize,
    pub grade: usize,
}

/// Scans the merged schema for the first column matching each role's alias
/// set.
///
/// Fails with [`AnalysisError::UnresolvedColumns`] listing every role that
/// found no column; the run halts without attempting partial analysis.
pub fn resolve(dataset: &Dataset, config: &AliasConfig) -> Result<ColumnRoles, AnalysisError> {
    let find = |aliases: &[String]| {
        dataset
            .columns
            .iter()
            .position(|col| aliases.iter().any(|a| *a == col.to_lowercase()))
    };

    let class = find(&config.class);
    let student = find(&config.student);
    let grade = find(&config.grade);

    match (class, student, grade) {
        (Some(class), Some(student), Some(grade)) => Ok(ColumnRoles {
            class,
            student,
            grade,
        }),
        _ => {
            let mut missing = Vec::new();
            if class.is_none() {
                missing.push(Role::Class);
            }
            if student.is_none() {
                missing.push(Role::Student);
            }
            if grade.is_none() {
                missing.push(Role::Grade);
            }
            Err(AnalysisError::UnresolvedColumns(missing))
        }
    }
}
