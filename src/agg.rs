use rusqlite::Connection;
use serde::Serialize;

/// Grouping key used when the data source hands back a row with no subject
/// name. Upstream schemas should never produce one, but a dashboard must not
/// key a card on null.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct AggError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AggError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// One grade as read from the data source. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub score: i64,
    pub comment: Option<String>,
}

/// Grades grouped by subject name in first-seen order.
///
/// The dashboard query orders rows by subject name, but grouping itself never
/// re-sorts: card order on screen is the order subjects first appeared in the
/// result set, and grade order within a card is row order.
#[derive(Debug, Clone, Default)]
pub struct SubjectGroups {
    groups: Vec<(String, Vec<GradeRecord>)>,
}

impl SubjectGroups {
    pub fn push(&mut self, subject: &str, grade: GradeRecord) {
        if let Some((_, grades)) = self.groups.iter_mut().find(|(name, _)| name == subject) {
            grades.push(grade);
        } else {
            self.groups.push((subject.to_string(), vec![grade]));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GradeRecord])> {
        self.groups
            .iter()
            .map(|(name, grades)| (name.as_str(), grades.as_slice()))
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Arithmetic mean of the scores; an empty group averages to 0.0.
pub fn average(grades: &[GradeRecord]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    grades.iter().map(|g| g.score as f64).sum::<f64>() / (grades.len() as f64)
}

pub fn format_average(avg: f64) -> String {
    format!("{:.2}", avg)
}

/// Runs the one read the parent dashboard is built from: every grade of every
/// student linked to the guardian, joined to its subject, ordered by subject
/// name (rowid as the tiebreak so grade order inside a subject is insert
/// order), then grouped.
pub fn fetch_guardian_grades(
    conn: &Connection,
    guardian_id: &str,
) -> Result<SubjectGroups, AggError> {
    let mut stmt = conn
        .prepare(
            "SELECT s.name, g.score, g.comment
             FROM grades g
             JOIN subjects s ON g.subject_id = s.id
             JOIN guardian_students gs ON g.student_id = gs.student_id
             WHERE gs.guardian_id = ?
             ORDER BY s.name, g.rowid",
        )
        .map_err(|e| AggError::new("db_query_failed", e.to_string()))?;

    let rows = stmt
        .query_map([guardian_id], |r| {
            let subject: Option<String> = r.get(0)?;
            let score: i64 = r.get(1)?;
            let comment: Option<String> = r.get(2)?;
            Ok((subject, score, comment))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AggError::new("db_query_failed", e.to_string()))?;

    let mut groups = SubjectGroups::default();
    for (subject, score, comment) in rows {
        let subject = subject.unwrap_or_else(|| UNKNOWN_SUBJECT.to_string());
        groups.push(&subject, GradeRecord { score, comment });
    }
    Ok(groups)
}
