use crate::agg;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::style;
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn subject_card(subject: &str, grades: &[agg::GradeRecord]) -> serde_json::Value {
    let avg = agg::average(grades);
    let badges = grades
        .iter()
        .map(|g| {
            json!({
                "score": g.score,
                "color": style::grade_color(g.score).to_hex(),
                "tooltip": g.comment.clone().unwrap_or_else(|| "No comment".to_string()),
            })
        })
        .collect::<Vec<_>>();
    json!({
        "subject": subject,
        "label": subject.to_uppercase(),
        "color": style::subject_color(subject).to_hex(),
        "average": agg::format_average(avg),
        "averageRaw": avg,
        "badges": badges,
    })
}

fn handle_dashboard_parent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let guardian_id = match required_str(req, "guardianId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    // A data-source fault is reported and suppressed: the parent gets an
    // empty dashboard, never an error reply.
    let groups = match agg::fetch_guardian_grades(conn, &guardian_id) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                code = %e.code,
                message = %e.message,
                guardian_id = %guardian_id,
                "guardian grade fetch failed; serving empty dashboard"
            );
            agg::SubjectGroups::default()
        }
    };

    let subjects = groups
        .iter()
        .map(|(subject, grades)| subject_card(subject, grades))
        .collect::<Vec<_>>();

    ok(
        &req.id,
        json!({
            "guardianId": guardian_id,
            "title": "Child's Grades",
            "subjects": subjects,
        }),
    )
}

fn handle_dashboard_teacher(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let teacher_id = match required_str(req, "teacherId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let display_name: Option<String> = match conn
        .query_row(
            "SELECT display_name FROM teachers WHERE id = ?",
            [&teacher_id],
            |r| r.get(0),
        )
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "teacherId": teacher_id,
            "title": "eGrade - Teacher Dashboard",
            "welcome": format!("Welcome, Teacher (ID: {})", teacher_id),
            "displayName": display_name,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.parent" => Some(handle_dashboard_parent(state, req)),
        "dashboard.teacher" => Some(handle_dashboard_teacher(state, req)),
        _ => None,
    }
}
