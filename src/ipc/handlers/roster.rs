use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

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

fn handle_subjects_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }

    let id = Uuid::new_v4().to_string();
    match conn.execute(
        "INSERT INTO subjects(id, name) VALUES (?, ?)",
        (&id, trimmed),
    ) {
        Ok(_) => ok(&req.id, json!({ "subjectId": id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let last_name = match required_str(req, "lastName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let first_name = match required_str(req, "firstName") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let id = Uuid::new_v4().to_string();
    match conn.execute(
        "INSERT INTO students(id, last_name, first_name) VALUES (?, ?, ?)",
        (&id, &last_name, &first_name),
    ) {
        Ok(_) => ok(&req.id, json!({ "studentId": id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let display_name = match required_str(req, "displayName") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let id = Uuid::new_v4().to_string();
    match conn.execute(
        "INSERT INTO teachers(id, display_name) VALUES (?, ?)",
        (&id, &display_name),
    ) {
        Ok(_) => ok(&req.id, json!({ "teacherId": id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_guardians_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let display_name = match required_str(req, "displayName") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let id = Uuid::new_v4().to_string();
    match conn.execute(
        "INSERT INTO guardians(id, display_name) VALUES (?, ?)",
        (&id, &display_name),
    ) {
        Ok(_) => ok(&req.id, json!({ "guardianId": id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_guardians_link_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let guardian_id = match required_str(req, "guardianId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    // Linking twice is a no-op, not an error.
    match conn.execute(
        "INSERT OR IGNORE INTO guardian_students(guardian_id, student_id) VALUES (?, ?)",
        (&guardian_id, &student_id),
    ) {
        Ok(_) => ok(
            &req.id,
            json!({ "guardianId": guardian_id, "studentId": student_id }),
        ),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

fn handle_grades_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // 0-100 is the expected range but deliberately not enforced; only the
    // integer shape is.
    let Some(score) = req.params.get("score").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "score must be an integer", None);
    };
    let comment = req
        .params
        .get("comment")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());

    let id = Uuid::new_v4().to_string();
    let recorded_at = chrono::Utc::now().to_rfc3339();
    match conn.execute(
        "INSERT INTO grades(id, student_id, subject_id, score, comment, recorded_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        (&id, &student_id, &subject_id, score, &comment, &recorded_at),
    ) {
        Ok(_) => ok(&req.id, json!({ "gradeId": id })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.create" => Some(handle_subjects_create(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "teachers.create" => Some(handle_teachers_create(state, req)),
        "guardians.create" => Some(handle_guardians_create(state, req)),
        "guardians.linkStudent" => Some(handle_guardians_link_student(state, req)),
        "grades.record" => Some(handle_grades_record(state, req)),
        _ => None,
    }
}
