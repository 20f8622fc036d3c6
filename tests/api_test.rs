use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use uniadmin::{AppConfig, AppState, db, router};

async fn app() -> Router {
    let pool = db::connect_in_memory().await.expect("Failed to create test db");
    let config = AppConfig {
        upload_delay: Duration::from_millis(1),
        ..AppConfig::default()
    };
    router(AppState::new(pool, config))
}

struct As<'a> {
    role: &'a str,
    department: Option<&'a str>,
}

const ADMIN: As<'static> = As { role: "super_admin", department: None };
const INCHARGE: As<'static> = As { role: "timetable_incharge", department: None };

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    actor: Option<&As<'_>>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-user-role", actor.role);
        if let Some(department) = actor.department {
            builder = builder.header("x-user-department", department);
        }
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_writes_require_a_sufficient_role() {
    let app = app().await;
    let body = json!({ "name": "College of Engineering", "code": "COE", "type": "engineering" });

    let (status, error) = send(&app, Method::POST, "/colleges", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(error["message"].as_str().unwrap().contains("x-user-role"));

    let hod = As { role: "hod", department: Some("CSE") };
    let (status, _) = send(&app, Method::POST, "/colleges", Some(&hod), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, college) =
        send(&app, Method::POST, "/colleges", Some(&ADMIN), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(college["type"], "engineering");
    assert_eq!(college["status"], "active");

    let (status, _) = send(&app, Method::POST, "/colleges", Some(&ADMIN), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, colleges) = get(&app, "/colleges").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(colleges.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_hod_manages_only_own_department() {
    let app = app().await;
    let hod = As { role: "hod", department: Some("CSE") };

    let (status, _) = send(
        &app,
        Method::POST,
        "/faculty",
        Some(&hod),
        Some(json!({ "name": "Ravi Kumar", "email": "ravi@uni.edu", "department": "ECE" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, faculty) = send(
        &app,
        Method::POST,
        "/faculty",
        Some(&hod),
        Some(json!({ "name": "Anita Rao", "email": "anita@uni.edu", "department": "CSE" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(faculty["active"], true);

    let id = faculty["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/faculty/{}", id),
        Some(&hod),
        Some(json!({ "department": "ECE" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/faculty/{}", id),
        Some(&hod),
        Some(json!({ "designation": "Professor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["designation"], "Professor");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/faculty/{}", id),
        Some(&hod),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, trimmed) = send(
        &app,
        Method::PATCH,
        &format!("/faculty/{}", id),
        Some(&hod),
        Some(json!({ "email": "  anita.rao@uni.edu " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trimmed["email"], "anita.rao@uni.edu");
}

#[tokio::test]
async fn test_course_hours_and_common_flag() {
    let app = app().await;

    let (status, course) = send(
        &app,
        Method::POST,
        "/courses",
        Some(&ADMIN),
        Some(json!({
            "code": "CS301",
            "title": "Operating Systems",
            "semester": "Semester 3",
            "department": "CSE",
            "weeklyHours": "3L+1T"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["weeklyHours"], "3L+1T");
    assert_eq!(course["lectureHours"], 3);
    assert_eq!(course["isCommonCourse"], false);

    let (status, common) = send(
        &app,
        Method::POST,
        "/courses",
        Some(&ADMIN),
        Some(json!({
            "code": "HS101",
            "title": "Communication Skills",
            "semester": "Semester 3",
            "department": "All",
            "lectureHours": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(common["isCommonCourse"], true);
    assert_eq!(common["weeklyHours"], "2L");

    let (status, _) = send(
        &app,
        Method::POST,
        "/courses",
        Some(&ADMIN),
        Some(json!({
            "code": "CS301",
            "title": "Dup",
            "semester": "Semester 3",
            "department": "CSE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, ece) = get(&app, "/courses?department=ECE").await;
    let codes: Vec<&str> =
        ece.as_array().unwrap().iter().map(|c| c["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["HS101"]);

    let (_, only_common) = get(&app, "/courses?commonOnly=true").await;
    assert_eq!(only_common.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        "/courses",
        Some(&ADMIN),
        Some(json!({
            "code": "X1",
            "title": "Bad",
            "semester": "Semester 3",
            "weeklyHours": "3Q"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assignment_drives_faculty_load() {
    let app = app().await;

    let (_, semester) =
        send(&app, Method::POST, "/semesters", Some(&ADMIN), Some(json!({ "number": 1 }))).await;
    assert_eq!(semester["name"], "Semester 1");
    let (status, active) = send(
        &app,
        Method::PUT,
        &format!("/semesters/{}/activate", semester["id"].as_str().unwrap()),
        Some(&ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["status"], "active");

    let (_, teacher) = send(
        &app,
        Method::POST,
        "/faculty",
        Some(&ADMIN),
        Some(json!({
            "name": "Anita Rao",
            "email": "anita@uni.edu",
            "department": "CSE",
            "maxWeeklyHours": 10
        })),
    )
    .await;
    let teacher_id = teacher["id"].as_str().unwrap();

    let (_, course) = send(
        &app,
        Method::POST,
        "/courses",
        Some(&ADMIN),
        Some(json!({
            "code": "CS101",
            "title": "Programming",
            "semester": "Semester 1",
            "department": "CSE",
            "weeklyHours": "3L+1T+2P"
        })),
    )
    .await;
    let course_id = course["id"].as_str().unwrap();

    let (status, assigned) = send(
        &app,
        Method::PUT,
        &format!("/courses/{}/faculty", course_id),
        Some(&INCHARGE),
        Some(json!({ "faculty": teacher_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["facultyList"], json!([teacher_id]));

    let (status, load) = get(&app, &format!("/faculty/{}/load", teacher_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(load["semester"], "Semester 1");
    assert_eq!(load["assignedHours"], 6);
    assert_eq!(load["maxHours"], 10);
    assert_eq!(load["percentage"], 60.0);
    assert_eq!(load["status"], "optimal");

    let (_, report) = get(&app, "/reports/load?semester=Semester%201").await;
    assert_eq!(report.as_array().unwrap().len(), 1);

    let uri = format!("/courses/{}", course_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, teacher) = get(&app, &format!("/faculty/{}", teacher_id)).await;
    assert_eq!(teacher["assignedCourses"]["bySemester"], json!({}));
}

#[tokio::test]
async fn test_only_one_semester_is_active() {
    let app = app().await;
    let mut ids = Vec::new();
    for number in 1..=3 {
        let body = json!({ "number": number });
        let (status, semester) =
            send(&app, Method::POST, "/semesters", Some(&ADMIN), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(semester["id"].as_str().unwrap().to_string());
    }
    let body = json!({ "name": "Semester 2" });
    let (status, _) = send(&app, Method::POST, "/semesters", Some(&ADMIN), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = get(&app, "/semesters/active").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for id in &ids {
        send(&app, Method::PUT, &format!("/semesters/{}/activate", id), Some(&ADMIN), None).await;
    }

    let (_, semesters) = get(&app, "/semesters").await;
    let active: Vec<&Value> = semesters
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["status"] == "active")
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["name"], "Semester 3");
}

#[tokio::test]
async fn test_teacher_codes() {
    let app = app().await;
    let mut ids = Vec::new();
    for (name, email) in [("Meera Nair", "meera@uni.edu"), ("Mohan Naidu", "mohan@uni.edu")] {
        let (_, f) = send(
            &app,
            Method::POST,
            "/faculty",
            Some(&ADMIN),
            Some(json!({ "name": name, "email": email, "department": "CSE" })),
        )
        .await;
        ids.push(f["id"].as_str().unwrap().to_string());
    }

    let (status, f) = send(
        &app,
        Method::PUT,
        &format!("/faculty/{}/code", ids[0]),
        Some(&INCHARGE),
        Some(json!({ "code": " mn " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(f["code"], "MN");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/faculty/{}/code", ids[1]),
        Some(&INCHARGE),
        Some(json!({ "code": "MN" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, missing) = get(&app, "/faculty/codes/missing").await;
    assert_eq!(missing[0]["name"], "Mohan Naidu");
    assert_eq!(missing[0]["suggestedCode"], "MN2");

    let (status, conflicts) = get(&app, "/faculty/codes/conflicts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conflicts, json!([]));
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = app().await;
    let (status, _) = get(&app, "/settings/timetable").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let value = json!({ "periodsPerDay": 7, "days": ["Mon", "Tue"] });
    let (status, _) =
        send(&app, Method::PUT, "/settings/timetable", Some(&INCHARGE), Some(value.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
        send(&app, Method::PUT, "/settings/timetable", Some(&ADMIN), Some(value.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, setting) = get(&app, "/settings/timetable").await;
    assert_eq!(setting["value"], value);
}

#[tokio::test]
async fn test_bulk_import_runs_in_background() {
    let app = app().await;

    let hod = As { role: "hod", department: Some("CSE") };
    let (status, _) =
        send(&app, Method::POST, "/imports/faculty", Some(&hod), Some(json!([]))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(&app, Method::POST, "/imports/buses", Some(&ADMIN), Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let document = json!({
        "teachers": [
            { "name": "Anita Rao", "email": "anita@uni.edu", "department": "CSE" },
            { "name": "", "email": "nobody@uni.edu" },
            { "name": "Ravi Kumar", "email": "ravi@uni.edu", "department": "ECE", "code": "RK" }
        ]
    });
    let (status, accepted) =
        send(&app, Method::POST, "/imports/teachers", Some(&INCHARGE), Some(document)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(accepted["entity"], "faculty");
    assert_eq!(accepted["records"], 3);
    let job_id = accepted["jobId"].as_str().unwrap().to_string();

    let mut job = Value::Null;
    for _ in 0..500 {
        let (status, current) = get(&app, &format!("/imports/{}", job_id)).await;
        assert_eq!(status, StatusCode::OK);
        if current["state"] == "completed" {
            job = current;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(job["state"], "completed");
    assert_eq!(job["succeeded"], 2);
    assert_eq!(job["failed"], 1);
    let results = job["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["index"], 1);

    let (_, faculty) = get(&app, "/faculty").await;
    assert_eq!(faculty.as_array().unwrap().len(), 2);

    let (_, queue) = get(&app, "/imports/status").await;
    assert_eq!(queue["queueLength"], 0);
    assert_eq!(queue["delayMs"], 1);

    let (status, _) = get(&app, "/imports/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
