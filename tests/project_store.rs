use chrono::NaiveDate;
use workdesk::{
    format_timer, KeyValueStore, MemoryStore, ProjectStatus, ProjectStore, PROJECTS_KEY,
    TIMERS_KEY,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn ids_strictly_increase_without_deletions() {
    let mut store = ProjectStore::open(MemoryStore::new());
    let ids: Vec<u64> = (0..20).map(|i| store.add_project(format!("p{}", i))).collect();

    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ids.first(), Some(&1));
}

#[test]
fn delete_project_is_idempotent() {
    let backend = MemoryStore::new();
    let mut store = ProjectStore::open(backend.clone());
    let keep = store.add_project("keep");
    let gone = store.add_project("gone");
    store.add_timer_at(gone, "t", 1).unwrap();

    assert!(store.delete_project(gone));
    let after_first = backend.get(PROJECTS_KEY).unwrap();
    assert!(!store.delete_project(gone));

    assert_eq!(backend.get(PROJECTS_KEY).unwrap(), after_first);
    assert_eq!(store.projects().len(), 1);
    assert_eq!(store.projects()[0].id, keep);
    assert!(store.timers(gone).is_empty());
    assert!(!store.timer_lists().contains_key(&gone));
}

#[test]
fn immediate_double_toggle_accumulates_small_nonnegative_time() {
    let mut store = ProjectStore::open(MemoryStore::new());
    let p = store.add_project("p");
    let t = store.add_timer(p, "focus").unwrap();

    assert!(store.toggle_timer(p, t).unwrap());
    assert!(!store.toggle_timer(p, t).unwrap());

    let timer = store.timer(p, t).unwrap();
    assert!(!timer.is_running);
    assert!(timer.elapsed >= 0);
    assert!(timer.elapsed < 5_000);
}

#[test]
fn toggling_with_explicit_clock() {
    let mut store = ProjectStore::open(MemoryStore::new());
    let p = store.add_project("p");
    let t = store.add_timer_at(p, "focus", 1_000).unwrap();

    store.toggle_timer_at(p, t, 10_000).unwrap();
    assert_eq!(format_timer(store.timer(p, t), 15_000), "00:00:05");

    store.toggle_timer_at(p, t, 70_000).unwrap();
    assert_eq!(store.timer(p, t).unwrap().elapsed, 60_000);
    assert_eq!(format_timer(store.timer(p, t), 999_999), "00:01:00");

    assert!(store.toggle_timer_at(p, 404, 1).is_err());
}

#[test]
fn several_timers_run_independently() {
    let mut store = ProjectStore::open(MemoryStore::new());
    let p = store.add_project("p");
    let a = store.add_timer_at(p, "a", 1).unwrap();
    let b = store.add_timer_at(p, "b", 1).unwrap();

    store.toggle_timer_at(p, a, 0).unwrap();
    store.toggle_timer_at(p, b, 1_000).unwrap();
    store.toggle_timer_at(p, a, 3_000).unwrap();

    assert_eq!(store.timer(p, a).unwrap().elapsed, 3_000);
    assert!(store.timer(p, b).unwrap().is_running);
    assert_eq!(store.timer(p, b).unwrap().total_elapsed(3_000), 2_000);
}

#[test]
fn deleting_active_timer_clears_pointer() {
    let backend = MemoryStore::new();
    let mut store = ProjectStore::open(backend.clone());
    let p = store.add_project("p");
    let t = store.add_timer_at(p, "t", 42).unwrap();
    store.set_active_timer(p, Some(t)).unwrap();

    assert!(store.delete_timer(p, t));
    assert_eq!(store.project(p).unwrap().active_timer_id, None);

    let reopened = ProjectStore::open(backend);
    assert_eq!(reopened.project(p).unwrap().active_timer_id, None);
}

#[test]
fn legacy_projects_get_default_status() {
    let backend = MemoryStore::with_entry(
        PROJECTS_KEY,
        r#"[{"id":1,"title":"Old","createDate":"2023-04-01","content":""},
            {"id":2,"title":"New","createDate":"2023-04-02","content":"","status":"completed"}]"#,
    );
    let store = ProjectStore::open(backend);

    assert_eq!(store.project(1).unwrap().status, ProjectStatus::NotStarted);
    assert_eq!(store.project(2).unwrap().status, ProjectStatus::Completed);
    assert_eq!(store.project(1).unwrap().create_date, date(2023, 4, 1));
}

#[test]
fn unreadable_collections_start_empty() {
    let mut backend = MemoryStore::with_entry(PROJECTS_KEY, "not json at all");
    backend.set(TIMERS_KEY, "[1,2,3]").unwrap();

    let mut store = ProjectStore::open(backend);
    assert!(store.projects().is_empty());
    assert_eq!(store.add_project("fresh"), 1);
}

#[test]
fn dangling_active_timer_is_cleared_on_load() {
    let mut backend = MemoryStore::with_entry(
        PROJECTS_KEY,
        r#"[{"id":3,"title":"Crashed","createDate":"2024-01-01","activeTimerId":99}]"#,
    );
    backend
        .set(
            TIMERS_KEY,
            r#"{"3":[{"id":5,"name":"a","isRunning":false,"startTime":0,"elapsed":10}],"8":[]}"#,
        )
        .unwrap();

    let store = ProjectStore::open(backend);
    assert_eq!(store.project(3).unwrap().active_timer_id, None);
    assert_eq!(store.timers(3).len(), 1);
    assert!(!store.timer_lists().contains_key(&8));
}

#[test]
fn collections_round_trip() {
    let backend = MemoryStore::new();
    let mut store = ProjectStore::open(backend.clone());

    let a = store.add_project_on("Alpha", date(2024, 2, 1));
    let b = store.add_project_on("Beta", date(2024, 2, 2));
    store.update_project_content(a, "<p>notes</p>").unwrap();
    store.update_project_status(b, ProjectStatus::InProgress).unwrap();
    let t1 = store.add_timer_at(a, "design", 100).unwrap();
    store.add_timer_at(a, "build", 100).unwrap();
    store.toggle_timer_at(a, t1, 1_000).unwrap();
    store.set_active_timer(a, Some(t1)).unwrap();

    let reopened = ProjectStore::open(backend);
    assert_eq!(reopened.projects(), store.projects());
    assert_eq!(reopened.timer_lists(), store.timer_lists());
}

#[test]
fn stored_shape_uses_camel_case_and_string_keys() {
    let backend = MemoryStore::new();
    let mut store = ProjectStore::open(backend.clone());
    let p = store.add_project_on("Shape", date(2024, 3, 3));
    store.add_timer_at(p, "t", 77).unwrap();

    let projects: serde_json::Value =
        serde_json::from_str(&backend.get(PROJECTS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(
        projects,
        serde_json::json!([{
            "id": 1,
            "title": "Shape",
            "createDate": "2024-03-03",
            "content": "",
            "status": "not-started"
        }])
    );

    let timers: serde_json::Value =
        serde_json::from_str(&backend.get(TIMERS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(
        timers,
        serde_json::json!({
            "1": [{"id": 77, "name": "t", "isRunning": false, "startTime": 0, "elapsed": 0}]
        })
    );
}
