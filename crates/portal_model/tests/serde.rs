use portal_model::*;
use serde_json::json;

#[test]
fn snapshot_lookup_by_job_id() {
    let snapshot: IndexStatus = serde_json::from_value(json!({
        "faiss_available": true,
        "documents": 120,
        "jobs": {
            "job-123": {
                "status": "completed",
                "result": {"count": 42},
                "created_at": "2025-01-01T00:00:00"
            },
            "job-124": {"status": "error", "error": "disk full"}
        }
    }))
    .expect("parse snapshot");

    let done = snapshot.job("job-123").expect("job present");
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.result, Some(json!({"count": 42})));
    assert!(done.extra.contains_key("created_at"));

    let failed = snapshot.job("job-124").expect("job present");
    assert_eq!(failed.error.as_deref(), Some("disk full"));
    assert!(snapshot.job("job-999").is_none());
}

#[test]
fn malformed_sibling_jobs_do_not_break_the_snapshot() {
    let snapshot: IndexStatus = serde_json::from_value(json!({
        "documents": 3,
        "jobs": {
            "old-1": {"status": null, "error": {"code": 7}},
            "old-2": {"status": 5},
            "old-3": "corrupt",
            "job-1": {"status": "completed", "result": {"count": 3}},
            "job-2": {"result": {"count": 1}}
        }
    }))
    .expect("parse snapshot");

    let done = snapshot.job("job-1").expect("job present");
    assert_eq!(done.status, JobStatus::Completed);
    assert!(snapshot.job("old-3").is_none());

    let old = snapshot.job("old-1").expect("job present");
    assert!(old.status.is_terminal());
    assert_eq!(old.error.as_deref(), Some(r#"{"code":7}"#));
    assert_eq!(
        snapshot.job("old-2").map(|job| job.status.clone()),
        Some(JobStatus::Other("5".into()))
    );

    let unlabelled = snapshot.job("job-2").expect("job present");
    assert!(unlabelled.status.is_terminal());

    let empty: IndexStatus = serde_json::from_value(json!({"jobs": null})).expect("null jobs");
    assert!(empty.jobs.is_empty());
}

#[test]
fn job_history_skips_unreadable_rows() {
    let list: IndexJobList = serde_json::from_value(json!({
        "jobs": [
            {"job_id": "a", "status": "completed"},
            "garbage",
            {"job_id": "b", "status": {"phase": "x"}}
        ]
    }))
    .expect("parse job list");
    let ids: Vec<&str> = list.jobs.iter().map(|job| job.job_id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(list.jobs[1].status.is_terminal());
}

#[test]
fn service_hierarchy_from_yaml() {
    let yaml = r#"
- id: governance_public_affairs
  name:
    en: Governance & Public Affairs
    si: පාලනය සහ පොදු කටයුතු
  ministries:
    - id: ministry_public_administration
      name: Ministry of Public Administration
      subservices:
        - id: civil_servant_info
          name:
            en: Civil Servant Information
          office_hours: Monday to Friday, 8:30 AM - 4:00 PM
          questions:
            - q:
                en: How to apply for a transfer?
              answer:
                en: Submit a transfer application form.
              downloads:
                - /static/forms/transfer-application.pdf
"#;
    let categories: Vec<SuperCategory> = serde_yaml::from_str(yaml).expect("parse hierarchy");
    let ministry = &categories[0].ministries[0];
    assert_eq!(
        ministry.name.localized(Language::Si),
        "Ministry of Public Administration"
    );
    let subservice = &ministry.subservices[0];
    assert_eq!(subservice.questions.len(), 1);
    assert_eq!(
        subservice.questions[0].q.localized(Language::Ta),
        "How to apply for a transfer?"
    );
    assert_eq!(
        categories[0].name.localized(Language::Si),
        "පාලනය සහ පොදු කටයුතු"
    );
}

#[test]
fn admin_records_keep_unknown_fields() {
    let ad: Ad = serde_json::from_value(json!({
        "id": "ad_courses_01",
        "title": {"en": "Free Digital Skills Course"},
        "link": "https://example.lk/courses"
    }))
    .expect("parse ad");
    let saved = serde_json::to_value(&ad).expect("serialize ad");
    assert_eq!(saved["link"], "https://example.lk/courses");
    assert_eq!(saved["title"]["en"], "Free Digital Skills Course");
}

#[test]
fn officer_contact_falls_back_to_nested_block() {
    let officer: Officer = serde_json::from_value(json!({
        "id": "off_it_01",
        "name": "Ms. Nayana Perera",
        "contact": {"email": "nayana@it.gov.lk", "phone": "071-1234567"}
    }))
    .expect("parse officer");
    assert_eq!(officer.email(), Some("nayana@it.gov.lk"));
    assert_eq!(officer.phone(), Some("071-1234567"));
}
