use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;

use gelatin_hub::ingest::{self, UploadFile};
use gelatin_hub::render::Tone;
use gelatin_hub::{
    ArticleRecord, CheckEncoding, CheckOutcome, ExportOutcome, FlagPolicy, HttpApi, Hub, HubConfig,
    HubError, LoginOutcome, Recorder, SessionClient, ValidationError,
};

// Spawns the filter on an ephemeral port and returns its base URL.
macro_rules! serve {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{}", addr)
    }};
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn config(base_url: String, export_dir: &Path) -> HubConfig {
    HubConfig {
        base_url,
        form_clear_delay_ms: 0,
        request_timeout_secs: 5,
        export_dir: export_dir.to_path_buf(),
        ..HubConfig::default()
    }
}

fn hub(config: HubConfig) -> Hub<HttpApi, Recorder> {
    let api = HttpApi::new(&config).unwrap();
    Hub::new(api, Recorder::default(), config)
}

fn csv_file(text: &str) -> UploadFile {
    UploadFile::new("papers.csv", text.as_bytes().to_vec())
}

#[tokio::test]
async fn check_posts_json_and_records_success() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = seen.clone();
    let routes = warp::post()
        .and(warp::path("check_article"))
        .and(warp::body::json())
        .map(move |body: Value| {
            seen_by_server.lock().unwrap().push(body.clone());
            let status = if body["doi"] == "10.1000/dup" { "duplicate" } else { "success" };
            warp::reply::json(&json!({ "status": status, "message": "handled" }))
        });
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));

    hub.form_mut().doi = "10.1000/new".into();
    hub.form_mut().title = "Cold-set gels".into();
    hub.form_mut().hardness = true;
    let outcome = hub.check_duplicate().await.unwrap();

    assert_eq!(outcome, CheckOutcome::Saved("handled".into()));
    assert_eq!(hub.renderer().last_stats().unwrap().saved, 1);
    assert!(hub.form().is_empty());

    hub.form_mut().doi = "10.1000/dup".into();
    let outcome = hub.check_duplicate().await.unwrap();
    assert_eq!(outcome, CheckOutcome::Duplicate("handled".into()));
    assert_eq!(hub.state().saved().len(), 1);

    hub.form_mut().doi = "https://doi.org/10.1000/Linked".into();
    hub.check_duplicate().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2]["doi"], "10.1000/linked");
    assert_eq!(seen[0]["title"], "Cold-set gels");
    assert_eq!(seen[0]["hardness"], json!(true));
    assert_eq!(seen[0]["whc"], json!(false));
    assert!(seen[0]["timestamp"].is_string());
}

#[tokio::test]
async fn check_can_post_form_fields() {
    let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = seen.clone();
    let routes = warp::post()
        .and(warp::path("check_article"))
        .and(warp::body::form())
        .map(move |form: HashMap<String, String>| {
            seen_by_server.lock().unwrap().push(form);
            warp::reply::json(&json!({ "status": "new", "message": "Article saved successfully." }))
        });
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(serve!(routes), dir.path());
    config.check_encoding = CheckEncoding::Form;
    let mut hub = hub(config);

    hub.form_mut().doi = "10.1000/form".into();
    hub.form_mut().whc = true;
    let outcome = hub.check_duplicate().await.unwrap();

    assert_eq!(outcome, CheckOutcome::Informational("Article saved successfully.".into()));
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["doi"], "10.1000/form");
    assert_eq!(seen[0]["whc"], "true");
    assert_eq!(seen[0]["hardness"], "false");
}

#[tokio::test]
async fn server_error_on_check_is_reported() {
    let routes = warp::post()
        .and(warp::path("check_article"))
        .map(|| warp::reply::with_status("database locked", StatusCode::INTERNAL_SERVER_ERROR));
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));
    hub.form_mut().doi = "10.1000/x".into();

    match hub.check_duplicate().await {
        Err(HubError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "database locked");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert_eq!(hub.renderer().last_notice().unwrap().tone, Tone::Error);
}

#[tokio::test]
async fn upload_sends_file_and_parsed_rows() {
    let bodies: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let bodies_by_server = bodies.clone();
    let routes = warp::post()
        .and(warp::path("upload_file"))
        .and(warp::header::<String>("content-type"))
        .and(warp::body::bytes())
        .map(move |content_type: String, body: warp::hyper::body::Bytes| {
            let text = String::from_utf8_lossy(&body).into_owned();
            bodies_by_server.lock().unwrap().push((content_type, text));
            warp::reply::json(&json!({ "added": 1, "duplicates": 1 }))
        });
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));

    let summary = hub
        .upload_file(Some(csv_file(
            "DOI,Title,Protein_Type\n10.1000/A,First,porcine\n10.1000/b,Second,fish\nnope,Third,\n",
        )))
        .await
        .unwrap();

    assert_eq!(summary.valid, 2);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.duplicates, 1);
    assert!(hub.state().is_uploaded("10.1000/a"));

    let bodies = bodies.lock().unwrap();
    let (content_type, text) = &bodies[0];
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(text.contains("name=\"file\"; filename=\"papers.csv\""));
    assert!(text.contains("name=\"processed_data\""));
    assert!(text.contains("\"doi\":\"10.1000/a\""));
    assert!(text.contains("\"protein\":\"porcine\""));
    assert!(!text.contains("\"doi\":\"nope\""));
}

#[tokio::test]
async fn rejected_file_never_reaches_the_server() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_by_server = hits.clone();
    let routes = warp::path("upload_file").map(move || {
        hits_by_server.fetch_add(1, Ordering::SeqCst);
        warp::reply::json(&json!({}))
    });
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(serve!(routes), dir.path());
    config.max_upload_mb = 1;
    let mut hub = hub(config);

    let invalid = hub.upload_file(Some(csv_file("DOI,Title\nabc/123,Bad\n"))).await;
    assert!(matches!(invalid, Err(HubError::Validation(ValidationError::NoValidRows))));

    let excel = hub
        .upload_file(Some(UploadFile::new("sheet.xls", vec![0xd0, 0xcf, 0x11, 0xe0])))
        .await;
    assert!(matches!(excel, Err(HubError::UnsupportedFormat(_))));

    let oversized = hub
        .upload_file(Some(UploadFile::new("big.csv", vec![b'a'; 2 * 1024 * 1024])))
        .await;
    assert!(matches!(
        oversized,
        Err(HubError::Validation(ValidationError::FileTooLarge { .. }))
    ));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(hub.state().uploaded().is_empty());
}

#[tokio::test]
async fn stats_come_from_the_server_when_it_answers() {
    let routes = warp::get().and(warp::path("stats")).map(|| {
        warp::reply::json(&json!({ "total": 12, "uploaded": 5, "saved": 7, "unique": 11 }))
    });
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));

    let stats = hub.show_stats().await;

    assert_eq!((stats.total, stats.uploaded, stats.saved, stats.unique), (12, 5, 7, 11));
    assert!(hub.renderer().notices.is_empty());
}

#[tokio::test]
async fn stats_degrade_to_local_on_server_error() {
    let routes = warp::path("stats").map(|| warp::reply::with_status("no", StatusCode::BAD_GATEWAY));
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));

    let stats = hub.show_stats().await;

    assert_eq!(stats.total, 0);
    assert_eq!(hub.renderer().last_notice().unwrap().tone, Tone::Info);
    assert_eq!(hub.renderer().stats.len(), 1);
}

#[tokio::test]
async fn offline_server_uses_local_data_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(closed_port_url(), dir.path()));

    let empty_export = hub.download_database().await;
    assert!(matches!(empty_export, Err(HubError::NothingToExport)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let upload = hub
        .upload_file(Some(csv_file("DOI,Title\n10.1000/x,\"Gel, \"\"strong\"\"\"\n10.2000/y,Other\n")))
        .await;
    assert!(matches!(upload, Err(HubError::Network(_))));

    let stats = hub.show_stats().await;
    assert_eq!((stats.uploaded, stats.unique), (2, 2));

    hub.form_mut().doi = "10.1000/X".into();
    assert_eq!(hub.check_duplicate().await.unwrap(), CheckOutcome::AlreadyUploaded);

    let outcome = hub.download_database().await.unwrap();
    let path = match &outcome {
        ExportOutcome::Local(path) => path.clone(),
        other => panic!("expected local export, got {:?}", other),
    };
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("protein_gelatin_local_"));

    let reimported = ingest::ingest(
        &UploadFile::new("again.csv", std::fs::read(&path).unwrap()),
        1024 * 1024,
        FlagPolicy::Boolean,
    )
    .unwrap();
    let mut dois: Vec<String> = reimported.records().iter().map(ArticleRecord::key).collect();
    dois.sort();
    assert_eq!(dois, vec!["10.1000/x", "10.2000/y"]);
    assert_eq!(reimported.records()[0].title, "Gel, \"strong\"");
}

#[tokio::test]
async fn export_saves_the_server_dump() {
    let routes = warp::get()
        .and(warp::path("export"))
        .map(|| warp::reply::with_header("DOI,Title\n10.1000/s,Server\n", "content-type", "text/csv"));
    let dir = tempfile::tempdir().unwrap();
    let mut hub = hub(config(serve!(routes), dir.path()));

    let outcome = hub.download_database().await.unwrap();

    match outcome {
        ExportOutcome::Server(path) => {
            assert_eq!(std::fs::read_to_string(path).unwrap(), "DOI,Title\n10.1000/s,Server\n");
        }
        other => panic!("expected server export, got {:?}", other),
    }
}

#[tokio::test]
async fn session_round_trip() {
    let logins: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let logged_in = logins.clone();
    let logged_out = logins.clone();
    let listed = logins.clone();

    let register = warp::post()
        .and(warp::path("register"))
        .and(warp::body::form())
        .map(|form: HashMap<String, String>| {
            if form.contains_key("email") && form.contains_key("password") {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            }
        });
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::body::form())
        .map(move |form: HashMap<String, String>| {
            if form.get("password").map(String::as_str) == Some("right") {
                logged_in.lock().unwrap().push(form["email"].clone());
                StatusCode::OK
            } else {
                StatusCode::UNAUTHORIZED
            }
        });
    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::body::form())
        .map(move |form: HashMap<String, String>| {
            logged_out.lock().unwrap().retain(|email| *email != form["email"]);
            StatusCode::OK
        });
    let active = warp::get().and(warp::path("active_users")).map(move || {
        let users: Vec<Value> = listed
            .lock()
            .unwrap()
            .iter()
            .map(|email| json!({ "email": email, "last_active": 1700000000 }))
            .collect();
        warp::reply::json(&users)
    });

    let dir = tempfile::tempdir().unwrap();
    let config = config(serve!(register.or(login).or(logout).or(active)), dir.path());
    let mut session = SessionClient::new(HttpApi::new(&config).unwrap());
    let mut ui = Recorder::default();

    session.register("lab@uni.edu", "right", &mut ui).await.unwrap();

    let refused = session.login("lab@uni.edu", "wrong", &mut ui).await.unwrap();
    assert_eq!(refused, LoginOutcome::Rejected);
    assert!(session.active().is_empty());

    let accepted = session.login("lab@uni.edu", "right", &mut ui).await.unwrap();
    assert_eq!(accepted, LoginOutcome::LoggedIn);
    assert_eq!(session.active().len(), 1);
    assert_eq!(session.active()[0].email, "lab@uni.edu");

    session.logout(None, &mut ui).await.unwrap();
    assert!(session.active().is_empty());
    assert_eq!(session.current_user(), None);
    assert_eq!(ui.active_users.len(), 3);
}
