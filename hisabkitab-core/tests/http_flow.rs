use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use hisabkitab_core::{create_router, db, AppState, Config};
use tower::util::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "hisabkitab-test-boundary";

/// 2x2 RGB PNG.
const PNG_LOGO: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x08, 0x02, 0x00, 0x00, 0x00, 0xfd, 0xd4, 0x9a,
    0x73, 0x00, 0x00, 0x00, 0x10, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8, 0xcf, 0xc0, 0x00,
    0x44, 0x0c, 0x10, 0x0a, 0x00, 0x1f, 0xee, 0x03, 0xfd, 0x8b, 0x5f, 0x14, 0xd4, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

fn data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("hisabkitab-{}", Uuid::new_v4()))
}

async fn app() -> Router {
    app_in(data_dir()).await
}

async fn app_in(dir: PathBuf) -> Router {
    let pool = db::create_memory_pool().await.expect("memory pool");
    create_router(AppState::new(pool, Config::for_tests(dir)))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `multipart/form-data` POST with text fields and an optional logo file.
fn post_multipart(
    uri: &str,
    fields: &[(&str, &str)],
    logo: Option<(&str, &[u8])>,
    cookie: &str,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = logo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// Files currently stored in the logo directory.
fn logo_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir.join("logos")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

fn sets_flash(response: &Response<Body>) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with("hk_flash=") && !value.starts_with("hk_flash=;"))
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// `name=value` of the session cookie set by the response, if any.
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("hk_session=") && pair.len() > "hk_session=".len())
        .map(str::to_string)
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Signs up and logs in, returning the session cookie.
async fn sign_in(app: &Router, name: &str, email: &str) -> String {
    let signup = app
        .clone()
        .oneshot(post_form(
            "/signup",
            &format!("name={name}&email={email}&password=secret123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(signup.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&signup), "/login");

    let login = app
        .clone()
        .oneshot(post_form(
            "/login",
            &format!("email={email}&password=secret123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/");
    session_cookie(&login).expect("session cookie")
}

const INVOICE_FORM: &str = "invoice_no=&invoice_date=2024-03-05&from_name=Studio&to_name=Acme\
    &tax_mode=on&tax_rate=18\
    &desc%5B%5D=Design&qty%5B%5D=2&rate%5B%5D=500\
    &desc%5B%5D=Hosting&qty%5B%5D=1&rate%5B%5D=1200\
    &desc%5B%5D=&qty%5B%5D=1&rate%5B%5D=";

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/db", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn pages_require_a_session() {
    let app = app().await;
    for uri in ["/", "/new", "/clients", "/settings", "/invoice/1", "/invoice/1/pdf"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }

    let forged = app
        .oneshot(get("/", Some("hk_session=not-a-token")))
        .await
        .unwrap();
    assert_eq!(location(&forged), "/login");
}

#[tokio::test]
async fn duplicate_signup_and_bad_login_are_rejected() {
    let app = app().await;
    sign_in(&app, "Asha", "asha@example.com").await;

    let again = app
        .clone()
        .oneshot(post_form(
            "/signup",
            "name=Other&email=ASHA%40example.com&password=x",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&again), "/signup");

    let wrong = app
        .oneshot(post_form(
            "/login",
            "email=asha%40example.com&password=wrong",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&wrong), "/login");
    assert!(session_cookie(&wrong).is_none());
}

#[tokio::test]
async fn invoice_lifecycle() {
    let app = app().await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    let new_page = app.clone().oneshot(get("/new", Some(&cookie))).await.unwrap();
    assert_eq!(new_page.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(new_page).await).unwrap();
    assert!(html.contains("value=\"Asha\""));

    let created = app
        .clone()
        .oneshot(post_form("/new", INVOICE_FORM, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/invoice/1");

    let view = app.clone().oneshot(get("/invoice/1", Some(&cookie))).await.unwrap();
    assert_eq!(view.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(view).await).unwrap();
    assert!(html.contains("HK-20240305-001"));
    assert!(html.contains("2200.00"));
    assert!(html.contains("396.00"));
    assert!(html.contains("2596.00"));

    let pdf = app.clone().oneshot(get("/invoice/1/pdf", Some(&cookie))).await.unwrap();
    assert_eq!(pdf.status(), StatusCode::OK);
    assert_eq!(pdf.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        pdf.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice_HK-20240305-001.pdf\""
    );
    assert!(body_bytes(pdf).await.starts_with(b"%PDF"));

    let list = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(list).await).unwrap();
    assert!(html.contains("/invoice/1"));

    let deleted = app
        .clone()
        .oneshot(post_form("/invoice/1/delete", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&deleted), "/");

    let gone = app.oneshot(get("/invoice/1", Some(&cookie))).await.unwrap();
    assert_eq!(gone.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&gone), "/");
}

#[tokio::test]
async fn invalid_invoice_goes_back_to_form() {
    let app = app().await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    let missing_items = "invoice_date=2024-03-05&from_name=Studio&to_name=Acme&desc%5B%5D=&qty%5B%5D=1&rate%5B%5D=5";
    let response = app
        .clone()
        .oneshot(post_form("/new", missing_items, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/new");

    let list = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(list).await).unwrap();
    assert!(!html.contains("/invoice/1"));
}

#[tokio::test]
async fn invoices_are_private_to_their_owner() {
    let app = app().await;
    let owner = sign_in(&app, "Asha", "asha%40example.com").await;
    let other = sign_in(&app, "Ravi", "ravi%40example.com").await;

    let created = app
        .clone()
        .oneshot(post_form("/new", INVOICE_FORM, Some(&owner)))
        .await
        .unwrap();
    assert_eq!(location(&created), "/invoice/1");

    for uri in ["/invoice/1", "/invoice/1/pdf"] {
        let response = app.clone().oneshot(get(uri, Some(&other))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }

    let delete = app
        .clone()
        .oneshot(post_form("/invoice/1/delete", "", Some(&other)))
        .await
        .unwrap();
    assert_eq!(location(&delete), "/");

    let still_there = app.oneshot(get("/invoice/1", Some(&owner))).await.unwrap();
    assert_eq!(still_there.status(), StatusCode::OK);
}

#[tokio::test]
async fn saved_client_fills_recipient() {
    let app = app().await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    let saved = app
        .clone()
        .oneshot(post_form(
            "/clients/new",
            "name=Acme+Corp&email=billing%40acme.test&address=1+Main+St",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(location(&saved), "/clients");

    let form = "invoice_date=2024-03-05&from_name=Studio&client=Acme+Corp&desc%5B%5D=Work&qty%5B%5D=1&rate%5B%5D=100";
    let created = app
        .clone()
        .oneshot(post_form("/new", form, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&created), "/invoice/1");

    let view = app.clone().oneshot(get("/invoice/1", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(view).await).unwrap();
    assert!(html.contains("Acme Corp"));
    assert!(html.contains("billing@acme.test"));

    let unnamed = app
        .oneshot(post_form("/clients/new", "name=+&email=x", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&unnamed), "/clients");
}

#[tokio::test]
async fn oversized_amounts_are_rejected_before_saving() {
    let app = app().await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    let forms = [
        "invoice_date=2024-03-05&from_name=Studio&to_name=Acme\
         &desc%5B%5D=Huge&qty%5B%5D=79228162514264337593543950335&rate%5B%5D=2",
        "invoice_date=2024-03-05&from_name=Studio&to_name=Acme\
         &desc%5B%5D=A&qty%5B%5D=1&rate%5B%5D=50000000000000000000000000000\
         &desc%5B%5D=B&qty%5B%5D=1&rate%5B%5D=50000000000000000000000000000",
        "invoice_date=2024-03-05&from_name=Studio&to_name=Acme\
         &desc%5B%5D=Big&qty%5B%5D=999999999999999&rate%5B%5D=999999999999999",
    ];
    for form in forms {
        let response = app
            .clone()
            .oneshot(post_form("/new", form, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/new");
        assert!(sets_flash(&response));
    }

    let list = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(list).await).unwrap();
    assert!(!html.contains("/invoice/1"));

    let view = app.oneshot(get("/invoice/1", Some(&cookie))).await.unwrap();
    assert_eq!(location(&view), "/");
}

#[tokio::test]
async fn malformed_ids_behave_like_missing_records() {
    let app = app().await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    for uri in ["/invoice/abc", "/invoice/abc/pdf"] {
        let response = app.clone().oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }

    let invoice = app
        .clone()
        .oneshot(post_form("/invoice/abc/delete", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&invoice), "/");

    let client = app
        .oneshot(post_form("/clients/abc/delete", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(client.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&client), "/clients");
}

#[tokio::test]
async fn settings_save_and_logo_upload() {
    let dir = data_dir();
    let app = app_in(dir.clone()).await;
    let cookie = sign_in(&app, "Asha", "asha%40example.com").await;

    let profile = [
        ("business_name", "Asha Designs"),
        ("email", "hello@asha.test"),
        ("phone", "98450 12345"),
        ("address", "12 MG Road"),
        ("tax_id", "29ABCDE1234F1Z5"),
    ];

    // Text fields only.
    let saved = app
        .clone()
        .oneshot(post_multipart("/settings", &profile, None, &cookie))
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&saved), "/settings");
    assert!(sets_flash(&saved));

    let page = app.clone().oneshot(get("/settings", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("Asha Designs"));
    assert!(html.contains("29ABCDE1234F1Z5"));
    assert!(!html.contains("A logo is on file"));

    // Unsupported logo type: nothing saved, nothing written.
    let renamed = [("business_name", "Renamed"), ("email", ""), ("phone", ""), ("address", ""), ("tax_id", "")];
    let rejected = app
        .clone()
        .oneshot(post_multipart("/settings", &renamed, Some(("logo.svg", &b"<svg/>"[..])), &cookie))
        .await
        .unwrap();
    assert_eq!(location(&rejected), "/settings");
    assert!(sets_flash(&rejected));
    assert!(logo_files(&dir).is_empty());

    let page = app.clone().oneshot(get("/settings", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("Asha Designs"));
    assert!(!html.contains("Renamed"));

    // PNG logo is stored under the data directory.
    let uploaded = app
        .clone()
        .oneshot(post_multipart("/settings", &profile, Some(("logo.PNG", PNG_LOGO)), &cookie))
        .await
        .unwrap();
    assert_eq!(location(&uploaded), "/settings");
    let first = logo_files(&dir);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(&first[0]).unwrap(), PNG_LOGO);

    let page = app.clone().oneshot(get("/settings", Some(&cookie))).await.unwrap();
    let html = String::from_utf8(body_bytes(page).await).unwrap();
    assert!(html.contains("A logo is on file"));

    // A save without a file keeps the logo.
    app.clone()
        .oneshot(post_multipart("/settings", &profile, None, &cookie))
        .await
        .unwrap();
    assert_eq!(logo_files(&dir), first);

    // A replacement removes the previous file.
    app.clone()
        .oneshot(post_multipart("/settings", &profile, Some(("new.png", PNG_LOGO)), &cookie))
        .await
        .unwrap();
    let second = logo_files(&dir);
    assert_eq!(second.len(), 1);
    assert_ne!(second, first);

    // The stored logo goes into the PDF.
    let created = app
        .clone()
        .oneshot(post_form("/new", INVOICE_FORM, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&created), "/invoice/1");
    let pdf = app.oneshot(get("/invoice/1/pdf", Some(&cookie))).await.unwrap();
    assert_eq!(pdf.status(), StatusCode::OK);
    assert!(body_bytes(pdf).await.starts_with(b"%PDF"));

    let _ = std::fs::remove_dir_all(&dir);
}
