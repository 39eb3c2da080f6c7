//! In-process stand-in for the CRM REST API.
//!
//! Only `access-1` is accepted as a bearer token. Customer `missing` answers
//! 404 with a JSON message, `boom` answers 500 with a plain-text body, and
//! `analytics/funnel` stalls long enough to trip short client timeouts.

use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use url::Url;

pub const ACCESS_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const PASSWORD: &str = "correct horse";
pub const STALL: Duration = Duration::from_secs(2);

pub struct StubApi {
    pub base_url: Url,
    handle: ServerHandle,
}

impl StubApi {
    /// Bind to an ephemeral port and serve on the current actix runtime.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let server = HttpServer::new(|| {
            App::new().service(
                web::scope("/api")
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/logout", web::post().to(logout))
                    .route("/auth/refresh", web::post().to(refresh))
                    .route("/auth/me", web::get().to(me))
                    .route("/customers", web::get().to(list_customers))
                    .route("/customers", web::post().to(create_customer))
                    .route("/customers/{id}", web::get().to(get_customer))
                    .route("/customers/{id}", web::delete().to(delete_customer))
                    .route("/analytics/revenue", web::get().to(revenue))
                    .route("/analytics/funnel", web::get().to(funnel)),
            )
        })
        .workers(1)
        .listen(listener)
        .expect("bind test server")
        .disable_signals()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        let base_url = Url::parse(&format!("http://{addr}/api/")).expect("stub base URL");
        Self { base_url, handle }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn authorised(request: &HttpRequest) -> bool {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {ACCESS_TOKEN}"))
}

fn unauthorised() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": "Missing or invalid token" }))
}

pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "name": "Ada Lovelace",
        "email": "ada@crm.io",
        "role": "sales",
        "permissions": ["customers:read"]
    })
}

pub fn customer_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": "contact@techcorp.com",
        "company": "TechCorp",
        "status": "active",
        "createdAt": "2024-01-15T10:30:00Z",
        "updatedAt": "2024-03-20T14:45:00Z"
    })
}

async fn login(body: web::Json<Value>) -> HttpResponse {
    if body.get("password").and_then(Value::as_str) != Some(PASSWORD) {
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }
    HttpResponse::Ok().json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": REFRESH_TOKEN,
        "user": user_json()
    }))
}

async fn logout() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn refresh(body: web::Json<Value>) -> HttpResponse {
    if body.get("refresh_token").and_then(Value::as_str) == Some(REFRESH_TOKEN) {
        HttpResponse::Ok().json(json!({ "access_token": ACCESS_TOKEN }))
    } else {
        unauthorised()
    }
}

async fn me(request: HttpRequest) -> HttpResponse {
    if !authorised(&request) {
        return unauthorised();
    }
    HttpResponse::Ok().json(user_json())
}

async fn list_customers(request: HttpRequest) -> HttpResponse {
    if !authorised(&request) {
        return unauthorised();
    }
    HttpResponse::Ok().json(json!([customer_json("1", "Alice Johnson")]))
}

async fn create_customer(request: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !authorised(&request) {
        return unauthorised();
    }
    let name = body.get("name").and_then(Value::as_str).unwrap_or("Unnamed");
    HttpResponse::Created().json(customer_json("99", name))
}

async fn get_customer(request: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if !authorised(&request) {
        return unauthorised();
    }
    match path.as_str() {
        "missing" => HttpResponse::NotFound().json(json!({ "message": "Customer not found" })),
        "boom" => HttpResponse::InternalServerError()
            .content_type("text/plain")
            .body("  upstream\n exploded  "),
        id => HttpResponse::Ok().json(customer_json(id, "Alice Johnson")),
    }
}

async fn delete_customer(request: HttpRequest) -> HttpResponse {
    if !authorised(&request) {
        return unauthorised();
    }
    HttpResponse::NoContent().finish()
}

async fn revenue(query: web::Query<Vec<(String, String)>>) -> HttpResponse {
    let period = query
        .iter()
        .find(|(key, _)| key == "period")
        .map_or("none", |(_, value)| value.as_str());
    HttpResponse::Ok().json(json!([{ "label": period, "value": 1250.5 }]))
}

async fn funnel() -> HttpResponse {
    actix_web::rt::time::sleep(STALL).await;
    HttpResponse::Ok().json(json!([]))
}
