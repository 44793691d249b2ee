use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use server::startup::{build_app, build_controller};
use tokio::net::TcpListener;

/// Minimal stand-in for the OpenSDS REST API.
#[derive(Clone, Default)]
struct FakeOpenSds {
    volumes: Arc<Mutex<HashMap<String, Value>>>,
    next_id: Arc<Mutex<u32>>,
}

async fn profiles() -> Json<Value> {
    Json(json!([{"id": "p-default", "name": "default", "description": "default policy", "storageTags": {}}]))
}

async fn create_volume(State(s): State<FakeOpenSds>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let id = {
        let mut n = s.next_id.lock().expect("lock");
        *n += 1;
        format!("vol-{}", *n)
    };
    let vol = json!({
        "id": id,
        "createAt": "2017-10-24T15:04:05",
        "updateAt": "",
        "name": body["name"],
        "description": body["description"],
        "size": body["size"],
        "profileId": body["profileId"]
    });
    s.volumes.lock().expect("lock").insert(id, vol.clone());
    (StatusCode::ACCEPTED, Json(vol))
}

async fn list_volumes(State(s): State<FakeOpenSds>) -> Json<Value> {
    Json(Value::Array(s.volumes.lock().expect("lock").values().cloned().collect()))
}

async fn delete_volume(State(s): State<FakeOpenSds>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match s.volumes.lock().expect("lock").remove(&id) {
        Some(_) => (StatusCode::OK, Json(json!({"status": "Success"}))),
        None => (StatusCode::NOT_FOUND, Json(json!({"status": "Failure", "error": "not found"}))),
    }
}

async fn serve(router: Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(addr)
}

struct TestApp {
    base_url: String,
    opensds: FakeOpenSds,
}

async fn start() -> anyhow::Result<TestApp> {
    let opensds = FakeOpenSds::default();
    let backend_router = Router::new()
        .route("/api/v1alpha/profiles", get(profiles))
        .route("/api/v1alpha/block/volumes", get(list_volumes).post(create_volume))
        .route("/api/v1alpha/block/volumes/:id", delete(delete_volume))
        .with_state(opensds.clone());
    let backend_addr = serve(backend_router).await?;

    let mut cfg = AppConfig::default();
    cfg.backend.endpoint = format!("http://{}", backend_addr);
    cfg.normalize_and_validate()?;
    let app = build_app(build_controller(&cfg)?);
    let broker_addr = serve(app).await?;

    Ok(TestApp { base_url: format!("http://{}", broker_addr), opensds })
}

#[tokio::test]
async fn e2e_provision_bind_deprovision() -> anyhow::Result<()> {
    let app = start().await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/v2/catalog", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let catalog = res.json::<Value>().await?;
    assert_eq!(catalog["services"][0]["plans"][0]["id"], "p-default");

    let res = c
        .put(format!("{}/v2/service_instances/inst-1", app.base_url))
        .json(&json!({"plan_id": "p-default", "parameters": {"name": "n", "capacity": 5}}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let stored = app.opensds.volumes.lock().expect("lock").get("vol-1").cloned();
    let stored = stored.expect("volume created on backend");
    assert_eq!(stored["size"], 5);
    assert_eq!(stored["profileId"], "p-default");

    let res = c
        .put(format!("{}/v2/service_instances/inst-1/service_bindings/b1", app.base_url))
        .json(&json!({"plan_id": "p-default"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let creds = res.json::<Value>().await?["credentials"].clone();
    assert_eq!(creds, json!({"volumeId": "vol-1", "pool": "rbd", "image": "OPENSDS:n:vol-1"}));

    let res = c.delete(format!("{}/v2/service_instances/inst-1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(app.opensds.volumes.lock().expect("lock").is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_backend_not_found_on_delete_keeps_instance() -> anyhow::Result<()> {
    let app = start().await?;
    let c = reqwest::Client::new();

    let res = c
        .put(format!("{}/v2/service_instances/inst-1", app.base_url))
        .json(&json!({"plan_id": "p-default", "parameters": {"capacity": 1}}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    // volume disappears behind the broker's back
    app.opensds.volumes.lock().expect("lock").clear();

    let res = c.delete(format!("{}/v2/service_instances/inst-1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_GATEWAY);
    let body = res.json::<Value>().await?;
    assert!(body["description"].as_str().unwrap_or_default().contains("404"));

    let res = c.get(format!("{}/v2/service_instances/inst-1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}
