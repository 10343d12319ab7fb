use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::subscription::repo::seaorm::SeaOrmSubscriptionRepository;
use service::subscription::repository::{memory::InMemorySubscriptionRepository, SubscriptionRepository};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, AppState};

const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }
}

async fn start_with(repo: Arc<dyn SubscriptionRepository>) -> anyhow::Result<TestApp> {
    let app: Router = routes::build_router(AppState::new(repo), cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn start_server() -> anyhow::Result<TestApp> {
    start_with(Arc::new(InMemorySubscriptionRepository::new())).await
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn yandex() -> Value {
    json!({
        "service_name": "Yandex Plus",
        "price": 400,
        "user_id": USER,
        "start_date": "07-2025"
    })
}

async fn create(c: &reqwest::Client, app: &TestApp, body: &Value) -> anyhow::Result<Value> {
    let res = c.post(app.url("/subscriptions")).json(body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/subscriptions/total-cost"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_get_update_delete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let created = create(&c, &app, &yandex()).await?;
    let id = created["id"].as_i64().expect("id");
    assert!(id > 0);
    assert_eq!(created["service_name"], "Yandex Plus");
    assert_eq!(created["price"], 400);
    assert_eq!(created["user_id"], USER);
    assert_eq!(created["start_date"], "07-2025");
    assert!(created["end_date"].is_null());

    let res = c.get(app.url(&format!("/subscriptions/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    let res = c
        .put(app.url(&format!("/subscriptions/{id}")))
        .json(&json!({
            "service_name": "Yandex Plus Multi",
            "price": 450,
            "user_id": USER,
            "start_date": "08-2025",
            "end_date": "12-2025"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["price"], 450);
    assert_eq!(updated["end_date"], "12-2025");

    let res = c.delete(app.url(&format!("/subscriptions/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    let res = c.get(app.url(&format!("/subscriptions/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = c.delete(app.url(&format!("/subscriptions/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_bad_requests() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // 格式错误的 id
    for path in ["/subscriptions/abc", "/subscriptions/1.5"] {
        let res = c.get(app.url(path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{path}");
        let res = c.delete(app.url(path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{path}");
    }

    // 非法 JSON
    let res = c
        .post(app.url("/subscriptions"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let mut invalid = Vec::new();
    let mut v = yandex(); v["price"] = json!(-1); invalid.push(v);
    let mut v = yandex(); v["service_name"] = json!(""); invalid.push(v);
    let mut v = yandex(); v["user_id"] = json!("not-a-uuid"); invalid.push(v);
    let mut v = yandex(); v["start_date"] = json!("2025-07"); invalid.push(v);
    let mut v = yandex(); v["end_date"] = json!("06-2025"); invalid.push(v);
    for body in invalid {
        let res = c.post(app.url("/subscriptions")).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{body}");
        let err = res.json::<Value>().await?;
        assert_eq!(err["error"], "Validation Error");
        assert!(err["detail"].is_string());
    }

    let res = c.get(app.url("/subscriptions?user_id=nope")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c
        .put(app.url("/subscriptions/999"))
        .json(&yandex())
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_list_filters() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(app.url("/subscriptions")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));

    let other = Uuid::new_v4().to_string();
    create(&c, &app, &yandex()).await?;
    create(&c, &app, &json!({"service_name": "Netflix", "price": 300, "user_id": USER, "start_date": "01-2025"})).await?;
    create(&c, &app, &json!({"service_name": "Netflix", "price": 300, "user_id": other, "start_date": "01-2025"})).await?;

    let all = c.get(app.url("/subscriptions")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(all.len(), 3);

    let mine = c.get(app.url(&format!("/subscriptions?user_id={USER}"))).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(mine.len(), 2);

    let netflix = c
        .get(app.url(&format!("/subscriptions?user_id={USER}&service_name=Netflix")))
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(netflix.len(), 1);
    assert_eq!(netflix[0]["service_name"], "Netflix");

    // 空字符串等同于未提供
    let empty = c.get(app.url("/subscriptions?user_id=&service_name=")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(empty.len(), 3);
    Ok(())
}

#[tokio::test]
async fn e2e_total_cost() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&c, &app, &yandex()).await?;

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "07-2025", "period_end": "09-2025", "user_id": USER, "service_name": "Yandex Plus"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"total_cost": 1200}));

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "01-2025", "period_end": "06-2025"}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["total_cost"], 0);

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "09-2025", "period_end": "07-2025"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["total_cost"], 0);

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "13-2025", "period_end": "09-2025"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let err = res.json::<Value>().await?;
    assert!(err["detail"].as_str().unwrap_or_default().contains("period_start"));

    // 空 user_id 不是 UUID，不能退化为不过滤
    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "01-2025", "period_end": "01-2025", "user_id": ""}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let err = res.json::<Value>().await?;
    assert!(err["detail"].as_str().unwrap_or_default().contains("user_id"));

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "07-2025", "period_end": "09-2025", "service_name": ""}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["total_cost"], 0);

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_end": "09-2025"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_postgres_backed_total_cost() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip postgres e2e test");
        return Ok(());
    }
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;
    let app = start_with(Arc::new(SeaOrmSubscriptionRepository::new(db))).await?;
    let c = client();

    // 独立 user_id，避免与其它测试数据互相影响
    let uid = Uuid::new_v4().to_string();
    let created = create(&c, &app, &json!({"service_name": "Yandex Plus", "price": 400, "user_id": uid, "start_date": "07-2025"})).await?;
    assert_eq!(created["start_date"], "07-2025");

    let res = c
        .post(app.url("/subscriptions/total-cost"))
        .json(&json!({"period_start": "07-2025", "period_end": "09-2025", "user_id": uid}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["total_cost"], 1200);

    let id = created["id"].as_i64().expect("id");
    let res = c.delete(app.url(&format!("/subscriptions/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    Ok(())
}
