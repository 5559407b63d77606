use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

fn pokemon(id: u64, english: &str) -> Value {
    json!({
        "id": id,
        "name": {"english": english, "japanese": "", "chinese": "", "french": english},
        "type": ["Normal"],
        "base": {"HP": 50, "Attack": 50, "Defense": 50},
        "image": format!("http://localhost:3000/assets/pokemons/{id}.png")
    })
}

struct TestApp {
    app: Router,
    data_file: std::path::PathBuf,
}

impl TestApp {
    async fn call(&self, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let resp = self.app.clone().call(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }

    async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Request::builder().uri(uri).body(Body::empty())?).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.call(req).await
    }

    async fn on_disk(&self) -> anyhow::Result<Value> {
        Ok(serde_json::from_slice(&tokio::fs::read(&self.data_file).await?)?)
    }
}

async fn build_app(seed: Vec<Value>) -> anyhow::Result<TestApp> {
    let root = std::path::PathBuf::from(format!("target/test-data/{}", Uuid::new_v4()));
    let data_file = root.join("pokemons.json");
    tokio::fs::create_dir_all(&root).await?;
    tokio::fs::write(&data_file, serde_json::to_vec_pretty(&seed)?).await?;

    let mut config = configs::AppConfig::default();
    config.catalog.data_file = data_file.to_string_lossy().into_owned();
    config.catalog.assets_dir = root.join("assets").to_string_lossy().into_owned();
    let app = server::build_app(&config).await?;
    Ok(TestApp { app, data_file })
}

#[tokio::test]
async fn root_and_health() -> anyhow::Result<()> {
    let app = build_app(vec![]).await?;
    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Pokemon API Server", "version": "1.0.0"}));

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn list_paginates_by_twenty() -> anyhow::Result<()> {
    let app = build_app((1..=25).map(|i| pokemon(i, &format!("Mon{i}"))).collect()).await?;

    let (status, body) = app.get("/api/pokemons").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(20));
    assert_eq!(body["pagination"], json!({"currentPage": 1, "totalPages": 2, "totalCount": 25, "limit": 20}));

    let (_, body) = app.get("/api/pokemons?page=2").await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["data"][0]["id"], 21);

    for uri in ["/api/pokemons?page=0", "/api/pokemons?page=-4", "/api/pokemons?page=abc"] {
        let (status, body) = app.get(uri).await?;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["pagination"]["currentPage"], 1, "{uri}");
        assert_eq!(body["data"][0]["id"], 1, "{uri}");
    }

    // repeated key: the first value is used
    let (status, body) = app.get("/api/pokemons?page=1&page=2").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["data"][0]["id"], 1);

    for uri in ["/api/pokemons?page=2abc", "/api/pokemons?page=2.7"] {
        let (status, body) = app.get(uri).await?;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["pagination"]["currentPage"], 2, "{uri}");
        assert_eq!(body["data"][0]["id"], 21, "{uri}");
    }

    let (status, body) = app.get("/api/pokemons?page=9").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["totalCount"], 25);
    Ok(())
}

#[tokio::test]
async fn search_and_get_by_id() -> anyhow::Result<()> {
    let app = build_app(vec![pokemon(1, "Bulbasaur"), pokemon(25, "Pikachu")]).await?;

    let (status, body) = app.get("/api/pokemons/search/PIKACHU").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 25);

    let (status, body) = app.get("/api/pokemons/search/Mewtwo").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Pokemon not found"}));

    let (status, body) = app.get("/api/pokemons/1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, pokemon(1, "Bulbasaur"));

    for uri in ["/api/pokemons/2", "/api/pokemons/abc"] {
        let (status, body) = app.get(uri).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Pokemon not found");
    }
    Ok(())
}

#[tokio::test]
async fn create_returns_201_and_persists() -> anyhow::Result<()> {
    let app = build_app(vec![pokemon(1, "Bulbasaur"), pokemon(3, "Venusaur")]).await?;

    let (status, created) = app
        .send_json("POST", "/api/pokemons", &json!({
            "name": {"english": "Charmander"},
            "type": "Fire",
            "base": {"HP": 39, "Attack": 52}
        }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 4);
    assert_eq!(created["type"], json!(["Fire"]));
    assert_eq!(created["name"], json!({"english": "Charmander", "japanese": "", "chinese": "", "french": "Charmander"}));
    assert_eq!(created["image"], "http://localhost:3000/assets/pokemons/4.png");

    let (status, fetched) = app.get("/api/pokemons/4").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let disk = app.on_disk().await?;
    assert_eq!(disk.as_array().map(Vec::len), Some(3));
    assert_eq!(disk[2], created);
    Ok(())
}

#[tokio::test]
async fn create_accepts_list_type_with_blank_entry() -> anyhow::Result<()> {
    let app = build_app(vec![]).await?;

    let body = json!({"name": {"english": "X"}, "type": [""], "base": {}});
    let (status, created) = app.send_json("POST", "/api/pokemons", &body).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], json!([""]));

    let body = json!({"name": {"english": "Y"}, "type": "", "base": {}});
    let (status, resp) = app.send_json("POST", "/api/pokemons", &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp, json!({"error": "Missing required fields"}));

    assert_eq!(app.on_disk().await?.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn create_rejects_missing_fields() -> anyhow::Result<()> {
    let app = build_app(vec![pokemon(1, "Bulbasaur")]).await?;

    for body in [
        json!({"type": ["Fire"], "base": {}}),
        json!({"name": {"english": ""}, "type": ["Fire"], "base": {}}),
        json!({"name": {"english": "X"}, "base": {}}),
        json!({"name": {"english": "X"}, "type": ["Fire"]}),
        json!({"name": "X", "type": ["Fire"], "base": {}}),
    ] {
        let (status, resp) = app.send_json("POST", "/api/pokemons", &body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp, json!({"error": "Missing required fields"}), "{body}");
    }

    let req = Request::builder()
        .method("POST")
        .uri("/api/pokemons")
        .header("content-type", "application/json")
        .body(Body::from("{ nope"))?;
    let (status, resp) = app.call(req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid JSON body");

    assert_eq!(app.on_disk().await?.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn update_is_a_shallow_merge() -> anyhow::Result<()> {
    let mut bulba = pokemon(1, "Bulbasaur");
    bulba["name"]["japanese"] = json!("フシギダネ");
    let app = build_app(vec![bulba]).await?;

    let (status, updated) = app
        .send_json("PUT", "/api/pokemons/1", &json!({"base": {"HP": 1}, "id": 500}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["base"], json!({"HP": 1}));
    assert_eq!(updated["name"]["japanese"], "フシギダネ");

    let (status, updated) = app
        .send_json("PUT", "/api/pokemons/1", &json!({"name": {"english": "Bulby"}, "type": "Grass"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"]["english"], "Bulby");
    assert_eq!(updated["name"]["japanese"], "");
    assert_eq!(updated["type"], json!(["Grass"]));
    assert_eq!(app.on_disk().await?[0], updated);

    let (status, body) = app.send_json("PUT", "/api/pokemons/77", &json!({"base": {}})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pokemon not found");

    let (status, body) = app.send_json("PUT", "/api/pokemons/1", &json!({"name": {"french": "X"}})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid update payload");

    let (status, body) = app.send_json("PUT", "/api/pokemons/1", &json!(["not", "an", "object"])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid update payload");
    Ok(())
}

#[tokio::test]
async fn delete_twice() -> anyhow::Result<()> {
    let app = build_app(vec![pokemon(1, "A"), pokemon(2, "B"), pokemon(3, "C")]).await?;

    let req = Request::builder().method("DELETE").uri("/api/pokemons/2").body(Body::empty())?;
    let (status, body) = app.call(req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Pokemon deleted");
    assert_eq!(body["pokemon"], pokemon(2, "B"));

    let req = Request::builder().method("DELETE").uri("/api/pokemons/2").body(Body::empty())?;
    let (status, body) = app.call(req).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pokemon not found");

    let disk = app.on_disk().await?;
    let ids: Vec<_> = disk.as_array().into_iter().flatten().map(|p| p["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(3)]);
    Ok(())
}

#[tokio::test]
async fn malformed_catalog_fails_startup() -> anyhow::Result<()> {
    let root = std::path::PathBuf::from(format!("target/test-data/{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&root).await?;
    let data_file = root.join("pokemons.json");
    tokio::fs::write(&data_file, b"[{\"id\": ").await?;

    let mut config = configs::AppConfig::default();
    config.catalog.data_file = data_file.to_string_lossy().into_owned();
    let res = server::build_app(&config).await;
    assert!(matches!(res, Err(server::errors::StartupError::Catalog(_))));
    Ok(())
}
