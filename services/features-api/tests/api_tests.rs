//! End-to-end tests of the router against an in-memory store.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use features_api::AuthConfig;
use features_protocol::FeatureId;
use serde_json::json;
use storage::FeatureRow;

use common::*;

#[tokio::test]
async fn test_landing_page() {
    let response = send(app(), get("/api")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");

    let json = body_json(response).await;
    let links = json["links"].as_array().unwrap();
    assert_eq!(links[0]["href"], "http://localhost:8080/api");
    assert_eq!(links[3]["rel"], "service-desc");
    assert_eq!(links[3]["type"], "application/vnd.oai.openapi+json;version=3.0");
    assert!(json.get("authentication").is_none());
}

#[tokio::test]
async fn test_doubled_mount_landing_page() {
    let response = send(app(), get("/api/api")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["authentication"]["scheme"], "basic");
    assert_eq!(json["links"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_conformance() {
    let response = send(app(), get("/api/conformance")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");

    let json = body_json(response).await;
    assert!(json["conformsTo"]
        .as_array()
        .unwrap()
        .contains(&json!("http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core")));
}

#[tokio::test]
async fn test_collections_and_collection() {
    let json = body_json(send(app(), get("/api/collections")).await).await;
    assert_eq!(json["collections"][0]["id"], "turbidez_rj");

    let response = send(app(), get("/api/collections/turbidez_rj")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");
    let json = body_json(response).await;
    assert_eq!(json["title"], "Turbidez de Corpos d'Água no Rio de Janeiro");
    assert_eq!(
        json["extent"]["temporal"]["interval"][0],
        json!(["2013-01-01T00:00:00Z", "2019-12-31T23:59:59Z"])
    );
}

#[tokio::test]
async fn test_items_default_page() {
    let response = send(app(), get("/api/collections/turbidez_rj/items")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/geo+json");

    let json = body_json(response).await;
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["numberMatched"], 12);
    assert_eq!(json["numberReturned"], 10);
    assert_eq!(json["features"].as_array().unwrap().len(), 10);
    assert_eq!(json["features"][0]["id"], 1);
    assert_eq!(json["features"][0]["geometry"]["type"], "Point");
    assert_eq!(json["features"][0]["properties"]["med"], 1.5);
    assert!(json["timeStamp"].as_str().unwrap().ends_with('Z'));

    let rels: Vec<&str> = json["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert_eq!(rels, vec!["self", "collection"]);
    assert_eq!(
        json["links"][0]["href"],
        "http://localhost:8080/api/collections/turbidez_rj/items"
    );
}

#[tokio::test]
async fn test_items_limit_and_bbox_scenario() {
    let response = send(
        app(),
        get("/api/collections/turbidez_rj/items?limit=5&bbox=-44,-23,-41,-21"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/geo+json");

    let json = body_json(response).await;
    let features = json["features"].as_array().unwrap();
    assert!(features.len() <= 5);
    assert_eq!(features.len(), 5);
    assert_eq!(json["numberMatched"], 8);
    assert_eq!(json["numberReturned"], features.len());
}

#[tokio::test]
async fn test_items_offset() {
    let json = body_json(
        send(
            app(),
            get("/api/collections/turbidez_rj/items?limit=5&offset=10"),
        )
        .await,
    )
    .await;
    assert_eq!(json["numberMatched"], 12);
    assert_eq!(json["numberReturned"], 2);
    assert_eq!(json["features"][0]["id"], 11);
}

#[tokio::test]
async fn test_items_limit_clamped() {
    let json = body_json(
        send(app(), get("/api/collections/turbidez_rj/items?limit=0")).await,
    )
    .await;
    assert_eq!(json["numberReturned"], 1);

    let json = body_json(
        send(app(), get("/api/collections/turbidez_rj/items?limit=5000")).await,
    )
    .await;
    assert_eq!(json["numberReturned"], 12);

    let json = body_json(
        send(app(), get("/api/collections/turbidez_rj/items?limit=abc")).await,
    )
    .await;
    assert_eq!(json["numberReturned"], 10);
}

#[tokio::test]
async fn test_malformed_bbox_is_ignored() {
    for bbox in ["-44,-23,-41", "a,b,c,d", "-44,-23,-41,-21,0"] {
        let uri = format!("/api/collections/turbidez_rj/items?limit=100&bbox={}", bbox);
        let response = send(app(), get(&uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "bbox {}", bbox);
        let json = body_json(response).await;
        assert_eq!(json["numberMatched"], 12, "bbox {}", bbox);
    }
}

#[tokio::test]
async fn test_negative_offset_reaches_store() {
    let response = send(app(), get("/api/collections/turbidez_rj/items?offset=-1")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "InternalServerError");
}

#[tokio::test]
async fn test_single_item() {
    let response = send(app(), get("/api/collections/turbidez_rj/items/3")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/geo+json");

    let json = body_json(response).await;
    assert_eq!(json["type"], "Feature");
    assert_eq!(json["id"], 3);
    assert_eq!(json["geometry"], json!({"type": "Point", "coordinates": [-43.3, -22.5]}));
    assert_eq!(json["properties"]["corpodagua"], "Rio 3");
}

#[tokio::test]
async fn test_missing_item() {
    let response = send(app(), get("/api/collections/turbidez_rj/items/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NotFound");
}

#[tokio::test]
async fn test_non_numeric_item_id_skips_store() {
    let store = Arc::new(MemoryStore::new(sample_rows()));
    let app = app_with(store.clone(), auth(), service());

    let response = send(app, get("/api/collections/turbidez_rj/items/abc")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_queryables() {
    let response = send(app(), get("/api/collections/turbidez_rj/queryables")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");

    let json = body_json(response).await;
    assert_eq!(json["type"], "object");
    assert_eq!(json["properties"]["med_13"]["type"], "number");
}

#[tokio::test]
async fn test_openapi() {
    let response = send(app(), get("/api/openapi")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");

    let json = body_json(response).await;
    assert_eq!(json["servers"][0]["url"], "http://localhost:8080/api");
    assert!(json["paths"]
        .get("/collections/{collectionId}/items/{featureId}")
        .is_some());
    assert_eq!(json["components"]["securitySchemes"]["basicAuth"]["type"], "http");
}

#[tokio::test]
async fn test_unknown_collection_at_every_scoped_path() {
    for uri in [
        "/api/collections/unknown",
        "/api/collections/unknown/items",
        "/api/collections/unknown/items/1",
        "/api/collections/unknown/queryables",
    ] {
        let response = send(app(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(content_type(&response), "application/json");
        let json = body_json(response).await;
        assert_eq!(json["code"], "NotFound", "{}", uri);
        assert_eq!(json["description"], "Collection 'unknown' not found");
    }
}

#[tokio::test]
async fn test_unmatched_paths_are_not_found() {
    for uri in [
        "/",
        "/other",
        "/api/unknown",
        "/api/collections/turbidez_rj/features",
        "/api/collections/turbidez_rj/items/1/extra",
    ] {
        let response = send(app(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_json(response).await["code"], "NotFound");
    }
}

#[tokio::test]
async fn test_missing_credentials() {
    let response = send(app(), get_anonymous("/api/collections")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"Test Realm\""
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert_eq!(body_json(response).await["code"], "Unauthorized");
}

#[tokio::test]
async fn test_wrong_credentials() {
    let request = Request::builder()
        .uri("/api")
        .header(header::AUTHORIZATION, basic_header(USER, "nope"))
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(body_json(response).await["code"], "Forbidden");
}

#[tokio::test]
async fn test_malformed_credentials() {
    for value in ["Basic ***", "Basic dXNlcm5hbWU="] {
        let request = Request::builder()
            .uri("/api")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = send(app(), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", value);
        assert_eq!(body_json(response).await["code"], "BadRequest");
    }
}

#[tokio::test]
async fn test_unknown_path_requires_auth_first() {
    let response = send(app(), get_anonymous("/nowhere")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_preflight_without_auth() {
    for uri in ["/api/collections", "/anything/at/all", "/"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = send(app(), request).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let headers = response.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, OPTIONS"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type, Authorization"
        );
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_cors_on_success_and_not_found() {
    for uri in ["/api", "/api/collections/unknown"] {
        let response = send(app(), get(uri)).await;
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}

#[tokio::test]
async fn test_auth_disabled() {
    let app = app_with(
        Arc::new(MemoryStore::new(sample_rows())),
        AuthConfig::disabled(),
        service(),
    );
    let response = send(app.clone(), get_anonymous("/api/collections")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(send(app.clone(), get_anonymous("/api/api")).await).await;
    assert!(json.get("authentication").is_none());

    let json = body_json(send(app, get_anonymous("/api/openapi")).await).await;
    assert!(json.get("security").is_none());
}

#[tokio::test]
async fn test_bad_geometry_is_internal_error() {
    let rows = vec![FeatureRow {
        id: FeatureId::Integer(1),
        wkt: "POINT(1".to_string(),
        properties: Default::default(),
    }];
    let app = app_with(Arc::new(MemoryStore::new(rows)), auth(), service());

    for uri in [
        "/api/collections/turbidez_rj/items",
        "/api/collections/turbidez_rj/items/1",
    ] {
        let response = send(app.clone(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        let json = body_json(response).await;
        assert_eq!(json["code"], "InternalServerError");
        assert!(json["detail"].as_str().unwrap().contains("WKT"));
    }
}

#[tokio::test]
async fn test_store_failure_detail_can_be_hidden() {
    let response = send(
        app_with(Arc::new(MemoryStore::failing()), auth(), service()),
        get("/api/collections/turbidez_rj/items"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("connection reset"));

    let mut hidden = service();
    hidden.expose_error_detail = false;
    let response = send(
        app_with(Arc::new(MemoryStore::failing()), auth(), hidden),
        get("/api/collections/turbidez_rj/items"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["description"], "Internal server error");
    assert!(json.get("detail").is_none());
}

#[tokio::test]
async fn test_public_url_used_for_links() {
    let mut public = service();
    public.public_url = Some("https://data.example.org".to_string());
    let app = app_with(Arc::new(MemoryStore::new(sample_rows())), auth(), public);

    let json = body_json(send(app, get("/api/collections/turbidez_rj")).await).await;
    assert!(json["links"]
        .as_array()
        .unwrap()
        .iter()
        .all(|l| l["href"].as_str().unwrap().starts_with("https://data.example.org/api")));
}

#[tokio::test]
async fn test_absolute_request_target_used_for_links() {
    let request = Request::builder()
        .uri("http://data.example.org:9000/api")
        .header(header::AUTHORIZATION, basic_header(USER, PASSWORD))
        .body(Body::empty())
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["links"][0]["rel"], "self");
    assert_eq!(json["links"][0]["href"], "http://data.example.org:9000/api");
}

#[tokio::test]
async fn test_custom_mount() {
    let app = app_with(
        Arc::new(MemoryStore::new(sample_rows())),
        auth(),
        features_api::ServiceConfig::new("ogc"),
    );
    let response = send(app.clone(), get("/ogc/collections/turbidez_rj")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["links"][4]["href"],
        "http://localhost:8080/ogc/collections/turbidez_rj"
    );

    let response = send(app, get("/api/collections")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
