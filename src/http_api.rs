use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Collection, Database,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

const LIVENESS_BODY: &str = "¡Servidor en ejecución!";
const DEFAULT_PORT: u16 = 5000;

/* ================== Context ================== */

#[derive(Clone)]
pub struct ApiCtx {
    pub db: Database,
    pub api_key: Option<String>,
}

/* ================== Models ================== */

/* ---- ContactSubmission ---- */

/// Un mensaje del formulario de contacto. Los tres campos son obligatorios
/// y no vacíos; cualquier campo extra del body se ignora.
#[derive(Deserialize, Debug)]
struct ContactSubmission {
    nombre: String,
    email: String,
    mensaje: String,
}

fn contact_from_body(body: serde_json::Value) -> Result<ContactSubmission, String> {
    let contact: ContactSubmission =
        serde_json::from_value(body).map_err(|e| e.to_string())?;

    for (campo, valor) in [
        ("nombre", &contact.nombre),
        ("email", &contact.email),
        ("mensaje", &contact.mensaje),
    ] {
        if valor.is_empty() {
            return Err(format!("el campo `{campo}` es obligatorio"));
        }
    }

    Ok(contact)
}

/* ================== Routes: liveness ================== */

async fn root() -> &'static str {
    LIVENESS_BODY
}

/* ================== Routes: contacto ================== */

async fn contact_submit(
    State(ctx): State<Arc<ApiCtx>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match save_contact(&ctx.db, body).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Mensaje guardado con éxito" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Error al guardar el mensaje", "error": e })),
        )
            .into_response(),
    }
}

async fn save_contact(db: &Database, body: serde_json::Value) -> Result<(), String> {
    let contact = contact_from_body(body)?;

    let coll: Collection<Document> = db.collection("contacts");
    coll.insert_one(
        doc! {
            "nombre": &contact.nombre,
            "email": &contact.email,
            "mensaje": &contact.mensaje,
        },
        None,
    )
    .await
    .map_err(|e| e.to_string())?;

    Ok(())
}

/* ================== Routes: users ================== */

// Two absent values compare equal, mirroring the header-vs-env check.
fn key_matches(candidate: Option<&str>, configured: Option<&str>) -> bool {
    candidate == configured
}

async fn users_list(State(ctx): State<Arc<ApiCtx>>, headers: HeaderMap) -> Response {
    let candidate = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    if !key_matches(candidate, ctx.api_key.as_deref()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Acceso denegado. API Key inválida." })),
        )
            .into_response();
    }

    match find_users(&ctx.db).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => {
            tracing::error!("error listing users: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error al obtener los usuarios" })),
            )
                .into_response()
        }
    }
}

async fn find_users(db: &Database) -> Result<Vec<Document>, mongodb::error::Error> {
    let coll: Collection<Document> = db.collection("users");

    let mut cur = coll.find(doc! {}, None).await?;

    let mut out = vec![];
    while let Some(docu) = cur.try_next().await? {
        out.push(docu);
    }

    Ok(out)
}

/* ================== Runner ================== */

fn router(ctx: Arc<ApiCtx>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/contacto", post(contact_submit))
        .route("/users", get(users_list))
        .with_state(ctx)
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT)
}

pub async fn run_http_server(db: Database) -> anyhow::Result<()> {
    // API_KEY queda opcional: su ausencia no impide el arranque, solo hace
    // fallar la comparación de /users contra cualquier header presente.
    let api_key = std::env::var("API_KEY").ok();

    let ctx = Arc::new(ApiCtx { db, api_key });
    let app = router(ctx).layer(TraceLayer::new_for_http());

    let port = parse_port(std::env::var("PORT").ok());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "http", "[http] listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

/* ================== Tests ================== */
