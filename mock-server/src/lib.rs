use std::{
    collections::{BTreeMap, HashMap, HashSet},
    io::Cursor,
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Served for `corrupt.png`; starts like nothing any decoder recognizes.
pub const CORRUPT_IMAGE: &[u8] = b"this is not an image";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bearer {
    pub token: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub time_seen: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

#[derive(Default)]
pub struct Registry {
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    animals: BTreeMap<String, Animal>,
    images: HashMap<String, Vec<u8>>,
}

pub type Db = Arc<RwLock<Registry>>;

pub fn app() -> Router {
    app_for(DEFAULT_ORIGIN)
}

/// Router whose seeded `imageURL`s point at `origin`.
pub fn app_for(origin: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(seed(origin)));
    Router::new()
        .route("/api/users/signup", post(sign_up))
        .route("/api/users/login", post(sign_in))
        .route("/api/animals/all", get(list_animal_names))
        .route("/api/animals/{name}", get(get_animal))
        .route("/images/{file}", get(get_image))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let origin = format!("http://{}", listener.local_addr()?);
    tracing::info!(%origin, "mock animal spotter API listening");
    axum::serve(listener, app_for(&origin)).await
}

fn seed(origin: &str) -> Registry {
    let sightings = [
        (1, "Lion", 1_563_900_000, -1.2921, 36.8219, "Resting under an acacia near the river.", "lion.png"),
        (
            2,
            "Snow Leopard",
            1_564_000_000,
            27.9881,
            86.925,
            "Tracks in fresh snow, then a glimpse on the ridge.",
            "snow-leopard.png",
        ),
        (3, "Zebra", 1_564_100_000, -2.3333, 34.8333, "A herd of about thirty crossing the plain.", "zebra.png"),
        (4, "Okapi", 1_564_200_000, 1.4, 28.6, "Photo came back unreadable.", "corrupt.png"),
    ];

    let mut registry = Registry::default();
    for (id, name, time_seen, latitude, longitude, description, file) in sightings {
        registry.animals.insert(
            name.to_string(),
            Animal {
                id,
                name: name.to_string(),
                time_seen,
                latitude,
                longitude,
                description: description.to_string(),
                image_url: format!("{origin}/images/{file}"),
            },
        );
        let bytes = if file == "corrupt.png" {
            CORRUPT_IMAGE.to_vec()
        } else {
            solid_png(id)
        };
        registry.images.insert(file.to_string(), bytes);
    }
    registry
}

/// Small PNG whose size differs per sighting.
fn solid_png(id: i64) -> Vec<u8> {
    let side = 4 + u32::try_from(id).unwrap_or(0);
    let image = image::RgbImage::from_pixel(side, side, image::Rgb([200, 150, 50]));
    let mut bytes = Vec::new();
    match image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png) {
        Ok(()) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "encoding seed image failed");
            Vec::new()
        }
    }
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if db.read().await.tokens.contains(token) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn sign_up(State(db): State<Db>, Json(input): Json<User>) -> StatusCode {
    let mut registry = db.write().await;
    if registry.users.contains_key(&input.username) {
        return StatusCode::CONFLICT;
    }
    tracing::info!(username = %input.username, "user signed up");
    registry.users.insert(input.username, input.password);
    StatusCode::OK
}

async fn sign_in(State(db): State<Db>, Json(input): Json<User>) -> Result<Json<Bearer>, StatusCode> {
    let mut registry = db.write().await;
    if registry.users.get(&input.username) != Some(&input.password) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let token = Uuid::new_v4().to_string();
    registry.tokens.insert(token.clone());
    Ok(Json(Bearer { token }))
}

async fn list_animal_names(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<String>>, StatusCode> {
    authorize(&db, &headers).await?;
    let registry = db.read().await;
    Ok(Json(registry.animals.keys().cloned().collect()))
}

async fn get_animal(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Animal>, StatusCode> {
    authorize(&db, &headers).await?;
    let registry = db.read().await;
    registry.animals.get(&name).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn get_image(State(db): State<Db>, Path(file): Path<String>) -> Response {
    let registry = db.read().await;
    match registry.images.get(&file) {
        Some(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animal_serializes_to_wire_names() {
        let animal = Animal {
            id: 1,
            name: "Lion".to_string(),
            time_seen: 1_563_900_000,
            latitude: 1.0,
            longitude: 2.0,
            description: "d".to_string(),
            image_url: "http://x/images/lion.png".to_string(),
        };
        let json = serde_json::to_value(&animal).unwrap();
        assert_eq!(json["timeSeen"], 1_563_900_000);
        assert_eq!(json["imageURL"], "http://x/images/lion.png");
        assert!(json.get("time_seen").is_none());
    }

    #[test]
    fn user_rejects_missing_password() {
        let result: Result<User, _> = serde_json::from_str(r#"{"username":"sam"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn seed_points_images_at_origin() {
        let registry = seed("http://127.0.0.1:9999");
        let lion = &registry.animals["Lion"];
        assert_eq!(lion.image_url, "http://127.0.0.1:9999/images/lion.png");
        assert_eq!(registry.animals.len(), 4);
        assert_eq!(registry.images["corrupt.png"], CORRUPT_IMAGE);
    }

    #[test]
    fn seed_images_are_png() {
        let registry = seed(DEFAULT_ORIGIN);
        assert!(registry.images["zebra.png"].starts_with(b"\x89PNG"));
    }
}
