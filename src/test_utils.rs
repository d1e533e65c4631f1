use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Set};

use crate::database::Database;
use crate::entities;
use crate::entities::user::UserRole;

pub async fn test_db() -> Arc<Database> {
    // A single pooled connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let database = Database::connect(options)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test database: {e:?}"));

    Arc::new(database)
}

pub async fn insert_user(db: &Database, username: &str) -> entities::user::Model {
    entities::user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        email_verified: Set(true),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

pub async fn insert_admin(db: &Database, username: &str) -> entities::user::Model {
    let user = insert_user(db, username).await;
    let mut active: entities::user::ActiveModel = user.into();
    active.role = Set(UserRole::Admin);
    active.update(&db.conn).await.unwrap()
}

pub async fn insert_artist(db: &Database, name: &str) -> entities::artist::Model {
    entities::artist::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

pub async fn insert_album(db: &Database, artist_id: i64, title: &str) -> entities::album::Model {
    entities::album::ActiveModel {
        artist_id: Set(artist_id),
        title: Set(title.to_string()),
        release_year: Set(Some(2020)),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

pub async fn insert_song(
    db: &Database,
    artist_id: i64,
    album_id: Option<i64>,
    title: &str,
    genre: &str,
) -> entities::song::Model {
    entities::song::ActiveModel {
        artist_id: Set(artist_id),
        album_id: Set(album_id),
        title: Set(title.to_string()),
        genre: Set(genre.to_string()),
        duration_seconds: Set(200),
        audio_url: Set(format!("https://cdn.example.com/{}.mp3", title.replace(' ', "-"))),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

pub async fn insert_playlist(
    db: &Database,
    user_id: i64,
    name: &str,
    is_public: bool,
) -> entities::playlist::Model {
    entities::playlist::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        is_public: Set(is_public),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

pub async fn insert_premium(
    db: &Database,
    user_id: i64,
    days: i64,
) -> entities::premium_user::Model {
    let now = Utc::now();
    entities::premium_user::ActiveModel {
        user_id: Set(user_id),
        start_date: Set(now - chrono::Duration::days(1)),
        end_date: Set(now + chrono::Duration::days(days)),
        amount_paid: Set(999),
        currency: Set("usd".to_string()),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}
