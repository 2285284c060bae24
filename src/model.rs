use chrono::{DateTime, NaiveDate, Utc};

/// Account as exposed over the API. The password hash lives only in the
/// database layer and is never serialized.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Lightweight chapter preview embedded in manga payloads.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterSummary {
    pub id: i64,
    pub chapter_number: String,
    pub released_at: DateTime<Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: i64,
    pub manga: i64,
    pub chapter_number: String,
    pub released_at: DateTime<Utc>,
    pub pages: Vec<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Manga {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub banner_image: String,
    pub genres: Vec<String>,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub released_year: String,
    pub author: String,
    pub artist: String,
    pub views: i64,
    pub is_featured: bool,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// At most 2 entries in listings, the full list in detail responses.
    pub chapters: Vec<ChapterSummary>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub manga: i64,
    pub chapter: Option<i64>,
    pub user: Option<i64>,
    pub user_username: Option<String>,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Rating {
    pub id: i64,
    pub manga: i64,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Bookmark {
    pub id: i64,
    pub manga: i64,
    pub manga_title: String,
    pub manga_cover: String,
    pub created_at: DateTime<Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ReadingHistory {
    pub id: i64,
    pub manga: i64,
    pub manga_title: String,
    pub manga_cover: String,
    pub chapter: i64,
    pub chapter_number: String,
    pub last_read_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub views: i64,
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct TopManga {
    pub id: i64,
    pub title: String,
    pub views: i64,
    pub cover_image: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct AnalyticsReport {
    pub total_mangas: i64,
    pub total_views: i64,
    pub total_chapters: i64,
    pub chart_data: Vec<DailyStat>,
    pub top_mangas: Vec<TopManga>,
}
