use crate::scraper::NO_RATING;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

/// Which library a title belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum TitleKind {
    #[serde(rename = "MO")]
    #[sqlx(rename = "MO")]
    Movie,
    #[serde(rename = "TV")]
    #[sqlx(rename = "TV")]
    Tv,
}

impl TitleKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Movie => "MO",
            Self::Tv => "TV",
        }
    }
}

impl fmt::Display for TitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TitleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mo" | "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(format!("Unknown video type: {other}")),
        }
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleOrder {
    #[default]
    Title,
    /// Most recently modified directory first
    Mtime,
    /// Highest rated first, unrated last
    Rating,
}

impl TitleOrder {
    const fn clause(self) -> &'static str {
        match self {
            Self::Title => "title ASC",
            Self::Mtime => "file_mtime DESC, title ASC",
            Self::Rating => "rating IS NULL, CAST(rating AS REAL) DESC, title ASC",
        }
    }
}

/// One cataloged directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TitleRecord {
    pub id: i64,
    pub kind: TitleKind,
    pub title: String,
    pub rating: Option<String>,
    pub blurb: String,
    pub imdb_title_url: Option<String>,
    /// Candidate list markup, see [`crate::scraper::find_results_html`]
    pub find_results: String,
    /// Poster path relative to the media root
    pub image: Option<String>,
    pub file_path: String,
    pub file_mtime: i64,
    pub file_ctime: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert payload for [`TitleRecord::create`]
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub kind: TitleKind,
    pub title: String,
    pub rating: Option<String>,
    pub blurb: String,
    pub imdb_title_url: Option<String>,
    pub find_results: String,
    pub image: Option<String>,
    pub file_path: String,
    pub file_mtime: i64,
    pub file_ctime: i64,
}

/// Fields replaced when a title is re-resolved against a chosen URL
#[derive(Debug, Clone)]
pub struct DetailsUpdate {
    pub rating: Option<String>,
    pub blurb: String,
    pub imdb_title_url: String,
    pub image: Option<String>,
}

impl TitleRecord {
    /// Rating for display, `N/A` when absent
    pub fn rating_or_na(&self) -> &str {
        self.rating.as_deref().unwrap_or(NO_RATING)
    }

    pub async fn create(pool: &SqlitePool, new: &NewTitle) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO titles (kind, title, rating, blurb, imdb_title_url, find_results, image,
                                file_path, file_mtime, file_ctime)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.kind)
        .bind(&new.title)
        .bind(&new.rating)
        .bind(&new.blurb)
        .bind(&new.imdb_title_url)
        .bind(&new.find_results)
        .bind(&new.image)
        .bind(&new.file_path)
        .bind(new.file_mtime)
        .bind(new.file_ctime)
        .fetch_one(pool)
        .await
    }

    /// Whether a record with this title and kind is already cataloged
    pub async fn exists(pool: &SqlitePool, title: &str, kind: TitleKind) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM titles WHERE title = ? AND kind = ?)",
        )
        .bind(title)
        .bind(kind)
        .fetch_one(pool)
        .await
    }

    /// All records with this exact title and kind
    pub async fn filter(
        pool: &SqlitePool,
        title: &str,
        kind: TitleKind,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM titles WHERE title = ? AND kind = ? ORDER BY id")
            .bind(title)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &SqlitePool,
        kind: TitleKind,
        order: TitleOrder,
    ) -> sqlx::Result<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM titles WHERE kind = ? ORDER BY {}",
            order.clause()
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool, kind: TitleKind) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM titles WHERE kind = ?")
            .bind(kind)
            .fetch_one(pool)
            .await
    }

    /// Case-insensitive title substring search across both kinds
    pub async fn search(pool: &SqlitePool, needle: &str) -> sqlx::Result<Vec<Self>> {
        let pattern = format!("%{}%", escape_like(needle.trim()));
        sqlx::query_as::<_, Self>(
            r"SELECT * FROM titles WHERE title LIKE ? ESCAPE '\' ORDER BY title ASC, kind ASC",
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    pub async fn update_details(
        pool: &SqlitePool,
        id: i64,
        update: &DetailsUpdate,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE titles
            SET rating = ?, blurb = ?, imdb_title_url = ?, image = ?, updated_at = datetime('now')
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.rating)
        .bind(&update.blurb)
        .bind(&update.imdb_title_url)
        .bind(&update.image)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM titles WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every record. Returns the number removed.
    pub async fn delete_all(pool: &SqlitePool) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM titles").execute(pool).await?;
        Ok(result.rows_affected())
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
