use std::{fmt, str::FromStr};

use axum::extract::{Path, Query, State};
use chrono::NaiveDateTime;
use diesel::{prelude::*, SqliteConnection};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{now, nullable, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{NewNewsArticle, NewsArticle, NewsChangeset},
        schema::news,
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Published,
    #[default]
    Draft,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Published => "published",
            ArticleStatus::Draft => "draft",
            ArticleStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ArticleStatus::Published),
            "draft" => Ok(ArticleStatus::Draft),
            "archived" => Ok(ArticleStatus::Archived),
            other => Err(format!("unknown article status '{other}'")),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<NewsArticle> for ArticleView {
    type Error = ApiError;

    fn try_from(row: NewsArticle) -> Result<Self, Self::Error> {
        Ok(ArticleView {
            tags: serde_json::from_str(&row.tags)?,
            status: row.status.parse().map_err(ApiError::Internal)?,
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            image_url: row.image_url,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Lowercase ASCII words joined by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("article");
    }
    slug
}

/// First free variant of `base`: `base`, `base-2`, `base-3`, ...
fn unique_slug(
    conn: &mut SqliteConnection,
    base: &str,
    exclude_id: Option<i32>,
) -> QueryResult<String> {
    let mut candidate = base.to_string();
    let mut n = 1;
    loop {
        let mut q = news::table
            .filter(news::slug.eq(&candidate))
            .select(news::id)
            .into_boxed();
        if let Some(id) = exclude_id {
            q = q.filter(news::id.ne(id));
        }
        if q.first::<i32>(conn).optional()?.is_none() {
            return Ok(candidate);
        }
        n += 1;
        candidate = format!("{base}-{n}");
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[derive(Deserialize, Debug)]
pub struct NewsQuery {
    pub status: Option<ArticleStatus>,
    pub tag: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ArticleStatus>,
}

fn into_views(rows: Vec<NewsArticle>) -> Result<Vec<ArticleView>, ApiError> {
    rows.into_iter().map(ArticleView::try_from).collect()
}

/// Anonymous readers only ever see published articles.
fn visible_to(admin: &Option<AdminSession>, article: &ArticleView) -> bool {
    admin.is_some() || article.status == ArticleStatus::Published
}

#[instrument(skip(state, admin))]
pub async fn list_news(
    State(state): State<SharedState>,
    admin: Option<AdminSession>,
    Query(query): Query<NewsQuery>,
) -> Result<ApiResponse<Vec<ArticleView>>, ApiError> {
    let status = if admin.is_some() {
        query.status
    } else {
        Some(ArticleStatus::Published)
    };

    let rows = database::run(&state.pool, move |conn| {
        let mut q = news::table.into_boxed();
        if let Some(status) = status {
            q = q.filter(news::status.eq(status.as_str()));
        }
        Ok(q
            .order((news::published_at.desc(), news::created_at.desc()))
            .load::<NewsArticle>(conn)?)
    })
    .await?;

    let mut articles = into_views(rows)?;
    if let Some(tag) = query.tag {
        articles.retain(|a| a.tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)));
    }
    Ok(ApiResponse::ok(articles))
}

#[instrument(skip(state, admin))]
pub async fn get_article(
    State(state): State<SharedState>,
    admin: Option<AdminSession>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ArticleView>, ApiError> {
    let id = parse_id(&id)?;
    let row = database::run(&state.pool, move |conn| {
        Ok(news::table.find(id).first::<NewsArticle>(conn).optional()?)
    })
    .await?;

    row.map(ArticleView::try_from)
        .transpose()?
        .filter(|article| visible_to(&admin, article))
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::not_found("Article"))
}

#[instrument(skip(state, admin))]
pub async fn get_article_by_slug(
    State(state): State<SharedState>,
    admin: Option<AdminSession>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<ArticleView>, ApiError> {
    let row = database::run(&state.pool, move |conn| {
        Ok(news::table
            .filter(news::slug.eq(slug))
            .first::<NewsArticle>(conn)
            .optional()?)
    })
    .await?;

    row.map(ArticleView::try_from)
        .transpose()?
        .filter(|article| visible_to(&admin, article))
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::not_found("Article"))
}

#[instrument(skip_all)]
pub async fn create_article(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreateArticle>,
) -> Result<ApiResponse<ArticleView>, ApiError> {
    require("title", &payload.title)?;
    require("content", &payload.content)?;

    let base = slugify(payload.slug.as_deref().unwrap_or(&payload.title));
    let tags = serde_json::to_string(&normalize_tags(payload.tags))?;
    let stamp = now();
    let published_at = (payload.status == ArticleStatus::Published).then_some(stamp);

    let row = database::run(&state.pool, move |conn| {
        Ok(conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let new_article = NewNewsArticle {
                slug: unique_slug(conn, &base, None)?,
                title: payload.title,
                content: payload.content,
                image_url: payload.image_url,
                tags,
                status: payload.status.as_str().to_string(),
                published_at,
                created_at: stamp,
                updated_at: stamp,
            };
            diesel::insert_into(news::table)
                .values(&new_article)
                .execute(conn)?;
            news::table.order(news::id.desc()).first::<NewsArticle>(conn)
        })?)
    })
    .await?;

    info!("Created article {} ({})", row.id, row.slug);
    Ok(ApiResponse::created(row.try_into()?))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_article(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateArticle>,
) -> Result<ApiResponse<ArticleView>, ApiError> {
    let id = parse_id(&id)?;
    if let Some(title) = &payload.title {
        require("title", title)?;
    }
    if let Some(content) = &payload.content {
        require("content", content)?;
    }
    let tags = payload
        .tags
        .map(|tags| serde_json::to_string(&normalize_tags(tags)))
        .transpose()?;

    let row = database::run(&state.pool, move |conn| {
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = news::table
                .find(id)
                .first::<NewsArticle>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Article"))?;

            let title_changed = payload
                .title
                .as_ref()
                .is_some_and(|title| *title != current.title);
            let slug = match (&payload.slug, title_changed) {
                (Some(requested), _) => Some(unique_slug(conn, &slugify(requested), Some(id))?),
                (None, true) => Some(unique_slug(
                    conn,
                    &slugify(payload.title.as_deref().unwrap_or_default()),
                    Some(id),
                )?),
                (None, false) => None,
            };

            let published_at = match payload.status {
                Some(ArticleStatus::Published) if current.published_at.is_none() => Some(now()),
                _ => None,
            };

            let changes = NewsChangeset {
                title: payload.title,
                slug,
                content: payload.content,
                image_url: payload.image_url,
                tags,
                status: payload.status.map(|s| s.as_str().to_string()),
                published_at,
                updated_at: Some(now()),
            };
            diesel::update(news::table.find(id))
                .set(&changes)
                .execute(conn)?;
            Ok(news::table.find(id).first::<NewsArticle>(conn)?)
        })
    })
    .await?;

    Ok(ApiResponse::ok(row.try_into()?))
}

#[instrument(skip(state, _admin))]
pub async fn delete_article(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(news::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Article"));
    }
    Ok(ApiResponse::message("Article deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_dashed_words() {
        assert_eq!(slugify("Home Win vs. Eagles!"), "home-win-vs-eagles");
        assert_eq!(slugify("  --Season 2024/25--  "), "season-2024-25");
        assert_eq!(slugify("Ünïcode only ✓"), "n-code-only");
        assert_eq!(slugify("!!!"), "article");
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = normalize_tags(vec![
            " league ".to_string(),
            "league".to_string(),
            String::new(),
            "youth".to_string(),
        ]);
        assert_eq!(tags, ["league", "youth"]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("hidden".parse::<ArticleStatus>().is_err());
        assert_eq!(
            serde_json::from_str::<ArticleStatus>("\"archived\"").unwrap(),
            ArticleStatus::Archived
        );
    }
}
