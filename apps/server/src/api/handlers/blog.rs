//! Health guide articles

use axum::{extract::State, Json};
use bedfinder_core::BlogPost;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{api::extractors::Path, state::AppState, Error, Result};

/// Listing entry; the article body is only served by the detail route.
#[derive(Debug, Serialize)]
pub struct BlogSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
}

impl From<BlogPost> for BlogSummary {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            author: post.author,
            published_at: post.published_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlogListing {
    pub total: usize,
    pub posts: Vec<BlogSummary>,
}

/// `GET /api/blog`
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<BlogListing>> {
    let posts = state.blog.published().await?;
    Ok(Json(BlogListing {
        total: posts.len(),
        posts: posts.into_iter().map(BlogSummary::from).collect(),
    }))
}

/// `GET /api/blog/:slug`
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    state
        .blog
        .by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("Blog post '{slug}'")))
}
