//! Health guide articles
//!
//! Visitors only ever see published posts, newest first, addressed by slug.

use super::BLOG_POSTS_TABLE;
use crate::{
    models::BlogPost,
    store::{RecordStore, Table},
    Error, Result,
};
use std::cmp::Reverse;
use std::sync::Arc;

#[derive(Clone)]
pub struct BlogRepository {
    table: Table<BlogPost>,
}

impl BlogRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: Table::new(store, BLOG_POSTS_TABLE),
        }
    }

    /// Store a post and return its id. The slug must not be taken yet.
    pub async fn create(&self, post: &BlogPost) -> Result<i64> {
        if self.table.all().await?.iter().any(|p| p.slug == post.slug) {
            return Err(Error::InvalidRecord {
                table: BLOG_POSTS_TABLE.to_string(),
                message: format!("slug '{}' is already in use", post.slug),
            });
        }

        let id = self.table.insert(post).await?;
        tracing::info!(post_id = id, slug = %post.slug, "Blog post created");
        Ok(id)
    }

    /// Published posts, newest first; ties go to the higher id.
    pub async fn published(&self) -> Result<Vec<BlogPost>> {
        let mut posts: Vec<BlogPost> = self
            .table
            .all()
            .await?
            .into_iter()
            .filter(|p| p.is_published)
            .collect();
        posts.sort_by_key(|p| Reverse((p.published_at, p.id)));
        Ok(posts)
    }

    /// The published post with this slug. Drafts are not found.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        Ok(self
            .table
            .all()
            .await?
            .into_iter()
            .find(|p| p.is_published && p.slug == slug))
    }

    pub async fn get_all(&self) -> Result<Vec<BlogPost>> {
        self.table.all().await
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.table.all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.table.is_empty().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn post(slug: &str, published_at: &str, is_published: bool) -> BlogPost {
        serde_json::from_value(json!({
            "title": slug.replace('-', " "),
            "slug": slug,
            "content": "<p>Body</p>",
            "published_at": published_at,
            "is_published": is_published,
        }))
        .unwrap()
    }

    async fn repo_with_posts() -> BlogRepository {
        let repo = BlogRepository::new(Arc::new(MemoryStore::new()));
        for p in [
            post("older", "2025-01-01T08:00:00Z", true),
            post("draft", "2025-03-01T08:00:00Z", false),
            post("newer", "2025-02-01T08:00:00Z", true),
            post("same-day", "2025-02-01T08:00:00Z", true),
        ] {
            repo.create(&p).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn published_lists_newest_first_without_drafts() {
        let repo = repo_with_posts().await;
        let slugs: Vec<String> = repo
            .published()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["same-day", "newer", "older"]);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn by_slug_hides_drafts_and_unknown_slugs() {
        let repo = repo_with_posts().await;
        assert_eq!(
            repo.by_slug("newer").await.unwrap().map(|p| p.id),
            Some(3)
        );
        assert!(repo.by_slug("draft").await.unwrap().is_none());
        assert!(repo.by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let repo = repo_with_posts().await;
        let err = repo
            .create(&post("older", "2025-04-01T08:00:00Z", true))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { .. }));
        assert_eq!(repo.count().await.unwrap(), 4);
    }
}
