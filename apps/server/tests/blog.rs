//! Health guide articles.

mod support;

use axum::http::StatusCode;
use bedfinder_core::BlogPost;
use serde_json::json;
use support::{assert_error_code, assert_status, TestApp};

fn draft() -> anyhow::Result<BlogPost> {
    Ok(serde_json::from_value(json!({
        "title": "Upcoming: maternity ward reopening",
        "slug": "maternity-ward-reopening",
        "content": "<p>Not yet announced.</p>",
        "excerpt": "Coming soon.",
        "published_at": "2030-01-01T00:00:00Z",
        "is_published": false
    }))?)
}

#[tokio::test]
async fn blog_lists_published_posts_newest_first() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.state.blog.create(&draft()?).await?;

    let (status, body) = app.get_json("/api/blog").await?;
    assert_status(status, StatusCode::OK, "blog listing");
    assert_eq!(body["total"], 2);

    let slugs: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(
        slugs,
        vec!["understanding-hospital-bed-types", "how-to-choose-right-hospital"]
    );
    assert!(body["posts"][0].get("content").is_none());
    Ok(())
}

#[tokio::test]
async fn blog_post_by_slug() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get_json("/api/blog/how-to-choose-right-hospital").await?;
    assert_status(status, StatusCode::OK, "blog post");
    assert_eq!(
        body["title"],
        "How to Choose the Right Hospital for Your Medical Needs"
    );
    assert!(body["content"].as_str().unwrap().contains("Key factors"));
    Ok(())
}

#[tokio::test]
async fn unknown_or_unpublished_post_is_404() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.state.blog.create(&draft()?).await?;

    let (status, body) = app.get_json("/api/blog/no-such-post").await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown slug");
    assert_error_code(&body, "not-found");

    let (status, _) = app.get_json("/api/blog/maternity-ward-reopening").await?;
    assert_status(status, StatusCode::NOT_FOUND, "draft");
    Ok(())
}
