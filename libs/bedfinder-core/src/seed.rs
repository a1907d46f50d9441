//! Sample data bootstrap
//!
//! Populates empty hospital, admin and blog tables. Tables that already hold
//! records are left alone, so running the seed on every startup is safe.

use crate::{
    models::{BlogPost, Hospital},
    repository::{AdminRepository, BlogRepository, HospitalRepository},
    Result,
};
use serde::Serialize;

const SAMPLE_HOSPITALS: &str = include_str!("../data/sample_hospitals.json");
const SAMPLE_BLOG_POSTS: &str = include_str!("../data/sample_blog_posts.json");

/// Credentials for the admin account created on an empty admin table.
#[derive(Clone, Copy)]
pub struct AdminSeed<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl Default for AdminSeed<'static> {
    fn default() -> Self {
        Self {
            username: "admin",
            password: "admin123",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub hospitals_created: usize,
    pub admins_created: usize,
    pub blog_posts_created: usize,
}

/// Repositories the seed writes to.
#[derive(Clone, Copy)]
pub struct SeedTargets<'a> {
    pub hospitals: &'a HospitalRepository,
    pub admins: &'a AdminRepository,
    pub blog: &'a BlogRepository,
}

/// The bundled sample hospitals, without ids.
pub fn sample_hospitals() -> Result<Vec<Hospital>> {
    Ok(serde_json::from_str(SAMPLE_HOSPITALS)?)
}

pub fn sample_blog_posts() -> Result<Vec<BlogPost>> {
    Ok(serde_json::from_str(SAMPLE_BLOG_POSTS)?)
}

pub async fn ensure_sample_data(
    targets: SeedTargets<'_>,
    admin: AdminSeed<'_>,
) -> Result<SeedReport> {
    let SeedTargets {
        hospitals,
        admins,
        blog,
    } = targets;
    let mut report = SeedReport::default();

    if hospitals.is_empty().await? {
        for hospital in sample_hospitals()? {
            hospitals.create(&hospital).await?;
            report.hospitals_created += 1;
        }
    }

    if admins.is_empty().await? {
        admins.create_admin(admin.username, admin.password).await?;
        report.admins_created += 1;
    }

    if blog.is_empty().await? {
        for post in sample_blog_posts()? {
            blog.create(&post).await?;
            report.blog_posts_created += 1;
        }
    }

    if report == SeedReport::default() {
        tracing::debug!("Store already populated, skipping sample data");
    } else {
        tracing::info!(
            hospitals = report.hospitals_created,
            admins = report.admins_created,
            blog_posts = report.blog_posts_created,
            "Sample data initialized"
        );
    }

    Ok(report)
}
