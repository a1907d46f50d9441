//! Repositories - typed data access over a [`RecordStore`](crate::store::RecordStore)
//!
//! Each repository owns exactly one table. There is no cross-table
//! referential integrity at this level.

pub mod admin;
pub mod blog;
pub mod booking;
pub mod hospital;

pub use admin::AdminRepository;
pub use blog::BlogRepository;
pub use booking::BookingRepository;
pub use hospital::HospitalRepository;

pub const HOSPITALS_TABLE: &str = "hospitals";
pub const BOOKINGS_TABLE: &str = "bookings";
pub const ADMINS_TABLE: &str = "admins";
pub const BLOG_POSTS_TABLE: &str = "blog_posts";
