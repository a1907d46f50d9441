//! Bedfinder core
//!
//! Persistence and query layer behind the hospital directory:
//! - [`store`]: the record store abstraction and its in-memory / JSON file backends
//! - [`filter`]: the filter engine turning search criteria into a hospital listing
//! - [`repository`]: typed repositories for hospitals, bookings, admins and blog posts
//! - [`seed`]: idempotent sample data bootstrap

#![forbid(unsafe_code)]

pub mod error;
pub mod filter;
pub mod models;
pub mod repository;
pub mod seed;
pub mod store;

pub use error::{Error, Result};
pub use filter::{filter_hospitals, BedMatch, Facets, ParsedCriteria, RejectedParam, SearchCriteria};
pub use models::{Admin, AdminProfile, BlogPost, Booking, BookingStatus, Hospital, NewBooking};
pub use repository::{AdminRepository, BlogRepository, BookingRepository, HospitalRepository};
pub use store::{JsonFileStore, MemoryStore, Record, RecordStore, Table};
