//! Admin accounts and credential checks
//!
//! Plaintext passwords enter through [`AdminRepository::create_admin`] and
//! [`AdminRepository::authenticate`] only; the table holds Argon2id PHC
//! strings. Hashing runs on the blocking thread pool.

use super::ADMINS_TABLE;
use crate::{
    models::Admin,
    store::{RecordStore, Table},
    Error, Result,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

#[cfg(test)]
static VERIFICATIONS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// Held by tests that verify passwords so verification counts don't interleave.
#[cfg(test)]
pub(crate) static VERIFY_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

#[derive(Serialize)]
struct NewAdmin<'a> {
    username: &'a str,
    password_hash: &'a str,
}

#[derive(Clone)]
pub struct AdminRepository {
    table: Table<Admin>,
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Hash checked when the username is unknown, so that path costs the same
/// Argon2 work as a wrong password.
fn dummy_hash() -> Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("bedfinder-unknown-admin")?;
    Ok(DUMMY.get_or_init(|| hash))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    #[cfg(test)]
    VERIFICATIONS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored admin password hash is not a valid PHC string");
            return false;
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Admin password verification failed");
            false
        }
    }
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Backend(format!("password task failed: {e}")))
}

impl AdminRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: Table::new(store, ADMINS_TABLE),
        }
    }

    /// Create an admin account, storing only a salted hash of `password`.
    ///
    /// Usernames are unique by convention only; no check is made here.
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<i64> {
        let password = password.to_owned();
        let password_hash = blocking(move || hash_password(&password)).await??;

        let id = self
            .table
            .insert(&NewAdmin {
                username,
                password_hash: &password_hash,
            })
            .await?;
        tracing::info!(admin_id = id, username, "Admin account created");
        Ok(id)
    }

    /// Check credentials. Unknown usernames and wrong passwords both yield `None`.
    ///
    /// Both failure paths run exactly one Argon2 verification.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<Admin>> {
        let admin = self
            .table
            .all()
            .await?
            .into_iter()
            .find(|a| a.username == username);

        let password = password.to_owned();
        let stored_hash = admin.as_ref().map(|a| a.password_hash.clone());
        let verified = blocking(move || match stored_hash {
            Some(hash) => Ok(verify_password(&password, &hash)),
            None => dummy_hash().map(|dummy| {
                verify_password(&password, dummy);
                false
            }),
        })
        .await??;

        Ok(admin.filter(|_| verified))
    }

    pub async fn get_all(&self) -> Result<Vec<Admin>> {
        self.table.all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Admin>> {
        self.table.get(id).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.table.is_empty().await
    }
}
