//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{ResortRecord, SkiDayRecord};
use ring::rand::{SecureRandom, SystemRandom};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const RESORTS: &str = "resorts";
    pub const SKI_DAYS: &str = "ski_days";
    pub const NOTIFICATIONS: &str = "notifications";
    /// User profiles (keyed by user ID)
    pub const PROFILES: &str = "profiles";
}

/// Which ski days a statistics query reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkiDayFilter {
    /// Every user's days (global counters)
    All,
    /// Days owned by one user
    User(String),
}

/// Read-only queries the statistics reducers need.
///
/// Implemented by `FirestoreDb`; tests substitute in-memory sources.
pub trait StatsSource: Sync {
    /// Every resort, regardless of approval state.
    fn list_resorts(&self) -> impl Future<Output = Result<Vec<ResortRecord>, AppError>> + Send;

    fn list_ski_days(
        &self,
        filter: SkiDayFilter,
    ) -> impl Future<Output = Result<Vec<SkiDayRecord>, AppError>> + Send;
}

/// Random 128-bit document ID, hex encoded.
pub fn new_document_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ids_are_unique_hex() {
        let a = new_document_id().unwrap();
        let b = new_document_id().unwrap();

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
