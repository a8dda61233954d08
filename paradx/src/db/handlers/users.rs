//! In-memory repository for users.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::UserDBRecord,
};
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::instrument;

/// Process-local user store keyed by username.
#[derive(Debug, Default)]
pub struct Users {
    records: DashMap<String, UserDBRecord>,
}

impl Users {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl Repository for Users {
    type Id = String;
    type Record = UserDBRecord;

    #[instrument(skip(self))]
    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn put(&self, record: Self::Record) -> Result<()> {
        self.records.insert(record.username.clone(), record);
        Ok(())
    }

    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn create(&self, record: Self::Record) -> Result<Self::Record> {
        // entry() holds the shard lock, so check-and-insert is atomic
        match self.records.entry(record.username.clone()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation { key: record.username }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }
}
