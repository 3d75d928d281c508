use crate::{
    error::{InvalidDateTimeSnafu, RmpSerdeEncodeSnafu, VirtueError},
    state::VirtueState,
    store::StoredSession,
};
use async_trait::async_trait;
use axum_login::tower_sessions::{
    ExpiredDeletion, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store::Error as SSError,
};
use chrono::{DateTime, Utc};
use snafu::{OptionExt, ResultExt};

///persists sessions through whichever [`crate::store::Store`] the site is running on
#[derive(Debug, Clone)]
pub struct VirtueSessionStore {
    state: VirtueState,
}

impl VirtueSessionStore {
    pub const fn new(state: VirtueState) -> Self {
        Self { state }
    }

    fn to_stored(record: &Record) -> Result<StoredSession, VirtueError> {
        let timestamp = record.expiry_date.unix_timestamp();
        let expiry_date = DateTime::<Utc>::from_timestamp(timestamp, record.expiry_date.nanosecond())
            .context(InvalidDateTimeSnafu { timestamp })?;
        let data = rmp_serde::to_vec(&record.data).context(RmpSerdeEncodeSnafu)?;

        Ok(StoredSession { data, expiry_date })
    }

    fn from_stored(id: Id, stored: &StoredSession) -> Result<Record, SSError> {
        let data = rmp_serde::from_slice(&stored.data).map_err(|e| SSError::Decode(e.to_string()))?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(stored.expiry_date.timestamp())
            .map_err(|e| SSError::Decode(e.to_string()))?;

        Ok(Record {
            id,
            data,
            expiry_date,
        })
    }
}

#[async_trait]
impl SessionStore for VirtueSessionStore {
    async fn create(&self, session_record: &mut Record) -> Result<(), SSError> {
        let store = self.state.store();

        while store
            .session_exists(&session_record.id.to_string())
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?
        {
            session_record.id = Id::default();
        }

        let stored = Self::to_stored(session_record).map_err(|e| SSError::Encode(e.to_string()))?;
        store
            .save_session(&session_record.id.to_string(), stored)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))
    }

    async fn save(&self, session_record: &Record) -> Result<(), SSError> {
        let stored = Self::to_stored(session_record).map_err(|e| SSError::Encode(e.to_string()))?;
        self.state
            .store()
            .save_session(&session_record.id.to_string(), stored)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))
    }

    async fn load(&self, session_id: &Id) -> Result<Option<Record>, SSError> {
        let Some(stored) = self
            .state
            .store()
            .load_session(&session_id.to_string())
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?
        else {
            return Ok(None);
        };

        Self::from_stored(*session_id, &stored).map(Some)
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        self.state
            .store()
            .delete_session(&session_id.to_string())
            .await
            .map_err(|e| SSError::Backend(e.to_string()))
    }
}

#[async_trait]
impl ExpiredDeletion for VirtueSessionStore {
    async fn delete_expired(&self) -> Result<(), SSError> {
        self.state
            .store()
            .delete_expired_sessions()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{RuntimeConfiguration, timetable::TimetableSource},
        store::memory::MemoryStore,
    };
    use axum_login::tower_sessions::cookie::time::Duration;
    use std::{collections::HashMap, sync::Arc};

    fn session_store() -> VirtueSessionStore {
        VirtueSessionStore::new(VirtueState::with_store(
            Arc::new(MemoryStore::default()),
            RuntimeConfiguration::in_memory(TimetableSource::File("timetable.json".into())),
        ))
    }

    #[tokio::test]
    async fn sessions_survive_a_save_and_load() {
        let store = session_store();
        let mut data = HashMap::new();
        data.insert("axum-login.data".to_string(), serde_json::json!({"user_id": 7}));
        let mut record = Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + Duration::days(5),
        };

        store.create(&mut record).await.unwrap();
        let loaded = store.load(&record.id).await.unwrap().unwrap();

        assert_eq!(loaded.data, record.data);
        assert_eq!(
            loaded.expiry_date.unix_timestamp(),
            record.expiry_date.unix_timestamp()
        );

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }
}
