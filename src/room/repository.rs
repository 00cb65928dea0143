use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

use super::models::{RoomModel, RoomSettings};
use crate::shared::AppError;

/// Result of attempting to insert a new room
#[derive(Debug, Clone)]
pub enum InsertRoomResult {
    /// Room stored under its code
    Inserted(RoomModel),
    /// Another room already uses this code
    CodeTaken,
}

/// Trait for room repository operations
#[async_trait]
pub trait RoomRepository {
    /// Inserts a room, reporting a code collision instead of overwriting
    async fn insert_room(&self, room: &RoomModel) -> Result<InsertRoomResult, AppError>;
    async fn get_room(&self, code: &str) -> Result<Option<RoomModel>, AppError>;
    async fn get_room_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError>;
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;

    /// Overwrites the policy fields of the room with `code`, returning the updated room
    async fn update_room_settings(
        &self,
        code: &str,
        settings: RoomSettings,
    ) -> Result<Option<RoomModel>, AppError>;

    /// Deletes every room owned by `host`, returning how many were removed
    async fn delete_rooms_by_host(&self, host: &str) -> Result<u64, AppError>;
}

/// In-memory implementation of RoomRepository for development and testing
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of rooms in the repository
    pub fn room_count(&self) -> usize {
        self.lock().map(|rooms| rooms.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, RoomModel>>, AppError> {
        self.rooms.lock().map_err(|_| {
            error!("Room store mutex poisoned");
            AppError::Internal
        })
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room), fields(room_code = %room.code))]
    async fn insert_room(&self, room: &RoomModel) -> Result<InsertRoomResult, AppError> {
        let mut rooms = self.lock()?;
        if rooms.contains_key(&room.code) {
            debug!("Room code already taken in memory");
            return Ok(InsertRoomResult::CodeTaken);
        }
        rooms.insert(room.code.clone(), room.clone());

        debug!(host = %room.host, "Room inserted in memory");
        Ok(InsertRoomResult::Inserted(room.clone()))
    }

    #[instrument(skip(self))]
    async fn get_room(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        let room = self.lock()?.get(code).cloned();

        match &room {
            Some(r) => debug!(room_code = %code, host = %r.host, "Room found in memory"),
            None => debug!(room_code = %code, "Room not found in memory"),
        }

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get_room_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError> {
        let rooms = self.lock()?;

        // Oldest first, so repeated lookups agree if a race produced two rooms
        let room = rooms
            .values()
            .filter(|room| room.host == host)
            .min_by_key(|room| room.created_at)
            .cloned();

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.lock()?;
        let mut room_list: Vec<RoomModel> = rooms.values().cloned().collect();
        room_list.sort_by_key(|room| room.created_at);

        debug!(room_count = room_list.len(), "Rooms listed from memory");
        Ok(room_list)
    }

    #[instrument(skip(self))]
    async fn update_room_settings(
        &self,
        code: &str,
        settings: RoomSettings,
    ) -> Result<Option<RoomModel>, AppError> {
        let mut rooms = self.lock()?;

        let Some(room) = rooms.get_mut(code) else {
            debug!(room_code = %code, "Room not found for update in memory");
            return Ok(None);
        };
        room.apply_settings(settings);

        debug!(room_code = %code, "Room settings updated in memory");
        Ok(Some(room.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_rooms_by_host(&self, host: &str) -> Result<u64, AppError> {
        let mut rooms = self.lock()?;
        let initial_count = rooms.len();

        rooms.retain(|_, room| room.host != host);

        let removed_count = (initial_count - rooms.len()) as u64;
        if removed_count > 0 {
            info!(removed_count = removed_count, "Deleted rooms for host in memory");
        }
        Ok(removed_count)
    }
}

/// PostgreSQL implementation of room repository
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error, action: &str) -> AppError {
    warn!(error = %e, action = action, "Room query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    #[instrument(skip(self, room), fields(room_code = %room.code))]
    async fn insert_room(&self, room: &RoomModel) -> Result<InsertRoomResult, AppError> {
        let result = sqlx::query(
            "INSERT INTO rooms (code, host, guest_can_pause, votes_to_skip, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&room.code)
        .bind(&room.host)
        .bind(room.guest_can_pause)
        .bind(room.votes_to_skip)
        .bind(room.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(host = %room.host, "Room inserted in database");
                Ok(InsertRoomResult::Inserted(room.clone()))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!("Room code already taken in database");
                Ok(InsertRoomResult::CodeTaken)
            }
            Err(e) => Err(database_error(e, "insert room")),
        }
    }

    #[instrument(skip(self))]
    async fn get_room(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(
            "SELECT code, host, guest_can_pause, votes_to_skip, created_at FROM rooms WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "get room"))
    }

    #[instrument(skip(self))]
    async fn get_room_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(
            "SELECT code, host, guest_can_pause, votes_to_skip, created_at FROM rooms WHERE host = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(host)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "get room by host"))
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(
            "SELECT code, host, guest_can_pause, votes_to_skip, created_at FROM rooms ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "list rooms"))
    }

    #[instrument(skip(self))]
    async fn update_room_settings(
        &self,
        code: &str,
        settings: RoomSettings,
    ) -> Result<Option<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(
            "UPDATE rooms SET guest_can_pause = $2, votes_to_skip = $3 WHERE code = $1 \
             RETURNING code, host, guest_can_pause, votes_to_skip, created_at",
        )
        .bind(code)
        .bind(settings.guest_can_pause)
        .bind(settings.votes_to_skip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "update room settings"))
    }

    #[instrument(skip(self))]
    async fn delete_rooms_by_host(&self, host: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE host = $1")
            .bind(host)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "delete rooms by host"))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_room(code: &str, host: &str) -> RoomModel {
        RoomModel::new(code.to_string(), host.to_string(), RoomSettings::default())
    }

    #[tokio::test]
    async fn test_insert_and_get_room() {
        let repo = InMemoryRoomRepository::new();
        let room = create_test_room("ABC123", "host-1");

        let result = repo.insert_room(&room).await.unwrap();
        assert!(matches!(result, InsertRoomResult::Inserted(_)));

        let retrieved = repo.get_room("ABC123").await.unwrap().unwrap();
        assert_eq!(retrieved, room);
    }

    #[tokio::test]
    async fn test_get_nonexistent_room() {
        let repo = InMemoryRoomRepository::new();

        assert!(repo.get_room("NOPE00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_reported_not_overwritten() {
        let repo = InMemoryRoomRepository::new();
        repo.insert_room(&create_test_room("ABC123", "host-1"))
            .await
            .unwrap();

        let result = repo
            .insert_room(&create_test_room("ABC123", "host-2"))
            .await
            .unwrap();

        assert!(matches!(result, InsertRoomResult::CodeTaken));
        let stored = repo.get_room("ABC123").await.unwrap().unwrap();
        assert_eq!(stored.host, "host-1");
    }

    #[tokio::test]
    async fn test_get_room_by_host() {
        let repo = InMemoryRoomRepository::new();
        repo.insert_room(&create_test_room("AAAAAA", "host-1"))
            .await
            .unwrap();
        repo.insert_room(&create_test_room("BBBBBB", "host-2"))
            .await
            .unwrap();

        let room = repo.get_room_by_host("host-2").await.unwrap().unwrap();
        assert_eq!(room.code, "BBBBBB");
        assert!(repo.get_room_by_host("host-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_rooms() {
        let repo = InMemoryRoomRepository::new();
        assert!(repo.list_rooms().await.unwrap().is_empty());

        for (code, host) in [("AAAAAA", "h1"), ("BBBBBB", "h2"), ("CCCCCC", "h3")] {
            repo.insert_room(&create_test_room(code, host)).await.unwrap();
        }

        let codes: std::collections::HashSet<String> = repo
            .list_rooms()
            .await
            .unwrap()
            .into_iter()
            .map(|room| room.code)
            .collect();
        assert_eq!(codes.len(), 3);
        assert!(codes.contains("AAAAAA"));
        assert!(codes.contains("CCCCCC"));
    }

    #[tokio::test]
    async fn test_update_room_settings() {
        let repo = InMemoryRoomRepository::new();
        repo.insert_room(&create_test_room("ABC123", "host-1"))
            .await
            .unwrap();

        let settings = RoomSettings {
            guest_can_pause: false,
            votes_to_skip: 4,
        };
        let updated = repo
            .update_room_settings("ABC123", settings)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.settings(), settings);
        assert_eq!(
            repo.get_room("ABC123").await.unwrap().unwrap().settings(),
            settings
        );
        assert!(repo
            .update_room_settings("NOPE00", settings)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_rooms_by_host() {
        let repo = InMemoryRoomRepository::new();
        repo.insert_room(&create_test_room("AAAAAA", "host-1"))
            .await
            .unwrap();
        repo.insert_room(&create_test_room("BBBBBB", "host-2"))
            .await
            .unwrap();

        assert_eq!(repo.delete_rooms_by_host("host-1").await.unwrap(), 1);
        assert_eq!(repo.delete_rooms_by_host("host-1").await.unwrap(), 0);
        assert_eq!(repo.room_count(), 1);
        assert!(repo.get_room("BBBBBB").await.unwrap().is_some());
    }
}
