use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    generators::{RandomRoomCodeGenerator, RoomCodeGenerator},
    models::{RoomModel, RoomSettings},
    repository::{InsertRoomResult, RoomRepository},
};
use crate::config::RoomConfig;
use crate::shared::AppError;

pub const ROOM_NOT_FOUND_MESSAGE: &str = "Room does not exist";
pub const NOT_HOST_MESSAGE: &str = "You are not the host of this room";

/// Service for handling room business logic
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    code_generator: Arc<dyn RoomCodeGenerator>,
    max_code_attempts: u32,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>, config: &RoomConfig) -> Self {
        Self::with_generator(
            repository,
            Arc::new(RandomRoomCodeGenerator::new(config.code_length)),
            config,
        )
    }

    pub fn with_generator(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        code_generator: Arc<dyn RoomCodeGenerator>,
        config: &RoomConfig,
    ) -> Self {
        Self {
            repository,
            code_generator,
            max_code_attempts: config.max_code_attempts.max(1),
        }
    }

    /// Creates a room for `host`, or updates the policy of the one it already hosts.
    ///
    /// Returns the room and whether it was newly created. An existing room keeps its code.
    #[instrument(skip(self))]
    pub async fn create_or_update(
        &self,
        host: &str,
        settings: RoomSettings,
    ) -> Result<(RoomModel, bool), AppError> {
        if let Some(existing) = self.find_by_host(host).await? {
            debug!(room_code = %existing.code, "Host already has a room, updating it");

            let room = self
                .repository
                .update_room_settings(&existing.code, settings)
                .await?
                .ok_or_else(|| {
                    // Deleted between the lookup and the update
                    warn!(room_code = %existing.code, "Room vanished during update");
                    AppError::NotFound(ROOM_NOT_FOUND_MESSAGE.to_string())
                })?;

            info!(room_code = %room.code, "Room settings replaced by create");
            return Ok((room, false));
        }

        let room = self.insert_with_unique_code(host, settings).await?;
        info!(room_code = %room.code, "Room created successfully");
        Ok((room, true))
    }

    /// Generates codes until one inserts cleanly, up to the configured attempt limit
    async fn insert_with_unique_code(
        &self,
        host: &str,
        settings: RoomSettings,
    ) -> Result<RoomModel, AppError> {
        for attempt in 1..=self.max_code_attempts {
            let code = self.code_generator.generate().await;
            let candidate = RoomModel::new(code, host.to_string(), settings);

            match self.repository.insert_room(&candidate).await? {
                InsertRoomResult::Inserted(room) => return Ok(room),
                InsertRoomResult::CodeTaken => {
                    debug!(attempt, room_code = %candidate.code, "Room code collision, retrying");
                }
            }
        }

        warn!(
            attempts = self.max_code_attempts,
            "Giving up on room code generation"
        );
        Err(AppError::RoomCodeExhausted(self.max_code_attempts))
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        self.repository.get_room(code).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError> {
        self.repository.get_room_by_host(host).await
    }

    /// Deletes any room hosted by `host`
    #[instrument(skip(self))]
    pub async fn delete_by_host(&self, host: &str) -> Result<u64, AppError> {
        let removed = self.repository.delete_rooms_by_host(host).await?;
        if removed > 0 {
            info!(removed_rooms = removed, "Host left, room closed");
        }
        Ok(removed)
    }

    /// Lists all rooms
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.repository.list_rooms().await?;
        debug!(room_count = rooms.len(), "Rooms retrieved");
        Ok(rooms)
    }

    /// Applies new settings to the room with `code` on behalf of `caller`.
    ///
    /// Fields left as `None` keep their current value. Only the host may update.
    #[instrument(skip(self))]
    pub async fn update_settings(
        &self,
        code: &str,
        caller: &str,
        guest_can_pause: Option<bool>,
        votes_to_skip: Option<i32>,
    ) -> Result<RoomModel, AppError> {
        let room = self
            .repository
            .get_room(code)
            .await?
            .ok_or_else(|| AppError::NotFound(ROOM_NOT_FOUND_MESSAGE.to_string()))?;

        if room.host != caller {
            info!(room_code = %code, "Rejected settings update from non-host");
            return Err(AppError::Forbidden(NOT_HOST_MESSAGE.to_string()));
        }

        let current = room.settings();
        let settings = RoomSettings {
            guest_can_pause: guest_can_pause.unwrap_or(current.guest_can_pause),
            votes_to_skip: votes_to_skip.unwrap_or(current.votes_to_skip),
        };

        let updated = self
            .repository
            .update_room_settings(code, settings)
            .await?
            .ok_or_else(|| AppError::NotFound(ROOM_NOT_FOUND_MESSAGE.to_string()))?;

        info!(
            room_code = %code,
            guest_can_pause = updated.guest_can_pause,
            votes_to_skip = updated.votes_to_skip,
            "Room settings updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::generators::test_support::ScriptedCodeGenerator;
    use crate::room::repository::InMemoryRoomRepository;
    use std::collections::HashSet;

    fn service() -> (RoomService, Arc<InMemoryRoomRepository>) {
        let repo = Arc::new(InMemoryRoomRepository::new());
        (
            RoomService::new(repo.clone(), &RoomConfig::default()),
            repo,
        )
    }

    fn settings(guest_can_pause: bool, votes_to_skip: i32) -> RoomSettings {
        RoomSettings {
            guest_can_pause,
            votes_to_skip,
        }
    }

    #[tokio::test]
    async fn test_create_new_room() {
        let (service, repo) = service();

        let (room, created) = service
            .create_or_update("host-1", settings(false, 3))
            .await
            .unwrap();

        assert!(created);
        assert_eq!(room.host, "host-1");
        assert_eq!(room.code.len(), 6);
        assert_eq!(room.settings(), settings(false, 3));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_second_create_updates_in_place() {
        let (service, repo) = service();

        let (first, _) = service
            .create_or_update("host-1", settings(true, 1))
            .await
            .unwrap();
        let (second, created) = service
            .create_or_update("host-1", settings(false, 5))
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(second.code, first.code);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.settings(), settings(false, 5));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_code_collision_is_retried() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let generator = Arc::new(ScriptedCodeGenerator::new(&["AAAAAA", "AAAAAA", "BBBBBB"]));
        let service = RoomService::with_generator(repo, generator, &RoomConfig::default());

        let (first, _) = service
            .create_or_update("host-1", RoomSettings::default())
            .await
            .unwrap();
        let (second, _) = service
            .create_or_update("host-2", RoomSettings::default())
            .await
            .unwrap();

        assert_eq!(first.code, "AAAAAA");
        assert_eq!(second.code, "BBBBBB");
    }

    #[tokio::test]
    async fn test_code_generation_gives_up_after_limit() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let generator = Arc::new(ScriptedCodeGenerator::new(&["AAAAAA"]));
        let config = RoomConfig {
            code_length: 6,
            max_code_attempts: 3,
        };
        let service = RoomService::with_generator(repo.clone(), generator, &config);

        service
            .create_or_update("host-1", RoomSettings::default())
            .await
            .unwrap();
        let result = service
            .create_or_update("host-2", RoomSettings::default())
            .await;

        assert!(matches!(result, Err(AppError::RoomCodeExhausted(3))));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_codes() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        // Short codes make collisions likely, exercising the retry path
        let config = RoomConfig {
            code_length: 2,
            max_code_attempts: 10_000,
        };
        let service = Arc::new(RoomService::new(repo.clone(), &config));

        let tasks = (0..50).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create_or_update(&format!("host-{i}"), RoomSettings::default())
                    .await
                    .unwrap()
                    .0
                    .code
            })
        });
        let codes: Vec<String> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|result| result.unwrap())
            .collect();

        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), 50);
        assert_eq!(repo.room_count(), 50);
    }

    #[tokio::test]
    async fn test_update_settings_by_host() {
        let (service, _) = service();
        let (room, _) = service
            .create_or_update("host-1", settings(true, 1))
            .await
            .unwrap();

        let updated = service
            .update_settings(&room.code, "host-1", Some(false), Some(9))
            .await
            .unwrap();

        assert_eq!(updated.settings(), settings(false, 9));
    }

    #[tokio::test]
    async fn test_update_settings_keeps_omitted_fields() {
        let (service, _) = service();
        let (room, _) = service
            .create_or_update("host-1", settings(false, 4))
            .await
            .unwrap();

        let updated = service
            .update_settings(&room.code, "host-1", None, Some(2))
            .await
            .unwrap();

        assert_eq!(updated.settings(), settings(false, 2));
    }

    #[tokio::test]
    async fn test_update_settings_by_guest_is_forbidden() {
        let (service, _) = service();
        let (room, _) = service
            .create_or_update("host-1", settings(true, 1))
            .await
            .unwrap();

        let result = service
            .update_settings(&room.code, "guest", Some(false), Some(9))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        let stored = service.find_by_code(&room.code).await.unwrap().unwrap();
        assert_eq!(stored.settings(), settings(true, 1));
    }

    #[tokio::test]
    async fn test_update_settings_unknown_room() {
        let (service, _) = service();

        let result = service
            .update_settings("NOPE00", "host-1", Some(false), Some(2))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_host() {
        let (service, _) = service();
        let (room, _) = service
            .create_or_update("host-1", RoomSettings::default())
            .await
            .unwrap();

        assert_eq!(service.delete_by_host("someone-else").await.unwrap(), 0);
        assert_eq!(service.delete_by_host("host-1").await.unwrap(), 1);
        assert!(service.find_by_code(&room.code).await.unwrap().is_none());
        assert!(service.find_by_host("host-1").await.unwrap().is_none());
    }
}
