use async_trait::async_trait;
use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Trait for generating candidate room codes
#[async_trait]
pub trait RoomCodeGenerator: Send + Sync {
    async fn generate(&self) -> String;
}

/// Uniform random codes over `A-Z0-9`
pub struct RandomRoomCodeGenerator {
    length: usize,
}

impl RandomRoomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomRoomCodeGenerator {
    fn default() -> Self {
        Self::new(6)
    }
}

#[async_trait]
impl RoomCodeGenerator for RandomRoomCodeGenerator {
    async fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}
