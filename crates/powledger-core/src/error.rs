use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("difficulty {difficulty} exceeds the digest width of {max} hex characters")]
    InvalidDifficulty { difficulty: u32, max: u32 },

    #[error("no nonce met difficulty {difficulty} within {attempts} attempts")]
    AttemptsExhausted { difficulty: u32, attempts: u64 },

    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce space exhausted for block {index}")]
    NonceOverflow { index: u64 },

    #[error("genesis block must have index 0 and previous hash \"0\"")]
    GenesisMismatch,

    #[error("block at position {position} has index {found}, expected {expected}")]
    IndexMismatch {
        position: usize,
        expected: u64,
        found: u64,
    },

    #[error("block {index} does not link to its predecessor's hash")]
    BrokenLink { index: u64 },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index} does not satisfy difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: u32 },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
