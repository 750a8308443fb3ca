pub const BYTE: usize = 8;
pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const CHUNK_SIZE: usize = 64;
/// Offset of the 64-bit length field inside the final padded chunk.
pub const LENGTH_OFFSET: usize = CHUNK_SIZE - 8;

pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const PROGRESS_INTERVAL: u64 = 1 << 16;

pub const DEMO_TRANSACTIONS: [&str; 2] = ["Alice pays Bob 5 BTC", "Bob pays Charlie 2 BTC"];
pub const DEMO_DIFFICULTIES: [u32; 2] = [3, 4];
