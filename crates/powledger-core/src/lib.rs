pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;
pub mod sha256;

use constants::GENESIS_PREVIOUS_HASH;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub use error::{LedgerError, Result};
pub use pow::{CancelToken, Miner, MiningReport, MiningState};
pub use sha256::{digest, digest_hex, Hash, Sha256};

/// Seconds since the UNIX epoch; a clock set before 1970 reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub transactions: String,
    /// Hex digest of the previous block, or `"0"` for genesis.
    pub previous_hash: String,
    /// Empty until a proof-of-work search accepts the block.
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// An unmined block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(index, unix_now(), transactions, previous_hash)
    }

    pub fn with_timestamp(
        index: u64,
        timestamp: u64,
        transactions: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index,
            timestamp,
            transactions: transactions.into(),
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
        }
    }

    /// Build a block and run proof of work on it before handing it back.
    pub fn create(
        index: u64,
        transactions: impl Into<String>,
        previous_hash: impl Into<String>,
        miner: &Miner,
    ) -> Result<(Self, MiningReport)> {
        let mut block = Self::new(index, transactions, previous_hash);
        let report = miner.mine(&mut block)?;
        Ok((block, report))
    }

    /// The exact text fed to the hash: index, timestamp, transactions,
    /// previous hash and nonce concatenated with no delimiters.
    pub fn canonical_repr(&self) -> String {
        self.canonical_repr_with_nonce(self.nonce)
    }

    pub fn canonical_repr_with_nonce(&self, nonce: u64) -> String {
        format!(
            "{}{}{}{}{}",
            self.index, self.timestamp, self.transactions, self.previous_hash, nonce
        )
    }

    pub fn calculate_hash(&self) -> String {
        self.hash_with_nonce(self.nonce)
    }

    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        digest_hex(self.canonical_repr_with_nonce(nonce).as_bytes())
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// The stored hash matches the block contents and meets `difficulty`.
    pub fn has_valid_hash(&self, difficulty: u32) -> bool {
        self.hash == self.calculate_hash() && pow::meets_difficulty(&self.hash, difficulty)
    }
}

pub mod chain {
    use super::*;
    use crate::pow::meets_difficulty;
    use tracing::debug;

    /// Append-only, in-memory chain. Blocks are owned by the chain and linked
    /// by position; nothing hands out mutable access to an appended block.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
    #[serde(transparent)]
    pub struct Chain {
        blocks: Vec<Block>,
    }

    impl Chain {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mine the next block at `difficulty` and link it as the new tail.
        pub fn append_block(
            &mut self,
            transactions: impl Into<String>,
            difficulty: u32,
        ) -> Result<MiningReport> {
            self.append_block_with(transactions, &Miner::new(difficulty))
        }

        /// Like [`Chain::append_block`] with a configured miner. The chain is
        /// left untouched when the search fails.
        pub fn append_block_with(
            &mut self,
            transactions: impl Into<String>,
            miner: &Miner,
        ) -> Result<MiningReport> {
            let (index, previous_hash) = match self.tip() {
                None => (0, GENESIS_PREVIOUS_HASH.to_string()),
                Some(tip) => (tip.index + 1, tip.hash.clone()),
            };
            let (block, report) = Block::create(index, transactions, previous_hash, miner)?;
            debug!(index, "appended block");
            self.blocks.push(block);
            Ok(report)
        }

        pub fn len(&self) -> usize {
            self.blocks.len()
        }

        pub fn is_empty(&self) -> bool {
            self.blocks.is_empty()
        }

        pub fn blocks(&self) -> &[Block] {
            &self.blocks
        }

        pub fn get(&self, position: usize) -> Option<&Block> {
            self.blocks.get(position)
        }

        pub fn tip(&self) -> Option<&Block> {
            self.blocks.last()
        }

        pub fn iter(&self) -> std::slice::Iter<'_, Block> {
            self.blocks.iter()
        }

        /// Index the next appended block will get.
        pub fn next_index(&self) -> u64 {
            self.tip().map_or(0, |tip| tip.index + 1)
        }

        /// Check genesis shape, index sequence, hash links, recomputed
        /// hashes and the difficulty prefix. Stops at the first violation.
        pub fn verify(&self, difficulty: u32) -> Result<()> {
            for (position, block) in self.blocks.iter().enumerate() {
                match position.checked_sub(1).map(|p| &self.blocks[p]) {
                    None if !block.is_genesis() => return Err(LedgerError::GenesisMismatch),
                    None => {}
                    Some(prev) => {
                        let expected = prev.index + 1;
                        if block.index != expected {
                            return Err(LedgerError::IndexMismatch {
                                position,
                                expected,
                                found: block.index,
                            });
                        }
                        if block.previous_hash != prev.hash {
                            return Err(LedgerError::BrokenLink { index: block.index });
                        }
                    }
                }
                if block.hash != block.calculate_hash() {
                    return Err(LedgerError::HashMismatch { index: block.index });
                }
                if !meets_difficulty(&block.hash, difficulty) {
                    return Err(LedgerError::InsufficientWork {
                        index: block.index,
                        difficulty,
                    });
                }
            }
            Ok(())
        }

        pub fn to_json_pretty(&self) -> Result<String> {
            Ok(serde_json::to_string_pretty(self)?)
        }
    }

    impl<'a> IntoIterator for &'a Chain {
        type Item = &'a Block;
        type IntoIter = std::slice::Iter<'a, Block>;

        fn into_iter(self) -> Self::IntoIter {
            self.blocks.iter()
        }
    }

    #[cfg(test)]
    pub(crate) fn from_blocks(blocks: Vec<Block>) -> Chain {
        Chain { blocks }
    }
}
