//! Proof of work over hex-prefix difficulty.
//!
//! A block is accepted once the first `difficulty` hex characters of its
//! digest are all `'0'`. This is a prefix test on the hex string, not a
//! numeric comparison against a target.

use crate::{
    constants::{MAX_DIFFICULTY, PROGRESS_INTERVAL},
    error::{LedgerError, Result},
    Block,
};
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{debug, info, trace, warn};

/// Count the leading `'0'` characters of a hex digest.
pub fn count_leading_zero_hex(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// True when the first `difficulty` characters of `hash` are `'0'`.
/// A difficulty longer than the digest can never be met.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// Cooperative stop signal shared between a miner and whoever may abort it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningState {
    Searching,
    Accepted,
}

/// Outcome of a successful search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningReport {
    pub index: u64,
    pub difficulty: u32,
    pub nonce: u64,
    pub hash: String,
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Nonce search configuration.
///
/// Without an attempt cap or a cancel token the search only ends when a
/// digest meets the difficulty; expect around `16^difficulty` attempts.
#[derive(Clone, Debug, Default)]
pub struct Miner {
    difficulty: u32,
    max_attempts: Option<u64>,
    cancel: Option<CancelToken>,
    parallel: bool,
}

impl Miner {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Spread the nonce search over the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn max_attempts(&self) -> Option<u64> {
        self.max_attempts
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidDifficulty {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(())
    }

    /// One state transition: bump the nonce, rehash, and accept if the
    /// digest meets the difficulty. `block.hash` is only written on acceptance.
    pub fn step(&self, block: &mut Block) -> Result<MiningState> {
        block.nonce = block
            .nonce
            .checked_add(1)
            .ok_or(LedgerError::NonceOverflow { index: block.index })?;
        let hash = block.calculate_hash();
        if meets_difficulty(&hash, self.difficulty) {
            block.hash = hash;
            Ok(MiningState::Accepted)
        } else {
            Ok(MiningState::Searching)
        }
    }

    /// Search nonces until `block` is accepted, the attempt cap is reached,
    /// or the cancel token fires.
    pub fn mine(&self, block: &mut Block) -> Result<MiningReport> {
        self.validate()?;
        if self.parallel {
            return crate::mine::mine_block_parallel(block, self);
        }

        debug!(index = block.index, difficulty = self.difficulty, "mining block");
        let started = Instant::now();
        let mut attempts = 0u64;
        loop {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                warn!(index = block.index, attempts, "attempt cap reached");
                return Err(LedgerError::AttemptsExhausted {
                    difficulty: self.difficulty,
                    attempts,
                });
            }
            if self.is_cancelled() {
                warn!(index = block.index, attempts, "mining cancelled");
                return Err(LedgerError::Cancelled { attempts });
            }

            attempts += 1;
            if self.step(block)? == MiningState::Accepted {
                let report = MiningReport {
                    index: block.index,
                    difficulty: self.difficulty,
                    nonce: block.nonce,
                    hash: block.hash.clone(),
                    attempts,
                    elapsed: started.elapsed(),
                };
                info!(
                    index = report.index,
                    nonce = report.nonce,
                    attempts = report.attempts,
                    "mined block with hash {}",
                    report.hash
                );
                return Ok(report);
            }
            if attempts % PROGRESS_INTERVAL == 0 {
                trace!(index = block.index, attempts, "still searching");
            }
        }
    }
}
