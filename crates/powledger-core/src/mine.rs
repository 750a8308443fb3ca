use crate::{
    error::{LedgerError, Result},
    pow::{meets_difficulty, Miner, MiningReport},
    Block,
};
use rayon::prelude::*;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use tracing::{debug, info, warn};

/// Searches nonces in parallel until the block digest meets the miner's difficulty.
///
/// Nonces after `block.nonce` are split across the rayon pool and the first
/// worker to find one wins, so which accepted nonce is kept is not
/// deterministic. An attempt cap bounds the range searched.
pub fn mine_block_parallel(block: &mut Block, miner: &Miner) -> Result<MiningReport> {
    miner.validate()?;
    let difficulty = miner.difficulty();
    let started = Instant::now();

    let start = block
        .nonce
        .checked_add(1)
        .ok_or(LedgerError::NonceOverflow { index: block.index })?;
    let end = match miner.max_attempts() {
        Some(max) => start.saturating_add(max),
        None => u64::MAX,
    };
    debug!(
        index = block.index,
        difficulty, start, end, "mining block in parallel"
    );

    // Workers only read the template; the nonce varies per attempt.
    let template = &*block;
    let attempts = AtomicU64::new(0);
    let found = (start..end).into_par_iter().find_any(|nonce| {
        if miner.is_cancelled() {
            return true;
        }
        attempts.fetch_add(1, Ordering::Relaxed);
        meets_difficulty(&template.hash_with_nonce(*nonce), difficulty)
    });
    let attempts = attempts.into_inner();

    let nonce = match found {
        Some(nonce) if !miner.is_cancelled() => nonce,
        Some(nonce) if meets_difficulty(&template.hash_with_nonce(nonce), difficulty) => nonce,
        Some(_) => {
            warn!(index = block.index, attempts, "mining cancelled");
            return Err(LedgerError::Cancelled { attempts });
        }
        None if miner.max_attempts().is_some() => {
            warn!(index = block.index, attempts, "attempt cap reached");
            return Err(LedgerError::AttemptsExhausted {
                difficulty,
                attempts,
            });
        }
        None => return Err(LedgerError::NonceOverflow { index: block.index }),
    };

    block.nonce = nonce;
    block.hash = block.calculate_hash();
    let report = MiningReport {
        index: block.index,
        difficulty,
        nonce,
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
    Ok(report)
}
