use anchor_lang::prelude::*;

use crate::errors::LotteryError;

/// Decides how a drawn round's prize pool is shared among its winners.
pub trait PrizePolicy {
    fn payout(&self, prize_pool: u64, winner_count: u64) -> Result<u64>;
}

/// Every winner receives `prize_pool / winner_count`. The remainder stays in
/// the vault and leaves with the unclaimed sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct EvenSplit;

impl PrizePolicy for EvenSplit {
    fn payout(&self, prize_pool: u64, winner_count: u64) -> Result<u64> {
        require!(winner_count > 0, LotteryError::NotWinner);
        prize_pool
            .checked_div(winner_count)
            .ok_or_else(|| error!(LotteryError::MathOverflow))
    }
}
