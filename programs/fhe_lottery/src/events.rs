use anchor_lang::prelude::*;

#[event]
pub struct RoundCreated {
    pub round_id: u64,
    pub round: Pubkey,
    pub vault: Pubkey,
    pub ticket_price: u64,
    pub start_time: i64,
    pub end_time: i64,
}

#[event]
pub struct TicketPurchased {
    pub round_id: u64,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub ticket_count_after: u64,
    pub prize_pool_after: u64,
}

#[event]
pub struct RoundDrawn {
    pub round_id: u64,
    pub winning_numbers: [u8; 6],
    pub ticket_count: u64,
    pub winner_count: u64,
}

#[event]
pub struct PrizeClaimed {
    pub round_id: u64,
    pub ticket_id: u64,
    pub winner: Pubkey,
    pub payout: u64,
    pub claimed_amount_after: u64,
}

#[event]
pub struct UnclaimedSwept {
    pub round_id: u64,
    pub amount: u64,
    pub treasury: Pubkey,
}
