use anchor_lang::prelude::*;

use crate::constants::NUMBERS_PER_TICKET;

/// Opaque reference to a value held by the FHE coprocessor.
pub type CipherHandle = [u8; 32];

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    pub bump: u8,

    /// ed25519 key whose attestations the program accepts for proof checks,
    /// draw randomness and encrypted comparisons. Default = unset.
    pub coprocessor: Pubkey,

    pub paused: bool,
    pub claim_grace_secs: i64,

    // System-owned PDA receiving swept prize balances
    pub treasury: Pubkey,
    pub treasury_bump: u8,

    pub version: u16,
}

#[account]
#[derive(InitSpace)]
pub struct RoundRegistry {
    pub admin: Pubkey,
    pub bump: u8,
    pub next_round_id: u64,
    pub version: u16,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum RoundPhase {
    #[default]
    Created,
    Open,
    Closed,
    Drawn,
}

#[account]
#[derive(InitSpace)]
pub struct Round {
    pub round_id: u64,
    pub bump: u8,
    pub phase: RoundPhase,

    /// NOTE: max_len mirrors MAX_ROUND_NAME_LEN.
    #[max_len(64)]
    pub name: String,
    pub creator: Pubkey,

    pub start_time: i64,
    pub end_time: i64,

    pub ticket_price: u64,
    pub prize_pool: u64,
    pub ticket_count: u64,

    // System-owned PDA vault (holds lamports, no data)
    pub vault: Pubkey,
    pub vault_bump: u8,

    pub drawn: bool,
    pub drawn_at: i64,
    pub winning_numbers: [u8; NUMBERS_PER_TICKET],
    pub winner_count: u64,

    // settlement
    pub claimed_amount: u64,
    pub swept: bool,
    pub swept_at: i64,
}

impl Round {
    /// Phase as seen by callers at `now`. The stored phase only moves on
    /// create and draw; the sale window closes by time alone.
    pub fn phase_at(&self, now: i64) -> RoundPhase {
        if self.drawn {
            RoundPhase::Drawn
        } else if now < self.start_time {
            RoundPhase::Created
        } else if now >= self.end_time {
            RoundPhase::Closed
        } else {
            self.phase
        }
    }

    pub fn is_open(&self, now: i64) -> bool {
        self.phase_at(now) == RoundPhase::Open
    }

    /// Balance still owed to winners or to the treasury.
    pub fn outstanding(&self) -> u64 {
        self.prize_pool.saturating_sub(self.claimed_amount)
    }
}

#[account]
#[derive(InitSpace)]
pub struct Ticket {
    pub round_id: u64,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub bump: u8,

    pub handles: [[u8; 32]; NUMBERS_PER_TICKET],
    // sha256 of each validity proof, same order as `handles`
    pub proof_digests: [[u8; 32]; NUMBERS_PER_TICKET],

    pub purchased_at: i64,
}

/// The part of a [`Ticket`] a draw reads. Proof digests stay behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawEntry {
    pub round_id: u64,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub handles: [CipherHandle; NUMBERS_PER_TICKET],
}

impl From<&Ticket> for DrawEntry {
    fn from(t: &Ticket) -> Self {
        Self {
            round_id: t.round_id,
            ticket_id: t.ticket_id,
            owner: t.owner,
            handles: t.handles,
        }
    }
}

/// Ticket ids one owner bought in one round, in purchase order.
#[account]
#[derive(InitSpace)]
pub struct UserTickets {
    pub round_id: u64,
    pub owner: Pubkey,
    pub bump: u8,

    #[max_len(48)]
    pub ticket_ids: Vec<u64>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct WinnerRecord {
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub matched: u8,

    pub claimed: bool,
    pub payout: u64,
    pub claimed_at: i64,
}

/// NOTE: `winners` uses max_len = MAX_TICKETS_PER_ROUND.
#[account]
#[derive(Debug, InitSpace)]
pub struct WinnerBoard {
    pub round_id: u64,
    pub bump: u8,
    pub recorded: bool,

    #[max_len(48)]
    pub winners: Vec<WinnerRecord>,
}

impl WinnerBoard {
    pub fn find_mut(&mut self, ticket_id: u64) -> Option<&mut WinnerRecord> {
        self.winners.iter_mut().find(|w| w.ticket_id == ticket_id)
    }
}
