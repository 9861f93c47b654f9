use anchor_lang::prelude::*;

pub mod capability;
pub mod constants;
pub mod contexts;
pub mod coprocessor;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod policy;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use capability::*;
pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use events::*;
pub use instructions::*;
pub use state::*;
pub use utils::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    // Required fields
    name: "FHE Lottery",
    project_url: "https://github.com/fhe-lottery/fhe-lottery",
    contacts: "link:https://github.com/fhe-lottery/fhe-lottery/issues",
    policy: "https://github.com/fhe-lottery/fhe-lottery/blob/main/SECURITY.md",

    // Optional fields
    preferred_languages: "en",
    source_code: "https://github.com/fhe-lottery/fhe-lottery"
}

declare_id!("35XiysSg7ehgveij6xodtmRQyhzhAUCNsJvZ4k6tgwdc");

#[program]
pub mod fhe_lottery {
    use super::*;
    use crate::instructions::{admin, draw, prize, ticket, views};

    // ----------------------------
    // Admin / config
    // ----------------------------
    pub fn initialize_config(ctx: Context<InitializeConfig>, claim_grace_secs: Option<u64>) -> Result<()> {
        admin::initialize_config(ctx, claim_grace_secs)
    }

    pub fn set_coprocessor(ctx: Context<UpdateConfig>, coprocessor: Pubkey) -> Result<()> {
        admin::set_coprocessor(ctx, coprocessor)
    }

    pub fn set_pause(ctx: Context<UpdateConfig>, paused: bool) -> Result<()> {
        admin::set_pause(ctx, paused)
    }

    pub fn set_claim_grace(ctx: Context<UpdateConfig>, claim_grace_secs: u64) -> Result<()> {
        admin::set_claim_grace(ctx, claim_grace_secs)
    }

    pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>, amount: u64) -> Result<()> {
        admin::withdraw_treasury(ctx, amount)
    }

    // ----------------------------
    // Rounds
    // ----------------------------
    pub fn create_round(ctx: Context<CreateRound>, name: String, ticket_price: u64) -> Result<u64> {
        admin::create_round(ctx, name, ticket_price)
    }

    pub fn buy_ticket(
        ctx: Context<BuyTicket>,
        round_id: u64,
        encrypted_numbers: Vec<[u8; 32]>,
        proofs: Vec<Vec<u8>>,
        payment: u64,
    ) -> Result<u64> {
        ticket::buy_ticket(ctx, round_id, encrypted_numbers, proofs, payment)
    }

    pub fn draw_round<'info>(
        ctx: Context<'_, '_, 'info, 'info, DrawRound<'info>>,
        round_id: u64,
    ) -> Result<()> {
        draw::draw_round(ctx, round_id)
    }

    pub fn claim_prize(ctx: Context<ClaimPrize>, round_id: u64, ticket_id: u64) -> Result<u64> {
        prize::claim_prize(ctx, round_id, ticket_id)
    }

    pub fn sweep_unclaimed(ctx: Context<SweepUnclaimed>, round_id: u64) -> Result<()> {
        prize::sweep_unclaimed(ctx, round_id)
    }

    // ----------------------------
    // Views
    // ----------------------------
    pub fn rounds_count(ctx: Context<RoundsCount>) -> Result<u64> {
        views::rounds_count(ctx)
    }

    pub fn get_round(ctx: Context<GetRound>, round_id: u64) -> Result<RoundSnapshot> {
        views::get_round(ctx, round_id)
    }

    pub fn get_user_tickets(ctx: Context<GetUserTickets>, round_id: u64, owner: Pubkey) -> Result<Vec<u64>> {
        views::get_user_tickets(ctx, round_id, owner)
    }

    pub fn get_winners(ctx: Context<GetWinners>, round_id: u64) -> Result<Vec<WinnerRecord>> {
        views::get_winners(ctx, round_id)
    }
}
