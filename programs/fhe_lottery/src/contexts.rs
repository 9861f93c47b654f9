// programs/fhe_lottery/src/contexts.rs

use anchor_lang::prelude::*;

use crate::state::{Config, Round, RoundRegistry, Ticket, UserTickets, WinnerBoard};

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [crate::CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + RoundRegistry::INIT_SPACE,
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump
    )]
    pub round_registry: Account<'info, RoundRegistry>,

    /// CHECK: system-owned PDA (owner = system program). Address enforced by seeds/bump.
    #[account(
        init,
        payer = admin,
        space = 0,
        owner = anchor_lang::solana_program::system_program::ID,
        seeds = [crate::TREASURY_SEED],
        bump
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Shared by every admin-only config update.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct CreateRound<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump = round_registry.bump,
    )]
    pub round_registry: Account<'info, RoundRegistry>,

    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [crate::ROUND_SEED, round_registry.next_round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub round: Account<'info, Round>,

    /// CHECK: system-owned vault PDA, holds lamports, no data
    #[account(
        init,
        payer = admin,
        space = 0,
        owner = anchor_lang::solana_program::system_program::ID,
        seeds = [crate::VAULT_SEED, round_registry.next_round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct BuyTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    /// CHECK: System-owned PDA vault. Address enforced by seeds/bump.
    #[account(
        mut,
        seeds = [crate::VAULT_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.vault_bump
    )]
    pub vault: UncheckedAccount<'info>,

    #[account(
        init,
        payer = buyer,
        space = 8 + Ticket::INIT_SPACE,
        seeds = [crate::TICKET_SEED, round_id.to_le_bytes().as_ref(), round.ticket_count.to_le_bytes().as_ref()],
        bump
    )]
    pub ticket: Account<'info, Ticket>,

    #[account(
        init_if_needed,
        payer = buyer,
        space = 8 + UserTickets::INIT_SPACE,
        seeds = [crate::USER_TICKETS_SEED, round_id.to_le_bytes().as_ref(), buyer.key().as_ref()],
        bump
    )]
    pub user_tickets: Account<'info, UserTickets>,

    #[account(mut)]
    pub buyer: Signer<'info>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Remaining accounts: every `Ticket` PDA of the round, in ticket id order.
#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct DrawRound<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + WinnerBoard::INIT_SPACE,
        seeds = [crate::WINNERS_SEED, round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub winner_board: Account<'info, WinnerBoard>,

    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct ClaimPrize<'info> {
    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    /// CHECK: WinnerBoard PDA, created by the draw. Read and written by the
    /// handler so that an undrawn round reports NotDrawn.
    #[account(
        mut,
        seeds = [crate::WINNERS_SEED, round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub winner_board: UncheckedAccount<'info>,

    /// CHECK: System-owned PDA vault. Address enforced by seeds/bump.
    #[account(
        mut,
        seeds = [crate::VAULT_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.vault_bump
    )]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub winner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SweepUnclaimed<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    /// CHECK: System-owned PDA vault. Address enforced by seeds/bump.
    #[account(
        mut,
        seeds = [crate::VAULT_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.vault_bump
    )]
    pub vault: UncheckedAccount<'info>,

    /// CHECK: System-owned PDA. Address enforced by seeds/bump + address=config.treasury
    #[account(
        mut,
        seeds = [crate::TREASURY_SEED],
        bump = config.treasury_bump,
        address = config.treasury
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawTreasury<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    /// CHECK: System-owned PDA. Address enforced.
    #[account(
        mut,
        seeds = [crate::TREASURY_SEED],
        bump = config.treasury_bump,
        address = config.treasury
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Read-only views
// ----------------------------

#[derive(Accounts)]
pub struct RoundsCount<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump = round_registry.bump,
    )]
    pub round_registry: Account<'info, RoundRegistry>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct GetRound<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump = round_registry.bump,
    )]
    pub round_registry: Account<'info, RoundRegistry>,

    /// CHECK: may not exist yet; existence is decided against the registry.
    #[account(
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub round: UncheckedAccount<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64, owner: Pubkey)]
pub struct GetUserTickets<'info> {
    /// CHECK: empty until the owner's first purchase in this round.
    #[account(
        seeds = [crate::USER_TICKETS_SEED, round_id.to_le_bytes().as_ref(), owner.as_ref()],
        bump
    )]
    pub user_tickets: UncheckedAccount<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct GetWinners<'info> {
    /// CHECK: empty until the round is drawn.
    #[account(
        seeds = [crate::WINNERS_SEED, round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub winner_board: UncheckedAccount<'info>,
}
