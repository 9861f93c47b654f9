use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};

use crate::constants::*;
use crate::errors::LotteryError;
use crate::events::RoundCreated;
use crate::state::{Config, Round, RoundPhase, RoundRegistry};
use crate::utils::{ensure_admin, TREASURY_SEED};
use crate::{CreateRound, InitializeConfig, UpdateConfig, WithdrawTreasury};

pub fn initialize_config(ctx: Context<InitializeConfig>, claim_grace_secs: Option<u64>) -> Result<()> {
    let claim_grace_secs = match claim_grace_secs {
        Some(secs) => i64::try_from(secs).map_err(|_| error!(LotteryError::MathOverflow))?,
        None => DEFAULT_CLAIM_GRACE_SECS,
    };

    let cfg = &mut ctx.accounts.config;
    cfg.admin = ctx.accounts.admin.key();
    cfg.bump = ctx.bumps.config;

    // defaults: no coprocessor until the admin registers one
    cfg.coprocessor = Pubkey::default();
    cfg.paused = false;
    cfg.claim_grace_secs = claim_grace_secs;

    cfg.treasury = ctx.accounts.treasury.key();
    cfg.treasury_bump = ctx.bumps.treasury;
    cfg.version = INITIAL_VERSION;

    let rr = &mut ctx.accounts.round_registry;
    rr.admin = cfg.admin;
    rr.bump = ctx.bumps.round_registry;
    rr.next_round_id = INITIAL_ROUND_ID;
    rr.version = INITIAL_VERSION;

    msg!("Lottery config initialized, admin {}", cfg.admin);
    Ok(())
}

pub fn set_coprocessor(ctx: Context<UpdateConfig>, coprocessor: Pubkey) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    ensure_admin(cfg, &ctx.accounts.admin.key())?;
    cfg.coprocessor = coprocessor;
    Ok(())
}

pub fn set_pause(ctx: Context<UpdateConfig>, paused: bool) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    ensure_admin(cfg, &ctx.accounts.admin.key())?;
    cfg.paused = paused;
    msg!("Lottery paused: {}", paused);
    Ok(())
}

pub fn set_claim_grace(ctx: Context<UpdateConfig>, claim_grace_secs: u64) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    ensure_admin(cfg, &ctx.accounts.admin.key())?;
    cfg.claim_grace_secs = i64::try_from(claim_grace_secs).map_err(|_| error!(LotteryError::MathOverflow))?;
    Ok(())
}

/// Validates and writes a new round into the zeroed `round` account, then
/// advances the registry. Returns the id the round was created under.
pub fn open_round(
    cfg: &Config,
    registry: &mut RoundRegistry,
    round: &mut Round,
    caller: &Pubkey,
    name: String,
    ticket_price: u64,
    now: i64,
) -> Result<u64> {
    require!(!cfg.paused, LotteryError::Paused);
    ensure_admin(cfg, caller)?;
    require!(!name.is_empty(), LotteryError::EmptyRoundName);
    require!(name.len() <= MAX_ROUND_NAME_LEN, LotteryError::RoundNameTooLong);
    require!(ticket_price > 0, LotteryError::ZeroTicketPrice);

    let round_id = registry.next_round_id;
    let next_round_id = round_id.checked_add(1).ok_or(LotteryError::MathOverflow)?;
    let end_time = now.checked_add(ROUND_DURATION_SECS).ok_or(LotteryError::MathOverflow)?;

    round.round_id = round_id;
    round.phase = RoundPhase::Open;
    round.name = name;
    round.creator = *caller;

    round.start_time = now;
    round.end_time = end_time;

    round.ticket_price = ticket_price;
    round.prize_pool = 0;
    round.ticket_count = 0;

    round.drawn = false;
    round.drawn_at = 0;
    round.winning_numbers = [0; NUMBERS_PER_TICKET];
    round.winner_count = 0;

    round.claimed_amount = 0;
    round.swept = false;
    round.swept_at = 0;

    registry.next_round_id = next_round_id;

    Ok(round_id)
}

pub fn create_round(mut ctx: Context<CreateRound>, name: String, ticket_price: u64) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let admin = ctx.accounts.admin.key();

    let accts = &mut ctx.accounts;
    let round_id = open_round(
        &accts.config,
        &mut accts.round_registry,
        &mut accts.round,
        &admin,
        name,
        ticket_price,
        now,
    )?;

    let round = &mut accts.round;
    round.bump = ctx.bumps.round;
    round.vault = accts.vault.key();
    round.vault_bump = ctx.bumps.vault;

    emit!(RoundCreated {
        round_id,
        round: round.key(),
        vault: round.vault,
        ticket_price,
        start_time: round.start_time,
        end_time: round.end_time,
    });
    msg!("Round {} created: \"{}\"", round_id, round.name);

    Ok(round_id)
}

/// Lamports to move out of the treasury, keeping `min_rent` behind.
/// `amount == 0` means everything above the minimum.
pub fn treasury_withdrawal(current_lamports: u64, min_rent: u64, amount: u64) -> Result<u64> {
    let withdraw_amount = if amount == 0 {
        current_lamports.saturating_sub(min_rent)
    } else {
        amount
    };

    require!(
        current_lamports >= withdraw_amount.saturating_add(min_rent),
        LotteryError::InsufficientVaultFunds
    );

    Ok(withdraw_amount)
}

pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>, amount: u64) -> Result<()> {
    let cfg = &ctx.accounts.config;
    ensure_admin(cfg, &ctx.accounts.admin.key())?;

    let treasury_info = ctx.accounts.treasury.to_account_info();
    let min_rent = Rent::get()?.minimum_balance(0); // system account
    let withdraw_amount = treasury_withdrawal(treasury_info.lamports(), min_rent, amount)?;

    if withdraw_amount == 0 {
        return Ok(());
    }

    let ix = system_instruction::transfer(
        &ctx.accounts.treasury.key(),
        &ctx.accounts.admin.key(),
        withdraw_amount,
    );
    let signer_seeds: &[&[u8]] = &[TREASURY_SEED, &[cfg.treasury_bump]];

    invoke_signed(
        &ix,
        &[
            treasury_info,
            ctx.accounts.admin.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
        &[signer_seeds],
    )?;

    msg!("Treasury withdrawal: {} lamports", withdraw_amount);
    Ok(())
}
