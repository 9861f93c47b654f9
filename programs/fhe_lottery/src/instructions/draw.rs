use anchor_lang::prelude::*;

use crate::{
    capability::FheCapability,
    constants::{MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_TICKET},
    coprocessor::AttestedCoprocessor,
    errors::LotteryError,
    events::RoundDrawn,
    state::{Config, DrawEntry, Round, RoundPhase, WinnerBoard, WinnerRecord},
    utils::{ensure_admin, load_coprocessor_message, load_round_tickets},
    DrawRound,
};

/// Gate shared by the handler and the draw itself.
pub fn ensure_drawable(cfg: &Config, round: &Round, caller: &Pubkey, now: i64) -> Result<()> {
    require!(!cfg.paused, LotteryError::Paused);
    ensure_admin(cfg, caller)?;
    require!(!round.drawn, LotteryError::AlreadyDrawn);
    require!(now >= round.end_time, LotteryError::RoundNotClosed);
    Ok(())
}

/// Six distinct numbers, each in `MIN_NUMBER..=MAX_NUMBER`.
pub fn validate_winning_numbers(numbers: &[u8]) -> Result<[u8; NUMBERS_PER_TICKET]> {
    let winning: [u8; NUMBERS_PER_TICKET] = numbers
        .try_into()
        .map_err(|_| error!(LotteryError::InvalidWinningNumbers))?;

    for (i, n) in winning.iter().enumerate() {
        require!(
            (MIN_NUMBER..=MAX_NUMBER).contains(n),
            LotteryError::InvalidWinningNumbers
        );
        require!(!winning[..i].contains(n), LotteryError::InvalidWinningNumbers);
    }

    Ok(winning)
}

/// Draws the winning numbers, compares them with every ticket of the round
/// and records the jackpot winners. All-or-nothing: `round` and `board` are
/// only written once every comparison has succeeded.
pub fn run_draw<F: FheCapability>(
    cfg: &Config,
    round: &mut Round,
    tickets: &[DrawEntry],
    board: &mut WinnerBoard,
    fhe: &mut F,
    caller: &Pubkey,
    now: i64,
) -> Result<u64> {
    ensure_drawable(cfg, round, caller, now)?;
    require!(!board.recorded, LotteryError::AlreadyDrawn);

    require!(
        tickets.len() as u64 == round.ticket_count,
        LotteryError::InvalidTicketAccounts
    );
    for (i, t) in tickets.iter().enumerate() {
        require!(
            t.round_id == round.round_id && t.ticket_id == i as u64,
            LotteryError::InvalidTicketAccounts
        );
    }

    let numbers = fhe.random_winning_numbers(NUMBERS_PER_TICKET, MIN_NUMBER..=MAX_NUMBER)?;
    let winning = validate_winning_numbers(&numbers)?;

    let mut winners = Vec::with_capacity(tickets.len());
    for t in tickets {
        let outcome = fhe.compare_encrypted(&t.handles, &winning)?;
        require!(
            outcome.matched as usize <= NUMBERS_PER_TICKET,
            LotteryError::ComparisonFailed
        );
        if outcome.is_jackpot() {
            winners.push(WinnerRecord {
                ticket_id: t.ticket_id,
                owner: t.owner,
                matched: outcome.matched,
                claimed: false,
                payout: 0,
                claimed_at: 0,
            });
        }
    }
    let winner_count = winners.len() as u64;

    // commit
    round.drawn = true;
    round.phase = RoundPhase::Drawn;
    round.drawn_at = now;
    round.winning_numbers = winning;
    round.winner_count = winner_count;

    board.round_id = round.round_id;
    board.recorded = true;
    board.winners = winners;

    Ok(winner_count)
}

// Tx layout must be: [ ed25519_verify(coprocessor draw attestation), draw_round ]
pub fn draw_round<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, DrawRound<'info>>,
    round_id: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let admin = ctx.accounts.admin.key();

    // Phase and authority errors take precedence over attestation problems.
    ensure_drawable(&ctx.accounts.config, &ctx.accounts.round, &admin, now)?;
    require!(
        ctx.accounts.config.coprocessor != Pubkey::default(),
        LotteryError::CoprocessorNotSet
    );

    let tickets = load_round_tickets(ctx.program_id, round_id, ctx.remaining_accounts)?;

    let ix_sys = ctx.accounts.instructions.to_account_info();
    let attestation = load_coprocessor_message(&ctx.accounts.config.coprocessor, &ix_sys)
        .map_err(|_| error!(LotteryError::RandomnessUnavailable))?;
    let mut fhe = AttestedCoprocessor::for_draw(ctx.program_id, &attestation, round_id, &tickets)?;

    let accts = &mut ctx.accounts;
    let winner_count = run_draw(
        &accts.config,
        &mut accts.round,
        &tickets,
        &mut accts.winner_board,
        &mut fhe,
        &admin,
        now,
    )?;
    accts.winner_board.bump = ctx.bumps.winner_board;

    emit!(RoundDrawn {
        round_id,
        winning_numbers: accts.round.winning_numbers,
        ticket_count: accts.round.ticket_count,
        winner_count,
    });
    msg!(
        "Round {} drawn: {:?}, {} winner(s)",
        round_id,
        accts.round.winning_numbers,
        winner_count
    );

    Ok(())
}
