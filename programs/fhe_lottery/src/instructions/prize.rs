use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};

use crate::{
    errors::LotteryError,
    events::{PrizeClaimed, UnclaimedSwept},
    policy::{EvenSplit, PrizePolicy},
    state::{Config, Round, WinnerBoard},
    utils::{ensure_admin, read_account, write_account, VAULT_SEED},
    ClaimPrize, SweepUnclaimed,
};

/// Marks `ticket_id` as claimed by `claimant` and returns its payout.
pub fn settle_claim<P: PrizePolicy>(
    round: &mut Round,
    board: &mut WinnerBoard,
    policy: &P,
    claimant: &Pubkey,
    ticket_id: u64,
    now: i64,
) -> Result<u64> {
    require!(round.drawn, LotteryError::NotDrawn);
    require!(!round.swept, LotteryError::ClaimAfterSweep);

    let prize_pool = round.prize_pool;
    let winner_count = round.winner_count;
    let claimed_amount = round.claimed_amount;

    let record = board
        .find_mut(ticket_id)
        .ok_or_else(|| error!(LotteryError::NotWinner))?;
    require_keys_eq!(record.owner, *claimant, LotteryError::Unauthorized);
    require!(!record.claimed, LotteryError::AlreadyClaimed);

    let payout = policy.payout(prize_pool, winner_count)?;
    let claimed_after = claimed_amount
        .checked_add(payout)
        .ok_or(LotteryError::MathOverflow)?;
    require!(claimed_after <= prize_pool, LotteryError::Overdraw);

    // commit
    record.claimed = true;
    record.payout = payout;
    record.claimed_at = now;
    round.claimed_amount = claimed_after;

    Ok(payout)
}

/// The board only exists once the round is drawn.
pub fn board_for_claim(round: &Round, board: Option<WinnerBoard>) -> Result<WinnerBoard> {
    require!(round.drawn, LotteryError::NotDrawn);
    board.ok_or_else(|| error!(LotteryError::NotWinner))
}

pub fn claim_prize(mut ctx: Context<ClaimPrize>, round_id: u64, ticket_id: u64) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let winner = ctx.accounts.winner.key();

    let accts = &mut ctx.accounts;
    let board_info = accts.winner_board.to_account_info();
    let mut board = board_for_claim(&accts.round, read_account(&board_info)?)?;

    let payout = settle_claim(&mut accts.round, &mut board, &EvenSplit, &winner, ticket_id, now)?;
    write_account(&board_info, &board)?;

    if payout > 0 {
        require!(
            accts.vault.lamports() >= payout,
            LotteryError::InsufficientVaultFunds
        );

        let ix = system_instruction::transfer(&accts.vault.key(), &winner, payout);
        let round_le = round_id.to_le_bytes();
        let signer_seeds: &[&[u8]] = &[VAULT_SEED, &round_le, &[accts.round.vault_bump]];

        invoke_signed(
            &ix,
            &[
                accts.vault.to_account_info(),
                accts.winner.to_account_info(),
                accts.system_program.to_account_info(),
            ],
            &[signer_seeds],
        )?;
    }

    emit!(PrizeClaimed {
        round_id,
        ticket_id,
        winner,
        payout,
        claimed_amount_after: accts.round.claimed_amount,
    });

    Ok(payout)
}

/// Closes settlement of a drawn round once the claim grace period is over.
/// Returns the balance owed to the treasury.
pub fn sweep_core(cfg: &Config, round: &mut Round, caller: &Pubkey, now: i64) -> Result<u64> {
    require!(!cfg.paused, LotteryError::Paused);
    ensure_admin(cfg, caller)?;
    require!(round.drawn, LotteryError::NotDrawn);
    require!(!round.swept, LotteryError::AlreadySwept);

    let min_sweep_time = round.drawn_at.saturating_add(cfg.claim_grace_secs);
    require!(now >= min_sweep_time, LotteryError::SweepTooEarly);

    let amount = round.outstanding();

    round.swept = true;
    round.swept_at = now;

    Ok(amount)
}

pub fn sweep_unclaimed(mut ctx: Context<SweepUnclaimed>, round_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let admin = ctx.accounts.admin.key();

    let accts = &mut ctx.accounts;
    let amount = sweep_core(&accts.config, &mut accts.round, &admin, now)?;

    if amount > 0 {
        require!(
            accts.vault.lamports() >= amount,
            LotteryError::InsufficientVaultFunds
        );

        let ix = system_instruction::transfer(&accts.vault.key(), &accts.treasury.key(), amount);
        let round_le = round_id.to_le_bytes();
        let signer_seeds: &[&[u8]] = &[VAULT_SEED, &round_le, &[accts.round.vault_bump]];

        invoke_signed(
            &ix,
            &[
                accts.vault.to_account_info(),
                accts.treasury.to_account_info(),
                accts.system_program.to_account_info(),
            ],
            &[signer_seeds],
        )?;
    }

    emit!(UnclaimedSwept {
        round_id,
        amount,
        treasury: accts.treasury.key(),
    });
    msg!("Round {} swept: {} lamports to treasury", round_id, amount);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::admin::open_round;
    use crate::instructions::draw::run_draw;
    use crate::instructions::ticket::{record_ticket, Purchase};
    use crate::state::DrawEntry;
    use crate::test_support::*;

    const PRICE: u64 = 1_000_000;
    const NOW: i64 = 1_700_000_000;
    const WINNING: [u8; 6] = [1, 2, 3, 4, 5, 6];
    const LOSING: [u8; 6] = [10, 20, 30, 40, 41, 42];

    struct Drawn {
        admin: Pubkey,
        cfg: Config,
        round: Round,
        board: WinnerBoard,
    }

    /// A round with one ticket per entry of `buyers`, drawn at end time.
    fn drawn_round(buyers: &[(Pubkey, [u8; 6])]) -> Drawn {
        let admin = Pubkey::new_unique();
        let cfg = config(admin);
        let mut rr = registry(admin);
        let mut round = blank_round();
        open_round(&cfg, &mut rr, &mut round, &admin, "R".to_string(), PRICE, NOW).expect("round");

        let mut fhe = MockCoprocessor::with_winning(&WINNING);
        let mut tickets: Vec<DrawEntry> = Vec::new();
        for (owner, numbers) in buyers {
            let (handles, proofs) = fhe.encrypt_ticket(*numbers);
            let mut t = blank_ticket();
            let mut ut = blank_user_tickets();
            record_ticket(
                &cfg,
                &mut round,
                &mut t,
                &mut ut,
                &mut fhe,
                Purchase {
                    owner: *owner,
                    encrypted_numbers: &handles,
                    proofs: &proofs,
                    payment: PRICE,
                },
                NOW,
            )
            .expect("ticket");
            tickets.push(DrawEntry::from(&t));
        }

        let mut board = blank_board();
        let end = round.end_time;
        run_draw(&cfg, &mut round, &tickets, &mut board, &mut fhe, &admin, end).expect("drawn");

        Drawn { admin, cfg, round, board }
    }

    #[test]
    fn winners_split_pool_evenly_once_each() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let carol = Pubkey::new_unique();
        let mut d = drawn_round(&[(alice, WINNING), (bob, LOSING), (carol, WINNING)]);
        assert_eq!(d.round.prize_pool, 3 * PRICE);
        assert_eq!(d.round.winner_count, 2);

        let paid = settle_claim(&mut d.round, &mut d.board, &EvenSplit, &alice, 0, NOW).expect("alice");
        assert_eq!(paid, 3 * PRICE / 2);

        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, &alice, 0, NOW),
            LotteryError::AlreadyClaimed,
        );
        assert_eq!(d.round.claimed_amount, paid);

        let paid_carol = settle_claim(&mut d.round, &mut d.board, &EvenSplit, &carol, 2, NOW).expect("carol");
        assert_eq!(paid_carol, paid);
        assert!(d.round.claimed_amount <= d.round.prize_pool);

        let record = d.board.winners.iter().find(|w| w.ticket_id == 2).expect("record");
        assert!(record.claimed);
        assert_eq!(record.payout, paid);
        assert_eq!(record.claimed_at, NOW);
    }

    #[test]
    fn odd_pool_leaves_dust_unclaimed() {
        let owners: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let mut d = drawn_round(&[(owners[0], WINNING), (owners[1], WINNING), (owners[2], WINNING)]);
        d.round.prize_pool += 1;

        for (i, owner) in owners.iter().enumerate() {
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, owner, i as u64, NOW).expect("claim");
        }

        assert_eq!(d.round.claimed_amount, 3 * PRICE);
        assert_eq!(d.round.outstanding(), 1);
    }

    #[test]
    fn losing_ticket_cannot_claim() {
        let bob = Pubkey::new_unique();
        let mut d = drawn_round(&[(Pubkey::new_unique(), WINNING), (bob, LOSING)]);

        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, &bob, 1, NOW),
            LotteryError::NotWinner,
        );
        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, &bob, 99, NOW),
            LotteryError::NotWinner,
        );
        assert_eq!(d.round.claimed_amount, 0);
    }

    #[test]
    fn only_ticket_owner_claims() {
        let alice = Pubkey::new_unique();
        let mut d = drawn_round(&[(alice, WINNING)]);

        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, &Pubkey::new_unique(), 0, NOW),
            LotteryError::Unauthorized,
        );
        assert!(!d.board.winners[0].claimed);
    }

    #[test]
    fn claim_before_draw_is_refused() {
        let mut round = blank_round();
        let mut board = blank_board();

        assert_lottery_err(
            settle_claim(&mut round, &mut board, &EvenSplit, &Pubkey::new_unique(), 0, NOW),
            LotteryError::NotDrawn,
        );
    }

    #[test]
    fn claim_against_missing_board_reports_round_state() {
        let round = blank_round();
        assert_lottery_err(board_for_claim(&round, None), LotteryError::NotDrawn);
        assert_lottery_err(board_for_claim(&round, Some(blank_board())), LotteryError::NotDrawn);

        let mut drawn = blank_round();
        drawn.drawn = true;
        assert_lottery_err(board_for_claim(&drawn, None), LotteryError::NotWinner);

        let d = drawn_round(&[(Pubkey::new_unique(), WINNING)]);
        let board = board_for_claim(&d.round, Some(d.board.clone())).expect("board");
        assert_eq!(board.winners.len(), 1);
    }

    struct Greedy;

    impl PrizePolicy for Greedy {
        fn payout(&self, prize_pool: u64, _winner_count: u64) -> Result<u64> {
            Ok(prize_pool)
        }
    }

    #[test]
    fn policy_cannot_overdraw_pool() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut d = drawn_round(&[(alice, WINNING), (bob, WINNING)]);

        settle_claim(&mut d.round, &mut d.board, &Greedy, &alice, 0, NOW).expect("whole pool");
        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &Greedy, &bob, 1, NOW),
            LotteryError::Overdraw,
        );
        assert_eq!(d.round.claimed_amount, d.round.prize_pool);
        assert!(!d.board.winners[1].claimed);
    }

    #[test]
    fn sweep_waits_for_grace_then_closes_claims() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut d = drawn_round(&[(alice, WINNING), (bob, WINNING)]);
        settle_claim(&mut d.round, &mut d.board, &EvenSplit, &alice, 0, NOW).expect("alice");

        let grace_end = d.round.drawn_at + d.cfg.claim_grace_secs;
        assert_lottery_err(
            sweep_core(&d.cfg, &mut d.round, &d.admin, grace_end - 1),
            LotteryError::SweepTooEarly,
        );

        let swept = sweep_core(&d.cfg, &mut d.round, &d.admin, grace_end).expect("swept");
        assert_eq!(swept, PRICE);
        assert!(d.round.swept);
        assert_eq!(d.round.swept_at, grace_end);

        assert_lottery_err(
            settle_claim(&mut d.round, &mut d.board, &EvenSplit, &bob, 1, grace_end),
            LotteryError::ClaimAfterSweep,
        );
        assert_lottery_err(
            sweep_core(&d.cfg, &mut d.round, &d.admin, grace_end),
            LotteryError::AlreadySwept,
        );
    }

    #[test]
    fn sweep_takes_whole_pool_of_round_without_winners() {
        let mut d = drawn_round(&[(Pubkey::new_unique(), LOSING), (Pubkey::new_unique(), LOSING)]);
        let at = d.round.drawn_at + d.cfg.claim_grace_secs;

        assert_eq!(sweep_core(&d.cfg, &mut d.round, &d.admin, at).expect("swept"), 2 * PRICE);
    }

    #[test]
    fn sweep_requires_admin_and_drawn_round() {
        let mut d = drawn_round(&[]);
        let at = d.round.drawn_at + d.cfg.claim_grace_secs;

        assert_lottery_err(
            sweep_core(&d.cfg, &mut d.round, &Pubkey::new_unique(), at),
            LotteryError::Unauthorized,
        );
        assert!(!d.round.swept);

        let mut undrawn = blank_round();
        assert_lottery_err(sweep_core(&d.cfg, &mut undrawn, &d.admin, at), LotteryError::NotDrawn);
    }
}
