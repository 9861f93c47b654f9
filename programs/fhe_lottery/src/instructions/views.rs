use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    state::{Round, RoundPhase, RoundRegistry, UserTickets, WinnerBoard, WinnerRecord},
    utils::read_account,
    GetRound, GetUserTickets, GetWinners, RoundsCount,
};

/// Read-only copy of a round as clients see it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub round_id: u64,
    pub name: String,
    pub phase: RoundPhase,
    pub start_time: i64,
    pub end_time: i64,
    pub ticket_price: u64,
    pub prize_pool: u64,
    pub ticket_count: u64,
    pub drawn: bool,
    /// Empty until the round is drawn.
    pub winning_numbers: Vec<u8>,
    pub winner_count: u64,
    pub claimed_amount: u64,
    pub swept: bool,
}

impl RoundSnapshot {
    pub fn of(round: &Round, now: i64) -> Self {
        let winning_numbers = if round.drawn {
            round.winning_numbers.to_vec()
        } else {
            Vec::new()
        };

        Self {
            round_id: round.round_id,
            name: round.name.clone(),
            phase: round.phase_at(now),
            start_time: round.start_time,
            end_time: round.end_time,
            ticket_price: round.ticket_price,
            prize_pool: round.prize_pool,
            ticket_count: round.ticket_count,
            drawn: round.drawn,
            winning_numbers,
            winner_count: round.winner_count,
            claimed_amount: round.claimed_amount,
            swept: round.swept,
        }
    }
}

pub fn round_snapshot(registry: &RoundRegistry, round_id: u64, round: Option<&Round>, now: i64) -> Result<RoundSnapshot> {
    require!(round_id < registry.next_round_id, LotteryError::RoundNotFound);
    let round = round.ok_or_else(|| error!(LotteryError::RoundNotFound))?;
    Ok(RoundSnapshot::of(round, now))
}

pub fn user_ticket_ids(user_tickets: Option<&UserTickets>) -> Vec<u64> {
    user_tickets
        .map(|ut| ut.ticket_ids.clone())
        .unwrap_or_default()
}

pub fn round_winners(board: Option<&WinnerBoard>) -> Vec<WinnerRecord> {
    match board {
        Some(b) if b.recorded => b.winners.clone(),
        _ => Vec::new(),
    }
}

pub fn rounds_count(ctx: Context<RoundsCount>) -> Result<u64> {
    Ok(ctx.accounts.round_registry.next_round_id)
}

pub fn get_round(ctx: Context<GetRound>, round_id: u64) -> Result<RoundSnapshot> {
    let now = Clock::get()?.unix_timestamp;
    let round: Option<Round> = read_account(&ctx.accounts.round.to_account_info())?;
    round_snapshot(&ctx.accounts.round_registry, round_id, round.as_ref(), now)
}

pub fn get_user_tickets(ctx: Context<GetUserTickets>, _round_id: u64, _owner: Pubkey) -> Result<Vec<u64>> {
    let user_tickets: Option<UserTickets> = read_account(&ctx.accounts.user_tickets.to_account_info())?;
    Ok(user_ticket_ids(user_tickets.as_ref()))
}

pub fn get_winners(ctx: Context<GetWinners>, _round_id: u64) -> Result<Vec<WinnerRecord>> {
    let board: Option<WinnerBoard> = read_account(&ctx.accounts.winner_board.to_account_info())?;
    Ok(round_winners(board.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::admin::open_round;
    use crate::test_support::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn snapshot_of_unknown_round_is_not_found() {
        let admin = Pubkey::new_unique();
        let cfg = config(admin);
        let mut rr = registry(admin);

        assert_lottery_err(round_snapshot(&rr, 0, None, NOW), LotteryError::RoundNotFound);

        let mut round = blank_round();
        open_round(&cfg, &mut rr, &mut round, &admin, "R1".to_string(), 5, NOW).expect("round");

        let snap = round_snapshot(&rr, 0, Some(&round), NOW).expect("found");
        assert_eq!(snap.round_id, 0);
        assert_eq!(snap.name, "R1");
        assert_eq!(snap.phase, RoundPhase::Open);
        assert!(snap.winning_numbers.is_empty());

        assert_lottery_err(round_snapshot(&rr, 1, Some(&round), NOW), LotteryError::RoundNotFound);
    }

    #[test]
    fn snapshot_reports_closed_then_drawn() {
        let admin = Pubkey::new_unique();
        let cfg = config(admin);
        let mut rr = registry(admin);
        let mut round = blank_round();
        open_round(&cfg, &mut rr, &mut round, &admin, "R1".to_string(), 5, NOW).expect("round");

        let closed = RoundSnapshot::of(&round, round.end_time);
        assert_eq!(closed.phase, RoundPhase::Closed);

        round.drawn = true;
        round.phase = RoundPhase::Drawn;
        round.winning_numbers = [1, 2, 3, 4, 5, 6];
        let drawn = RoundSnapshot::of(&round, round.end_time);
        assert_eq!(drawn.phase, RoundPhase::Drawn);
        assert_eq!(drawn.winning_numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn missing_indexes_read_as_empty() {
        assert!(user_ticket_ids(None).is_empty());
        assert!(round_winners(None).is_empty());
        assert!(round_winners(Some(&blank_board())).is_empty());

        let mut ut = blank_user_tickets();
        ut.ticket_ids = vec![0, 3, 7];
        assert_eq!(user_ticket_ids(Some(&ut)), vec![0, 3, 7]);
    }
}
