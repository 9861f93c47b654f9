use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke, system_instruction};

use crate::{
    capability::{EncryptedInput, FheCapability, InputContext},
    constants::{MAX_TICKETS_PER_ROUND, NUMBERS_PER_TICKET},
    coprocessor::AttestedCoprocessor,
    errors::LotteryError,
    events::TicketPurchased,
    state::{CipherHandle, Config, Round, Ticket, UserTickets},
    utils::{load_coprocessor_message, proof_digest},
    BuyTicket,
};

/// Caller-supplied part of a purchase.
pub struct Purchase<'a> {
    pub owner: Pubkey,
    pub encrypted_numbers: &'a [CipherHandle],
    pub proofs: &'a [Vec<u8>],
    pub payment: u64,
}

/// Everything about a purchase that can be checked without the coprocessor.
pub fn ensure_purchasable(cfg: &Config, round: &Round, purchase: &Purchase<'_>, now: i64) -> Result<()> {
    require!(!cfg.paused, LotteryError::Paused);
    require!(round.is_open(now), LotteryError::RoundNotOpen);
    require!(
        (round.ticket_count as usize) < MAX_TICKETS_PER_ROUND,
        LotteryError::RoundFull
    );
    require!(
        purchase.encrypted_numbers.len() == NUMBERS_PER_TICKET,
        LotteryError::WrongEntryCount
    );
    require!(purchase.proofs.len() == NUMBERS_PER_TICKET, LotteryError::WrongEntryCount);
    require!(purchase.payment == round.ticket_price, LotteryError::IncorrectPayment);
    Ok(())
}

/// Checks every precondition and every proof, then appends the ticket.
/// Nothing is written unless all six inputs are accepted.
pub fn record_ticket<F: FheCapability>(
    cfg: &Config,
    round: &mut Round,
    ticket: &mut Ticket,
    user_tickets: &mut UserTickets,
    fhe: &mut F,
    purchase: Purchase<'_>,
    now: i64,
) -> Result<u64> {
    ensure_purchasable(cfg, round, &purchase, now)?;

    let ticket_id = round.ticket_count;
    let context = InputContext {
        round_id: round.round_id,
        ticket_id,
    };

    let mut handles = [[0u8; 32]; NUMBERS_PER_TICKET];
    let mut digests = [[0u8; 32]; NUMBERS_PER_TICKET];
    for (i, (handle, proof)) in purchase
        .encrypted_numbers
        .iter()
        .zip(purchase.proofs.iter())
        .enumerate()
    {
        let input = EncryptedInput { handle, proof };
        let accepted = fhe.verify_and_register(input, context, &purchase.owner)?;
        require!(accepted, LotteryError::ProofRejected);

        handles[i] = *handle;
        digests[i] = proof_digest(proof);
    }

    let ticket_count = ticket_id.checked_add(1).ok_or(LotteryError::MathOverflow)?;
    let prize_pool = round
        .prize_pool
        .checked_add(purchase.payment)
        .ok_or(LotteryError::MathOverflow)?;

    // commit
    ticket.round_id = round.round_id;
    ticket.ticket_id = ticket_id;
    ticket.owner = purchase.owner;
    ticket.handles = handles;
    ticket.proof_digests = digests;
    ticket.purchased_at = now;

    user_tickets.round_id = round.round_id;
    user_tickets.owner = purchase.owner;
    user_tickets.ticket_ids.push(ticket_id);

    round.ticket_count = ticket_count;
    round.prize_pool = prize_pool;

    Ok(ticket_id)
}

/// Gates the purchase, then connects to the coprocessor and records it.
/// A closed round or a wrong payment fails before any attestation is read.
pub fn admit_purchase<F, C>(
    cfg: &Config,
    round: &mut Round,
    ticket: &mut Ticket,
    user_tickets: &mut UserTickets,
    purchase: Purchase<'_>,
    now: i64,
    connect: C,
) -> Result<u64>
where
    F: FheCapability,
    C: FnOnce() -> Result<F>,
{
    ensure_purchasable(cfg, round, &purchase, now)?;
    let mut fhe = connect()?;
    record_ticket(cfg, round, ticket, user_tickets, &mut fhe, purchase, now)
}

// Tx layout must be: [ ed25519_verify(coprocessor input attestation), buy_ticket ]
pub fn buy_ticket(
    mut ctx: Context<BuyTicket>,
    round_id: u64,
    encrypted_numbers: Vec<CipherHandle>,
    proofs: Vec<Vec<u8>>,
    payment: u64,
) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    let buyer = ctx.accounts.buyer.key();

    let program_id = ctx.program_id;
    let coprocessor = ctx.accounts.config.coprocessor;
    let ix_sys = ctx.accounts.instructions.to_account_info();

    let accts = &mut ctx.accounts;
    let ticket_id = admit_purchase(
        &accts.config,
        &mut accts.round,
        &mut accts.ticket,
        &mut accts.user_tickets,
        Purchase {
            owner: buyer,
            encrypted_numbers: &encrypted_numbers,
            proofs: &proofs,
            payment,
        },
        now,
        || {
            let attestation = load_coprocessor_message(&coprocessor, &ix_sys)?;
            AttestedCoprocessor::for_inputs(program_id, &attestation)
        },
    )?;
    accts.ticket.bump = ctx.bumps.ticket;
    accts.user_tickets.bump = ctx.bumps.user_tickets;

    let ix = system_instruction::transfer(&buyer, &accts.vault.key(), payment);
    invoke(
        &ix,
        &[
            accts.buyer.to_account_info(),
            accts.vault.to_account_info(),
            accts.system_program.to_account_info(),
        ],
    )?;

    emit!(TicketPurchased {
        round_id,
        ticket_id,
        owner: buyer,
        ticket_count_after: accts.round.ticket_count,
        prize_pool_after: accts.round.prize_pool,
    });

    Ok(ticket_id)
}
