use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use solana_sha256_hasher::hashv;

use crate::{
    constants::{MAX_TICKETS_PER_ROUND, NUMBERS_PER_TICKET},
    errors::LotteryError,
    state::{CipherHandle, Config, DrawEntry, Ticket},
};

// Ed25519SigVerify111111111111111111111111111
pub fn ed25519_program_id() -> Pubkey {
    Pubkey::new_from_array([
        3, 125, 70, 214, 124, 147, 251, 190, 18, 249, 66, 143, 131, 141, 64, 255,
        5, 112, 116, 73, 39, 244, 138, 100, 252, 202, 112, 68, 128, 0, 0, 0,
    ])
}

// -----------------
// Seeds
// -----------------
pub const CONFIG_SEED: &[u8] = b"config_v1";
pub const ROUND_REGISTRY_SEED: &[u8] = b"round_registry_v1";
pub const TREASURY_SEED: &[u8] = b"treasury_v1";

pub const ROUND_SEED: &[u8] = b"round_v1";
pub const VAULT_SEED: &[u8] = b"vault_v1";
pub const TICKET_SEED: &[u8] = b"ticket_v1";
pub const USER_TICKETS_SEED: &[u8] = b"user_tickets_v1";
pub const WINNERS_SEED: &[u8] = b"winners_v1";

// -------------------------
// Authority
// -------------------------
pub fn ensure_admin(cfg: &Config, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(cfg.admin, *caller, LotteryError::Unauthorized);
    Ok(())
}

// -------------------------
// Digests
// -------------------------
pub fn proof_digest(proof: &[u8]) -> [u8; 32] {
    hashv(&[b"proof".as_ref(), proof]).to_bytes()
}

/// Identifies a ticket's ciphertexts independent of where they are stored.
pub fn handles_digest(handles: &[CipherHandle; NUMBERS_PER_TICKET]) -> [u8; 32] {
    let mut parts: [&[u8]; NUMBERS_PER_TICKET + 1] = [&b"ticket"[..]; NUMBERS_PER_TICKET + 1];
    for (slot, h) in parts[1..].iter_mut().zip(handles.iter()) {
        *slot = &h[..];
    }
    hashv(&parts).to_bytes()
}

/// Running hash over a round's tickets in id order. Starts from zero bytes.
pub fn ledger_root<'a, I>(digests: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a [u8; 32]>,
{
    digests.into_iter().fold([0u8; 32], |acc, d| {
        hashv(&[b"ledger".as_ref(), acc.as_ref(), d.as_ref()]).to_bytes()
    })
}

// -------------------------
// Ticket accounts passed to a draw
// -------------------------

// Tickets are read one at a time on the stack; only the draw fields are kept.
pub fn load_round_tickets(
    program_id: &Pubkey,
    round_id: u64,
    accounts: &[AccountInfo],
) -> Result<Vec<DrawEntry>> {
    require!(
        accounts.len() <= MAX_TICKETS_PER_ROUND,
        LotteryError::InvalidTicketAccounts
    );

    let round_le = round_id.to_le_bytes();
    let mut entries = Vec::with_capacity(accounts.len());

    for (i, ai) in accounts.iter().enumerate() {
        require_keys_eq!(*ai.owner, *program_id, LotteryError::TicketPdaMismatch);

        let ticket: Ticket = {
            let data = ai.try_borrow_data()?;
            let mut slice: &[u8] = &data;
            Ticket::try_deserialize(&mut slice)?
        };

        let id_le = (i as u64).to_le_bytes();
        let expected = Pubkey::create_program_address(
            &[TICKET_SEED, &round_le, &id_le, &[ticket.bump]],
            program_id,
        )
        .map_err(|_| error!(LotteryError::TicketPdaMismatch))?;
        require_keys_eq!(expected, *ai.key, LotteryError::TicketPdaMismatch);

        entries.push(DrawEntry::from(&ticket));
    }

    Ok(entries)
}

// -------------------------
// Optional accounts
// -------------------------

/// `None` while the PDA has not been created (or belongs to another program).
pub fn read_account<T: AccountDeserialize + Owner>(ai: &AccountInfo) -> Result<Option<T>> {
    if ai.data_is_empty() || *ai.owner != T::owner() {
        return Ok(None);
    }
    let data = ai.try_borrow_data()?;
    let mut slice: &[u8] = &data;
    Ok(Some(T::try_deserialize(&mut slice)?))
}

/// Serializes `value` back over an account this program owns.
pub fn write_account<T: AccountSerialize + Owner>(ai: &AccountInfo, value: &T) -> Result<()> {
    require_keys_eq!(*ai.owner, T::owner(), anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram);
    let mut data = ai.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data;
    value.try_serialize(&mut writer)
}

// -------------------------
// ed25519 introspection
// -------------------------
pub fn parse_ed25519_ix_pubkey_and_msg(ix: &Instruction) -> Result<(Pubkey, Vec<u8>)> {
    require!(
        ix.program_id == ed25519_program_id(),
        LotteryError::MissingOrInvalidEd25519Ix
    );

    let data = &ix.data;
    require!(data.len() >= 16, LotteryError::MissingOrInvalidEd25519Ix);

    let num_sigs = data[0];
    require!(num_sigs == 1, LotteryError::MissingOrInvalidEd25519Ix);

    // Offsets must point into this same instruction (index == u16::MAX)
    let sig_ix = u16::from_le_bytes([data[4], data[5]]);
    let pk_ix = u16::from_le_bytes([data[8], data[9]]);
    let msg_ix = u16::from_le_bytes([data[14], data[15]]);
    require!(sig_ix == u16::MAX, LotteryError::MissingOrInvalidEd25519Ix);
    require!(pk_ix == u16::MAX, LotteryError::MissingOrInvalidEd25519Ix);
    require!(msg_ix == u16::MAX, LotteryError::MissingOrInvalidEd25519Ix);

    let pk_off = u16::from_le_bytes([data[6], data[7]]) as usize;
    let msg_off = u16::from_le_bytes([data[10], data[11]]) as usize;
    let msg_sz = u16::from_le_bytes([data[12], data[13]]) as usize;

    require!(pk_off + 32 <= data.len(), LotteryError::MissingOrInvalidEd25519Ix);
    require!(msg_off + msg_sz <= data.len(), LotteryError::MissingOrInvalidEd25519Ix);

    let pk_bytes: [u8; 32] = data[pk_off..pk_off + 32]
        .try_into()
        .map_err(|_| error!(LotteryError::MissingOrInvalidEd25519Ix))?;
    let msg = data[msg_off..msg_off + msg_sz].to_vec();

    Ok((Pubkey::new_from_array(pk_bytes), msg))
}

/// Message signed by `signer` in an ed25519 instruction.
pub fn signed_message_from(ix: &Instruction, signer: &Pubkey) -> Result<Vec<u8>> {
    let (pk, msg) = parse_ed25519_ix_pubkey_and_msg(ix)?;
    require_keys_eq!(pk, *signer, LotteryError::Ed25519PubkeyMismatch);
    Ok(msg)
}

// Tx layout must be: [ ed25519_verify(coprocessor), <lottery ix> ]
pub fn load_coprocessor_message(coprocessor: &Pubkey, ix_sys: &AccountInfo) -> Result<Vec<u8>> {
    require!(*coprocessor != Pubkey::default(), LotteryError::CoprocessorNotSet);

    let current_ix = load_current_index_checked(ix_sys)? as usize;
    require!(current_ix >= 1, LotteryError::MissingOrInvalidEd25519Ix);

    let ed_ix = load_instruction_at_checked(current_ix - 1, ix_sys)
        .map_err(|_| error!(LotteryError::MissingOrInvalidEd25519Ix))?;

    signed_message_from(&ed_ix, coprocessor)
}
