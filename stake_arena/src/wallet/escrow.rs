//! Escrow transfer primitive consumed by the tournament engine.

use super::{errors::WalletResult, models::EntryType};
use crate::tournament::models::{Amount, PlayerId, TournamentId};

/// Moves tokens between participants and a tournament's escrow.
///
/// Implementations must be all-or-nothing: an `Err` means no balance changed.
/// The engine performs the transfer before touching its own state, so a
/// failed transfer aborts the whole operation.
pub trait Escrow: Send + Sync {
    /// Move `amount` from `payer` into the tournament escrow
    fn transfer_in(
        &self,
        tournament_id: TournamentId,
        payer: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> WalletResult<()>;

    /// Move `amount` from the tournament escrow to `payee`
    fn transfer_out(
        &self,
        tournament_id: TournamentId,
        payee: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> WalletResult<()>;
}
