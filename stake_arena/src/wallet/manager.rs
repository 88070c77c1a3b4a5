//! In-memory wallet manager with double-entry ledger and tournament escrow.

use super::{
    errors::{WalletError, WalletResult},
    escrow::Escrow,
    models::{EntryDirection, EntryType, TournamentEscrow, Wallet, WalletEntry},
};
use crate::tournament::models::{Amount, PlayerId, TournamentId};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

#[derive(Default)]
struct Ledger {
    wallets: HashMap<PlayerId, Wallet>,
    escrows: HashMap<TournamentId, TournamentEscrow>,
    entries: Vec<WalletEntry>,
    next_entry_id: i64,
}

impl Ledger {
    fn wallet_mut(&mut self, user_id: PlayerId) -> &mut Wallet {
        self.wallets.entry(user_id).or_insert_with(|| {
            let now = Utc::now();
            Wallet {
                user_id,
                balance: 0,
                created_at: now,
                updated_at: now,
            }
        })
    }

    fn escrow_mut(&mut self, tournament_id: TournamentId) -> &mut TournamentEscrow {
        self.escrows.entry(tournament_id).or_insert_with(|| {
            let now = Utc::now();
            TournamentEscrow {
                tournament_id,
                balance: 0,
                created_at: now,
                updated_at: now,
            }
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_entry(
        &mut self,
        user_id: PlayerId,
        tournament_id: Option<TournamentId>,
        amount: Amount,
        balance_after: Amount,
        direction: EntryDirection,
        entry_type: EntryType,
        description: Option<String>,
    ) {
        self.next_entry_id += 1;
        self.entries.push(WalletEntry {
            id: self.next_entry_id,
            user_id,
            tournament_id,
            amount,
            balance_after,
            direction,
            entry_type,
            description,
            created_at: Utc::now(),
        });
    }
}

/// Wallet manager
///
/// Every transfer checks and updates both sides under a single lock, so a
/// failed transfer leaves all balances as they were.
#[derive(Default)]
pub struct WalletManager {
    ledger: Mutex<Ledger>,
}

impl WalletManager {
    /// Create an empty wallet manager
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> WalletResult<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|_| WalletError::TransactionFailed("wallet ledger lock poisoned".to_string()))
    }

    /// Credit a user's wallet from outside the system
    ///
    /// # Returns
    ///
    /// * `WalletResult<Amount>` - New wallet balance or error
    pub fn deposit(&self, user_id: PlayerId, amount: Amount) -> WalletResult<Amount> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let mut ledger = self.lock()?;
        let wallet = ledger.wallet_mut(user_id);
        let new_balance = wallet
            .balance
            .checked_add(amount)
            .ok_or(WalletError::Overflow)?;
        wallet.balance = new_balance;
        wallet.updated_at = Utc::now();

        ledger.create_entry(
            user_id,
            None,
            amount,
            new_balance,
            EntryDirection::Credit,
            EntryType::Deposit,
            None,
        );

        Ok(new_balance)
    }

    /// Get wallet for a user
    pub fn get_wallet(&self, user_id: PlayerId) -> WalletResult<Wallet> {
        self.lock()?
            .wallets
            .get(&user_id)
            .cloned()
            .ok_or(WalletError::WalletNotFound(user_id))
    }

    /// Wallet balance, zero for unknown users
    pub fn balance(&self, user_id: PlayerId) -> WalletResult<Amount> {
        Ok(self
            .lock()?
            .wallets
            .get(&user_id)
            .map_or(0, |wallet| wallet.balance))
    }

    /// Get tournament escrow
    pub fn get_escrow(&self, tournament_id: TournamentId) -> WalletResult<TournamentEscrow> {
        self.lock()?
            .escrows
            .get(&tournament_id)
            .cloned()
            .ok_or(WalletError::EscrowNotFound(tournament_id))
    }

    /// Sum of every wallet and escrow balance
    pub fn total_supply(&self) -> WalletResult<Amount> {
        let ledger = self.lock()?;
        let wallets = ledger.wallets.values().map(|w| w.balance);
        let escrows = ledger.escrows.values().map(|e| e.balance);
        wallets
            .chain(escrows)
            .try_fold(0u128, |acc, b| acc.checked_add(b))
            .ok_or(WalletError::Overflow)
    }

    /// Most recent ledger entries for a user, newest first
    pub fn get_entries(&self, user_id: PlayerId, limit: usize) -> WalletResult<Vec<WalletEntry>> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Transfer tokens from user wallet to tournament escrow
    ///
    /// # Returns
    ///
    /// * `WalletResult<Amount>` - New wallet balance or error
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidAmount` - Zero amount
    /// * `WalletError::WalletNotFound` - User never funded
    /// * `WalletError::InsufficientBalance` - Not enough tokens
    pub fn transfer_to_escrow(
        &self,
        user_id: PlayerId,
        tournament_id: TournamentId,
        amount: Amount,
        entry_type: EntryType,
    ) -> WalletResult<Amount> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let mut ledger = self.lock()?;

        let available = ledger
            .wallets
            .get(&user_id)
            .map(|w| w.balance)
            .ok_or(WalletError::WalletNotFound(user_id))?;
        let new_balance = available
            .checked_sub(amount)
            .ok_or(WalletError::InsufficientBalance {
                user_id,
                available,
                required: amount,
            })?;
        let escrow_balance = ledger
            .escrows
            .get(&tournament_id)
            .map_or(0, |e| e.balance)
            .checked_add(amount)
            .ok_or(WalletError::Overflow)?;

        let now = Utc::now();
        let wallet = ledger.wallet_mut(user_id);
        wallet.balance = new_balance;
        wallet.updated_at = now;
        let escrow = ledger.escrow_mut(tournament_id);
        escrow.balance = escrow_balance;
        escrow.updated_at = now;

        ledger.create_entry(
            user_id,
            Some(tournament_id),
            amount,
            new_balance,
            EntryDirection::Debit,
            entry_type,
            Some(format!("{entry_type} into tournament {tournament_id}")),
        );

        Ok(new_balance)
    }

    /// Transfer tokens from tournament escrow to user wallet
    ///
    /// The wallet is created on first credit.
    ///
    /// # Errors
    ///
    /// * `WalletError::EscrowNotFound` - Unknown tournament
    /// * `WalletError::EscrowUnderfunded` - Escrow holds less than `amount`
    pub fn transfer_from_escrow(
        &self,
        user_id: PlayerId,
        tournament_id: TournamentId,
        amount: Amount,
        entry_type: EntryType,
    ) -> WalletResult<Amount> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let mut ledger = self.lock()?;

        let available = ledger
            .escrows
            .get(&tournament_id)
            .map(|e| e.balance)
            .ok_or(WalletError::EscrowNotFound(tournament_id))?;
        let escrow_balance =
            available
                .checked_sub(amount)
                .ok_or(WalletError::EscrowUnderfunded {
                    tournament_id,
                    available,
                    required: amount,
                })?;
        let new_balance = ledger
            .wallets
            .get(&user_id)
            .map_or(0, |w| w.balance)
            .checked_add(amount)
            .ok_or(WalletError::Overflow)?;

        let now = Utc::now();
        let escrow = ledger.escrow_mut(tournament_id);
        escrow.balance = escrow_balance;
        escrow.updated_at = now;
        let wallet = ledger.wallet_mut(user_id);
        wallet.balance = new_balance;
        wallet.updated_at = now;

        ledger.create_entry(
            user_id,
            Some(tournament_id),
            amount,
            new_balance,
            EntryDirection::Credit,
            entry_type,
            Some(format!("{entry_type} from tournament {tournament_id}")),
        );

        Ok(new_balance)
    }
}

impl Escrow for WalletManager {
    fn transfer_in(
        &self,
        tournament_id: TournamentId,
        payer: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> WalletResult<()> {
        self.transfer_to_escrow(payer, tournament_id, amount, kind)
            .map(|_| ())
    }

    fn transfer_out(
        &self,
        tournament_id: TournamentId,
        payee: PlayerId,
        amount: Amount,
        kind: EntryType,
    ) -> WalletResult<()> {
        self.transfer_from_escrow(payee, tournament_id, amount, kind)
            .map(|_| ())
    }
}
