//! User Ledger
//!
//! In-memory accounts: balance, skin inventory, and the transient connection
//! handle. Mutated only while the engine's state lock is held, so there is a
//! single writer at any moment.

use crate::errors::AuthError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

/// Cosmetic item. `value` is informational only; stake equality is never
/// enforced against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skin {
    pub id: u32,
    pub name: String,
    pub value: u64,
    pub image: String,
}

/// Fixed catalog. Skins are never minted or destroyed by the core; new
/// accounts receive a starter slice of this list.
pub static SKIN_CATALOG: Lazy<Vec<Skin>> = Lazy::new(|| {
    vec![
        skin(1, "AK-47 | Redline", 50, "https://example.com/ak-redline.png"),
        skin(2, "AWP | Asiimov", 100, "https://example.com/awp-asiimov.png"),
        skin(3, "M4A4 | Howl", 200, "https://example.com/m4a4-howl.png"),
        skin(4, "Glock-18 | Fade", 300, "https://example.com/glock-fade.png"),
        skin(5, "USP-S | Kill Confirmed", 150, "https://example.com/usp-kill.png"),
        skin(6, "Knife | Doppler", 500, "https://example.com/knife-doppler.png"),
    ]
});

fn skin(id: u32, name: &str, value: u64, image: &str) -> Skin {
    Skin {
        id,
        name: name.to_string(),
        value,
        image: image.to_string(),
    }
}

/// First `count` catalog entries, granted at registration.
pub fn starter_skins(count: usize) -> Vec<Skin> {
    SKIN_CATALOG.iter().take(count).cloned().collect()
}

/// A registered user. `connection` is present only while a WebSocket is
/// attached and is cleared when the socket closes.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub username: String,
    password_hash: String,
    pub balance: u64,
    pub skins: Vec<Skin>,
    pub connection: Option<Uuid>,
}

impl UserAccount {
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(password) == self.password_hash
    }
}

/// Client-facing `{balance, skins}` view pushed after settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub balance: u64,
    pub skins: Vec<Skin>,
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// In-memory user store keyed by username. Accounts are never deleted.
#[derive(Debug, Default)]
pub struct UserLedger {
    accounts: HashMap<String, UserAccount>,
}

impl UserLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with the configured starting balance and skins.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        starting_balance: u64,
        skins: Vec<Skin>,
    ) -> Result<(), AuthError> {
        if self.accounts.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }
        self.accounts.insert(
            username.to_string(),
            UserAccount {
                username: username.to_string(),
                password_hash: hash_password(password),
                balance: starting_balance,
                skins,
                connection: None,
            },
        );
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.accounts.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn snapshot(&self, username: &str) -> Option<AccountSnapshot> {
        self.accounts.get(username).map(|account| AccountSnapshot {
            balance: account.balance,
            skins: account.skins.clone(),
        })
    }

    /// Bind a connection handle, replacing any previous one.
    pub fn attach_connection(
        &mut self,
        username: &str,
        connection: Uuid,
    ) -> Option<AccountSnapshot> {
        let account = self.accounts.get_mut(username)?;
        account.connection = Some(connection);
        Some(AccountSnapshot {
            balance: account.balance,
            skins: account.skins.clone(),
        })
    }

    /// Clear the connection handle, but only if it still belongs to this
    /// socket. A reconnect may already have replaced it.
    pub fn detach_connection(&mut self, username: &str, connection: Uuid) {
        if let Some(account) = self.accounts.get_mut(username) {
            if account.connection == Some(connection) {
                account.connection = None;
            }
        }
    }

    pub fn credit(&mut self, username: &str, amount: u64) {
        if let Some(account) = self.accounts.get_mut(username) {
            account.balance = account.balance.saturating_add(amount);
        }
    }

    /// Debit, saturating at zero. Balances are non-negative by type.
    pub fn debit(&mut self, username: &str, amount: u64) {
        if let Some(account) = self.accounts.get_mut(username) {
            account.balance = account.balance.saturating_sub(amount);
        }
    }

    /// Remove one specific skin from an inventory, returning it if owned.
    pub fn remove_skin(&mut self, username: &str, skin_id: u32) -> Option<Skin> {
        let account = self.accounts.get_mut(username)?;
        let index = account.skins.iter().position(|s| s.id == skin_id)?;
        Some(account.skins.remove(index))
    }

    pub fn add_skin(&mut self, username: &str, skin: Skin) {
        if let Some(account) = self.accounts.get_mut(username) {
            account.skins.push(skin);
        }
    }
}
