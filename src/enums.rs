use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─── Currency ────────────────────────────────────────────────────────

/// Supported deposit tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Usdt,
    Usdc,
    Busd,
    Bnb,
    Eth,
    Matic,
}

impl Currency {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usdt => "USDT",
            Currency::Usdc => "USDC",
            Currency::Busd => "BUSD",
            Currency::Bnb => "BNB",
            Currency::Eth => "ETH",
            Currency::Matic => "MATIC",
        }
    }

    pub fn all() -> &'static [Currency] {
        &[
            Currency::Usdt,
            Currency::Usdc,
            Currency::Busd,
            Currency::Bnb,
            Currency::Eth,
            Currency::Matic,
        ]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USDT" => Ok(Currency::Usdt),
            "USDC" => Ok(Currency::Usdc),
            "BUSD" => Ok(Currency::Busd),
            "BNB" => Ok(Currency::Bnb),
            "ETH" => Ok(Currency::Eth),
            "MATIC" | "POL" => Ok(Currency::Matic),
            _ => Err(AppError::validation(format!(
                "Unsupported currency: {}. Supported: USDT, USDC, BUSD, BNB, ETH, MATIC",
                s
            ))),
        }
    }
}

// ─── Network ─────────────────────────────────────────────────────────

/// Supported settlement networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Bep20,
    Trc20,
    Erc20,
    Polygon,
}

impl Network {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bep20 => "BEP20",
            Network::Trc20 => "TRC20",
            Network::Erc20 => "ERC20",
            Network::Polygon => "POLYGON",
        }
    }

    pub fn all() -> &'static [Network] {
        &[Network::Bep20, Network::Trc20, Network::Erc20, Network::Polygon]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BEP20" | "BSC" => Ok(Network::Bep20),
            "TRC20" | "TRON" => Ok(Network::Trc20),
            "ERC20" | "ETH" => Ok(Network::Erc20),
            "POLYGON" | "MATIC" => Ok(Network::Polygon),
            _ => Err(AppError::validation(format!(
                "Unsupported network: {}. Supported: BEP20, TRC20, ERC20, POLYGON",
                s
            ))),
        }
    }
}

// ─── DepositStatus ───────────────────────────────────────────────────

/// Deposit lifecycle. CANCELLED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "PENDING",
            DepositStatus::Confirmed => "CONFIRMED",
            DepositStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(DepositStatus::Pending),
            "CONFIRMED" => Ok(DepositStatus::Confirmed),
            "CANCELLED" => Ok(DepositStatus::Cancelled),
            _ => Err(AppError::validation(format!("Unknown deposit status: {}", s))),
        }
    }
}

// ─── DepositType ─────────────────────────────────────────────────────

/// Distinguishes chain-detected deposits from admin credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositType {
    Automatic,
    ManualAdmin,
}

impl DepositType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositType::Automatic => "AUTOMATIC",
            DepositType::ManualAdmin => "MANUAL_ADMIN",
        }
    }
}

impl fmt::Display for DepositType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AUTOMATIC" => Ok(DepositType::Automatic),
            "MANUAL_ADMIN" => Ok(DepositType::ManualAdmin),
            _ => Err(AppError::validation(format!("Unknown deposit type: {}", s))),
        }
    }
}

// ─── WalletOperationKind ─────────────────────────────────────────────

/// Balance-affecting ledger operation.
///
/// DEPOSIT credits the balance, WITHDRAWAL debits it. REFUND compensates
/// a prior credit: it debits the balance while leaving the running
/// deposit/withdrawal aggregates untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletOperationKind {
    Deposit,
    Withdrawal,
    Refund,
}

impl WalletOperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletOperationKind::Deposit => "DEPOSIT",
            WalletOperationKind::Withdrawal => "WITHDRAWAL",
            WalletOperationKind::Refund => "REFUND",
        }
    }

    /// The delta this operation applies to the wallet balance.
    pub fn signed_delta(&self, amount: Decimal) -> Decimal {
        match self {
            WalletOperationKind::Deposit => amount,
            WalletOperationKind::Withdrawal | WalletOperationKind::Refund => -amount,
        }
    }
}

impl fmt::Display for WalletOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletOperationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEPOSIT" => Ok(WalletOperationKind::Deposit),
            "WITHDRAWAL" => Ok(WalletOperationKind::Withdrawal),
            "REFUND" => Ok(WalletOperationKind::Refund),
            _ => Err(AppError::validation(format!("Unknown wallet operation: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_credits_the_balance() {
        let amount = Decimal::new(10_000, 2); // 100.00
        assert_eq!(WalletOperationKind::Deposit.signed_delta(amount), amount);
    }

    #[test]
    fn withdrawal_and_refund_debit_the_balance() {
        let amount = Decimal::new(2_550, 2); // 25.50
        assert_eq!(WalletOperationKind::Withdrawal.signed_delta(amount), -amount);
        assert_eq!(WalletOperationKind::Refund.signed_delta(amount), -amount);
    }

    #[test]
    fn currency_rejects_unsupported_token() {
        assert!("DOGE".parse::<Currency>().is_err());
        assert_eq!("usdt".parse::<Currency>().unwrap(), Currency::Usdt);
    }

    #[test]
    fn network_rejects_unsupported_chain() {
        assert!("SOLANA".parse::<Network>().is_err());
        assert_eq!("trc20".parse::<Network>().unwrap(), Network::Trc20);
    }
}
