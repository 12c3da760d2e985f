//! Session-based balance accrual.
//!
//! Pairs login and logout events per player and credits the external account
//! store once per completed pair: one in-game hour is worth 1000 currency
//! units, fractional hours prorated.

pub mod account;
pub mod session;

pub use account::{Account, AccountStore};
pub use session::{session_credit_amount, SessionCredit, SessionLedger, CREDITS_PER_HOUR};
