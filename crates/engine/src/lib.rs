//! Collecta engine.
//!
//! Domain model, storage and authorization for a collection-agent back
//! office, plus the pure running-balance [`Ledger`] used by every statement
//! surface.

pub use actor::{Actor, Role};
pub use currency::Currency;
pub use customers::{Customer, CustomerBalance, CustomerUpdate, NewCustomer};
pub use error::EngineError;
pub use ledger::{Ledger, LedgerEntry, LedgerRow, LedgerView};
pub use money::Money;
pub use ops::{AgentCollections, Engine, EngineBuilder, NewUser, Statement};
pub use transactions::{NewPosting, Transaction, TransactionKind};
pub use users::User;

mod actor;
mod currency;
mod customers;
mod error;
mod ledger;
mod money;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
