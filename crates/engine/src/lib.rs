//! Ledger core: entries, categories, cost centers and the rules tying them
//! together.

pub use categories::Category;
pub use cost_centers::CostCenter;
pub use entry::{Direction, Entry, EntryKind, EntryStatus, PaymentMethod};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, EntryFilter, EntryPage, PAGE_SIZE, RECENT_MAX, Totals};
pub use validation::{EntryInput, FieldError, FieldErrors, validate_entry};

mod categories;
mod cost_centers;
mod entries;
mod entry;
mod error;
mod money;
mod ops;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;
