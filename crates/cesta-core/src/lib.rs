pub mod day;
pub mod error;
pub mod identity;
pub mod trip;
pub mod types;

pub use day::DayBoundary;
pub use error::CestaError;
pub use trip::{BudgetStatus, ShoppingTrip};
pub use types::*;
