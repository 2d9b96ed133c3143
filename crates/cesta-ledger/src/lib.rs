pub mod catalog;
pub mod prices;
pub mod sessions;

pub use catalog::Catalog;
pub use prices::PriceLedger;
pub use sessions::SessionRecorder;
