pub mod balance;
pub mod classifier;
pub mod reconstructor;
pub mod reports;
pub mod scheduler;
pub mod service;
pub mod store;

pub use service::LedgerService;
