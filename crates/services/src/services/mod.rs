pub mod habits;
pub mod ledger;
pub mod progress;
