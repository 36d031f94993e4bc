//! Application layer: the wallet ledger service and the simulated card
//! payment gateway. Both keep their state behind a single lock so every
//! balance update and its log append land together.

pub mod gateway;
pub mod ledger;
