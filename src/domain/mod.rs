//! Domain layer: card validation rules, monetary value objects, ledger and
//! gateway data shapes, and the ports the application layer depends on.

pub mod card;
pub mod gateway;
pub mod money;
pub mod ports;
pub mod transaction;
