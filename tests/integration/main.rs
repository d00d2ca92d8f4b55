//! Cross-layer integration tests
//!
//! Full invocations through the runtime driver: engine, budgets, and
//! transactional storage working together.

mod receipts;
