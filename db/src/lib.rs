//! Persistence for berth: record models, the store traits the API is written
//! against, and the MongoDB and in-memory backends implementing them.

pub mod models;
pub mod storage;
