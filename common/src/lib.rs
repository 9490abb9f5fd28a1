//! Types shared between the berth API, storage layer and CLI.

pub mod caller;
pub mod guard;
pub mod params;
pub mod views;
