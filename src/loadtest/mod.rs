//! Loadtest command handlers.
//!
//! This module contains the handler for the populate command.

pub mod populate;
