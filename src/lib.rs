#![doc(test(attr(deny(warnings))))]

//! Vault Core is an interactive console over an encrypted, hierarchical
//! credential store: groups of entries that can be browsed, searched, edited
//! and soft-deleted through a recycle bin.

pub mod cli;
pub mod config;
pub mod errors;
pub mod store;
pub mod utils;
