//! Trial Game Server - SpacetimeDB Module
//!
//! Classroom investment game running as a SpacetimeDB module. Game state
//! and team records live in public tables; the operator console and team
//! clients subscribe to them and call reducers. All rules come from
//! trialgame-logic.

mod reducers;
mod tables;

pub use reducers::*;
pub use tables::*;
