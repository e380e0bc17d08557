//! Collection access over either store backend.
//!
//! Postgres keeps each document as JSONB next to the columns it is looked up
//! by. Single-document mutations lock the row, apply the domain update in
//! process, and write the document back inside one transaction.

pub mod case;
pub mod notification;
pub mod user;
