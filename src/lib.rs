//! Note Drafter
//!
//! Turns a structured blog idea into a generated article, normalizes its
//! markdown into a canonical shape, renders previews and exports, and saves
//! the result as a note.com draft.

pub mod app;
pub mod article;
pub mod backend;
pub mod config;
pub mod error;
pub mod markdown;
pub mod routes;
pub mod state;
pub mod utils;
