//! Terminal client for a chess position generation backend.
//!
//! The two page components, [`generation::GenerationPanel`] and
//! [`navigation::NavbarWidget`], work on a headless [`page::Document`] and
//! talk to the backend through [`api::ApiClient`]. The `chessgen` binary
//! drives them from the command line; tests drive them with fakes.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod messages;
pub mod navigation;
pub mod page;
pub mod storage;
