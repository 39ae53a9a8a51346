//! Folio
//!
//! Document delivery and presentation pipeline for a portfolio site: a
//! compiler from markdown-style documents to render trees, a small content
//! API over a directory of documents, and the client half (content cache,
//! reader sheet state machine, render-tree interpreter).
//!
//! # Modules
//!
//! - `library`: document files and their metadata headers
//! - `document`: body compiler and render tree types
//! - `service`, `routes`: list/detail operations and their HTTP surface
//! - `client`: deduplicating content cache over the HTTP API
//! - `sheet`: reader panel lifecycle, gestures and animation gating
//! - `render`: render tree to presentation widgets

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod library;
pub mod render;
pub mod routes;
pub mod service;
pub mod sheet;
pub mod state;
