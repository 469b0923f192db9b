//! # Hybrid Guide
//!
//! A hybrid retrieval router and context assembler for tourism questions.
//!
//! Each question is classified by keyword vocabularies, answered from a
//! structured attraction store (hours, ticket prices), a document search
//! index (rules, tips, recommendations), or both, and the merged evidence
//! is handed to a chat model together with a grounding prompt.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐
//!   question ──▶ │    intent    │
//!                └──────┬───────┘
//!            ┌──────────┴──────────┐
//!            ▼                     ▼
//!    ┌──────────────┐      ┌──────────────┐
//!    │  structured  │      │   document   │
//!    │   (SQLite)   │      │ (AI Search)  │
//!    └──────┬───────┘      └──────┬───────┘
//!           └──────────┬──────────┘
//!                      ▼
//!              ┌──────────────┐     ┌──────────────┐
//!              │   context    │ ──▶ │  generation  │ ──▶ answer + citations
//!              └──────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! guide init                            # create database
//! guide seed data/attractions.toml      # load attraction facts
//! guide index                           # chunk, embed and upload docs
//! guide ask "Cât costă biletul la Luvru?"
//! guide serve                           # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`intent`] | Keyword intent classification |
//! | [`entity`] | Attraction name resolution |
//! | [`store`] | Structured store trait, SQLite and in-memory backends |
//! | [`structured`] | Structured retrieval path |
//! | [`document`] | Document search client and retrieval path |
//! | [`context`] | Context assembly, citations, flow label |
//! | [`generation`] | Grounding prompt and chat client |
//! | [`pipeline`] | Request orchestration |
//! | [`server`] | HTTP server |
//! | [`indexer`] | Document indexing |
//! | [`chunk`] | Text chunking |
//! | [`embedding`] | Embedding client |
//! | [`seed`] | Structured store seeding |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chunk;
pub mod config;
pub mod context;
pub mod db;
pub mod document;
pub mod embedding;
pub mod entity;
pub mod error;
pub mod generation;
pub mod http;
pub mod indexer;
pub mod intent;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod seed;
pub mod server;
pub mod store;
pub mod structured;
