//! # risks-wiki
//!
//! Serves The Risks Digest RSS feed as a read-only federated wiki site.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Ingest → Normalizer → Store (snapshot) → Render → Server
//!                                   ↑
//!                                Refresh
//! ```
//!
//! Every cold start rebuilds the wiki from the feed; nothing is persisted.
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve the wiki
//! risks-wiki serve --bind 127.0.0.1:8000
//!
//! # Print the sitemap, or one page
//! risks-wiki dump
//! risks-wiki dump --page welcome-visitors
//! ```

/// Application context and error types.
pub mod app;

/// Command-line interface using clap.
///
/// - `serve [--bind ADDR]` - Ingest the feed and serve the wiki
/// - `dump [--page SLUG | --index]` - Print wiki JSON once
pub mod cli;

/// TOML configuration: feed URL, bind address, refresh interval, fetch
/// timeout.
pub mod config;

/// Core domain models.
///
/// - [`FeedChannel`](domain::FeedChannel) / [`FeedItem`](domain::FeedItem): parsed feed
/// - [`Page`](domain::Page): one wiki page with its [`StoryFragment`](domain::StoryFragment)s
/// - [`SitemapEntry`](domain::SitemapEntry): sitemap row
pub mod domain;

/// HTTP fetching with conditional request support.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Feed fetch + RSS/Atom parsing into channel and items.
pub mod ingest;

/// Item HTML cleanup and title slugs.
pub mod normalizer;

/// Time-gated re-ingestion with atomic snapshot swap.
pub mod refresh;

/// Page document rendering (story items and journal).
pub mod render;

/// axum routes for the federated wiki endpoints.
pub mod server;

/// Immutable wiki snapshots, the search index and the snapshot cell.
pub mod store;
