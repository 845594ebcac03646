//! # Playlists Module
//!
//! Backend-independent orchestration of a playlist build. It is split in two
//! phases that the command-line layer drives one after the other:
//!
//! ```text
//! queries ──► gather ──► on_result(slot, query, matches) ──► ResultSet
//!                                                                │
//!                  provider ◄── push(name, ResultSet::slice()) ◄─┘
//! ```
//!
//! - **Gather** fans the queries out to the provider with bounded
//!   concurrency and hands every candidate list to a caller supplied
//!   callback. The callback decides what gets committed.
//! - **Push** creates the playlist and then populates it, strictly in that
//!   order.
//!
//! Streaming backends plug in through the [`TrackProvider`] trait; see
//! [`crate::spotify`] and [`crate::deezer`].

mod manager;
mod provider;

pub use manager::{DEFAULT_MAX_CONCURRENCY, GatherSummary, Manager};
pub use provider::TrackProvider;
