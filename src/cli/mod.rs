//! # CLI Module
//!
//! Command-line front end of plcreator. It owns everything around the core
//! gather/push engine that deals with the user: reading the song file,
//! picking the provider from the environment, progress output, the results
//! table and the confirmation prompt.
//!
//! ## Commands
//!
//! - [`create`] - Searches every line of a text file and creates a playlist
//!   from the best matches
//!
//! ## Data Flow
//!
//! ```text
//! song file ──► read_songs ──► Manager::gather ──► ResultSet
//!                                   │                  │
//!                          warnings + table      Manager::push
//! ```
//!
//! For every query the first candidate returned by the provider is used.
//! Queries without candidates and candidates already claimed by an earlier
//! line are reported as warnings and left out of the playlist.
//!
//! ## Usage Patterns
//!
//! ```bash
//! plcreator create spotify songs.txt                  # playlist "songs"
//! plcreator create deezer songs.txt --name "Road trip" --yes
//! plcreator create spotify songs.txt --random-suffix --concurrency 20
//! ```

mod create;
mod report;

pub use create::{CreateOptions, Target, build_provider, commit_first, create, read_songs, run};
pub use report::{Outcome, Report};
