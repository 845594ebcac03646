use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use super::report::{Outcome, Report};
use crate::{
    config,
    deezer::DeezerClient,
    error::{PlaylistError, Result},
    info,
    playlists::{Manager, TrackProvider},
    results::ResultSet,
    spotify::SpotifyClient,
    types::Track,
    success, utils, warning,
};

/// Streaming service the playlist is created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Spotify,
    Deezer,
}

#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub target: Target,
    /// Text file with one song query per line.
    pub file: PathBuf,
    /// Playlist name; defaults to the file name without extension.
    pub name: Option<String>,
    pub random_suffix: bool,
    pub concurrency: Option<usize>,
    /// Skip the confirmation prompt before pushing.
    pub yes: bool,
}

/// Builds the provider for `target` from the environment.
pub fn build_provider(target: Target) -> Result<Arc<dyn TrackProvider>> {
    let provider: Arc<dyn TrackProvider> = match target {
        Target::Spotify => {
            let token = config::spotify_token()?;
            Arc::new(SpotifyClient::new(token).map_err(|source| PlaylistError::Setup {
                provider: crate::spotify::PROVIDER_NAME.to_string(),
                source,
            })?)
        }
        Target::Deezer => {
            let arl = config::deezer_arl_cookie()?;
            Arc::new(DeezerClient::new(arl).map_err(|source| PlaylistError::Setup {
                provider: crate::deezer::PROVIDER_NAME.to_string(),
                source,
            })?)
        }
    };

    Ok(provider)
}

/// Reads the song list, one trimmed, non-empty query per line.
pub async fn read_songs(path: &Path) -> Result<Vec<String>> {
    let text = async_fs::read_to_string(path).await?;
    let songs = utils::lines(&text);

    if songs.is_empty() {
        return Err(PlaylistError::EmptyInput(path.to_path_buf()));
    }

    Ok(songs)
}

/// Searches every song of `opts.file` and creates the playlist.
pub async fn create(opts: CreateOptions, cancel: CancellationToken) -> Result<()> {
    let provider = build_provider(opts.target)?;
    run(provider, opts, cancel).await
}

/// [`create`] against an already built provider.
pub async fn run(
    provider: Arc<dyn TrackProvider>,
    opts: CreateOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let songs = read_songs(&opts.file).await?;

    let base_name = opts
        .name
        .clone()
        .unwrap_or_else(|| utils::playlist_name_from_path(&opts.file));
    let random_suffix = opts.random_suffix || config::append_random_name()?;
    let name = utils::playlist_name(&base_name, random_suffix);

    let concurrency = match opts.concurrency {
        Some(c) => c,
        None => config::max_concurrency()?,
    };

    let manager = Manager::new(provider, concurrency);
    info!(
        "Searching {} songs on {}",
        songs.len(),
        manager.provider_name()
    );

    let results = Arc::new(ResultSet::new(songs.len()));
    let report = Arc::new(Report::new(songs.len()));
    let pb = progress_bar(songs.len() as u64);

    let gathered = {
        let results = Arc::clone(&results);
        let report = Arc::clone(&report);
        let pb = pb.clone();

        manager
            .gather(&cancel, songs.clone(), move |slot, query, matches| {
                pb.inc(1);

                let outcome = commit_first(&results, slot, matches);
                match (&outcome, matches.first()) {
                    (Outcome::NotFound, None) => {
                        pb.suspend(|| warning!("{:?}: track not found", query))
                    }
                    (Outcome::NotFound, Some(track)) => pb.suspend(|| {
                        warning!(
                            "{:?}: candidate {:?} has no id, treated as not found",
                            query,
                            track.name
                        )
                    }),
                    (Outcome::Duplicate { slot: first, .. }, Some(track)) => pb.suspend(|| {
                        warning!(
                            "Duplicated track for {:?}: id {}, name {:?} (already matched by line {})",
                            query,
                            track.id,
                            track.name,
                            first + 1
                        )
                    }),
                    _ => {}
                }
                report.set(slot, outcome);
            })
            .await
    };

    pb.finish_and_clear();
    let summary = gathered?;

    println!("{}", Table::new(report.rows(&songs)));
    success!(
        "Found {} of {} songs ({} candidates)",
        summary.resolved,
        songs.len(),
        summary.matches
    );

    if results.is_empty() {
        warning!("Nothing to add, playlist not created");
        return Ok(());
    }

    let tracks = results.slice();
    info!("Creating playlist {:?} with {} tracks", name, tracks.len());

    if !opts.yes && !confirm(&cancel).await? {
        warning!("Playlist not created");
        return Ok(());
    }

    let spinner = spinner("Creating playlist...");
    let pushed = manager.push(&cancel, &name, &tracks).await;
    spinner.finish_and_clear();

    let playlist_id = pushed?;
    success!("Playlist {:?} created (id {})", name, playlist_id);

    Ok(())
}

/// Commits the best candidate of `slot` into `results`.
///
/// The first candidate is the only one considered. A candidate without an id
/// counts as not found, and a candidate already held by another slot is a
/// duplicate of that slot.
pub fn commit_first(results: &ResultSet, slot: usize, matches: &[Track]) -> Outcome {
    let Some(track) = matches.first() else {
        return Outcome::NotFound;
    };

    match results.add(slot, &track.id) {
        (true, _) => Outcome::Added {
            name: track.name.clone(),
            candidates: matches.len(),
        },
        (false, Some(first)) => Outcome::Duplicate {
            name: track.name.clone(),
            slot: first,
        },
        (false, None) => Outcome::NotFound,
    }
}

/// Waits for the user to press Enter. Returns false on end of input.
async fn confirm(cancel: &CancellationToken) -> Result<bool> {
    println!("Press the Enter key to continue");

    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());

    let read = tokio::select! {
        _ = cancel.cancelled() => return Err(PlaylistError::Cancelled),
        read = stdin.read_line(&mut line) => read?,
    };

    Ok(read > 0)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message("Searching tracks...");
    pb
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
