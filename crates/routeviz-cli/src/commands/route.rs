//! Route command handler: select, search, play back, summarise.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use routeviz_lib::{
    Coordinate, Dataset, Error, LocalMapProvider, MapProvider, RunSummary, Session, SessionConfig,
};

use crate::output::render_run;
use crate::{OutputFormat, RouteArgs};

/// Build the session configuration: file, then environment, then flags.
pub fn resolve_config(args: &RouteArgs) -> Result<SessionConfig> {
    let base = match &args.config {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let mut config = base
        .apply_env()
        .context("invalid ROUTEVIZ_* environment override")?;

    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm.into();
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    if let Some(radius_km) = args.radius_km {
        config.radius_km = radius_km;
    }
    config.validate().context("invalid command-line option")?;
    Ok(config)
}

/// Handle the route subcommand.
///
/// Runs the full selection, search and playback cycle headlessly with a
/// fixed frame delta and writes the result to stdout.
pub async fn handle_route_command(
    dataset: Dataset,
    args: &RouteArgs,
    format: OutputFormat,
) -> Result<()> {
    if !args.frame_ms.is_finite() || args.frame_ms <= 0.0 {
        bail!("--frame-ms must be a positive number");
    }
    let config = resolve_config(args)?;
    let provider = LocalMapProvider::new(dataset, config.snap_radius_km);

    let from = endpoint(&provider, args.from, args.from_place.as_deref()).await?;
    let to = endpoint(&provider, args.to, args.to_place.as_deref()).await?;

    let mut session = Session::new(config);
    session
        .select_start(&provider, from)
        .await
        .map_err(friendly)
        .with_context(|| format!("failed to select start point {from}"))?;
    session
        .select_end(&provider, to)
        .await
        .map_err(friendly)
        .with_context(|| format!("failed to select end point {to}"))?;

    session.start().map_err(friendly)?;
    let ticked = session
        .play_to_end(args.frame_ms, args.max_frames)
        .map_err(friendly)?;
    if session.wants_frame() {
        bail!(
            "playback did not finish within {} frames; raise --max-frames or --speed",
            args.max_frames
        );
    }
    debug!(frames = ticked, time = session.time(), "playback finished");

    let summary = RunSummary::from_session(&session).context("failed to summarise the run")?;
    info!(
        hops = summary.hops,
        visited = summary.visited,
        frames = summary.frames,
        "route computed"
    );
    print!("{}", render_run(&summary, session.waypoints(), format)?);
    Ok(())
}

async fn endpoint(
    provider: &LocalMapProvider,
    coord: Option<Coordinate>,
    place: Option<&str>,
) -> Result<Coordinate> {
    if let Some(coord) = coord {
        return Ok(coord);
    }
    let Some(name) = place else {
        bail!("either a coordinate or a place name is required");
    };
    match provider.resolve_place_name(name).await? {
        Some(coord) => Ok(coord),
        None => Err(friendly(Error::UnknownPlace {
            name: name.to_string(),
            suggestions: provider.place_suggestions(name),
        })),
    }
}

/// Attach the user-facing notification text to a library error.
fn friendly(err: Error) -> anyhow::Error {
    let message = err.notification().message;
    if message == err.to_string() {
        return anyhow::Error::new(err);
    }
    anyhow::Error::new(err).context(message)
}
