//! Headless shell around the grid engine. Reads commands from stdin,
//! prints notices, and writes each frame as SVG when `GRIDLOC_SVG_OUT` is set.
use std::path::Path;
use std::sync::Arc;

use gridloc_client::api::HttpClient;
use gridloc_client::config::ClientConfig;
use gridloc_client::gesture::PointerEvent;
use gridloc_client::sensors::ReplaySensors;
use gridloc_client::session::{Session, SessionEvent, TapAction};
use gridloc_client::svg;
use gridloc_client::view::Frame;
use gridloc_client::Cell;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "commands: tap X Y | pinch DELTA | scan | go | collect | quit";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Tap { x: f64, y: f64 },
    Pinch(f64),
    Scan,
    /// Navigate to the last tapped cell.
    Go,
    /// Label the last tapped cell.
    Collect,
    Quit,
}

fn parse_number(raw: Option<&str>, what: &str) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("missing {what}"))?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid {what}: {raw}"))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some("tap") => Command::Tap {
            x: parse_number(parts.next(), "x")?,
            y: parse_number(parts.next(), "y")?,
        },
        Some("pinch") => Command::Pinch(parse_number(parts.next(), "delta")?),
        Some("scan") => Command::Scan,
        Some("go") => Command::Go,
        Some("collect") => Command::Collect,
        Some("quit") | Some("exit") => Command::Quit,
        Some(other) => return Err(format!("unknown command: {other}")),
        None => return Err("empty command".to_string()),
    };
    if parts.next().is_some() {
        return Err(format!("too many arguments: {line}"));
    }
    Ok(command)
}

fn write_frame(path: Option<&Path>, frame: &Frame) {
    let Some(path) = path else {
        return;
    };
    match std::fs::write(path, svg::render(frame)) {
        Ok(()) => debug!(path = %path.display(), revision = frame.revision, "frame written"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to write frame"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: invalid configuration: {e}");
        std::process::exit(1);
    });

    let client = HttpClient::new(&config.server_url, config.request_timeout).unwrap_or_else(|e| {
        eprintln!("Error: failed to build HTTP client: {e}");
        std::process::exit(1);
    });

    let sensors = match &config.sensor_file {
        Some(path) => ReplaySensors::load(path).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }),
        None => {
            warn!("GRIDLOC_SENSOR_FILE not set, polling will find no sensor readings");
            ReplaySensors::default()
        }
    };

    info!(
        server = %config.server_url,
        grid = config.grid.size,
        frames = sensors.len(),
        "starting gridloc"
    );

    let svg_out = config.svg_out.clone();
    let mut handle = Session::spawn(&config, Arc::new(client), Arc::new(sensors));
    let first = handle.frames.borrow_and_update().clone();
    write_frame(svg_out.as_deref(), &first);
    eprintln!("{USAGE}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_tap: Option<Cell> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Tap { x, y }) => {
                        handle.send(SessionEvent::Pointer(PointerEvent::Down { id: 0, x, y }));
                        Some(SessionEvent::Pointer(PointerEvent::Up { id: 0, x, y }))
                    }
                    Ok(Command::Pinch(delta)) => Some(SessionEvent::Pinch(delta)),
                    Ok(Command::Scan) => Some(SessionEvent::ScanWifi),
                    Ok(Command::Go) => last_tap.map(TapAction::Navigate).map(SessionEvent::Action),
                    Ok(Command::Collect) => {
                        last_tap.map(TapAction::Collect).map(SessionEvent::Action)
                    }
                    Err(e) => {
                        eprintln!("{e}\n{USAGE}");
                        continue;
                    }
                };
                match event {
                    Some(event) => {
                        handle.send(event);
                    }
                    None => eprintln!("tap a cell first"),
                }
            }
            Some(notice) = handle.notices.recv() => println!("{notice}"),
            Some(tap) = handle.taps.recv() => {
                println!("tapped {}", tap.cell);
                last_tap = Some(tap.cell);
            }
            changed = handle.frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = handle.frames.borrow_and_update().clone();
                write_frame(svg_out.as_deref(), &frame);
            }
        }
    }

    handle.shutdown().await;
    info!("bye");
}
