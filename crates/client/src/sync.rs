//! Loads the already-labeled cells from the backend.
use std::sync::Arc;

use gridloc_shared::grid::Cell;
use gridloc_shared::models::CoordinateEntry;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::NetworkClient;
use crate::error::ApiError;
use crate::notice::Notice;
use crate::session::Update;
use crate::view::GridView;

/// Fetch `/coordinates` in the background and post the result back.
pub fn spawn_sync<C: NetworkClient>(
    client: Arc<C>,
    updates: UnboundedSender<Update>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = client.fetch_visited().await;
        if updates.send(Update::Visited(result)).is_err() {
            debug!("session closed, dropping visited cells");
        }
    })
}

pub fn apply_visited(
    view: &mut GridView,
    result: Result<Vec<CoordinateEntry>, ApiError>,
) -> Option<Notice> {
    let entries = match result {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "failed to load visited cells");
            return Some(Notice::SyncFailed(e.to_string()));
        }
    };
    let total = entries.len();
    let cells: Vec<Cell> = entries
        .into_iter()
        .filter_map(|entry| {
            let cell = Cell::from_signed(entry.row, entry.col);
            if cell.is_none() {
                warn!(row = entry.row, col = entry.col, "ignoring out-of-range visited cell");
            }
            cell
        })
        .collect();
    let added = view.set_visited_locations(cells);
    info!(total, added, "visited cells loaded");
    None
}
