//! "Navigate here": ask the backend for a route from the user to a cell.
use std::sync::Arc;

use gridloc_shared::grid::Cell;
use gridloc_shared::models::{PathRequest, PathResponse};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::api::NetworkClient;
use crate::error::ApiError;
use crate::notice::Notice;
use crate::session::Update;
use crate::view::GridView;

/// Start a path request from the current user location to `goal`.
/// Without a user location there is nothing to route from.
pub fn navigate<C: NetworkClient>(
    view: &GridView,
    client: &Arc<C>,
    goal: Cell,
    updates: &UnboundedSender<Update>,
) -> Option<Notice> {
    let Some(start) = view.user_location() else {
        warn!(%goal, "no user location, cannot request a path");
        return Some(Notice::NoPath);
    };
    let client = client.clone();
    let updates = updates.clone();
    tokio::spawn(async move {
        let result = client.shortest_path(PathRequest::new(start, goal)).await;
        if updates.send(Update::Path { goal, result }).is_err() {
            debug!(%goal, "session closed, dropping path");
        }
    });
    None
}

pub fn apply_path(
    view: &mut GridView,
    goal: Cell,
    result: Result<PathResponse, ApiError>,
) -> Option<Notice> {
    let response = match result {
        Ok(response) => response,
        Err(e) if e.is_not_found() => {
            debug!(%goal, "no path");
            return Some(Notice::NoPath);
        }
        Err(e) => {
            warn!(%goal, error = %e, "path request failed");
            return Some(Notice::NoPath);
        }
    };
    let Some(cells) = response.cells() else {
        warn!(%goal, "path contains negative coordinates");
        return Some(Notice::NoPath);
    };
    let len = cells.len();
    if !view.set_path(cells) {
        return Some(Notice::NoPath);
    }
    info!(%goal, len, "path updated");
    None
}
