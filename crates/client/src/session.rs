//! The session task owns the grid view. Input events and network results
//! are applied one at a time, in arrival order, and a new frame is
//! published whenever the view changed.
use std::sync::Arc;

use gridloc_shared::grid::Cell;
use gridloc_shared::models::{CoordinateEntry, PathResponse, PredictedLocation};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::NetworkClient;
use crate::collect::{self, Collector};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::gesture::PointerEvent;
use crate::notice::Notice;
use crate::path;
use crate::polling::{self, PollLoop, PollSettings};
use crate::sensors::SensorSource;
use crate::sync;
use crate::view::{Frame, GridView};

/// What the host asks for after a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    Navigate(Cell),
    Collect(Cell),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Pointer(PointerEvent),
    /// Scale factor from a native pinch detector.
    Pinch(f64),
    Action(TapAction),
    ScanWifi,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapEvent {
    pub cell: Cell,
}

/// Results posted back by background network tasks.
#[derive(Debug)]
pub enum Update {
    Visited(Result<Vec<CoordinateEntry>, ApiError>),
    Path {
        goal: Cell,
        result: Result<PathResponse, ApiError>,
    },
    Predicted(Result<PredictedLocation, ApiError>),
    SampleSubmitted {
        cell: Cell,
        result: Result<String, ApiError>,
    },
}

pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    pub frames: watch::Receiver<Arc<Frame>>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
    pub taps: mpsc::UnboundedReceiver<TapEvent>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue an event. Returns `false` once the session has stopped.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub async fn shutdown(self) {
        let _ = self.events.send(SessionEvent::Shutdown);
        let _ = self.task.await;
    }
}

pub struct Session<C, S> {
    view: GridView,
    client: Arc<C>,
    sensors: Arc<S>,
    collector: Collector,
    poll_settings: PollSettings,
    updates: mpsc::UnboundedSender<Update>,
    frames: watch::Sender<Arc<Frame>>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<C: NetworkClient, S: SensorSource> Session<C, S> {
    /// Start a session on the current runtime.
    pub fn spawn(config: &ClientConfig, client: Arc<C>, sensors: Arc<S>) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (taps_tx, taps_rx) = mpsc::unbounded_channel();

        let mut view = GridView::new(config.grid, Some(config.start_location));
        view.on_cell_tap(move |cell| {
            let _ = taps_tx.send(TapEvent { cell });
        });
        view.take_invalidated();
        let (frames_tx, frames_rx) = watch::channel(Arc::new(view.draw()));

        let access_points: Arc<[String]> = config.access_points.iter().cloned().collect();
        let session = Session {
            view,
            client,
            sensors,
            collector: Collector::new(config.grid, access_points.clone(), config.scan_interval),
            poll_settings: PollSettings {
                period: config.poll_interval,
                access_points,
                missing_rssi: config.missing_rssi,
            },
            updates: updates_tx,
            frames: frames_tx,
            notices: notices_tx,
        };
        let task = tokio::spawn(session.run(events_rx, updates_rx));

        SessionHandle {
            events: events_tx,
            frames: frames_rx,
            notices: notices_rx,
            taps: taps_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        mut updates: mpsc::UnboundedReceiver<Update>,
    ) {
        info!(grid = self.view.spec().size, "session started");
        sync::spawn_sync(self.client.clone(), self.updates.clone());
        let poll = PollLoop::start(
            self.client.clone(),
            self.sensors.clone(),
            self.poll_settings.clone(),
            self.updates.clone(),
        );

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event),
                },
                Some(update) = updates.recv() => self.handle_update(update),
            }
            if self.view.take_invalidated() {
                self.frames.send_replace(Arc::new(self.view.draw()));
            }
        }

        poll.shutdown().await;
        info!("session stopped");
    }

    fn notify(&self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            debug!(%notice, "notice");
            let _ = self.notices.send(notice);
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Pointer(pointer) => {
                self.view.handle_pointer(pointer);
            }
            SessionEvent::Pinch(delta) => {
                self.view.apply_pinch(delta);
            }
            SessionEvent::Action(TapAction::Navigate(goal)) => {
                let notice = path::navigate(&self.view, &self.client, goal, &self.updates);
                self.notify(notice);
            }
            SessionEvent::Action(TapAction::Collect(cell)) => {
                match self.collector.prepare(cell, self.sensors.as_ref()) {
                    Ok(sample) => {
                        collect::spawn_submit(self.client.clone(), sample, self.updates.clone());
                    }
                    Err(e) => self.notify(Some(Notice::CollectionRejected(e))),
                }
            }
            SessionEvent::ScanWifi => {
                let notice = self.collector.scan(self.sensors.as_ref());
                self.notify(Some(notice));
            }
            SessionEvent::Shutdown => {}
        }
    }

    fn handle_update(&mut self, update: Update) {
        let notice = match update {
            Update::Visited(result) => sync::apply_visited(&mut self.view, result),
            Update::Path { goal, result } => path::apply_path(&mut self.view, goal, result),
            Update::Predicted(result) => polling::apply_prediction(&mut self.view, result),
            Update::SampleSubmitted { cell, result } => {
                let notice = collect::apply_submit(cell, result);
                if matches!(notice, Notice::SampleSubmitted(_)) {
                    sync::spawn_sync(self.client.clone(), self.updates.clone());
                }
                Some(notice)
            }
        };
        self.notify(notice);
    }
}
