//! The zoomable grid: owns the scale and the render model, turns input into
//! cell taps, and draws frames.
use gridloc_shared::grid::{clamp_scale, Cell, GridSpec, Rect, LABEL_SCALE_THRESHOLD, MIN_SCALE};
use tracing::debug;

use crate::gesture::{Gesture, GestureTracker, PointerEvent};
use crate::model::{RenderModel, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Unlabeled cell, outline only.
    Grid,
    Visited,
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { rect: Rect, style: CellStyle },
    Label { x: f64, y: f64, text: String, size: f64 },
    Marker { cx: f64, cy: f64, radius: f64 },
}

/// Everything needed to paint the grid once, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub revision: u64,
    pub commands: Vec<DrawCommand>,
}

type TapHandler = Box<dyn FnMut(Cell) + Send>;

pub struct GridView {
    model: RenderModel,
    scale: f64,
    gestures: GestureTracker,
    on_tap: Option<TapHandler>,
    invalidated: bool,
}

impl std::fmt::Debug for GridView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView")
            .field("model", &self.model)
            .field("scale", &self.scale)
            .field("has_tap_handler", &self.on_tap.is_some())
            .finish()
    }
}

impl GridView {
    /// A new view starts dirty so the host draws it once.
    pub fn new(spec: GridSpec, start: Option<Cell>) -> Self {
        GridView {
            model: RenderModel::new(spec, start),
            scale: MIN_SCALE,
            gestures: GestureTracker::new(),
            on_tap: None,
            invalidated: true,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        self.model.spec()
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn user_location(&self) -> Option<Cell> {
        self.model.user_location()
    }

    fn track(&mut self, before: u64) {
        if self.model.revision() != before {
            self.invalidated = true;
        }
    }

    pub fn set_visited_locations(&mut self, cells: impl IntoIterator<Item = Cell>) -> usize {
        let before = self.model.revision();
        let added = self.model.mark_visited(cells);
        self.track(before);
        added
    }

    pub fn set_path(&mut self, path: Vec<Cell>) -> bool {
        let before = self.model.revision();
        let ok = self.model.set_path(path);
        self.track(before);
        ok
    }

    pub fn set_user_location(&mut self, location: Option<Cell>) -> bool {
        let before = self.model.revision();
        let ok = self.model.set_user_location(location);
        self.track(before);
        ok
    }

    /// Register the tap handler, replacing any previous one.
    pub fn on_cell_tap(&mut self, handler: impl FnMut(Cell) + Send + 'static) {
        self.on_tap = Some(Box::new(handler));
    }

    /// Multiply the scale by `delta`, clamped to the zoom limits.
    /// Returns whether the scale actually changed.
    pub fn apply_pinch(&mut self, delta: f64) -> bool {
        if !delta.is_finite() || delta <= 0.0 {
            debug!(delta, "ignoring invalid pinch delta");
            return false;
        }
        let next = clamp_scale(self.scale * delta);
        if next == self.scale {
            return false;
        }
        self.scale = next;
        self.invalidated = true;
        true
    }

    /// Feed one pointer event. Returns the tapped cell if this event
    /// completed a tap inside the grid.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Cell> {
        match self.gestures.handle(event)? {
            Gesture::Pinch(delta) => {
                self.apply_pinch(delta);
                None
            }
            Gesture::Tap { x, y } => self.tap_at(x, y),
        }
    }

    /// Resolve a tap at a view position and notify the handler.
    pub fn tap_at(&mut self, x: f64, y: f64) -> Option<Cell> {
        let cell = self.model.spec().view_to_cell(x, y, self.scale);
        match cell {
            Some(cell) => {
                debug!(%cell, x, y, scale = self.scale, "cell tapped");
                if let Some(handler) = self.on_tap.as_mut() {
                    handler(cell);
                }
            }
            None => debug!(x, y, scale = self.scale, "tap outside grid"),
        }
        cell
    }

    /// Whether a redraw is due; clears the flag.
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.model.snapshot()
    }

    pub fn draw(&self) -> Frame {
        let spec = self.model.spec();
        let scale = self.scale;
        let extent = spec.extent(scale);
        let mut commands = Vec::new();

        for cell in spec.cells() {
            let rect = spec.cell_rect(cell, scale);
            let style = if self.model.is_visited(cell) {
                CellStyle::Visited
            } else {
                CellStyle::Grid
            };
            commands.push(DrawCommand::Rect { rect, style });
            if scale > LABEL_SCALE_THRESHOLD {
                commands.push(DrawCommand::Label {
                    x: rect.left + 10.0 * scale,
                    y: rect.top + 40.0 * scale,
                    text: cell.label(),
                    size: 30.0 * scale,
                });
            }
        }

        for &cell in self.model.path() {
            commands.push(DrawCommand::Rect {
                rect: spec.cell_rect(cell, scale),
                style: CellStyle::Path,
            });
        }

        if let Some(cell) = self.model.user_location() {
            let (cx, cy) = spec.cell_rect(cell, scale).center();
            commands.push(DrawCommand::Marker {
                cx,
                cy,
                radius: spec.cell_size * scale / 4.0,
            });
        }

        Frame {
            width: extent,
            height: extent,
            scale,
            revision: self.model.revision(),
            commands,
        }
    }
}
