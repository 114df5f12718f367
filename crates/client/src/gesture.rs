//! Raw pointer input to pinch and tap gestures.
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { id: u32, x: f64, y: f64 },
    Move { id: u32, x: f64, y: f64 },
    Up { id: u32, x: f64, y: f64 },
    /// The platform took the gesture away; forget every pointer.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Multiply the current scale by this factor.
    Pinch(f64),
    /// Single-pointer tap at a view position.
    Tap { x: f64, y: f64 },
}

/// Spans shorter than this are treated as touching fingers and ignored.
const MIN_SPAN: f64 = 1.0;

#[derive(Debug, Default)]
pub struct GestureTracker {
    pointers: BTreeMap<u32, (f64, f64)>,
    /// Pointer that may still become a tap. Cleared once a second pointer lands.
    tap_candidate: Option<u32>,
    last_span: Option<f64>,
}

fn span(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    fn current_span(&self) -> Option<f64> {
        let mut it = self.pointers.values();
        let a = *it.next()?;
        let b = *it.next()?;
        Some(span(a, b)).filter(|s| *s >= MIN_SPAN)
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        match event {
            PointerEvent::Down { id, x, y } => {
                self.pointers.insert(id, (x, y));
                if self.pointers.len() == 1 {
                    self.tap_candidate = Some(id);
                } else {
                    self.tap_candidate = None;
                }
                self.last_span = self.current_span();
                None
            }
            PointerEvent::Move { id, x, y } => {
                let pos = self.pointers.get_mut(&id)?;
                *pos = (x, y);
                if self.pointers.len() < 2 {
                    return None;
                }
                let now = self.current_span();
                let prev = self.last_span;
                self.last_span = now;
                match (prev, now) {
                    (Some(prev), Some(now)) if now != prev => Some(Gesture::Pinch(now / prev)),
                    _ => None,
                }
            }
            PointerEvent::Up { id, x, y } => {
                self.pointers.remove(&id)?;
                self.last_span = self.current_span();
                if self.tap_candidate == Some(id) && self.pointers.is_empty() {
                    self.tap_candidate = None;
                    return Some(Gesture::Tap { x, y });
                }
                None
            }
            PointerEvent::Cancel => {
                self.pointers.clear();
                self.tap_candidate = None;
                self.last_span = None;
                None
            }
        }
    }
}
