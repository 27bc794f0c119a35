use super::event::HapticEvent;

pub const DEFAULT_DEADBAND: f32 = 0.15;

/// Collapses runs of near-identical impact events into their first occurrence.
#[derive(Clone, Copy, Debug)]
pub struct Compactor {
    deadband: f32,
}

impl Default for Compactor {
    fn default() -> Self {
        Self::new(DEFAULT_DEADBAND)
    }
}

impl Compactor {
    pub fn new(deadband: f32) -> Self {
        Self {
            deadband: deadband.max(0.0),
        }
    }

    /// A compactor that keeps every event.
    pub fn disabled() -> Self {
        Self { deadband: 0.0 }
    }

    pub fn deadband(&self) -> f32 {
        self.deadband
    }

    /// Drop each event whose kind matches the last retained event and whose
    /// intensity is within the deadband of it. Notifications are always kept.
    pub fn compact(&self, events: &[HapticEvent]) -> Vec<HapticEvent> {
        let mut kept: Vec<HapticEvent> = Vec::with_capacity(events.len());
        for event in events {
            let redundant = !event.kind.is_notification()
                && kept.last().is_some_and(|last| {
                    last.kind == event.kind
                        && (last.intensity - event.intensity).abs() < self.deadband
                });
            if !redundant {
                kept.push(*event);
            }
        }
        kept
    }
}
