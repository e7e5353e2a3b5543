use physics::{BodyTransform, TransformSink};
use tracing::{debug, info};

/// Writes every synchronised pose to the log.
#[derive(Debug, Default)]
pub struct LoggingSink {
    pub updates: usize,
    /// Disabled bodies reported so far
    pub hidden: usize,
}

impl TransformSink for LoggingSink {
    fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if !enabled {
            self.hidden += 1;
            debug!(id, "hidden");
        }
        true
    }

    fn update_transform(&mut self, id: &str, transform: &BodyTransform) -> bool {
        self.updates += 1;
        info!(id, position = ?transform.position, orientation = ?transform.orientation, "pose");
        true
    }
}
