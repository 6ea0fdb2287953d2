use crate::errors::Result;
use crate::scene::{Camera, Scene};

/// Consumes the scene after each mixer update and produces a frame.
pub trait RenderBackend {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;
}

/// Back end that renders nothing. Counts frames and logs what it would draw.
#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    frames: u64,
    last_node_count: usize,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Node count of the last rendered scene.
    #[must_use]
    pub fn last_node_count(&self) -> usize {
        self.last_node_count
    }
}

impl RenderBackend for HeadlessBackend {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        self.frames += 1;
        self.last_node_count = scene.nodes.len();
        log::trace!(
            "Frame {}: {} nodes, camera '{}' at {}",
            self.frames,
            self.last_node_count,
            camera.name,
            camera.position
        );
        Ok(())
    }
}
