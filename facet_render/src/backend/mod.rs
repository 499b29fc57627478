//! GPU buffer backends.

#[cfg(windows)]
mod d3d12;
mod headless;

#[cfg(windows)]
pub use d3d12::D3d12Backend;
pub use headless::HeadlessBackend;

use crate::{error::RenderError, id::BufferId};

/// Buffer allocation surface the renderer needs from a graphics API.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Allocates a vertex buffer sized for `contents` and fills it.
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8])
        -> Result<BufferId, RenderError>;

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), RenderError>;

    fn buffer_size(&self, id: BufferId) -> Option<u64>;
}
