use crate::{error::RenderError, id::BufferId, vertex::Vertex};

use super::Backend;

struct HostBuffer {
    label: String,
    contents: Vec<u8>,
}

/// Keeps buffers in host memory. Used without a GPU, and by tests to read
/// back what was uploaded.
#[derive(Default)]
pub struct HeadlessBackend {
    buffers: Vec<Option<HostBuffer>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffer(id).map(|buffer| buffer.contents.as_slice())
    }

    pub fn buffer_label(&self, id: BufferId) -> Option<&str> {
        self.buffer(id).map(|buffer| buffer.label.as_str())
    }

    pub fn read_vertices(&self, id: BufferId) -> Option<Vec<Vertex>> {
        let contents = self.buffer_contents(id)?;
        Some(
            contents
                .chunks_exact(Vertex::STRIDE)
                .map(bytemuck::pod_read_unaligned)
                .collect(),
        )
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.iter().flatten().count()
    }

    fn buffer(&self, id: BufferId) -> Option<&HostBuffer> {
        self.buffers.get(id.0).and_then(Option::as_ref)
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "Headless"
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferId, RenderError> {
        let idx = self.buffers.len();
        self.buffers.push(Some(HostBuffer {
            label: label.to_owned(),
            contents: contents.to_vec(),
        }));
        tracing::trace!("Headless: created buffer {} ({} bytes)", label, contents.len());

        Ok(BufferId(idx))
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), RenderError> {
        match self.buffers.get_mut(id.0).and_then(Option::take) {
            Some(_) => Ok(()),
            None => Err(RenderError::UnknownBuffer(id)),
        }
    }

    fn buffer_size(&self, id: BufferId) -> Option<u64> {
        self.buffer(id).map(|buffer| buffer.contents.len() as u64)
    }
}
