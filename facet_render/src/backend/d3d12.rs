use gpu_allocator::{
    d3d12::{
        Allocator, AllocatorCreateDesc, ID3D12DeviceVersion, Resource, ResourceCategory,
        ResourceCreateDesc, ResourceStateOrBarrierLayout, ResourceType,
    },
    AllocationError, MemoryLocation,
};
use std::{mem::MaybeUninit, ptr};
use windows::Win32::Graphics::{
    Direct3D::D3D_FEATURE_LEVEL_11_0,
    Direct3D12::*,
    Dxgi::{Common::*, *},
};

use crate::{error::RenderError, id::BufferId};

use super::Backend;

struct AllocatedBuffer {
    allocation: Resource,
    size: u64,
}

/// Direct3D 12 backend. Vertex buffers live in the upload heap and are
/// written through a CPU mapping.
pub struct D3d12Backend {
    _factory: IDXGIFactory6,
    _device: ID3D12Device,
    allocator: Allocator,
    buffers: Vec<Option<AllocatedBuffer>>,
}

impl D3d12Backend {
    pub fn new() -> Result<Self, RenderError> {
        if cfg!(debug_assertions) {
            unsafe {
                let mut debug: Option<ID3D12Debug1> = None;
                if D3D12GetDebugInterface(&mut debug).is_ok() {
                    if let Some(debug) = debug {
                        debug.EnableDebugLayer();
                    }
                }
            }
        }

        let factory: IDXGIFactory6 =
            unsafe { CreateDXGIFactory2(DXGI_CREATE_FACTORY_DEBUG) }.map_err(backend_error)?;
        let physical_device = get_physical_device(&factory)?;

        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(&physical_device, D3D_FEATURE_LEVEL_11_0, &mut device) }
            .map_err(backend_error)?;
        let device = device.ok_or_else(|| {
            RenderError::ResourceCreation("D3D12CreateDevice returned no device".into())
        })?;

        let allocator = Allocator::new(&AllocatorCreateDesc {
            device: ID3D12DeviceVersion::Device(device.clone()),
            debug_settings: Default::default(),
            allocation_sizes: Default::default(),
        })
        .map_err(allocation_error)?;

        Ok(Self {
            _factory: factory,
            _device: device,
            allocator,
            buffers: Vec::new(),
        })
    }

    fn write(&self, buffer: &AllocatedBuffer, contents: &[u8]) -> Result<(), RenderError> {
        let mut data = MaybeUninit::<*mut std::ffi::c_void>::uninit();
        unsafe {
            let resource = buffer.allocation.resource();
            resource
                .Map(0, None, Some(data.as_mut_ptr()))
                .map_err(backend_error)?;
            ptr::copy_nonoverlapping(
                contents.as_ptr(),
                data.assume_init() as *mut u8,
                contents.len(),
            );
            resource.Unmap(0, None);
        }
        Ok(())
    }
}

impl Backend for D3d12Backend {
    fn name(&self) -> &'static str {
        "Direct3D 12"
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferId, RenderError> {
        let size = contents.len() as u64;
        let desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: 0,
            Width: size,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: D3D12_RESOURCE_FLAG_NONE,
        };
        let allocation = self
            .allocator
            .create_resource(&ResourceCreateDesc {
                name: label,
                memory_location: MemoryLocation::CpuToGpu,
                resource_category: ResourceCategory::Buffer,
                resource_desc: &desc,
                clear_value: None,
                initial_state_or_layout: ResourceStateOrBarrierLayout::ResourceState(
                    D3D12_RESOURCE_STATE_GENERIC_READ,
                ),
                resource_type: &ResourceType::Placed,
            })
            .map_err(allocation_error)?;

        let buffer = AllocatedBuffer { allocation, size };
        if let Err(err) = self.write(&buffer, contents) {
            let _ = self.allocator.free_resource(buffer.allocation);
            return Err(err);
        }
        tracing::trace!("D3D12: created buffer {} ({} bytes)", label, size);

        let idx = self.buffers.len();
        self.buffers.push(Some(buffer));
        Ok(BufferId(idx))
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), RenderError> {
        let buffer = self
            .buffers
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(RenderError::UnknownBuffer(id))?;
        self.allocator
            .free_resource(buffer.allocation)
            .map_err(allocation_error)
    }

    fn buffer_size(&self, id: BufferId) -> Option<u64> {
        self.buffers
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|buffer| buffer.size)
    }
}

impl Drop for D3d12Backend {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..).flatten() {
            let _ = self.allocator.free_resource(buffer.allocation);
        }
    }
}

/// First hardware adapter, in high-performance order, that can host a
/// feature level 11.0 device.
fn get_physical_device(factory: &IDXGIFactory6) -> Result<IDXGIAdapter1, RenderError> {
    (0..)
        .map_while(|i| {
            unsafe {
                factory.EnumAdapterByGpuPreference::<IDXGIAdapter1>(
                    i,
                    DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE,
                )
            }
            .ok()
        })
        .filter(|adapter| {
            let mut desc = Default::default();
            unsafe { adapter.GetDesc1(&mut desc) }.is_ok()
                && (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE)
                    == DXGI_ADAPTER_FLAG_NONE
        })
        .find(|adapter| unsafe {
            D3D12CreateDevice(
                adapter,
                D3D_FEATURE_LEVEL_11_0,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok())
        .ok_or_else(|| RenderError::ResourceCreation("no hardware adapter supports D3D12".into()))
}

fn backend_error(err: windows::core::Error) -> RenderError {
    RenderError::Backend(err.to_string())
}

fn allocation_error(err: AllocationError) -> RenderError {
    match err {
        AllocationError::OutOfMemory => RenderError::OutOfMemory,
        err => RenderError::ResourceCreation(err.to_string()),
    }
}
