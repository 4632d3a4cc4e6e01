use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Viewport rectangle in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(size: PhysicalSize<u32>) -> Self {
        Self { x: 0, y: 0, width: size.width, height: size.height }
    }
}

/// The window's GPU context: device, queue, swapchain and depth target.
///
/// The surface holds a clone of the window `Arc`, so it stays valid for as
/// long as this value lives.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Drawable size in physical pixels. May be 0x0 while minimized.
    size: PhysicalSize<u32>,

    depth_view: wgpu::TextureView,
    viewport: Viewport,
    wireframe: bool,
}

impl Gpu {
    /// Creates the context for `window`.
    pub async fn new(window: Arc<Window>, init: &GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let required_features = init.features_for(adapter.features());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("carrier device"),
                required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps.alpha_modes, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let depth_view = surface::create_depth_view(&device, size.width, size.height);
        let wireframe = required_features.contains(wgpu::Features::POLYGON_MODE_LINE);

        let info = adapter.get_info();
        log::info!("successfully created GPU context on {} ({:?})", info.name, info.backend);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            depth_view,
            viewport: Viewport::full(size),
            wireframe,
        })
    }

    /// Downlevel flags of the adapter, part of what shaders may use.
    pub fn downlevel_flags(&self) -> wgpu::DownlevelFlags {
        self.adapter.get_downlevel_capabilities().flags
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Whether the device was created with line polygon mode.
    pub fn supports_wireframe(&self) -> bool {
        self.wireframe
    }

    /// Required alignment of dynamic uniform offsets.
    pub fn uniform_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Sets the viewport, clamped to the drawable area.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let x = viewport.x.min(self.size.width);
        let y = viewport.y.min(self.size.height);
        self.viewport = Viewport {
            x,
            y,
            width: viewport.width.min(self.size.width - x),
            height: viewport.height.min(self.size.height - y),
        };
    }

    /// Reconfigures the swapchain and depth target, and resets the viewport
    /// to cover the new size.
    ///
    /// wgpu cannot configure a 0x0 surface; in that case only the stored
    /// size changes and configuration waits for the next non-empty resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        self.viewport = Viewport::full(new_size);

        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = surface::create_depth_view(&self.device, new_size.width, new_size.height);
    }

    /// Acquires the next swapchain image and an encoder for it.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("carrier frame encoder"),
            });

        Ok(GpuFrame { surface_texture, view, encoder })
    }

    /// Submits the frame's commands and presents the image.
    ///
    /// With a `Fifo` present mode this is where the vsync wait happens.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Applies the recovery for an acquisition error.
    pub fn handle_surface_error(&mut self, err: &SurfaceError) -> SurfaceErrorAction {
        let action = surface::classify_surface_error(err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        action
    }
}
