/// Surface and present preferences for [`Gpu::new`](super::Gpu::new).
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// `Fifo` waits for vertical sync; anything else may tear.
    pub present_mode: wgpu::PresentMode,

    /// Preferred compositing mode; replaced by a supported one if needed.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Hint only, backends may ignore it.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Defaults with the present mode chosen from a vsync flag.
    pub fn with_vsync(vsync: bool) -> Self {
        Self {
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: Some(wgpu::CompositeAlphaMode::Opaque),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_selects_fifo() {
        assert_eq!(GpuInit::with_vsync(true).present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(GpuInit::with_vsync(false).present_mode, wgpu::PresentMode::AutoNoVsync);
    }
}
