/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// `Bgra8UnormSrgb` is tried first, then `Rgba8UnormSrgb`.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO paces presentation to the display refresh and is always supported.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Adapter selection preference.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_present_once_per_refresh() {
        let init = GpuInit::default();
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
        assert!(init.prefer_srgb);
        assert!(init.required_features.is_empty());
        assert_eq!(init.desired_maximum_frame_latency, 2);
    }
}
