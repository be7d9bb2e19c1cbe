use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// Picks the surface format, preferring 8-bit BGRA/RGBA sRGB when requested.
///
/// Returns `None` if the surface reports no formats at all.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if formats.contains(&f) {
                return Some(f);
            }
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Surface extent for the first configuration.
///
/// Some platforms report 0x0 before the window is mapped; wgpu rejects that,
/// so each side is clamped to 1 until a real resize arrives.
pub(crate) fn initial_extent(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width.max(1), size.height.max(1))
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;

    // wgpu rejects 0x0 surfaces; configuration waits for a real size.
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    // ── format selection ──────────────────────────────────────────────────

    #[test]
    fn prefers_bgra_srgb() {
        let formats = [F::Rgba8Unorm, F::Rgba8UnormSrgb, F::Bgra8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, true), Some(F::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_rgba_srgb() {
        let formats = [F::Bgra8Unorm, F::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, true), Some(F::Rgba8UnormSrgb));
    }

    #[test]
    fn first_format_without_srgb_preference() {
        let formats = [F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn first_format_when_no_srgb_available() {
        let formats = [F::Rgb10a2Unorm, F::Bgra8Unorm];
        assert_eq!(choose_surface_format(&formats, true), Some(F::Rgb10a2Unorm));
    }

    #[test]
    fn no_formats() {
        assert_eq!(choose_surface_format(&[], true), None);
    }

    // ── alpha mode ────────────────────────────────────────────────────────

    #[test]
    fn requested_alpha_mode_when_supported() {
        let modes = [wgpu::CompositeAlphaMode::Opaque, wgpu::CompositeAlphaMode::PreMultiplied];
        assert_eq!(
            choose_alpha_mode(&modes, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::PreMultiplied
        );
    }

    #[test]
    fn unsupported_alpha_mode_falls_back_to_first() {
        let modes = [wgpu::CompositeAlphaMode::Opaque];
        assert_eq!(
            choose_alpha_mode(&modes, Some(wgpu::CompositeAlphaMode::PostMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn empty_alpha_modes_use_auto() {
        assert_eq!(choose_alpha_mode(&[], None), wgpu::CompositeAlphaMode::Auto);
    }

    // ── initial extent ────────────────────────────────────────────────────

    #[test]
    fn zero_sized_window_gets_a_configurable_extent() {
        assert_eq!(initial_extent(PhysicalSize::new(0, 0)), PhysicalSize::new(1, 1));
        assert_eq!(initial_extent(PhysicalSize::new(0, 300)), PhysicalSize::new(1, 300));
    }

    #[test]
    fn real_size_is_kept() {
        assert_eq!(initial_extent(PhysicalSize::new(512, 512)), PhysicalSize::new(512, 512));
    }

    // ── surface errors ────────────────────────────────────────────────────

    #[test]
    fn lost_and_outdated_reconfigure() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Lost),
            SurfaceErrorAction::Reconfigured
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Outdated),
            SurfaceErrorAction::Reconfigured
        );
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::OutOfMemory),
            SurfaceErrorAction::Fatal
        );
    }

    #[test]
    fn timeout_skips_frame() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Timeout),
            SurfaceErrorAction::SkipFrame
        );
    }
}
