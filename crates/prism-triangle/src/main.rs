mod view;

use winit::dpi::{LogicalPosition, LogicalSize};

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::paint::Color;
use prism_engine::window::{Runtime, RuntimeConfig, WindowButtons};

use view::TriangleView;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(window_config(), GpuInit::default(), TriangleView::new)
}

/// Fixed 512x512 titled window with only a close button, cleared to red.
fn window_config() -> RuntimeConfig {
    RuntimeConfig {
        title: "My First Triangle".to_string(),
        initial_size: LogicalSize::new(512.0, 512.0),
        initial_position: Some(LogicalPosition::new(200.0, 100.0)),
        resizable: false,
        enabled_buttons: WindowButtons::CLOSE,
        clear_color: Color::RED,
    }
}
