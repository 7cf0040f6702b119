use crate::comment::{Comment, DisplayMode};
use crate::config::{Canvas, CanvasConfig};

/// Initialize tracing for tests with appropriate settings
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer() // Write to test output
        .try_init();
}

/// Canvas with the given size and default timing (5s scroll and still).
pub fn test_canvas(width: u32, height: u32) -> Canvas {
    CanvasConfig {
        width,
        height,
        ..Default::default()
    }
    .build()
    .unwrap()
}

/// Single-line comment at default size.
pub fn test_comment(
    canvas: &Canvas,
    progress: f64,
    order: i64,
    text: &str,
    mode: DisplayMode,
) -> Comment {
    let duration = canvas.default_duration(mode);
    Comment::new(
        canvas, progress, duration, order, text, 25.0, mode, 0xFFFFFF, 0,
    )
}
