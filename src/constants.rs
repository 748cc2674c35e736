//! Constants used throughout the application

/// Default history window size (W)
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Samples the split-average policy needs (older pair + newer pair)
pub const SPLIT_AVERAGE_SAMPLES: usize = 4;

/// Smallest window any policy can work with
pub const MIN_WINDOW_SIZE: usize = 2;

/// Default absolute extent change for the delta policy
pub const DEFAULT_DELTA_THRESHOLD: f64 = 2000.0;

/// Default relative change for the split-average policy
pub const DEFAULT_RATIO_THRESHOLD: f64 = 0.2;

/// Default consecutive agreeing ticks before a state is confirmed (CONFIRM)
pub const DEFAULT_CONFIRM_FRAMES: usize = 2;

/// Default consecutive flat ticks before leaving a directional state
pub const DEFAULT_RELEASE_FRAMES: usize = 1;

/// Segmentation defaults
pub const DEFAULT_BG_HISTORY: i32 = 500;
pub const DEFAULT_BG_VAR_THRESHOLD: f64 = 50.0;
pub const DEFAULT_BLUR_KERNEL: i32 = 5;
pub const DEFAULT_BINARY_THRESHOLD: f64 = 200.0;
pub const DEFAULT_MORPH_KERNEL: i32 = 3;
pub const DEFAULT_MORPH_ITERATIONS: i32 = 2;
pub const DEFAULT_MIN_REGION_AREA: f64 = 500.0;
pub const DEFAULT_BACKGROUND_REFRESH_FRAMES: u32 = 30;

/// Default capture size
pub const DEFAULT_FRAME_WIDTH: i32 = 640;
pub const DEFAULT_FRAME_HEIGHT: i32 = 480;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
