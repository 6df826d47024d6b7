//! Shared application-wide constants.
//! Centralizes tweakable values used across the editor core, rendering and persistence.

// Node dimensions
/// Default node width in world units.
pub const NODE_WIDTH: f32 = 160.0;
/// Default node height in world units.
pub const NODE_HEIGHT: f32 = 64.0;
/// Radius of the input/output connector handles in world units.
pub const HANDLE_RADIUS: f32 = 8.0;
/// Extra slack around handles when hit-testing, in world units.
pub const HANDLE_HIT_SLACK: f32 = 4.0;
/// Side length of the square delete button in the node's top-right corner.
pub const DELETE_BUTTON_SIZE: f32 = 16.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Dash length of the in-progress connection line (screen pixels).
pub const DRAFT_DASH_LENGTH: f32 = 8.0;
/// Gap length of the in-progress connection line (screen pixels).
pub const DRAFT_GAP_LENGTH: f32 = 5.0;

// Canvas interactions
/// Click threshold in world units used for distinguishing click vs drag.
pub const CLICK_THRESHOLD: f32 = 10.0;
/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.25;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f32 = 5.0;

// Seeded graph
/// Id of the start node every fresh graph begins with.
pub const SEED_START_ID: &str = "start-1";
/// Position of the seeded start node.
pub const SEED_START_POSITION: (f32, f32) = (80.0, 120.0);

// Notifications
/// How long a toast stays on screen, in seconds.
pub const TOAST_SECONDS: f64 = 3.0;
/// Maximum number of toasts shown at once.
pub const MAX_TOASTS: usize = 5;

// Persistence
/// Key under which eframe persists [`crate::EditorSettings`].
pub const APP_STATE_KEY: &str = "app_state";
/// Application id used for the native storage directory.
pub const APP_ID: &str = "bot_flow_editor";
