//! World-space layout of the note grid.

/// Number of horizontal lanes.
pub const NUM_LANES: usize = 4;
/// Number of vertical layers.
pub const NUM_LAYERS: usize = 3;

/// X coordinate of each lane centre.
pub const LANE_X: [f32; NUM_LANES] = [-1.2, -0.4, 0.4, 1.2];
/// Y coordinate of each layer centre.
pub const LAYER_Y: [f32; NUM_LAYERS] = [0.8, 1.4, 2.0];

/// Depth at which notes appear.
pub const SPAWN_Z: f32 = -40.0;
/// Depth of the player plane (where notes are due).
pub const PLAYER_Z: f32 = 0.0;
/// How far past the player plane a note may travel before it counts as missed.
pub const MISS_Z: f32 = 2.0;

/// Width of the play field covered by the camera image.
pub const FIELD_WIDTH: f32 = 4.0;
/// Height of the play field covered by the camera image.
pub const FIELD_HEIGHT: f32 = 2.4;
/// World y of the bottom edge of the camera image.
pub const FIELD_FLOOR_Y: f32 = 0.2;
