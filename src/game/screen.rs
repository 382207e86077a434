//! Screen Layout
//!
//! Bounds and static obstacles of the screen being simulated.
//! Level files are parsed elsewhere; this module only validates the result.

use serde::{Serialize, Deserialize};

use crate::core::rect::{Rect, RectError, RectSpec};

/// Raw screen description as read from a level file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenLayout {
    /// Screen name
    pub name: String,
    /// Screen width in pixels
    pub width: f64,
    /// Screen height in pixels
    pub height: f64,
    /// Impassable structures
    #[serde(default)]
    pub obstacles: Vec<RectSpec>,
}

/// A validated screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    /// Screen name
    pub name: String,
    /// Playable area; entities are kept inside it
    pub bounds: Rect,
    /// Impassable structures, in resolution order
    pub obstacles: Vec<Rect>,
}

impl Screen {
    /// Empty screen of the given size.
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            bounds,
            obstacles: Vec::new(),
        }
    }

    /// Add an obstacle.
    pub fn with_obstacle(mut self, obstacle: Rect) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Validate a parsed layout.
    pub fn from_layout(layout: ScreenLayout) -> Result<Self, RectError> {
        let bounds = Rect::try_new(0.0, 0.0, layout.width, layout.height)?;
        let obstacles = layout
            .obstacles
            .into_iter()
            .map(Rect::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: layout.name,
            bounds,
            obstacles,
        })
    }
}
