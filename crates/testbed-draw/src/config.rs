//! Debug draw configuration.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::render::gfx::PrimitiveKind;

/// Errors from [`DebugDrawConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{kind} capacity must be positive")]
    ZeroCapacity { kind: PrimitiveKind },

    #[error("{kind} capacity {capacity} is not a multiple of {per_primitive}")]
    SplitPrimitive {
        kind: PrimitiveKind,
        capacity: usize,
        per_primitive: usize,
    },
}

/// Sizing and styling for a [`DebugDraw`](crate::draw::DebugDraw).
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawConfig {
    /// Point vertices per batch.
    pub point_capacity: usize,
    /// Line vertices per batch (two per segment).
    pub line_capacity: usize,
    /// Triangle vertices per batch (three per triangle).
    pub triangle_capacity: usize,
    /// Color for overlay strings.
    pub text_color: Color,
    /// Screen pixels per font pixel for the built-in glyph font.
    pub glyph_scale: f32,
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            point_capacity: PrimitiveKind::Point.default_capacity(),
            line_capacity: PrimitiveKind::Line.default_capacity(),
            triangle_capacity: PrimitiveKind::Triangle.default_capacity(),
            text_color: Color::from_rgb_u8(230, 153, 153),
            glyph_scale: 2.0,
        }
    }
}

impl DebugDrawConfig {
    pub fn capacity(&self, kind: PrimitiveKind) -> usize {
        match kind {
            PrimitiveKind::Point => self.point_capacity,
            PrimitiveKind::Line => self.line_capacity,
            PrimitiveKind::Triangle => self.triangle_capacity,
        }
    }

    /// Check that every batch can hold at least one whole primitive and
    /// never splits one across a flush.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in [PrimitiveKind::Point, PrimitiveKind::Line, PrimitiveKind::Triangle] {
            let capacity = self.capacity(kind);
            let per_primitive = kind.vertices_per_primitive();
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity { kind });
            }
            if capacity % per_primitive != 0 {
                return Err(ConfigError::SplitPrimitive {
                    kind,
                    capacity,
                    per_primitive,
                });
            }
        }
        Ok(())
    }
}
