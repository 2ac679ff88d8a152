use crate::paint::Color;

/// Cosmetic parameters of a [`BrushRenderer`](super::BrushRenderer).
///
/// None of these affect compiled geometry; changing them never triggers
/// revalidation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrushStyle {
    pub face_color: Color,
    pub edge_color: Color,
    pub occluded_edge_color: Color,
    pub tint_color: Color,
    /// Alpha applied to the transparent face bucket.
    pub transparency_alpha: f32,
    pub grayscale: bool,
    pub tint: bool,
    pub show_edges: bool,
    pub show_occluded_edges: bool,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            face_color: Color::rgb(0.2, 0.2, 0.2),
            edge_color: Color::rgb(0.7, 0.7, 0.7),
            occluded_edge_color: Color::new(0.7, 0.7, 0.7, 0.5),
            tint_color: Color::rgb(1.0, 0.0, 0.0),
            transparency_alpha: 1.0,
            grayscale: false,
            tint: false,
            show_edges: true,
            show_occluded_edges: false,
        }
    }
}
