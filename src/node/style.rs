//! Sparse style overrides merged down the tree at read time.

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FontShape {
    Upright,
    Italic,
    SmallCaps,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FontSeries {
    Medium,
    Bold,
}

/// A sparse override record. `None` means "inherit"; a node's effective
/// style is its ancestors' computed style overlaid by these fields, later
/// (deeper) values winning.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Style {
    pub font_family: Option<String>,
    pub font_shape: Option<FontShape>,
    pub font_series: Option<FontSeries>,
    /// Size tier 1..=10, 5 being normal size.
    pub font_size: Option<u8>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// This style overlaid by `over`: every field set in `over` wins.
    pub fn overlaid_with(&self, over: &Style) -> Style {
        Style {
            font_family: over.font_family.clone().or_else(|| self.font_family.clone()),
            font_shape: over.font_shape.or(self.font_shape),
            font_series: over.font_series.or(self.font_series),
            font_size: over.font_size.or(self.font_size),
            color: over.color.clone().or_else(|| self.color.clone()),
            background_color: over
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
        }
    }
}
