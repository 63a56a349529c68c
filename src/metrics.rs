//! Math styles and the font metric constants the layout engine reads.
//!
//! The constants follow the TeX sigma/xi parameters, normalised to em units,
//! so shift calculations match the TeXbook appendix G rules directly. A real
//! renderer would substitute values read from its font; everything here is
//! plain data, so that substitution is just constructing a different
//! [`FontMetrics`].

/// The TeX-derived discrete rendering modes. Cramped variants are used
/// inside subscripts, denominators and under radicals, where superscripts
/// are raised less.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MathStyle {
    Display,
    DisplayCramped,
    Text,
    TextCramped,
    Script,
    ScriptCramped,
    ScriptScript,
    ScriptScriptCramped,
}

impl MathStyle {
    pub fn is_cramped(self) -> bool {
        matches!(
            self,
            MathStyle::DisplayCramped
                | MathStyle::TextCramped
                | MathStyle::ScriptCramped
                | MathStyle::ScriptScriptCramped
        )
    }

    pub fn is_display(self) -> bool {
        matches!(self, MathStyle::Display | MathStyle::DisplayCramped)
    }

    /// The cramped counterpart of this style.
    pub fn cramp(self) -> MathStyle {
        match self {
            MathStyle::Display => MathStyle::DisplayCramped,
            MathStyle::Text => MathStyle::TextCramped,
            MathStyle::Script => MathStyle::ScriptCramped,
            MathStyle::ScriptScript => MathStyle::ScriptScriptCramped,
            other => other,
        }
    }

    /// The style used for a superscript of this style.
    pub fn sup(self) -> MathStyle {
        let smaller = match self {
            MathStyle::Display | MathStyle::Text => MathStyle::Script,
            MathStyle::DisplayCramped | MathStyle::TextCramped => MathStyle::ScriptCramped,
            MathStyle::Script | MathStyle::ScriptScript => MathStyle::ScriptScript,
            MathStyle::ScriptCramped | MathStyle::ScriptScriptCramped => {
                MathStyle::ScriptScriptCramped
            }
        };
        smaller
    }

    /// The style used for a subscript of this style: the superscript style,
    /// always cramped.
    pub fn sub(self) -> MathStyle {
        self.sup().cramp()
    }

    /// The style used for a fraction numerator.
    pub fn fraction_numerator(self) -> MathStyle {
        match self {
            MathStyle::Display => MathStyle::Text,
            MathStyle::DisplayCramped => MathStyle::TextCramped,
            MathStyle::Text => MathStyle::Script,
            MathStyle::TextCramped => MathStyle::ScriptCramped,
            MathStyle::Script | MathStyle::ScriptScript => MathStyle::ScriptScript,
            MathStyle::ScriptCramped | MathStyle::ScriptScriptCramped => {
                MathStyle::ScriptScriptCramped
            }
        }
    }

    /// The style used for a fraction denominator: the numerator style,
    /// cramped.
    pub fn fraction_denominator(self) -> MathStyle {
        self.fraction_numerator().cramp()
    }

    /// Scale factor applied to dimensions produced under this style,
    /// relative to text style.
    pub fn multiplier(self) -> f64 {
        match self {
            MathStyle::Display
            | MathStyle::DisplayCramped
            | MathStyle::Text
            | MathStyle::TextCramped => 1.0,
            MathStyle::Script | MathStyle::ScriptCramped => 0.7,
            MathStyle::ScriptScript | MathStyle::ScriptScriptCramped => 0.5,
        }
    }
}

/// Scale factor for a font size tier (1 = tiny .. 10 = huge, 5 = normal).
pub fn size_multiplier(size: u8) -> f64 {
    const MULTIPLIERS: [f64; 10] = [0.5, 0.7, 0.8, 0.9, 1.0, 1.2, 1.44, 1.728, 2.074, 2.488];
    MULTIPLIERS[(size.clamp(1, 10) - 1) as usize]
}

/// Height, depth and italic correction of a single glyph, in em.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct GlyphMetrics {
    pub height: f64,
    pub depth: f64,
    pub italic: f64,
}

/// Spacing constants for one font, in em units.
#[derive(PartialEq, Clone, Debug)]
pub struct FontMetrics {
    pub x_height: f64,
    pub axis_height: f64,
    pub default_rule_thickness: f64,

    /// Minimum superscript shift in display style (sigma 13).
    pub sup1: f64,
    /// Minimum superscript shift in non-display, non-cramped styles.
    pub sup2: f64,
    /// Minimum superscript shift in cramped styles.
    pub sup3: f64,
    /// Minimum subscript shift when there is no superscript.
    pub sub1: f64,
    /// Minimum subscript shift when there is a superscript.
    pub sub2: f64,
    pub sup_drop: f64,
    pub sub_drop: f64,

    pub big_op_spacing1: f64,
    pub big_op_spacing2: f64,
    pub big_op_spacing3: f64,
    pub big_op_spacing4: f64,
    pub big_op_spacing5: f64,

    /// Horizontal space reserved after a corner sub/superscript.
    pub script_space: f64,
    pub pt_per_em: f64,
}

impl Default for FontMetrics {
    /// Computer Modern values, the same table TeX's plain format loads.
    fn default() -> FontMetrics {
        FontMetrics {
            x_height: 0.430554,
            axis_height: 0.25,
            default_rule_thickness: 0.04,
            sup1: 0.412892,
            sup2: 0.362892,
            sup3: 0.288889,
            sub1: 0.15,
            sub2: 0.247217,
            sup_drop: 0.386108,
            sub_drop: 0.05,
            big_op_spacing1: 0.111112,
            big_op_spacing2: 0.166667,
            big_op_spacing3: 0.2,
            big_op_spacing4: 0.6,
            big_op_spacing5: 0.1,
            script_space: 0.05,
            pt_per_em: 10.0,
        }
    }
}

impl FontMetrics {
    /// Metrics for a single glyph. This is a coarse stand-in table; the
    /// buckets only need to be stable and plausible for layout to be
    /// meaningful.
    pub fn glyph(&self, c: char) -> GlyphMetrics {
        match c {
            '0'..='9' => GlyphMetrics { height: 0.645, depth: 0.0, italic: 0.0 },
            'g' | 'j' | 'p' | 'q' | 'y' => GlyphMetrics {
                height: self.x_height,
                depth: 0.194,
                italic: 0.0,
            },
            'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' => GlyphMetrics {
                height: 0.694,
                depth: 0.0,
                italic: 0.0,
            },
            'a'..='z' => GlyphMetrics { height: self.x_height, depth: 0.0, italic: 0.0 },
            'A'..='Z' => GlyphMetrics { height: 0.683, depth: 0.0, italic: 0.025 },
            '(' | ')' | '[' | ']' | '{' | '}' | '|' => GlyphMetrics {
                height: 0.75,
                depth: 0.25,
                italic: 0.0,
            },
            '∑' | '∏' | '⋃' | '⋂' => GlyphMetrics { height: 0.75, depth: 0.25, italic: 0.0 },
            '∫' | '∮' => GlyphMetrics { height: 0.805, depth: 0.306, italic: 0.138 },
            '+' | '−' | '-' | '=' | '×' | '÷' | '±' => GlyphMetrics {
                height: 0.583,
                depth: 0.083,
                italic: 0.0,
            },
            _ => GlyphMetrics { height: 0.7, depth: 0.0, italic: 0.0 },
        }
    }
}
