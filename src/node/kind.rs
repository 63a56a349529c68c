//! Node kind categories and the pluggable kind-descriptor table.

use rustc_hash::FxHashMap;

use crate::render::BoxCategory;

/// Closed set of semantic unit categories. The kind drives spacing class,
/// layout rule selection and serialization.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Kind {
    /// Invisible sentinel heading every branch, so a cursor position before
    /// the first real child is representable.
    First,
    /// The designated tree root. Never appears as a child.
    Root,
    Group,
    Ordinary,
    Binary,
    Relation,
    Open,
    Close,
    Punctuation,
    Operator,
    Inner,
    /// Ordinary symbol in text context.
    Text,
    Array,
    Fraction,
    Surd,
    Accent,
    Enclose,
    Placeholder,
    Spacing,
}

/// Semantic context a unit lives in; affects metrics and serialization.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Mode {
    Math,
    Text,
}

/// How sub/superscripts are placed relative to a unit.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Limits {
    /// Stacked above/below in display style, corner otherwise.
    Auto,
    /// Always stacked above/below.
    Over,
    /// Always in the corner position.
    Adjacent,
}

/// Which attachment algorithm the layout engine uses for a kind's scripts.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ScriptsMode {
    /// Upper/lower right corner, TeXbook rules 18a-f.
    Corner,
    /// Stacked above and below, big-operator style.
    Limits,
}

/// Per-kind layout behaviour, resolved through the [`KindTable`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct KindDescriptor {
    pub category: BoxCategory,
    pub scripts: ScriptsMode,
}

impl Default for KindDescriptor {
    fn default() -> KindDescriptor {
        KindDescriptor { category: BoxCategory::Ordinary, scripts: ScriptsMode::Corner }
    }
}

/// Maps kinds to their layout behaviour. A table is given to a tree at
/// construction time; custom kinds (or overridden behaviour for standard
/// ones) are registered here rather than through any global state.
#[derive(Clone, Debug)]
pub struct KindTable {
    entries: FxHashMap<Kind, KindDescriptor>,
}

impl KindTable {
    /// The standard TeX-compatible table.
    pub fn standard() -> KindTable {
        let mut table = KindTable { entries: FxHashMap::default() };
        let corner = |category| KindDescriptor { category, scripts: ScriptsMode::Corner };
        table.set(Kind::Ordinary, corner(BoxCategory::Ordinary));
        table.set(Kind::Text, corner(BoxCategory::Ordinary));
        table.set(Kind::Binary, corner(BoxCategory::Binary));
        table.set(Kind::Relation, corner(BoxCategory::Relation));
        table.set(Kind::Open, corner(BoxCategory::Open));
        table.set(Kind::Close, corner(BoxCategory::Close));
        table.set(Kind::Punctuation, corner(BoxCategory::Punctuation));
        table.set(Kind::Inner, corner(BoxCategory::Inner));
        table.set(
            Kind::Operator,
            KindDescriptor { category: BoxCategory::Operator, scripts: ScriptsMode::Limits },
        );
        table.set(Kind::Group, corner(BoxCategory::Ordinary));
        table.set(Kind::Root, corner(BoxCategory::Ordinary));
        table.set(Kind::Fraction, corner(BoxCategory::Inner));
        table.set(Kind::Surd, corner(BoxCategory::Ordinary));
        table.set(Kind::Accent, corner(BoxCategory::Ordinary));
        table.set(Kind::Enclose, corner(BoxCategory::Ordinary));
        table.set(Kind::Array, corner(BoxCategory::Inner));
        table.set(Kind::Placeholder, corner(BoxCategory::Ordinary));
        table
    }

    pub fn set(&mut self, kind: Kind, descriptor: KindDescriptor) {
        self.entries.insert(kind, descriptor);
    }

    /// Unregistered kinds fall back to an ordinary corner-script unit.
    pub fn descriptor(&self, kind: Kind) -> KindDescriptor {
        self.entries.get(&kind).copied().unwrap_or_default()
    }
}

impl Default for KindTable {
    fn default() -> KindTable {
        KindTable::standard()
    }
}
