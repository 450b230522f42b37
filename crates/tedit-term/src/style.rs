// SPDX-License-Identifier: MIT
//
// Text style: attributes and colors for SGR rendition.
//
// The editor only styles one thing, the status line, but it still goes
// through a proper attribute set and color type so `ansi::style` can emit
// a single combined SGR sequence instead of ad-hoc strings.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes as a compact bitfield. Each flag maps to one SGR
    /// parameter.
    ///
    /// ```
    /// use tedit_term::style::Attr;
    ///
    /// assert!(Attr::INVERSE.contains(Attr::INVERSE));
    /// assert!(Attr::empty().is_empty());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 7: swap foreground and background.
        const INVERSE = 1 << 0;
    }
}

impl Attr {
    /// SGR parameter codes for the set flags, in ascending order.
    #[must_use]
    pub fn sgr_codes(self) -> Vec<u8> {
        let mut codes = Vec::with_capacity(1);
        if self.contains(Self::INVERSE) {
            codes.push(7);
        }
        codes
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Foreground color: the terminal default, or red for errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// Terminal default foreground (no SGR color code emitted).
    #[default]
    Default,
    Red,
}

impl Color {
    /// SGR foreground code, or `None` for the terminal default.
    #[must_use]
    pub const fn fg_code(self) -> Option<u8> {
        match self {
            Self::Default => None,
            Self::Red => Some(31),
        }
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground color plus attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Plain inverse video, the status-line look.
    pub const INVERSE: Self = Self {
        fg: Color::Default,
        attrs: Attr::INVERSE,
    };

    /// Whether this style emits nothing.
    #[must_use]
    pub fn is_plain(self) -> bool {
        self.fg == Color::Default && self.attrs.is_empty()
    }
}
