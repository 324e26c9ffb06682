//! Text styling attributes and tag style descriptors.
//!
//! - [`TextAttributes`]: bitflags for bold, italic, underline, etc.
//! - [`Style`]: colors plus attributes, mergeable by precedence
//! - [`TagStyle`]: the descriptor a tag node hands to its store: an
//!   identity key, a priority, and the visual [`Style`]
//!
//! # Examples
//!
//! ```
//! use text_overlay::{Rgba, Style, TagStyle, TextAttributes};
//!
//! let link = TagStyle::new("link")
//!     .with_style(Style::fg(Rgba::BLUE).with_underline())
//!     .with_priority(2);
//! assert_eq!(link.id(), "link");
//! assert!(link.style().attributes.contains(TextAttributes::UNDERLINE));
//! ```

use crate::color::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Text rendering attributes (bold, italic, underline, etc.).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u16 {
        const BOLD          = 0x001;
        const DIM           = 0x002;
        const ITALIC        = 0x004;
        const UNDERLINE     = 0x008;
        const STRIKETHROUGH = 0x010;
        const OVERLINE      = 0x020;
        /// Text is present in the buffer but not displayed.
        const INVISIBLE     = 0x040;
        /// Text inside the range may not be edited by the user.
        const READ_ONLY     = 0x080;
        const MONOSPACE     = 0x100;
    }
}

/// Visual style: optional colors plus attributes.
///
/// `None` for a color means "inherit" rather than a specific color, so an
/// inner tag that only sets a background keeps the outer tag's foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color (None = inherit).
    pub fg: Option<Rgba>,
    /// Background color (None = inherit).
    pub bg: Option<Rgba>,
    /// Text rendering attributes.
    pub attributes: TextAttributes,
}

impl Style {
    /// Empty style with no colors or attributes.
    pub const NONE: Self = Self {
        fg: None,
        bg: None,
        attributes: TextAttributes::empty(),
    };

    /// Create a new style builder.
    #[must_use]
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    /// Create a style with only foreground color.
    #[must_use]
    pub const fn fg(color: Rgba) -> Self {
        Self {
            fg: Some(color),
            ..Self::NONE
        }
    }

    /// Create a style with only background color.
    #[must_use]
    pub const fn bg(color: Rgba) -> Self {
        Self {
            bg: Some(color),
            ..Self::NONE
        }
    }

    /// Create a style carrying only `attributes`.
    #[must_use]
    pub const fn attrs(attributes: TextAttributes) -> Self {
        Self {
            attributes,
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn bold() -> Self {
        Self::attrs(TextAttributes::BOLD)
    }

    #[must_use]
    pub const fn italic() -> Self {
        Self::attrs(TextAttributes::ITALIC)
    }

    #[must_use]
    pub const fn underline() -> Self {
        Self::attrs(TextAttributes::UNDERLINE)
    }

    /// Return a new style with the specified foreground color.
    #[must_use]
    pub const fn with_fg(self, color: Rgba) -> Self {
        Self {
            fg: Some(color),
            ..self
        }
    }

    /// Return a new style with the specified background color.
    #[must_use]
    pub const fn with_bg(self, color: Rgba) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }

    /// Return a new style with the specified attributes added.
    #[must_use]
    pub const fn with_attributes(self, attrs: TextAttributes) -> Self {
        Self {
            attributes: self.attributes.union(attrs),
            ..self
        }
    }

    #[must_use]
    pub const fn with_bold(self) -> Self {
        self.with_attributes(TextAttributes::BOLD)
    }

    #[must_use]
    pub const fn with_italic(self) -> Self {
        self.with_attributes(TextAttributes::ITALIC)
    }

    #[must_use]
    pub const fn with_underline(self) -> Self {
        self.with_attributes(TextAttributes::UNDERLINE)
    }

    /// Check if this style has any non-default properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attributes.is_empty()
    }

    /// Merge two styles, with `other` taking precedence for set values.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attributes: self.attributes | other.attributes,
        }
    }
}

/// Builder for creating styles fluently.
#[derive(Clone, Debug, Default)]
pub struct StyleBuilder {
    style: Style,
}

impl StyleBuilder {
    #[must_use]
    pub fn fg(mut self, color: Rgba) -> Self {
        self.style.fg = Some(color);
        self
    }

    #[must_use]
    pub fn bg(mut self, color: Rgba) -> Self {
        self.style.bg = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.style.attributes |= TextAttributes::BOLD;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.style.attributes |= TextAttributes::ITALIC;
        self
    }

    #[must_use]
    pub fn underline(mut self) -> Self {
        self.style.attributes |= TextAttributes::UNDERLINE;
        self
    }

    #[must_use]
    pub fn strikethrough(mut self) -> Self {
        self.style.attributes |= TextAttributes::STRIKETHROUGH;
        self
    }

    #[must_use]
    pub fn attributes(mut self, attrs: TextAttributes) -> Self {
        self.style.attributes |= attrs;
        self
    }

    #[must_use]
    pub fn build(self) -> Style {
        self.style
    }
}

/// Style descriptor owned by a tag node.
///
/// The `id` keys the style object inside the store and is the tag's identity:
/// it is fixed at construction and an update that changes it is rejected.
/// `priority` and `style` may be updated in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagStyle {
    id: String,
    priority: u8,
    style: Style,
}

impl TagStyle {
    /// Create a descriptor with an empty style and priority 0.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            style: Style::NONE,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the priority used when several tags cover the same character
    /// (higher wins).
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// The identity key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether `other` describes the same style object.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
