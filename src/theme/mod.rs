//! Color themes
//!
//! A [`Theme`] is a plain value handed to the renderer. There is no global
//! current theme.

use ratatui::style::Color;

/// A color theme for the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub description: &'static str,

    // Accent colors
    pub primary: Color,
    pub secondary: Color,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // UI elements
    pub border: Color,
    pub selection: Color,
    pub selection_text: Color,
    /// Background of search matches
    pub highlight: Color,
    /// Background of the selected search match
    pub highlight_current: Color,
}

pub const DARK: Theme = Theme {
    name: "dark",
    description: "Dark theme (default)",
    primary: Color::Rgb(124, 58, 237),     // #7c3aed
    secondary: Color::Rgb(6, 182, 212),    // #06b6d4
    background: Color::Rgb(31, 41, 55),    // #1f2937
    foreground: Color::Rgb(249, 250, 251), // #f9fafb
    muted: Color::Rgb(107, 114, 128),      // #6b7280
    success: Color::Rgb(16, 185, 129),     // #10b981
    warning: Color::Rgb(245, 158, 11),     // #f59e0b
    error: Color::Rgb(239, 68, 68),        // #ef4444
    border: Color::Rgb(55, 65, 81),        // #374151
    selection: Color::Rgb(124, 58, 237),
    selection_text: Color::Rgb(249, 250, 251),
    highlight: Color::Rgb(120, 53, 15), // #78350f
    highlight_current: Color::Rgb(245, 158, 11),
};

pub const LIGHT: Theme = Theme {
    name: "light",
    description: "Light theme",
    primary: Color::Rgb(124, 58, 237),
    secondary: Color::Rgb(8, 145, 178),    // #0891b2
    background: Color::Rgb(255, 255, 255), // #ffffff
    foreground: Color::Rgb(31, 41, 55),
    muted: Color::Rgb(156, 163, 175),  // #9ca3af
    success: Color::Rgb(5, 150, 105),  // #059669
    warning: Color::Rgb(217, 119, 6),  // #d97706
    error: Color::Rgb(220, 38, 38),    // #dc2626
    border: Color::Rgb(229, 231, 235), // #e5e7eb
    selection: Color::Rgb(124, 58, 237),
    selection_text: Color::Rgb(255, 255, 255),
    highlight: Color::Rgb(254, 243, 199), // #fef3c7
    highlight_current: Color::Rgb(251, 191, 36),
};

pub const SOLARIZED: Theme = Theme {
    name: "solarized",
    description: "Solarized dark theme",
    primary: Color::Rgb(38, 139, 210),     // #268bd2
    secondary: Color::Rgb(42, 161, 152),   // #2aa198
    background: Color::Rgb(0, 43, 54),     // #002b36
    foreground: Color::Rgb(131, 148, 150), // #839496
    muted: Color::Rgb(88, 110, 117),       // #586e75
    success: Color::Rgb(133, 153, 0),      // #859900
    warning: Color::Rgb(181, 137, 0),      // #b58900
    error: Color::Rgb(220, 50, 47),        // #dc322f
    border: Color::Rgb(7, 54, 66),         // #073642
    selection: Color::Rgb(38, 139, 210),
    selection_text: Color::Rgb(253, 246, 227),
    highlight: Color::Rgb(7, 54, 66),
    highlight_current: Color::Rgb(181, 137, 0),
};

pub const NORD: Theme = Theme {
    name: "nord",
    description: "Nord theme",
    primary: Color::Rgb(136, 192, 208),    // #88c0d0
    secondary: Color::Rgb(129, 161, 193),  // #81a1c1
    background: Color::Rgb(46, 52, 64),    // #2e3440
    foreground: Color::Rgb(236, 239, 244), // #eceff4
    muted: Color::Rgb(76, 86, 106),        // #4c566a
    success: Color::Rgb(163, 190, 140),    // #a3be8c
    warning: Color::Rgb(235, 203, 139),    // #ebcb8b
    error: Color::Rgb(191, 97, 106),       // #bf616a
    border: Color::Rgb(59, 66, 82),        // #3b4252
    selection: Color::Rgb(136, 192, 208),
    selection_text: Color::Rgb(46, 52, 64),
    highlight: Color::Rgb(67, 76, 94),
    highlight_current: Color::Rgb(235, 203, 139),
};

pub const GRUVBOX: Theme = Theme {
    name: "gruvbox",
    description: "Gruvbox dark theme",
    primary: Color::Rgb(215, 153, 33),     // #d79921
    secondary: Color::Rgb(69, 133, 136),   // #458588
    background: Color::Rgb(40, 40, 40),    // #282828
    foreground: Color::Rgb(235, 219, 178), // #ebdbb2
    muted: Color::Rgb(146, 131, 116),      // #928374
    success: Color::Rgb(152, 151, 26),     // #98971a
    warning: Color::Rgb(215, 153, 33),
    error: Color::Rgb(204, 36, 29), // #cc241d
    border: Color::Rgb(60, 56, 54), // #3c3836
    selection: Color::Rgb(215, 153, 33),
    selection_text: Color::Rgb(40, 40, 40),
    highlight: Color::Rgb(80, 73, 69),
    highlight_current: Color::Rgb(215, 153, 33),
};

/// Every built-in theme, default first
pub const BUILTIN_THEMES: [Theme; 5] = [DARK, LIGHT, SOLARIZED, NORD, GRUVBOX];

impl Theme {
    /// Built-in theme with the given name, falling back to the dark theme
    pub fn by_name(name: &str) -> Self {
        BUILTIN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
            .copied()
            .unwrap_or(DARK)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTIN_THEMES.iter().map(|t| t.name)
    }
}

impl Default for Theme {
    fn default() -> Self {
        DARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_dark() {
        assert_eq!(Theme::default().name, "dark");
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Theme::by_name("Nord"), NORD);
        assert_eq!(Theme::by_name(" light "), LIGHT);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::by_name("neon"), DARK);
    }

    #[test]
    fn theme_names_are_unique() {
        let mut names: Vec<_> = Theme::names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_THEMES.len());
    }
}
