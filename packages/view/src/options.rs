use droplet_geometry::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Layout constants. Every field falls back to its default when missing
/// from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOptions {
    pub padding: f64,
    pub indent_width: f64,
    /// Height of the strip closing a block under its indented body
    pub indent_tongue_height: f64,
    pub tab_offset: f64,
    pub tab_width: f64,
    pub tab_height: f64,
    /// Fraction of the tab width taken by each sloped side
    pub tab_side_width: f64,
    pub min_indent_tongue_width: f64,
    pub indent_drop_area_min_width: f64,
    pub min_socket_width: f64,
    pub text_height: f64,
    pub text_padding: f64,
    pub empty_line_width: f64,
    pub highlight_area_height: f64,
    pub bevel_clip: f64,
    /// Advance used by the default monospace measurement
    pub char_width: f64,
    /// Block color tag → `#rrggbb`
    pub colors: HashMap<String, String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            padding: 5.0,
            indent_width: 20.0,
            indent_tongue_height: 20.0,
            tab_offset: 10.0,
            tab_width: 15.0,
            tab_height: 5.0,
            tab_side_width: 0.125,
            min_indent_tongue_width: 150.0,
            indent_drop_area_min_width: 50.0,
            min_socket_width: 10.0,
            text_height: 15.0,
            text_padding: 1.0,
            empty_line_width: 50.0,
            highlight_area_height: 10.0,
            bevel_clip: 3.0,
            char_width: 8.0,
            colors: default_colors(),
        }
    }
}

impl ViewOptions {
    /// RGB for a block color tag; unknown tags and bad hex fall back to gray
    pub fn color_for(&self, tag: &str) -> Color {
        self.colors
            .get(tag)
            .and_then(|hex| Color::from_hex(hex))
            .or_else(|| Color::from_hex(tag))
            .unwrap_or(Color::GRAY)
    }

    /// Horizontal run of each sloped tab side
    pub(crate) fn tab_side(&self) -> f64 {
        self.tab_width * self.tab_side_width
    }
}

fn default_colors() -> HashMap<String, String> {
    [
        ("error", "#ff0000"),
        ("comment", "#c0c0c0"),
        ("return", "#fff59d"),
        ("control", "#ffcc80"),
        ("value", "#a5d6a7"),
        ("command", "#90caf9"),
        ("red", "#ef9a9a"),
        ("pink", "#f48fb1"),
        ("purple", "#ce93d8"),
        ("deeppurple", "#b39ddb"),
        ("indigo", "#9fa8da"),
        ("blue", "#90caf9"),
        ("lightblue", "#81d4fa"),
        ("cyan", "#80deea"),
        ("teal", "#80cbc4"),
        ("green", "#a5d6a7"),
        ("lightgreen", "#c5e1a5"),
        ("lime", "#e6ee9c"),
        ("yellow", "#fff59d"),
        ("amber", "#ffe082"),
        ("orange", "#ffcc80"),
        ("deeporange", "#ffab91"),
        ("brown", "#bcaaa4"),
        ("grey", "#eeeeee"),
        ("bluegrey", "#b0bec5"),
    ]
    .into_iter()
    .map(|(tag, hex)| (tag.to_string(), hex.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r##"{ "padding": 8, "tabWidth": 20, "colors": { "command": "#123456" } }"##;
        let options: ViewOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.padding, 8.0);
        assert_eq!(options.tab_width, 20.0);
        assert_eq!(options.indent_width, 20.0);
        assert_eq!(options.color_for("command"), Color::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_color_lookup_fallbacks() {
        let options = ViewOptions::default();
        assert_eq!(options.color_for("value"), Color::rgb(0xa5, 0xd6, 0xa7));
        assert_eq!(options.color_for("#ffffff"), Color::WHITE);
        assert_eq!(options.color_for("no-such-tag"), Color::GRAY);
    }
}
