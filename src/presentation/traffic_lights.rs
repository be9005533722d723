//! Draws the traffic light panel shown after a query
use itertools::Itertools;

use crate::model::road::{LightColor, RoadLabel};

pub const PANEL_TITLE: &str = "Traffic Light Simulation";

/// Visible width of one light including the gap to the next one
const COLUMN_WIDTH: usize = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ColorStyle {
    /// Lit lamp drawn in its color
    #[default]
    Ansi,
    /// Lit lamp drawn as the initial of its color
    Plain,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Indicator {
    pub label: RoadLabel,
    pub color: LightColor,
}

impl From<RoadLabel> for Indicator {
    fn from(label: RoadLabel) -> Self {
        Indicator {
            label,
            color: label.light_color(),
        }
    }
}

/// One traffic light per road, side by side in label order
pub fn render_panel(labels: &[RoadLabel], style: ColorStyle) -> String {
    let lights = labels
        .iter()
        .map(|&label| render_light(Indicator::from(label), style))
        .collect_vec();

    let mut panel = format!("{PANEL_TITLE}\n{}\n", "=".repeat(PANEL_TITLE.len()));

    let height = lights.first().map_or(0, Vec::len);
    for row in 0..height {
        let line = lights.iter().map(|light| light[row].as_str()).join("");
        panel.push_str(line.trim_end());
        panel.push('\n');
    }

    panel
}

fn render_light(indicator: Indicator, style: ColorStyle) -> Vec<String> {
    let mut lines = vec![
        format!("{:<COLUMN_WIDTH$}", format!("Road {}", indicator.label)),
        format!("{:<COLUMN_WIDTH$}", " +---+"),
    ];

    for lamp in LightColor::LAMP_ORDER {
        let symbol = lamp_symbol(lamp, lamp == indicator.color, style);
        lines.push(format!(" | {symbol} |   "));
    }

    lines.push(format!("{:<COLUMN_WIDTH$}", " +---+"));

    lines
}

fn lamp_symbol(lamp: LightColor, lit: bool, style: ColorStyle) -> String {
    match (style, lit) {
        (ColorStyle::Plain, false) => ".".to_string(),
        (ColorStyle::Plain, true) => lamp.name()[..1].to_uppercase(),
        (ColorStyle::Ansi, false) => "\u{25cb}".to_string(),
        (ColorStyle::Ansi, true) => {
            let code = match lamp {
                LightColor::Red => 31,
                LightColor::Yellow => 33,
                LightColor::Green => 32,
            };
            format!("\x1b[{code}m\u{25cf}\x1b[0m")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<RoadLabel> {
        (0..n).filter_map(RoadLabel::from_position).collect()
    }

    #[test]
    fn test_render_plain_panel() {
        let panel = render_panel(&labels(4), ColorStyle::Plain);

        let expected = "\
Traffic Light Simulation
========================
Road A   Road B   Road C   Road D
 +---+    +---+    +---+    +---+
 | . |    | R |    | . |    | R |
 | . |    | . |    | Y |    | . |
 | G |    | . |    | . |    | . |
 +---+    +---+    +---+    +---+
";

        assert_eq!(panel, expected);
    }

    #[test]
    fn empty_panel_has_only_the_title() {
        assert_eq!(
            render_panel(&[], ColorStyle::Plain),
            "Traffic Light Simulation\n========================\n"
        );
    }

    #[test]
    fn exactly_one_lamp_is_lit() {
        for label in labels(RoadLabel::MAX_ROADS) {
            let light = render_light(Indicator::from(label), ColorStyle::Ansi);
            let lit = light.iter().filter(|line| line.contains("\x1b[")).count();

            assert_eq!(lit, 1, "road {label}");
        }
    }

    #[test]
    fn ansi_lamp_uses_its_color() {
        let light = render_light(Indicator::from(labels(1)[0]), ColorStyle::Ansi);

        // green is the bottom lamp
        assert!(light[4].contains("\x1b[32m"));
        assert!(!light[2].contains("\x1b["));
    }
}
