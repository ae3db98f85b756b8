//! Askama templates for the widget.

use askama::Template;

use crate::arrival::{ArrivalState, DelaySeverity};

/// How often the widget page reloads itself, in seconds.
pub const WIDGET_REFRESH_SECS: u64 = 15;

const GREEN: &str = "#4CAF50";
const ORANGE: &str = "#FF9800";
const RED: &str = "#F44336";
const GRAY: &str = "rgba(128, 128, 128, 0.7)";
const WHITE: &str = "#FFFFFF";
const TRANSPARENT: &str = "transparent";

/// Stops drawn on the route bar. The last one is the tracked station.
const STOP_COUNT: usize = 3;

/// How far past a stop the vehicle must be before it counts as passed.
const PASSED_MARGIN: f64 = 0.1;

/// Position from which the vehicle counts as at the tracked station.
const ARRIVED_POSITION: f64 = 0.95;

/// The widget page.
#[derive(Template)]
#[template(path = "widget.html")]
pub struct WidgetTemplate {
    pub widget: WidgetView,
    pub refresh_secs: u64,
}

/// Widget view model.
#[derive(Debug, Clone)]
pub struct WidgetView {
    pub line_number: String,
    pub arrival_text: String,
    pub tooltip: String,
    /// CSS class for the delay severity
    pub severity: &'static str,
    /// Vehicle and travelled-path colour
    pub colour: &'static str,
    /// Vehicle offset along the bar, as a CSS percentage
    pub vehicle_percent: String,
    pub stops: Vec<StopView>,
}

impl WidgetView {
    pub fn from_state(state: &ArrivalState) -> Self {
        let severity = state.delay_severity();
        let colour = severity_colour(severity);
        let position = state.vehicle_position();

        Self {
            line_number: state.line_number().to_string(),
            arrival_text: state.formatted_arrival(),
            tooltip: state.summary(),
            severity: severity.as_str(),
            colour,
            vehicle_percent: percent(position),
            stops: (0..STOP_COUNT)
                .map(|i| StopView::new(i, position, colour))
                .collect(),
        }
    }
}

/// One stop marker on the route bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopView {
    pub left_percent: String,
    pub stroke: &'static str,
    pub fill: &'static str,
    pub is_home: bool,
}

impl StopView {
    fn new(index: usize, position: f64, colour: &'static str) -> Self {
        let stop_position = index as f64 / (STOP_COUNT - 1) as f64;
        let is_home = index == STOP_COUNT - 1;

        let (stroke, fill) = if is_home {
            let fill = if position >= ARRIVED_POSITION {
                WHITE
            } else {
                TRANSPARENT
            };
            (WHITE, fill)
        } else if position > stop_position + PASSED_MARGIN {
            (GRAY, colour)
        } else {
            (GRAY, TRANSPARENT)
        };

        Self {
            left_percent: percent(stop_position),
            stroke,
            fill,
            is_home,
        }
    }
}

/// Colour for the vehicle marker.
pub fn severity_colour(severity: DelaySeverity) -> &'static str {
    match severity {
        DelaySeverity::OnTime => GREEN,
        DelaySeverity::Minor => ORANGE,
        DelaySeverity::Major => RED,
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(position: f64) -> Vec<StopView> {
        (0..STOP_COUNT)
            .map(|i| StopView::new(i, position, ORANGE))
            .collect()
    }

    #[test]
    fn colours_follow_severity() {
        assert_eq!(severity_colour(DelaySeverity::OnTime), "#4CAF50");
        assert_eq!(severity_colour(DelaySeverity::Minor), "#FF9800");
        assert_eq!(severity_colour(DelaySeverity::Major), "#F44336");
    }

    #[test]
    fn stops_are_spread_along_the_bar() {
        let lefts: Vec<_> = stops(0.0).into_iter().map(|s| s.left_percent).collect();
        assert_eq!(lefts, vec!["0.0", "50.0", "100.0"]);
    }

    #[test]
    fn nothing_passed_at_start() {
        let stops = stops(0.0);
        assert!(stops[..2].iter().all(|s| s.fill == TRANSPARENT && s.stroke == GRAY));
        assert_eq!(stops[2].stroke, WHITE);
        assert_eq!(stops[2].fill, TRANSPARENT);
    }

    #[test]
    fn stop_passed_only_beyond_margin() {
        // Sitting on the middle stop doesn't pass it
        let at_middle = stops(0.5);
        assert_eq!(at_middle[0].fill, ORANGE);
        assert_eq!(at_middle[1].fill, TRANSPARENT);

        let past_middle = stops(0.75);
        assert_eq!(past_middle[0].fill, ORANGE);
        assert_eq!(past_middle[1].fill, ORANGE);
        assert_eq!(past_middle[2].fill, TRANSPARENT);
    }

    #[test]
    fn home_stop_fills_on_arrival() {
        assert_eq!(stops(0.94)[2].fill, TRANSPARENT);
        assert_eq!(stops(0.95)[2].fill, WHITE);
        assert_eq!(stops(1.0)[2].fill, WHITE);
        assert!(stops(1.0)[2].is_home);
    }

    #[test]
    fn pending_state_view() {
        let view = WidgetView::from_state(&ArrivalState::pending());
        assert_eq!(view.line_number, "--");
        assert_eq!(view.arrival_text, "--");
        assert_eq!(view.tooltip, "No data available");
        assert_eq!(view.colour, GREEN);
        assert_eq!(view.vehicle_percent, "0.0");
    }

    #[test]
    fn template_renders() {
        let html = WidgetTemplate {
            widget: WidgetView::from_state(&ArrivalState::pending()),
            refresh_secs: WIDGET_REFRESH_SECS,
        }
        .render()
        .unwrap();

        assert!(html.contains("<span class=\"line\">--</span>"));
        assert!(html.contains("content=\"15\""));
        assert!(html.contains("title=\"No data available\""));
    }
}
