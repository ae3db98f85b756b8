//! Selecting the departures the user cares about.
//!
//! Golemio returns every departure from the station, already sorted by
//! time. Matching is a stable filter on line number (exact) and headsign
//! (substring), both case-insensitive.

use std::fmt;

use crate::config::TrackingConfig;
use crate::golemio::Departure;

/// How many distinct `line→headsign` pairs a no-match report lists.
const MAX_AVAILABLE_EXAMPLES: usize = 5;

/// Departures matching `tracking`, in upstream order.
pub fn match_departures<'a>(
    departures: &'a [Departure],
    tracking: &TrackingConfig,
) -> Vec<&'a Departure> {
    departures
        .iter()
        .filter(|d| matches_line(d, tracking.line_filter()))
        .filter(|d| matches_direction(d, tracking.direction_filter()))
        .collect()
}

fn matches_line(departure: &Departure, line: Option<&str>) -> bool {
    let Some(line) = line else {
        return true;
    };
    departure
        .line()
        .is_some_and(|l| l.to_lowercase() == line.to_lowercase())
}

fn matches_direction(departure: &Departure, direction: Option<&str>) -> bool {
    let Some(direction) = direction else {
        return true;
    };
    departure
        .headsign()
        .is_some_and(|h| h.to_lowercase().contains(&direction.to_lowercase()))
}

/// Why nothing matched: the active filters and a sample of what the
/// station actually serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatch {
    /// Human-readable active filters, e.g. `line 17`, `dir 'Modřany'`.
    pub filters: Vec<String>,
    /// Distinct `line→headsign` pairs in upstream order.
    pub available: Vec<String>,
}

impl NoMatch {
    /// Describe a failed match of `tracking` against `departures`.
    pub fn describe(departures: &[Departure], tracking: &TrackingConfig) -> Self {
        let mut filters = Vec::new();
        if let Some(line) = tracking.line_filter() {
            filters.push(format!("line {line}"));
        }
        if let Some(direction) = tracking.direction_filter() {
            filters.push(format!("dir '{direction}'"));
        }

        let mut available: Vec<String> = Vec::new();
        for d in departures {
            let pair = format!(
                "{}→{}",
                d.line().unwrap_or_default(),
                d.headsign().unwrap_or_default()
            );
            if !available.contains(&pair) {
                available.push(pair);
                if available.len() == MAX_AVAILABLE_EXAMPLES {
                    break;
                }
            }
        }

        Self { filters, available }
    }
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            return f.write_str("No departures");
        }
        write!(
            f,
            "No match for {}\nAvailable: {}",
            self.filters.join(", "),
            self.available.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golemio::{Route, Trip};

    pub(crate) fn departure(line: &str, headsign: &str) -> Departure {
        Departure {
            route: Some(Route {
                short_name: Some(line.to_string()),
                route_type: Some(0),
            }),
            trip: Some(Trip {
                headsign: Some(headsign.to_string()),
                id: None,
            }),
            ..Departure::default()
        }
    }

    fn pairs(matched: &[&Departure]) -> Vec<(String, String)> {
        matched
            .iter()
            .map(|d| {
                (
                    d.line().unwrap_or_default().to_string(),
                    d.headsign().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn board() -> Vec<Departure> {
        vec![
            departure("17", "Sídliště Modřany"),
            departure("24", "Kubánské náměstí"),
            departure("17", "Vozovna Kobylisy"),
            departure("24", "Kobylisy"),
            departure("17", "Sídliště Modřany"),
        ]
    }

    #[test]
    fn line_filter_keeps_order() {
        let departures = board();
        let tracking = TrackingConfig::station("Kobylisy").with_line("17");

        let matched = match_departures(&departures, &tracking);
        assert_eq!(
            pairs(&matched),
            vec![
                ("17".into(), "Sídliště Modřany".into()),
                ("17".into(), "Vozovna Kobylisy".into()),
                ("17".into(), "Sídliště Modřany".into()),
            ]
        );
        assert!(std::ptr::eq(matched[0], &departures[0]));
        assert!(std::ptr::eq(matched[1], &departures[2]));
        assert!(std::ptr::eq(matched[2], &departures[4]));
    }

    #[test]
    fn line_filter_is_exact_and_case_insensitive() {
        let departures = vec![
            departure("X9", "Letiště"),
            departure("x9", "Letiště"),
            departure("X91", "Letiště"),
            departure("9", "Letiště"),
        ];
        let tracking = TrackingConfig::station("S").with_line("x9");

        let matched = match_departures(&departures, &tracking);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].line(), Some("X9"));
        assert_eq!(matched[1].line(), Some("x9"));
    }

    #[test]
    fn direction_filter_is_substring_and_case_insensitive() {
        let departures = board();
        let tracking = TrackingConfig::station("Kobylisy").with_direction("KOBYLISY");

        let matched = match_departures(&departures, &tracking);
        assert_eq!(
            pairs(&matched),
            vec![
                ("17".into(), "Vozovna Kobylisy".into()),
                ("24".into(), "Kobylisy".into()),
            ]
        );
    }

    #[test]
    fn direction_filter_handles_diacritics_case() {
        let departures = vec![departure("17", "Sídliště Modřany")];
        let tracking = TrackingConfig::station("S").with_direction("SÍDLIŠTĚ");
        assert_eq!(match_departures(&departures, &tracking).len(), 1);
    }

    #[test]
    fn filters_combine_with_and() {
        let departures = board();
        let tracking = TrackingConfig::station("Kobylisy")
            .with_line("17")
            .with_direction("kobylisy");

        let matched = match_departures(&departures, &tracking);
        assert_eq!(pairs(&matched), vec![("17".into(), "Vozovna Kobylisy".into())]);
    }

    #[test]
    fn no_filters_keeps_everything() {
        let departures = board();
        let matched = match_departures(&departures, &TrackingConfig::station("Kobylisy"));
        assert_eq!(matched.len(), departures.len());
    }

    #[test]
    fn empty_filters_impose_nothing() {
        let departures = board();
        let tracking = TrackingConfig::station("Kobylisy")
            .with_line("")
            .with_direction("");
        assert_eq!(match_departures(&departures, &tracking).len(), departures.len());
    }

    #[test]
    fn departures_without_route_or_trip_never_match_filters() {
        let departures = vec![Departure::default()];
        assert!(
            match_departures(&departures, &TrackingConfig::station("S").with_line("17"))
                .is_empty()
        );
        assert!(
            match_departures(&departures, &TrackingConfig::station("S").with_direction("a"))
                .is_empty()
        );
        assert_eq!(
            match_departures(&departures, &TrackingConfig::station("S")).len(),
            1
        );
    }

    #[test]
    fn no_match_report() {
        let departures = board();
        let tracking = TrackingConfig::station("Kobylisy")
            .with_line("3")
            .with_direction("Lehovec");

        let no_match = NoMatch::describe(&departures, &tracking);
        assert_eq!(no_match.filters, vec!["line 3", "dir 'Lehovec'"]);
        assert_eq!(
            no_match.available,
            vec![
                "17→Sídliště Modřany",
                "24→Kubánské náměstí",
                "17→Vozovna Kobylisy",
                "24→Kobylisy",
            ]
        );
        assert_eq!(
            no_match.to_string(),
            "No match for line 3, dir 'Lehovec'\n\
             Available: 17→Sídliště Modřany, 24→Kubánské náměstí, 17→Vozovna Kobylisy, 24→Kobylisy"
        );
    }

    #[test]
    fn no_match_lists_at_most_five_examples() {
        let departures: Vec<_> = (1..=8)
            .map(|i| departure(&i.to_string(), "Somewhere"))
            .collect();
        let no_match =
            NoMatch::describe(&departures, &TrackingConfig::station("S").with_line("99"));

        assert_eq!(no_match.available.len(), 5);
        assert_eq!(no_match.available[0], "1→Somewhere");
        assert_eq!(no_match.available[4], "5→Somewhere");
    }

    #[test]
    fn no_match_without_filters() {
        let no_match = NoMatch::describe(&[], &TrackingConfig::station("S"));
        assert!(no_match.filters.is_empty());
        assert_eq!(no_match.to_string(), "No departures");
    }
}
