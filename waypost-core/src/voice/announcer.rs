//! Deciding when and how to speak the next instruction

use hashbrown::HashSet;

use crate::model::{Direction, ManeuverKind, Step};

/// Fires each (leg, step) pair at most once per route, however often
/// the position oscillates around the announcement threshold or the
/// resolved step jumps backwards.
#[derive(Debug, Default)]
pub struct ManeuverAnnouncer {
    announced: HashSet<(usize, usize)>,
}

impl ManeuverAnnouncer {
    pub fn new() -> ManeuverAnnouncer {
        ManeuverAnnouncer::default()
    }

    /// Forget announced steps, e.g. when the route is replaced
    pub fn reset(&mut self) {
        self.announced.clear();
    }

    /// Returns the announcement text when the maneuver is close enough
    /// and this step has not been announced yet
    pub fn check(
        &mut self,
        leg_index: usize,
        step_index: usize,
        step: &Step,
        distance_to_maneuver_m: f64,
        threshold_m: f64,
    ) -> Option<String> {
        if distance_to_maneuver_m > threshold_m {
            return None;
        }
        if !self.announced.insert((leg_index, step_index)) {
            return None;
        }
        Some(compose_instruction(step, distance_to_maneuver_m))
    }
}

/// Compose the spoken instruction from the step's maneuver template,
/// the rounded distance and the street name when present
pub fn compose_instruction(step: &Step, distance_m: f64) -> String {
    let distance = format_spoken_distance(distance_m);
    let street = step
        .street
        .as_deref()
        .map(|name| format!(" onto {name}"))
        .unwrap_or_default();

    match step.maneuver {
        ManeuverKind::Turn => match step.direction {
            Some(direction) => format!("In {distance}, turn {direction}{street}"),
            None => fallback(step, &distance),
        },
        ManeuverKind::Continue => {
            let direction = step.direction.unwrap_or(Direction::Straight);
            format!("Continue {direction} for {distance}")
        }
        ManeuverKind::Roundabout => match step.roundabout_exit {
            Some(exit) => format!(
                "In {distance}, enter the roundabout and take the {} exit{street}",
                ordinal(exit)
            ),
            None => format!("In {distance}, enter the roundabout{street}"),
        },
        ManeuverKind::Arrive => {
            format!("In {distance}, you will arrive at your destination")
        }
        ManeuverKind::Depart => {
            let direction = step.direction.unwrap_or(Direction::Straight);
            format!("Head {direction}{street}")
        }
        ManeuverKind::Merge | ManeuverKind::Ramp => fallback(step, &distance),
    }
}

fn fallback(step: &Step, distance: &str) -> String {
    if step.instruction.is_empty() {
        format!("In {distance}, continue ahead")
    } else {
        step.instruction.clone()
    }
}

/// Round for speech: nearest 10 m under 100 m, nearest 50 m under
/// 1000 m, one-decimal kilometers beyond
pub fn format_spoken_distance(m: f64) -> String {
    if m < 100.0 {
        format!("{} meters", ((m / 10.0).round() * 10.0) as i64)
    } else if m < 1000.0 {
        format!("{} meters", ((m / 50.0).round() * 50.0) as i64)
    } else {
        format!("{:.1} kilometers", m / 1000.0)
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
