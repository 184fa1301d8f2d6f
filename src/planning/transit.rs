//! The travel block that opens the first day

use chrono::NaiveTime;

use super::day::LOCAL_OPERATOR;
use crate::generators::transport::TransportLinks;
use crate::models::{Activity, BlockType, Coordinates, Cost, Links, TimeBlock, TravelOption, TripRequest, Warning};

/// Assumed straight-line distance when either endpoint is unknown
const UNKNOWN_DISTANCE_KM: f64 = 300.0;
/// Roads are longer than the straight line between endpoints
const ROAD_DETOUR: f64 = 1.3;
const MOUNTAIN_SLOWDOWN: f64 = 1.6;

const MOUNTAIN_KEYWORDS: [&str; 16] = [
    "himalaya", "ladakh", "leh", "spiti", "manali", "shimla", "darjeeling", "sikkim", "gangtok",
    "kashmir", "mountain", "hill", "valley", "pass", "alps", "andes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitMode {
    Car,
    Bus,
    Train,
    Flight,
}

impl TransitMode {
    /// Mode named by the transport component, if it names a known one
    #[must_use]
    pub fn parse(mode: &str) -> Option<Self> {
        let mode = mode.to_lowercase();
        if mode.contains("flight") || mode.contains("air") || mode.contains("plane") {
            Some(Self::Flight)
        } else if mode.contains("train") || mode.contains("rail") {
            Some(Self::Train)
        } else if mode.contains("bus") || mode.contains("coach") {
            Some(Self::Bus)
        } else if mode.contains("car") || mode.contains("drive") || mode.contains("taxi") || mode.contains("cab") {
            Some(Self::Car)
        } else {
            None
        }
    }

    #[must_use]
    pub fn by_distance(km: f64) -> Self {
        if km <= 150.0 {
            Self::Car
        } else if km <= 600.0 {
            Self::Train
        } else {
            Self::Flight
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Flight => "flight",
        }
    }

    fn is_road(self) -> bool {
        matches!(self, Self::Car | Self::Bus)
    }
}

/// Whether the destination name suggests slow mountain roads
#[must_use]
pub fn is_mountainous(destination: &str) -> bool {
    let destination = destination.to_lowercase();
    MOUNTAIN_KEYWORDS.iter().any(|k| destination.contains(k))
}

/// Door to door minutes for `km` of straight-line distance
#[must_use]
pub fn estimate_minutes(km: f64, mode: TransitMode, mountainous: bool) -> u32 {
    let hours = match mode {
        TransitMode::Flight => km / 750.0 + 3.0,
        TransitMode::Train => km * ROAD_DETOUR / 70.0 + 0.5,
        TransitMode::Bus => km * ROAD_DETOUR / 45.0,
        TransitMode::Car => km * ROAD_DETOUR / 55.0,
    };
    let hours = if mountainous && mode.is_road() { hours * MOUNTAIN_SLOWDOWN } else { hours };
    (hours * 60.0).round().clamp(30.0, 24.0 * 60.0) as u32
}

/// Travel block from origin to destination ending when the day's first block starts
#[must_use]
pub fn transit_block(
    request: &TripRequest,
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
    primary_mode: Option<&str>,
    first_start: NaiveTime,
) -> TimeBlock {
    let distance = match (origin, destination) {
        (Some(from), Some(to)) => from.distance_km(&to),
        _ => UNKNOWN_DISTANCE_KM,
    };
    let mode = primary_mode
        .and_then(TransitMode::parse)
        .unwrap_or_else(|| TransitMode::by_distance(distance));
    let mountainous = is_mountainous(request.destination());
    let minutes = estimate_minutes(distance, mode, mountainous);

    let since_midnight = first_start.signed_duration_since(NaiveTime::MIN).num_minutes();
    let start = if i64::from(minutes) >= since_midnight {
        NaiveTime::MIN
    } else {
        first_start - chrono::Duration::minutes(i64::from(minutes))
    };

    let mut block = TimeBlock::new(BlockType::Fixed, start, first_start);
    let mut activity = Activity::generic(
        format!("Travel from {} to {}", request.origin(), request.destination()),
        "transit",
        request.destination(),
        request.currency(),
    );
    activity.location.coordinates = destination;
    activity.priority = 1;
    block.activity = Some(activity);

    let links = TransportLinks::new(request.origin(), request.destination());
    block.travel = Some(TravelOption {
        mode: mode.as_str().to_string(),
        details: format!("About {distance:.0} km from {} to {}", request.origin(), request.destination()),
        duration: Some(minutes),
        cost: Cost::new(request.currency(), "Varies"),
        links: Links::to(links.for_mode(mode.as_str())),
        operator: Some(LOCAL_OPERATOR.to_string()),
    });
    block.warnings.push(if mountainous && mode.is_road() {
        Warning::new("travel", "Mountain roads are slow and can close in bad weather; allow extra time.", 1)
    } else {
        Warning::new("travel", "Confirm departure times and bookings before setting off.", 2)
    });
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::fixtures::jaipur_request;
    use rstest::rstest;

    #[rstest]
    #[case(80.0, TransitMode::Car)]
    #[case(280.0, TransitMode::Train)]
    #[case(1400.0, TransitMode::Flight)]
    fn test_mode_by_distance(#[case] km: f64, #[case] expected: TransitMode) {
        assert_eq!(TransitMode::by_distance(km), expected);
    }

    #[test]
    fn test_mountain_roads_take_longer() {
        let flat = estimate_minutes(200.0, TransitMode::Car, false);
        let mountain = estimate_minutes(200.0, TransitMode::Car, true);
        assert!(mountain > flat);
        assert_eq!(
            estimate_minutes(200.0, TransitMode::Flight, true),
            estimate_minutes(200.0, TransitMode::Flight, false)
        );
        assert!(is_mountainous("Leh, Ladakh"));
        assert!(!is_mountainous("Jaipur"));
    }

    #[test]
    fn test_block_ends_at_first_start() {
        let request = jaipur_request();
        let delhi = Coordinates::new(28.6139, 77.2090);
        let jaipur = Coordinates::new(26.9124, 75.7873);
        let first = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let block = transit_block(&request, Some(delhi), Some(jaipur), Some("Train"), first);
        assert_eq!(block.end_time, first);
        assert!(block.start_time < first);
        assert_eq!(block.travel.as_ref().unwrap().mode, "train");
        assert_eq!(block.travel.as_ref().unwrap().operator.as_deref(), Some(LOCAL_OPERATOR));
        assert_eq!(block.duration_minutes, block.travel.unwrap().duration.unwrap());
    }

    #[test]
    fn test_long_transit_clamps_to_midnight() {
        let request = jaipur_request();
        let first = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let block = transit_block(&request, None, None, Some("bus"), first);
        assert_eq!(block.start_time, NaiveTime::MIN);
        assert_eq!(block.duration_minutes, 120);
    }
}
