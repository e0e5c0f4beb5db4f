//! Downtown-Manhattan network slice with real station coordinates.
//!
//! Lines 1 (Broadway-Seventh Ave), 4 (Lexington Ave) and A (Eighth Ave),
//! connected through the Chambers/Canal/Fulton hubs. Roosevelt Island is
//! included with no segments to give tests an unreachable station.

use transit_planner::baseline::BaselineSnapshot;
use transit_planner::graph::{LineId, StationId, TransitGraph};
use transit_planner::network::{
    LineRecord, NetworkData, SegmentRecord, StationRecord, TransferRecord,
};

/// (address, lat, lng) pairs used by the geocoder fixture.
pub const NEAR_SOUTH_FERRY: (f64, f64) = (40.7030, -74.0130);
pub const NEAR_GRAND_CENTRAL: (f64, f64) = (40.7520, -73.9760);
pub const NEAR_TIMES_SQUARE: (f64, f64) = (40.7575, -73.9850);
/// Montauk: a perfectly geocodable point ~170 km from the network.
pub const REMOTE_POINT: (f64, f64) = (41.0359, -71.9545);

fn station(id: &str, name: &str, lat: f64, lng: f64, lines: &[&str]) -> StationRecord {
    StationRecord {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lng,
        lines: lines.iter().map(|l| l.to_string()).collect(),
    }
}

fn segment(from: &str, to: &str, line: &str, minutes: f64, incidents: f64) -> SegmentRecord {
    SegmentRecord {
        from: from.to_string(),
        to: to.to_string(),
        line: line.to_string(),
        minutes,
        incidents: Some(incidents),
    }
}

pub fn downtown_network() -> NetworkData {
    NetworkData {
        stations: vec![
            station("south_ferry", "South Ferry", 40.7024, -74.0137, &["1"]),
            station("rector", "Rector Street", 40.7098, -74.0111, &["1"]),
            station("chambers", "Chambers Street", 40.7134, -74.0055, &["1", "A"]),
            station("canal", "Canal Street", 40.7170, -73.9933, &["1", "A"]),
            station("fourteenth", "14th Street", 40.7374, -74.0000, &["1", "A"]),
            station("times_square", "Times Square-42nd Street", 40.7580, -73.9855, &["1"]),
            station("bowling_green", "Bowling Green", 40.7034, -74.0133, &["4"]),
            station("wall", "Wall Street", 40.7074, -74.0113, &["4"]),
            station("fulton", "Fulton Street", 40.7074, -74.0060, &["4", "A"]),
            station("brooklyn_bridge", "Brooklyn Bridge-City Hall", 40.7127, -74.0059, &["4"]),
            station("union_square", "14th Street-Union Square", 40.7350, -73.9911, &["4"]),
            station("grand_central", "Grand Central-42nd Street", 40.7527, -73.9772, &["4"]),
            station("west_fourth", "West 4th Street", 40.7323, -74.0003, &["A"]),
            station("penn", "34th Street-Penn Station", 40.7505, -73.9934, &["A"]),
            // no segments: unreachable on purpose
            station("roosevelt", "Roosevelt Island", 40.7591, -73.9536, &["F"]),
        ],
        lines: vec![
            LineRecord {
                id: "1".to_string(),
                name: "Broadway-Seventh Ave".to_string(),
                color: "red".to_string(),
                on_time_percent: 88.0,
            },
            LineRecord {
                id: "4".to_string(),
                name: "Lexington Ave".to_string(),
                color: "green".to_string(),
                on_time_percent: 87.0,
            },
            LineRecord {
                id: "A".to_string(),
                name: "Eighth Ave".to_string(),
                color: "blue".to_string(),
                on_time_percent: 82.0,
            },
        ],
        segments: vec![
            segment("south_ferry", "rector", "1", 2.0, 3.0),
            segment("rector", "chambers", "1", 2.0, 4.0),
            segment("chambers", "canal", "1", 2.0, 9.0),
            segment("canal", "fourteenth", "1", 3.0, 6.0),
            segment("fourteenth", "times_square", "1", 4.0, 7.0),
            segment("bowling_green", "wall", "4", 2.0, 2.0),
            segment("wall", "fulton", "4", 2.0, 3.0),
            segment("fulton", "brooklyn_bridge", "4", 2.0, 5.0),
            segment("brooklyn_bridge", "union_square", "4", 4.0, 6.0),
            segment("union_square", "grand_central", "4", 3.0, 8.0),
            segment("fulton", "chambers", "A", 2.0, 4.0),
            segment("chambers", "canal", "A", 2.0, 9.0),
            segment("canal", "west_fourth", "A", 2.0, 10.0),
            segment("west_fourth", "fourteenth", "A", 2.0, 5.0),
            segment("fourteenth", "penn", "A", 3.0, 6.0),
        ],
        transfers: vec![
            TransferRecord {
                station: "fulton".to_string(),
                from_line: "A".to_string(),
                to_line: "4".to_string(),
                minutes: 1.0,
            },
            TransferRecord {
                station: "fulton".to_string(),
                from_line: "4".to_string(),
                to_line: "A".to_string(),
                minutes: 1.0,
            },
            TransferRecord {
                station: "chambers".to_string(),
                from_line: "1".to_string(),
                to_line: "A".to_string(),
                minutes: 1.0,
            },
            TransferRecord {
                station: "chambers".to_string(),
                from_line: "A".to_string(),
                to_line: "1".to_string(),
                minutes: 1.0,
            },
        ],
    }
}

pub fn downtown_graph() -> TransitGraph {
    TransitGraph::from_network(&downtown_network()).expect("fixture network is valid")
}

/// Baseline built from the fixture stations' incident counts and the
/// fixture lines' on-time percentages.
pub fn loaded_baseline() -> BaselineSnapshot {
    let incidents = vec![
        (StationId::new("south_ferry"), 3.0),
        (StationId::new("rector"), 4.0),
        (StationId::new("chambers"), 4.0),
        (StationId::new("canal"), 9.0),
        (StationId::new("fourteenth"), 6.0),
        (StationId::new("times_square"), 7.0),
        (StationId::new("bowling_green"), 2.0),
        (StationId::new("wall"), 3.0),
        (StationId::new("fulton"), 5.0),
        (StationId::new("brooklyn_bridge"), 5.0),
        (StationId::new("union_square"), 8.0),
        (StationId::new("grand_central"), 8.0),
        (StationId::new("west_fourth"), 10.0),
        (StationId::new("penn"), 6.0),
    ];
    let on_time = vec![
        (LineId::new("1"), 88.0),
        (LineId::new("4"), 87.0),
        (LineId::new("A"), 82.0),
    ];
    BaselineSnapshot::from_samples(incidents, on_time)
}

pub fn station_id(id: &str) -> StationId {
    StationId::new(id)
}
