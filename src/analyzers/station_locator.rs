use crate::models::Station;

/// Closest station to `(lat, lon)` by planar Euclidean distance.
///
/// Linear scan; on equal distances the earliest station wins. Returns `None`
/// for an empty collection.
pub fn find_nearest(stations: &[Station], lat: f64, lon: f64) -> Option<&Station> {
    nearest_with_distance(stations, lat, lon).map(|(station, _)| station)
}

/// Like [`find_nearest`], also returning the distance in degrees
pub fn nearest_with_distance(stations: &[Station], lat: f64, lon: f64) -> Option<(&Station, f64)> {
    let mut best: Option<(&Station, f64)> = None;

    for station in stations {
        let distance = station.coordinates().planar_distance(lat, lon);
        // Strict comparison keeps the first of equally distant stations
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((station, distance));
        }
    }

    best
}

/// Owns a frozen collection of analyzed stations for repeated lookups
#[derive(Debug, Clone, Default)]
pub struct StationLocator {
    stations: Vec<Station>,
}

impl StationLocator {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&Station> {
        find_nearest(&self.stations, lat, lon)
    }

    pub fn nearest_with_distance(&self, lat: f64, lon: f64) -> Option<(&Station, f64)> {
        nearest_with_distance(&self.stations, lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations() -> Vec<Station> {
        vec![
            Station::new("north", &[10.0, 0.0]).unwrap(),
            Station::new("south", &[-10.0, 0.0]).unwrap(),
            Station::new("east", &[0.0, 10.0]).unwrap(),
        ]
    }

    #[test]
    fn test_nearest_known_points() {
        let stations = stations();

        assert_eq!(find_nearest(&stations, 9.0, 1.0).unwrap().name(), "north");
        assert_eq!(find_nearest(&stations, -3.0, 0.5).unwrap().name(), "south");
        assert_eq!(find_nearest(&stations, 1.0, 30.0).unwrap().name(), "east");
    }

    #[test]
    fn test_tie_resolved_by_input_order() {
        let stations = stations();
        // (0, 0) is 10 away from every station
        assert_eq!(find_nearest(&stations, 0.0, 0.0).unwrap().name(), "north");

        let mut reversed = stations;
        reversed.reverse();
        assert_eq!(find_nearest(&reversed, 0.0, 0.0).unwrap().name(), "east");
    }

    #[test]
    fn test_empty_collection() {
        assert!(find_nearest(&[], 40.0, 7.0).is_none());
        assert!(StationLocator::default().nearest(40.0, 7.0).is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_are_searched() {
        let stations = vec![
            Station::new("weird", &[200.0, 500.0]).unwrap(),
            Station::new("plain", &[40.5, 8.5]).unwrap(),
        ];
        let locator = StationLocator::new(stations);

        let (station, distance) = locator.nearest_with_distance(40.0, 7.0).unwrap();
        assert_eq!(station.name(), "plain");
        assert!((distance - (0.25f64 + 2.25).sqrt()).abs() < 1e-12);
        assert_eq!(locator.len(), 2);
    }
}
