pub mod temperature {
    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert_eq!(c2f(-40.0), -40.0);
    }
}

pub mod speed {
    pub fn ms2kph(ms: f64) -> f64 {
        ms * 3.6
    }

    #[test]
    fn test_ms2kph() {
        assert_eq!(ms2kph(10.0), 36.0);
    }
}

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    /// Where the wind blows to, for a "from" direction.
    const ARROWS: [&str; 8] = ["↓", "↙", "←", "↖", "↑", "↗", "→", "↘"];

    fn sector(deg: f64, sectors: usize) -> usize {
        let deg = deg.rem_euclid(360.0);
        let width = 360.0 / sectors as f64;
        (deg / width + 0.5) as usize % sectors
    }

    pub fn degree_to_compass(deg: f64) -> &'static str {
        COMPASS[sector(deg, COMPASS.len())]
    }

    pub fn degree_to_arrow(deg: f64) -> &'static str {
        ARROWS[sector(deg, ARROWS.len())]
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
        assert_eq!(degree_to_compass(-90.0), "W");
    }

    #[test]
    fn test_degree_to_arrow() {
        // wind from the north blows south
        assert_eq!(degree_to_arrow(0.0), "↓");
        assert_eq!(degree_to_arrow(270.0), "→");
        assert_eq!(degree_to_arrow(350.0), "↓");
    }
}
