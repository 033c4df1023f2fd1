use rand::Rng;
use serde::Serialize;

pub const FORECAST_LABELS: [&str; 5] = ["Today", "Tomorrow", "Day 3", "Day 4", "Day 5"];

/// Five-point temperature sketch derived from the current reading with
/// bounded jitter. Not a forecast: the `illustrative` flag is always set so
/// no consumer can mistake it for provider data.
#[derive(Clone, Debug, Serialize)]
pub struct ForecastSketch {
    pub labels: Vec<String>,
    pub temps: Vec<i64>,
    pub illustrative: bool,
}

impl ForecastSketch {
    pub fn from_current(current_temp: f64) -> Self {
        let mut rng = rand::thread_rng();
        let spans = [2.0, 3.0, 2.5, 2.0];

        let mut temps = Vec::with_capacity(FORECAST_LABELS.len());
        temps.push(current_temp.round() as i64);
        for span in spans {
            temps.push((current_temp + rng.gen_range(-span..=span)).round() as i64);
        }

        Self {
            labels: FORECAST_LABELS.iter().map(|l| l.to_string()).collect(),
            temps,
            illustrative: true,
        }
    }
}

/// Reshaped reply of `GET /api/weather`.
#[derive(Clone, Debug, Serialize)]
pub struct WeatherReport {
    pub name: String,
    pub country: String,
    pub temp: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub forecast: ForecastSketch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_is_labelled_illustrative() {
        let sketch = ForecastSketch::from_current(21.4);
        assert!(sketch.illustrative);
        assert_eq!(sketch.labels.len(), 5);
        assert_eq!(sketch.temps.len(), 5);
        assert_eq!(sketch.labels[0], "Today");
    }

    #[test]
    fn sketch_anchors_today_and_bounds_jitter() {
        let sketch = ForecastSketch::from_current(20.0);
        assert_eq!(sketch.temps[0], 20);
        for temp in &sketch.temps[1..] {
            assert!((*temp - 20).abs() <= 4, "jitter out of range: {}", temp);
        }
    }
}
