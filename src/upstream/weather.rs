use crate::error::AppError;
use crate::upstream::WeatherClient;
use async_trait::async_trait;
use log::info;
use serde::Deserialize;

/// Flattened current-conditions reading handed to the weather handler.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    sys: OwmSys,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: String,
}

impl From<OwmResponse> for CurrentConditions {
    fn from(resp: OwmResponse) -> Self {
        let (description, icon) = resp
            .weather
            .into_iter()
            .next()
            .map(|c| (c.description, c.icon))
            .unwrap_or_default();

        Self {
            name: resp.name,
            country: resp.sys.country,
            temp: resp.main.temp,
            feels_like: resp.main.feels_like,
            humidity: resp.main.humidity,
            wind_speed: resp.wind.speed,
            description,
            icon,
        }
    }
}

/// OpenWeatherMap current-weather client. Metric units, one GET per lookup.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<CurrentConditions, AppError> {
        info!("OpenWeatherClient::current() -> city={}", city);

        let resp = self
            .http
            .get(self.endpoint())
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        let parsed: OwmResponse = resp.json().await?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_provider_envelope() {
        let resp: OwmResponse = serde_json::from_str(
            r#"{
                "name": "Accra",
                "main": { "temp": 29.6, "feels_like": 33.1, "humidity": 74 },
                "wind": { "speed": 3.4 },
                "weather": [{ "description": "broken clouds", "icon": "04d" }],
                "sys": { "country": "GH" }
            }"#,
        )
        .unwrap();

        let conditions: CurrentConditions = resp.into();
        assert_eq!(conditions.name, "Accra");
        assert_eq!(conditions.country, "GH");
        assert_eq!(conditions.humidity, 74);
        assert_eq!(conditions.description, "broken clouds");
    }

    #[test]
    fn tolerates_missing_condition_block() {
        let resp: OwmResponse = serde_json::from_str(
            r#"{
                "name": "Nowhere",
                "main": { "temp": 10.0, "feels_like": 9.0, "humidity": 50 },
                "wind": { "speed": 1.0 },
                "sys": {}
            }"#,
        )
        .unwrap();

        let conditions: CurrentConditions = resp.into();
        assert!(conditions.description.is_empty());
        assert!(conditions.icon.is_empty());
    }
}
