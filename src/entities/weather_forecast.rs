//! WeatherForecast entity - Entità di esempio esposta dal binario

use super::Entity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherForecast {
    #[serde(default)]
    pub id: i32,
    pub date: NaiveDate,
    pub temperature_c: i32,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Entity for WeatherForecast {
    type Id = i32;
    const RESOURCE: &'static str = "weatherforecast";

    fn id(&self) -> &i32 {
        &self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }
}
