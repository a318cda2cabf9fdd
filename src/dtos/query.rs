//! Query DTOs - Parametri della query string

use serde::Deserialize;

/// `?createIfNotExists=true|false` on update routes, `false` when absent
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct UpdateQuery {
    #[serde(rename = "createIfNotExists", default)]
    pub create_if_not_exists: bool,
}
