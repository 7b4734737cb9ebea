use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Cargo, CargoId, CargoStatus};

pub const CARGO_ROUTE: &str = "/api/cargo";

/// Body of `POST /api/cargo` and `PUT /api/cargo/{cargoId}`. Identifier,
/// status and timestamps are left to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoDraft {
    pub flight_number: String,
    pub origin_airport: String,
    pub destination_airport: String,
    pub cargo_type: String,
    pub weight: f64,
    pub volume: f64,
    pub shipper_name: String,
    pub consignee_name: String,
}

impl From<&Cargo> for CargoDraft {
    fn from(cargo: &Cargo) -> Self {
        Self {
            flight_number: cargo.flight_number.clone(),
            origin_airport: cargo.origin_airport.clone(),
            destination_airport: cargo.destination_airport.clone(),
            cargo_type: cargo.cargo_type.clone(),
            weight: cargo.weight,
            volume: cargo.volume,
            shipper_name: cargo.shipper_name.clone(),
            consignee_name: cargo.consignee_name.clone(),
        }
    }
}

/// Body of `POST /api/cargo/{cargoId}/tracking`. Id, cargo id and timestamp
/// are filled in by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingDraft {
    pub location: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoEndpoint<'a> {
    Collection,
    Item(&'a CargoId),
    ByStatus(CargoStatus),
    CountByStatus(CargoStatus),
    ByFlight(&'a str),
    /// Takes its keyword as the `keyword` query parameter.
    Search,
    Tracking(&'a CargoId),
}

impl CargoEndpoint<'_> {
    /// Unescaped path segments below the server root.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec!["api", "cargo"];
        match self {
            CargoEndpoint::Collection => {}
            CargoEndpoint::Item(cargo_id) => segments.push(cargo_id.as_str()),
            CargoEndpoint::ByStatus(status) => {
                segments.extend(["status", status.as_str()]);
            }
            CargoEndpoint::CountByStatus(status) => {
                segments.extend(["stats", "status", status.as_str()]);
            }
            CargoEndpoint::ByFlight(flight_number) => {
                segments.extend(["flight", *flight_number]);
            }
            CargoEndpoint::Search => segments.push("search"),
            CargoEndpoint::Tracking(cargo_id) => {
                segments.extend([cargo_id.as_str(), "tracking"]);
            }
        }
        segments
    }
}

impl fmt::Display for CargoEndpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments() {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
