//! String-typed staging copy of a cargo record while a create/edit dialog is open.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{domain::Cargo, error::ParseLabelError, protocol::CargoDraft};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CargoField {
    FlightNumber,
    OriginAirport,
    DestinationAirport,
    CargoType,
    Weight,
    Volume,
    ShipperName,
    ConsigneeName,
}

impl CargoField {
    pub const ALL: [CargoField; 8] = [
        CargoField::FlightNumber,
        CargoField::OriginAirport,
        CargoField::DestinationAirport,
        CargoField::CargoType,
        CargoField::Weight,
        CargoField::Volume,
        CargoField::ShipperName,
        CargoField::ConsigneeName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CargoField::FlightNumber => "flightNumber",
            CargoField::OriginAirport => "originAirport",
            CargoField::DestinationAirport => "destinationAirport",
            CargoField::CargoType => "cargoType",
            CargoField::Weight => "weight",
            CargoField::Volume => "volume",
            CargoField::ShipperName => "shipperName",
            CargoField::ConsigneeName => "consigneeName",
        }
    }
}

impl fmt::Display for CargoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CargoField {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseLabelError::new("cargo field", value))
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FormError {
    #[error("required fields are empty: {}", join_fields(.0))]
    MissingFields(Vec<CargoField>),
    #[error("{field} must be a finite number, got '{value}'")]
    NotANumber { field: CargoField, value: String },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: CargoField, value: f64 },
}

fn join_fields(fields: &[CargoField]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoForm {
    pub flight_number: String,
    pub origin_airport: String,
    pub destination_airport: String,
    pub cargo_type: String,
    pub weight: String,
    pub volume: String,
    pub shipper_name: String,
    pub consignee_name: String,
}

impl CargoForm {
    pub fn for_create() -> Self {
        Self::default()
    }

    pub fn for_edit(cargo: &Cargo) -> Self {
        Self {
            flight_number: cargo.flight_number.clone(),
            origin_airport: cargo.origin_airport.clone(),
            destination_airport: cargo.destination_airport.clone(),
            cargo_type: cargo.cargo_type.clone(),
            weight: cargo.weight.to_string(),
            volume: cargo.volume.to_string(),
            shipper_name: cargo.shipper_name.clone(),
            consignee_name: cargo.consignee_name.clone(),
        }
    }

    pub fn get(&self, field: CargoField) -> &str {
        match field {
            CargoField::FlightNumber => &self.flight_number,
            CargoField::OriginAirport => &self.origin_airport,
            CargoField::DestinationAirport => &self.destination_airport,
            CargoField::CargoType => &self.cargo_type,
            CargoField::Weight => &self.weight,
            CargoField::Volume => &self.volume,
            CargoField::ShipperName => &self.shipper_name,
            CargoField::ConsigneeName => &self.consignee_name,
        }
    }

    pub fn set(&mut self, field: CargoField, value: impl Into<String>) {
        let slot = match field {
            CargoField::FlightNumber => &mut self.flight_number,
            CargoField::OriginAirport => &mut self.origin_airport,
            CargoField::DestinationAirport => &mut self.destination_airport,
            CargoField::CargoType => &mut self.cargo_type,
            CargoField::Weight => &mut self.weight,
            CargoField::Volume => &mut self.volume,
            CargoField::ShipperName => &mut self.shipper_name,
            CargoField::ConsigneeName => &mut self.consignee_name,
        };
        *slot = value.into();
    }

    /// Presence check only: text fields count as filled when non-empty, even
    /// if blank. Measurements are trimmed since they are parsed anyway.
    pub fn missing_fields(&self) -> Vec<CargoField> {
        CargoField::ALL
            .into_iter()
            .filter(|field| {
                let value = self.get(*field);
                match field {
                    CargoField::Weight | CargoField::Volume => value.trim().is_empty(),
                    _ => value.is_empty(),
                }
            })
            .collect()
    }

    /// Converts the staged strings into a write body. Text fields are sent
    /// exactly as staged.
    pub fn to_draft(&self) -> Result<CargoDraft, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        Ok(CargoDraft {
            flight_number: self.flight_number.clone(),
            origin_airport: self.origin_airport.clone(),
            destination_airport: self.destination_airport.clone(),
            cargo_type: self.cargo_type.clone(),
            weight: parse_measurement(CargoField::Weight, &self.weight)?,
            volume: parse_measurement(CargoField::Volume, &self.volume)?,
            shipper_name: self.shipper_name.clone(),
            consignee_name: self.consignee_name.clone(),
        })
    }
}

fn parse_measurement(field: CargoField, raw: &str) -> Result<f64, FormError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FormError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
    if value < 0.0 {
        return Err(FormError::Negative { field, value });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
