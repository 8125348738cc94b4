//! Output formatting for vehicles and detail links (table, JSON), and the JSON stock file.

use crate::config::OutputFormat;
use crate::dealer::VehicleRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tracing::debug;

/// Serializes `value` as JSON indented by four spaces. Non-ASCII text is kept as is.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).context("Failed to serialize JSON")?;
    String::from_utf8(buf).context("Serialized JSON is not valid UTF-8")
}

/// Writes the scraped vehicles to `path`, creating its parent directory if needed.
pub fn write_json_file(path: &Path, records: &[VehicleRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            debug!("Created directory: {}", parent.display());
        }
    }

    let json = to_json(records)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Formats vehicles and links for the console.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single vehicle.
    pub fn format_vehicle(&self, vehicle: &VehicleRecord) -> String {
        match self.format {
            OutputFormat::Json => to_json(vehicle).unwrap_or_else(|_| "{}".to_string()),
            OutputFormat::Table => self.table_single(vehicle),
        }
    }

    /// Formats multiple vehicles.
    pub fn format_vehicles(&self, vehicles: &[VehicleRecord]) -> String {
        match self.format {
            OutputFormat::Json => to_json(vehicles).unwrap_or_else(|_| "[]".to_string()),
            OutputFormat::Table if vehicles.is_empty() => "No vehicles found.".to_string(),
            OutputFormat::Table => self.table_vehicles(vehicles),
        }
    }

    /// Formats detail page URLs.
    pub fn format_links(&self, links: &[String]) -> String {
        match self.format {
            OutputFormat::Json => to_json(links).unwrap_or_else(|_| "[]".to_string()),
            OutputFormat::Table if links.is_empty() => "No vehicle links found.".to_string(),
            OutputFormat::Table => {
                let mut lines: Vec<String> = links
                    .iter()
                    .enumerate()
                    .map(|(i, link)| format!("{:>4}  {}", i + 1, link))
                    .collect();
                lines.push(String::new());
                lines.push(format!("Total: {} links", links.len()));
                lines.join("\n")
            }
        }
    }

    fn table_single(&self, vehicle: &VehicleRecord) -> String {
        let mut lines = vec![
            format!("Name:         {}", vehicle.name),
            format!("Brand:        {}", vehicle.brand),
            format!("Model:        {}", vehicle.model_base),
        ];

        if !vehicle.version_details.is_empty() {
            lines.push(format!("Version:      {}", vehicle.version_details));
        }

        lines.push(format!("Price:        R$ {:.2}", vehicle.price));
        lines.push(format!("Year:         {}", vehicle.year));
        lines.push(format!("KM:           {}", vehicle.km));
        lines.push(format!("Transmission: {}", vehicle.transmission_type));
        lines.push(format!("Fuel:         {}", vehicle.fuel_type));
        lines.push(format!("Color:        {}", vehicle.color));
        lines.push(format!("Doors:        {}", vehicle.doors));

        if !vehicle.options.is_empty() {
            lines.push(format!("Options:      {}", vehicle.options.join(", ")));
        }

        lines.push(format!("Photos:       {}", vehicle.photos.len()));
        lines.push(format!("URL:          {}", vehicle.link_details));

        lines.join("\n")
    }

    fn table_vehicles(&self, vehicles: &[VehicleRecord]) -> String {
        let year_width = 9;
        let km_width = 9;
        let price_width = 12;
        let name_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<year_width$}  {:>km_width$}  {:>price_width$}  {}",
            "Year", "KM", "Price", "Name"
        ));
        lines.push(format!(
            "{:-<year_width$}  {:-<km_width$}  {:-<price_width$}  {:-<name_width$}",
            "", "", "", ""
        ));

        for vehicle in vehicles {
            lines.push(format!(
                "{:<year_width$}  {:>km_width$}  {:>price_width$.2}  {}",
                vehicle.year,
                vehicle.km,
                vehicle.price,
                truncate(&vehicle.name, name_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} vehicles", vehicles.len()));

        lines.join("\n")
    }
}
