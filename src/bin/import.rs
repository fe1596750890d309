// src/bin/import.rs
// DOCUMENTATION: Bulk place import from CSV
// PURPOSE: Validate rows locally, then post them to POST /admin/places/import
//
// Usage: import <places.csv> [--dry-run]
// Columns: name,category,district,address,latitude,longitude,rating,
//          price_level,phone,website,tags,description  (tags are ';' separated)

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::time::Duration;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Rows posted per request
const BATCH_SIZE: usize = 200;

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    category: String,
    district: Option<String>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    rating: Option<f32>,
    price_level: Option<i32>,
    phone: Option<String>,
    website: Option<String>,
    tags: Option<String>,
    description: Option<String>,
}

/// Body of one place in the import batch
#[derive(Debug, Serialize, PartialEq)]
struct PlacePayload {
    name: String,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug)]
struct SkippedRow {
    /// 1-based line the record starts on, header included
    line: u64,
    reason: String,
}

#[derive(Debug, Deserialize, Default)]
struct ImportResponse {
    #[serde(default)]
    received: usize,
    #[serde(default)]
    created: Vec<serde_json::Value>,
    #[serde(default)]
    failed: Vec<ImportFailure>,
}

#[derive(Debug, Deserialize)]
struct ImportFailure {
    index: usize,
    name: Option<String>,
    error: String,
}

fn canonical_category(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "restaurant" | "restaurants" | "food" => Some("restaurant"),
        "attraction" | "attractions" | "sightseeing" => Some("attraction"),
        "activity" | "activities" => Some("activity"),
        "shopping" | "shop" => Some("shopping"),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_row(row: CsvRow) -> std::result::Result<PlacePayload, String> {
    let name = row.name.trim().to_string();
    if name.is_empty() {
        return Err("name is empty".to_string());
    }

    let category = canonical_category(&row.category)
        .ok_or_else(|| format!("unknown category '{}'", row.category.trim()))?;

    match (row.latitude, row.longitude) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(format!("coordinates out of range: {}, {}", lat, lng));
            }
        }
        (None, None) => {}
        _ => return Err("latitude and longitude must be given together".to_string()),
    }

    if let Some(rating) = row.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(format!("rating {} is outside 0..5", rating));
        }
    }

    if let Some(level) = row.price_level {
        if !(0..=4).contains(&level) {
            return Err(format!("price_level {} is outside 0..4", level));
        }
    }

    let tags = row
        .tags
        .unwrap_or_default()
        .split(';')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(PlacePayload {
        name,
        category: category.to_string(),
        district: non_blank(row.district),
        address: non_blank(row.address),
        latitude: row.latitude,
        longitude: row.longitude,
        rating: row.rating,
        price_level: row.price_level,
        phone: non_blank(row.phone),
        website: non_blank(row.website),
        tags,
        description: non_blank(row.description),
    })
}

/// Parse every record; malformed or invalid rows are collected, not fatal
fn read_rows<R: Read>(reader: R) -> Result<(Vec<PlacePayload>, Vec<SkippedRow>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header")?
        .clone();

    let mut places = Vec::new();
    let mut skipped = Vec::new();

    for result in csv_reader.records() {
        // Quoted fields may span lines, so take the line the record starts on
        let (line, parsed) = match result {
            Ok(record) => (
                record.position().map_or(0, |p| p.line()),
                record
                    .deserialize::<CsvRow>(Some(&headers))
                    .map_err(|e| e.to_string())
                    .and_then(parse_row),
            ),
            Err(e) => (e.position().map_or(0, |p| p.line()), Err(e.to_string())),
        };
        match parsed {
            Ok(place) => places.push(place),
            Err(reason) => skipped.push(SkippedRow { line, reason }),
        }
    }

    Ok((places, skipped))
}

struct PlaceImporter {
    base_url: String,
    admin_token: String,
    client: Client,
}

impl PlaceImporter {
    fn new(base_url: String, admin_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token,
            client,
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn post_batch(&self, batch: &[PlacePayload]) -> Result<ImportResponse> {
        let url = format!("{}/admin/places/import", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-Admin-Token", &self.admin_token)
            .json(batch)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("HTTP {} - {}", status, body);
        }

        response
            .json::<ImportResponse>()
            .await
            .context("Failed to parse import response")
    }

    async fn run(&self, places: &[PlacePayload]) -> Result<(usize, usize)> {
        println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
        if !self.check_service_health().await {
            bail!("service unavailable at {}", self.base_url);
        }
        println!("{}✅ Service available{}", GREEN, RESET);

        let mut created = 0;
        let mut failed = 0;

        for (n, batch) in places.chunks(BATCH_SIZE).enumerate() {
            let offset = n * BATCH_SIZE;
            println!(
                "{}[batch {}] posting {} places...{}",
                CYAN,
                n + 1,
                batch.len(),
                RESET
            );

            let report = self.post_batch(batch).await?;
            created += report.created.len();
            failed += report.failed.len();

            println!(
                "{}✅ {} received, {} created{}",
                GREEN,
                report.received,
                report.created.len(),
                RESET
            );
            for failure in &report.failed {
                println!(
                    "{}⚠️  row {} ({}): {}{}",
                    YELLOW,
                    offset + failure.index + 1,
                    failure.name.as_deref().unwrap_or("?"),
                    failure.error,
                    RESET
                );
            }
        }

        Ok((created, failed))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: import <places.csv> [--dry-run]");
    };

    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let (places, skipped) = read_rows(file)?;

    println!("{}📄 {}: {} valid rows, {} skipped{}", BOLD, path, places.len(), skipped.len(), RESET);
    for row in &skipped {
        println!("{}❌ line {}: {}{}", RED, row.line, row.reason, RESET);
    }

    if dry_run || places.is_empty() {
        println!("{}Nothing posted{}", YELLOW, RESET);
        return Ok(());
    }

    let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN must be set")?;
    let base_url = env::var("GUIDE_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let importer = PlaceImporter::new(base_url, admin_token)?;
    let (created, failed) = importer.run(&places).await?;

    println!("\n{}✨ Import finished{}", GREEN, RESET);
    println!("  • Created: {}{}{}", GREEN, created, RESET);
    println!("  • Rejected by server: {}{}{}", YELLOW, failed, RESET);
    println!("  • Skipped locally: {}{}{}", RED, skipped.len(), RESET);

    Ok(())
}
