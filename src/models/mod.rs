//! Domain types: persisted medicine/pharmacy documents and the transient
//! recognition/aggregation records produced per upload request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pharmacy account referenced by medicine documents and inventory rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

/// Dosage details for one medicine document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dosage {
    pub form: String,
    pub strength: String,
    pub instructions: String,
}

impl Default for Dosage {
    fn default() -> Self {
        Self {
            form: "tablet".into(),
            strength: "N/A".into(),
            instructions: String::new(),
        }
    }
}

/// Safety information attached to a medicine document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyInfo {
    pub side_effects: Vec<String>,
    pub contraindications: Vec<String>,
    pub interactions: Vec<String>,
    pub warnings: Vec<String>,
}

/// A medicine document. Carries a denormalized owning pharmacy reference and
/// top-level price/stock alongside the per-pharmacy inventory rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub generic_name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub dosage: Dosage,
    pub safety_info: SafetyInfo,
    pub prescription_required: bool,
    pub pharmacy_id: Option<Uuid>,
}

/// A pharmacy-specific stock record for one medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub pharmacy_id: Uuid,
    pub price: f64,
    pub stock: i64,
    pub discount: i64,
    pub is_available: bool,
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
}

/// Where a recognized medicine candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    DirectMatch,
    FuzzyMatch,
    Huggingface,
    Matched,
}

/// Transient per-request medicine candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedMedicine {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub source: MatchSource,
}

/// One matched stock line inside an aggregated pharmacy result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub medicine_id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

/// Aggregated per-pharmacy result: pharmacy identity plus the matched
/// medicines it currently stocks. Transient, keyed by pharmacy id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyMatch {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub medicines_in_stock: Vec<StockLine>,
}
