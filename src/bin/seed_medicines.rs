//! Seed the catalogue with a starter set of common medicines for one
//! pharmacy. Insert-only: medicines already present for the pharmacy are
//! left untouched, so re-running is safe.

use chrono::{Duration, Utc};
use rand::Rng;
use regex::Regex;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pharmalink::config::AppConfig;
use pharmalink::db;
use pharmalink::db::repository::{find_or_create_pharmacy, seed_medicine};
use pharmalink::models::{Dosage, InventoryEntry, Medicine, SafetyInfo};

const DEFAULT_PHARMACY: &str = "City Care Pharmacy";

struct SeedEntry {
    name: &'static str,
    strength: &'static str,
    category: &'static str,
    form: &'static str,
    price_range: (f64, f64),
}

const fn entry(
    name: &'static str,
    strength: &'static str,
    category: &'static str,
    form: &'static str,
    min: f64,
    max: f64,
) -> SeedEntry {
    SeedEntry {
        name,
        strength,
        category,
        form,
        price_range: (min, max),
    }
}

fn catalogue() -> Vec<SeedEntry> {
    vec![
        entry("Paracetamol", "500mg", "painkillers", "tablet", 1.0, 3.0),
        entry("Ibuprofen", "400mg", "painkillers", "tablet", 2.0, 5.0),
        entry("Amoxicillin", "500mg", "antibiotics", "tablet", 5.0, 10.0),
        entry("Amoxicillin + Clavulanate", "625mg", "antibiotics", "tablet", 12.0, 20.0),
        entry("Azithromycin", "500mg", "antibiotics", "tablet", 15.0, 25.0),
        entry("Ciprofloxacin", "500mg", "antibiotics", "tablet", 5.0, 8.0),
        entry("Doxycycline", "100mg", "antibiotics", "tablet", 3.0, 6.0),
        entry("Metronidazole", "400mg", "antibiotics", "tablet", 2.0, 5.0),
        entry("Cefixime", "200mg", "antibiotics", "tablet", 10.0, 20.0),
        entry("Omeprazole", "20mg", "digestive", "tablet", 3.0, 5.0),
        entry("Pantoprazole", "40mg", "digestive", "tablet", 4.0, 7.0),
        entry("Rabeprazole", "20mg", "digestive", "tablet", 5.0, 8.0),
        entry("Ranitidine", "150mg", "digestive", "tablet", 2.0, 4.0),
        entry("Domperidone", "10mg", "digestive", "tablet", 2.0, 4.0),
        entry("Ondansetron", "4mg", "digestive", "tablet", 10.0, 15.0),
        entry("ORS Sachet", "1L", "digestive", "tablet", 15.0, 20.0),
        entry("Levocetirizine", "5mg", "respiratory", "tablet", 2.0, 4.0),
        entry("Cetirizine", "10mg", "respiratory", "tablet", 2.0, 3.0),
        entry("Chlorpheniramine", "4mg", "respiratory", "tablet", 1.0, 2.0),
        entry("Montelukast", "10mg", "respiratory", "tablet", 8.0, 12.0),
        entry("Salbutamol Inhaler", "200 doses", "respiratory", "inhaler", 120.0, 150.0),
        entry("Budesonide Inhaler", "200mcg", "respiratory", "inhaler", 180.0, 220.0),
        entry("Amlodipine", "5mg", "blood_pressure", "tablet", 2.0, 4.0),
        entry("Losartan", "50mg", "blood_pressure", "tablet", 4.0, 6.0),
        entry("Telmisartan", "40mg", "blood_pressure", "tablet", 6.0, 10.0),
        entry("Atorvastatin", "10mg", "heart", "tablet", 5.0, 7.0),
        entry("Clopidogrel", "75mg", "heart", "tablet", 8.0, 12.0),
        entry("Metformin", "500mg", "diabetes", "tablet", 3.0, 5.0),
        entry("Glibenclamide", "5mg", "diabetes", "tablet", 2.0, 4.0),
        entry("Insulin", "10ml vial", "diabetes", "injection", 120.0, 180.0),
        entry("Vitamin C", "500mg", "vitamins", "tablet", 2.0, 4.0),
        entry("Zinc", "50mg", "supplements", "tablet", 2.0, 3.0),
        entry("Calcium + Vitamin D3", "500mg/250IU", "supplements", "tablet", 4.0, 8.0),
        entry("Vitamin B-Complex", "N/A", "vitamins", "tablet", 3.0, 6.0),
        entry("Folic Acid", "5mg", "vitamins", "tablet", 1.0, 2.0),
        entry("Iron + Folic Acid tablet", "N/A", "supplements", "tablet", 1.0, 2.0),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let conn = db::open_database(&config.db_path)?;

    let pharmacy_name = config
        .seed_pharmacy
        .as_deref()
        .unwrap_or(DEFAULT_PHARMACY);
    let pharmacy = find_or_create_pharmacy(&conn, pharmacy_name, None)?;
    tracing::info!(pharmacy = pharmacy_name, "Seeding medicine catalogue");

    let rx_required = Regex::new(r"(?i)insulin|inhaler|ciprofloxacin|doxycycline|clopidogrel")?;
    let mut rng = rand::thread_rng();
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for seed in catalogue() {
        let (min, max) = seed.price_range;
        let price = (rng.gen_range(min..=max) * 100.0).round() / 100.0;
        let stock = rng.gen_range(20..=200);

        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: seed.name.to_string(),
            generic_name: seed.name.to_string(),
            category: seed.category.to_string(),
            price,
            stock,
            dosage: Dosage {
                form: seed.form.to_string(),
                strength: seed.strength.to_string(),
                instructions: String::new(),
            },
            safety_info: SafetyInfo::default(),
            prescription_required: rx_required.is_match(seed.name),
            pharmacy_id: Some(pharmacy.id),
        };

        let expiry = Utc::now().date_naive() + Duration::days(rng.gen_range(120..=720));
        let inventory = InventoryEntry {
            id: Uuid::new_v4(),
            medicine_id: medicine.id,
            pharmacy_id: pharmacy.id,
            price,
            stock,
            discount: rng.gen_range(0..=15),
            is_available: stock > 0,
            expiry_date: Some(expiry),
            batch_number: Some(format!("BATCH-{}", rng.gen_range(10000..=99999))),
        };

        if seed_medicine(&conn, &medicine, &inventory)? {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }

    tracing::info!(inserted, skipped, "Seeding complete");
    Ok(())
}
