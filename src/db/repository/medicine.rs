//! Medicine catalogue and inventory repository.
//!
//! Pharmacy aggregation runs through two paths: the inventory join for
//! pharmacy_inventory rows, and a fallback over the denormalized pharmacy
//! reference carried on the medicine documents themselves.

use std::collections::BTreeMap;

use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{InventoryEntry, Medicine, PharmacyMatch, StockLine};

pub fn insert_medicine(conn: &Connection, medicine: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (
            id, name, generic_name, category, price, stock,
            dosage_form, dosage_strength, dosage_instructions,
            side_effects, contraindications, interactions, warnings,
            prescription_required, pharmacy_id
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            medicine.id.to_string(),
            medicine.name,
            medicine.generic_name,
            medicine.category,
            medicine.price,
            medicine.stock,
            medicine.dosage.form,
            medicine.dosage.strength,
            medicine.dosage.instructions,
            to_json_list(&medicine.safety_info.side_effects)?,
            to_json_list(&medicine.safety_info.contraindications)?,
            to_json_list(&medicine.safety_info.interactions)?,
            to_json_list(&medicine.safety_info.warnings)?,
            medicine.prescription_required,
            medicine.pharmacy_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

pub fn insert_inventory_entry(
    conn: &Connection,
    entry: &InventoryEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacy_inventory (
            id, medicine_id, pharmacy_id, price, stock, discount,
            is_available, expiry_date, batch_number
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.id.to_string(),
            entry.medicine_id.to_string(),
            entry.pharmacy_id.to_string(),
            entry.price,
            entry.stock,
            entry.discount,
            entry.is_available,
            entry.expiry_date,
            entry.batch_number,
        ],
    )?;
    Ok(())
}

/// All medicine names in the catalogue. The recognition pipeline fetches this
/// once per request and reuses the snapshot across all matching tiers.
pub fn medicine_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT DISTINCT name FROM medicines ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn medicine_exists(
    conn: &Connection,
    name: &str,
    pharmacy_id: Uuid,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM medicines WHERE name = ?1 AND pharmacy_id = ?2",
        params![name, pharmacy_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert-only seeding: skip the medicine when one with the same name already
/// exists for the pharmacy. Returns true when a row was inserted.
pub fn seed_medicine(
    conn: &Connection,
    medicine: &Medicine,
    entry: &InventoryEntry,
) -> Result<bool, DatabaseError> {
    let pharmacy_id = medicine.pharmacy_id.ok_or_else(|| {
        DatabaseError::ConstraintViolation("seeded medicine needs a pharmacy".into())
    })?;
    if medicine_exists(conn, &medicine.name, pharmacy_id)? {
        return Ok(false);
    }
    insert_medicine(conn, medicine)?;
    insert_inventory_entry(conn, entry)?;
    Ok(true)
}

/// Pharmacies stocking any of the given medicines, via the inventory join.
/// Only rows that are available and in stock count. Results are grouped per
/// pharmacy with one stock line per matched medicine.
pub fn stocked_pharmacies(
    conn: &Connection,
    names: &[String],
) -> Result<Vec<PharmacyMatch>, DatabaseError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (1..=names.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT p.id, p.name, p.location, m.id, m.name, i.price, i.stock
         FROM pharmacy_inventory i
         JOIN medicines m ON m.id = i.medicine_id
         JOIN pharmacies p ON p.id = i.pharmacy_id
         WHERE m.name IN ({placeholders})
           AND i.is_available = 1
           AND i.stock > 0
         ORDER BY p.name, m.name"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(names.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, i64>(6)?,
        ))
    })?;

    group_pharmacy_rows(rows)
}

/// Fallback aggregation over the denormalized pharmacy reference on the
/// medicine documents, using their top-level price and stock. Used when the
/// inventory join comes back empty for a non-empty match set.
pub fn fallback_pharmacies(
    conn: &Connection,
    names: &[String],
) -> Result<Vec<PharmacyMatch>, DatabaseError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (1..=names.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT p.id, p.name, p.location, m.id, m.name, m.price, m.stock
         FROM medicines m
         JOIN pharmacies p ON p.id = m.pharmacy_id
         WHERE m.name IN ({placeholders})
         ORDER BY p.name, m.name"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(names.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, i64>(6)?,
        ))
    })?;

    group_pharmacy_rows(rows)
}

type PharmacyRow = (String, String, Option<String>, String, String, f64, i64);

fn group_pharmacy_rows(
    rows: impl Iterator<Item = Result<PharmacyRow, rusqlite::Error>>,
) -> Result<Vec<PharmacyMatch>, DatabaseError> {
    let mut grouped: BTreeMap<String, PharmacyMatch> = BTreeMap::new();

    for row in rows {
        let (pharmacy_id, pharmacy_name, location, medicine_id, medicine_name, price, stock) =
            row?;
        let entry = grouped.entry(pharmacy_id.clone()).or_insert_with(|| {
            PharmacyMatch {
                id: parse_uuid(&pharmacy_id).unwrap_or_else(Uuid::nil),
                name: pharmacy_name,
                location,
                medicines_in_stock: Vec::new(),
            }
        });
        entry.medicines_in_stock.push(StockLine {
            medicine_id: parse_uuid(&medicine_id).unwrap_or_else(Uuid::nil),
            name: medicine_name,
            price,
            stock,
        });
    }

    Ok(grouped.into_values().collect())
}

fn parse_uuid(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s).ok()
}

fn to_json_list(items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("cannot encode list: {e}")))
}
