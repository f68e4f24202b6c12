//! Pharmacy repository.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Pharmacy;

pub fn insert_pharmacy(conn: &Connection, pharmacy: &Pharmacy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacies (id, name, location) VALUES (?1, ?2, ?3)",
        params![
            pharmacy.id.to_string(),
            pharmacy.name,
            pharmacy.location
        ],
    )?;
    Ok(())
}

pub fn find_pharmacy_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Pharmacy>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, location FROM pharmacies WHERE name = ?1",
            params![name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, name, location)) => {
            let id = Uuid::parse_str(&id).map_err(|e| {
                DatabaseError::ConstraintViolation(format!("invalid pharmacy id: {e}"))
            })?;
            Ok(Some(Pharmacy { id, name, location }))
        }
        None => Ok(None),
    }
}

/// Find a pharmacy by name, creating it if absent.
pub fn find_or_create_pharmacy(
    conn: &Connection,
    name: &str,
    location: Option<&str>,
) -> Result<Pharmacy, DatabaseError> {
    if let Some(existing) = find_pharmacy_by_name(conn, name)? {
        return Ok(existing);
    }
    let pharmacy = Pharmacy {
        id: Uuid::new_v4(),
        name: name.to_string(),
        location: location.map(str::to_string),
    };
    insert_pharmacy(conn, &pharmacy)?;
    Ok(pharmacy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_find_pharmacy() {
        let conn = open_memory_database().unwrap();
        let pharmacy = Pharmacy {
            id: Uuid::new_v4(),
            name: "City Care Pharmacy".into(),
            location: Some("Main Street".into()),
        };
        insert_pharmacy(&conn, &pharmacy).unwrap();

        let found = find_pharmacy_by_name(&conn, "City Care Pharmacy")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, pharmacy.id);
        assert_eq!(found.location.as_deref(), Some("Main Street"));
    }

    #[test]
    fn find_missing_pharmacy_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(find_pharmacy_by_name(&conn, "Nowhere").unwrap().is_none());
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let first = find_or_create_pharmacy(&conn, "City Care Pharmacy", None).unwrap();
        let second = find_or_create_pharmacy(&conn, "City Care Pharmacy", None).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn pharmacy_names_are_unique() {
        let conn = open_memory_database().unwrap();
        let a = Pharmacy {
            id: Uuid::new_v4(),
            name: "City Care Pharmacy".into(),
            location: None,
        };
        let b = Pharmacy {
            id: Uuid::new_v4(),
            name: "City Care Pharmacy".into(),
            location: None,
        };
        insert_pharmacy(&conn, &a).unwrap();
        assert!(insert_pharmacy(&conn, &b).is_err());
    }
}
