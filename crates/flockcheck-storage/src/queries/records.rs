// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inspection record CRUD on the `poultry_health` table.

use flockcheck_core::{AttachmentRef, FieldId, FieldValues, FlockError, Record, RecordId, UserId};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const SELECT_COLUMNS: &str = "SELECT id, user, body_weight, body_temperature, \
     vaccination_medication, infection_symptoms, image_path, timestamp FROM poultry_health";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    let mut values = FieldValues::new();
    for field in FieldId::ALL {
        let value: Option<String> = row.get(field.column())?;
        if let Some(value) = value {
            values.set(field, value);
        }
    }
    let image_path: Option<String> = row.get("image_path")?;
    Ok(Record {
        id: RecordId(row.get("id")?),
        user: UserId(row.get("user")?),
        values,
        attachment: image_path.map(AttachmentRef),
        created_at: row.get("timestamp")?,
    })
}

/// Insert a new record. The timestamp is assigned by the database.
pub async fn insert_record(
    db: &Database,
    user: &UserId,
    values: &FieldValues,
    attachment: Option<&AttachmentRef>,
) -> Result<RecordId, FlockError> {
    let user = user.0.clone();
    let values = values.clone();
    let image_path = attachment.map(|a| a.0.clone());
    db.connection()
        .call(move |conn| -> rusqlite::Result<RecordId> {
            conn.execute(
                "INSERT INTO poultry_health (user, body_weight, body_temperature,
                     vaccination_medication, infection_symptoms, image_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user,
                    values.get(FieldId::Weight),
                    values.get(FieldId::Temperature),
                    values.get(FieldId::MedicationNotes),
                    values.get(FieldId::SymptomNotes),
                    image_path,
                ],
            )?;
            Ok(RecordId(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite all value slots and the attachment of an existing record.
///
/// `user` and `timestamp` are left untouched.
pub async fn update_record(
    db: &Database,
    id: RecordId,
    values: &FieldValues,
    attachment: Option<&AttachmentRef>,
) -> Result<(), FlockError> {
    let values = values.clone();
    let image_path = attachment.map(|a| a.0.clone());
    let affected = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE poultry_health
                 SET body_weight = ?1, body_temperature = ?2,
                     vaccination_medication = ?3, infection_symptoms = ?4, image_path = ?5
                 WHERE id = ?6",
                params![
                    values.get(FieldId::Weight),
                    values.get(FieldId::Temperature),
                    values.get(FieldId::MedicationNotes),
                    values.get(FieldId::SymptomNotes),
                    image_path,
                    id.0,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if affected == 0 {
        return Err(FlockError::NotFound {
            entity: "record",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Get a record by id.
pub async fn get_record(db: &Database, id: RecordId) -> Result<Option<Record>, FlockError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Most recently created record for `user`; ties on timestamp go to the higher id.
pub async fn latest_for_user(db: &Database, user: &UserId) -> Result<Option<Record>, FlockError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE user = ?1 ORDER BY timestamp DESC, id DESC LIMIT 1"),
                params![user],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the most recently created record for `user` and return it.
///
/// Select and delete run in one transaction so a concurrent insert for the
/// same user cannot change which row is removed.
pub async fn delete_latest_for_user(
    db: &Database,
    user: &UserId,
) -> Result<Option<Record>, FlockError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Record>> {
            let tx = conn.transaction()?;
            let latest = tx
                .query_row(
                    &format!(
                        "{SELECT_COLUMNS} WHERE user = ?1 ORDER BY timestamp DESC, id DESC LIMIT 1"
                    ),
                    params![user],
                    row_to_record,
                )
                .optional()?;
            if let Some(record) = &latest {
                tx.execute(
                    "DELETE FROM poultry_health WHERE id = ?1",
                    params![record.id.0],
                )?;
            }
            tx.commit()?;
            Ok(latest)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("records.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn values(pairs: &[(FieldId, &str)]) -> FieldValues {
        pairs.iter().map(|(f, v)| (*f, v.to_string())).collect()
    }

    #[tokio::test]
    async fn insert_and_get_preserves_missing_slots() {
        let (db, _dir) = setup_db().await;
        let user = UserId::from("u1");
        let id = insert_record(&db, &user, &values(&[(FieldId::Weight, "1.5")]), None)
            .await
            .unwrap();

        let record = get_record(&db, id).await.unwrap().unwrap();
        assert_eq!(record.user, user);
        assert_eq!(record.values.get(FieldId::Weight), Some("1.5"));
        assert!(!record.values.is_filled(FieldId::Temperature));
        assert!(record.attachment.is_none());
        assert!(!record.created_at.is_empty());
        assert!(!record.is_complete());
    }

    #[tokio::test]
    async fn fields_are_read_from_their_named_columns() {
        let (db, _dir) = setup_db().await;
        let id = db
            .connection()
            .call(|conn| -> rusqlite::Result<RecordId> {
                conn.execute(
                    "INSERT INTO poultry_health (user, body_weight, body_temperature,
                         vaccination_medication, infection_symptoms)
                     VALUES ('u1', 'w', 't', 'm', 's')",
                    [],
                )?;
                Ok(RecordId(conn.last_insert_rowid()))
            })
            .await
            .unwrap();

        let record = get_record(&db, id).await.unwrap().unwrap();
        assert_eq!(record.values.get(FieldId::Weight), Some("w"));
        assert_eq!(record.values.get(FieldId::Temperature), Some("t"));
        assert_eq!(record.values.get(FieldId::MedicationNotes), Some("m"));
        assert_eq!(record.values.get(FieldId::SymptomNotes), Some("s"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_record(&db, RecordId(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_values_and_keeps_timestamp() {
        let (db, _dir) = setup_db().await;
        let user = UserId::from("u1");
        let id = insert_record(&db, &user, &values(&[(FieldId::Weight, "1.5")]), None)
            .await
            .unwrap();
        let before = get_record(&db, id).await.unwrap().unwrap();

        let image = AttachmentRef("/tmp/images/u1/abc.jpg".into());
        update_record(
            &db,
            id,
            &values(&[(FieldId::Temperature, "41.2"), (FieldId::SymptomNotes, "coughing")]),
            Some(&image),
        )
        .await
        .unwrap();

        let after = get_record(&db, id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(!after.values.is_filled(FieldId::Weight));
        assert_eq!(after.values.get(FieldId::Temperature), Some("41.2"));
        assert_eq!(after.attachment, Some(image));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_record(&db, RecordId(7), &FieldValues::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn latest_prefers_higher_id_on_timestamp_tie() {
        let (db, _dir) = setup_db().await;
        let user = UserId::from("u1");
        let first = insert_record(&db, &user, &FieldValues::new(), None).await.unwrap();
        let second = insert_record(&db, &user, &FieldValues::new(), None).await.unwrap();
        // Force identical timestamps.
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE poultry_health SET timestamp = '2026-01-01T00:00:00.000Z'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let latest = latest_for_user(&db, &user).await.unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_ne!(latest.id, first);
    }

    #[tokio::test]
    async fn latest_is_scoped_to_user() {
        let (db, _dir) = setup_db().await;
        let a = UserId::from("a");
        let b = UserId::from("b");
        let a_id = insert_record(&db, &a, &FieldValues::new(), None).await.unwrap();
        insert_record(&db, &b, &FieldValues::new(), None).await.unwrap();

        assert_eq!(latest_for_user(&db, &a).await.unwrap().unwrap().id, a_id);
        assert!(latest_for_user(&db, &UserId::from("c")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_latest_removes_only_newest_for_user() {
        let (db, _dir) = setup_db().await;
        let a = UserId::from("a");
        let b = UserId::from("b");
        let older = insert_record(&db, &a, &FieldValues::new(), None).await.unwrap();
        let newer = insert_record(&db, &a, &FieldValues::new(), None).await.unwrap();
        let other = insert_record(&db, &b, &FieldValues::new(), None).await.unwrap();

        let deleted = delete_latest_for_user(&db, &a).await.unwrap().unwrap();
        assert_eq!(deleted.id, newer);
        assert!(get_record(&db, newer).await.unwrap().is_none());
        assert!(get_record(&db, older).await.unwrap().is_some());
        assert!(get_record(&db, other).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_latest_without_records_is_none() {
        let (db, _dir) = setup_db().await;
        let deleted = delete_latest_for_user(&db, &UserId::from("nobody")).await.unwrap();
        assert!(deleted.is_none());
    }
}
