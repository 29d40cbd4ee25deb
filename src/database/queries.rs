use rusqlite::{Connection, OptionalExtension};

pub fn get_item(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO local_storage (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value, chrono::Utc::now().timestamp()],
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> rusqlite::Result<bool> {
    let removed = conn.execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn set_overwrites_previous_value() {
        let conn = conn();
        set_item(&conn, "k", "one").unwrap();
        set_item(&conn, "k", "two").unwrap();
        assert_eq!(get_item(&conn, "k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let conn = conn();
        set_item(&conn, "k", "v").unwrap();
        assert!(remove_item(&conn, "k").unwrap());
        assert!(!remove_item(&conn, "k").unwrap());
        assert_eq!(get_item(&conn, "k").unwrap(), None);
    }
}
