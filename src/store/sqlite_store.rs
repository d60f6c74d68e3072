use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Category, Complaint, Priority, Role, Status, User};
use crate::error::{AppError, Result};

/// Durable record store for complaints, plus a read-only view of the `users`
/// table the external auth system maintains.
///
/// Timestamps are stored as fixed-width RFC 3339 TEXT so that SQL `ORDER BY`
/// on them matches chronological order.
pub struct ComplaintStore {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

/// Optional exact-match constraints for the admin listing. Omitted fields
/// impose no constraint; supplied ones are ANDed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplaintFilter {
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

/// Dashboard aggregates, always computed over the full collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub solved: i64,
}

const COMPLAINT_COLUMNS: &str =
    "id, owner_id, category, description, priority, status, admin_remarks, created_at, updated_at";

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl ComplaintStore {
    /// Open or create the database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            path: PathBuf::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS complaints (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                admin_remarks TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_complaints_owner ON complaints(owner_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_complaints_status ON complaints(status)",
            [],
        )?;

        // Populated by the auth system; the complaint core only reads it.
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                room_number TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        Ok(())
    }

    /// Persist a new complaint
    pub fn insert_complaint(&self, complaint: &Complaint) -> Result<()> {
        self.conn.execute(
            "INSERT INTO complaints
             (id, owner_id, category, description, priority, status, admin_remarks, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                complaint.id.to_string(),
                complaint.owner_id.to_string(),
                complaint.category.to_string(),
                complaint.description,
                complaint.priority.to_string(),
                complaint.status.to_string(),
                complaint.admin_remarks,
                timestamp(complaint.created_at),
                timestamp(complaint.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get a complaint by id
    pub fn get_complaint(&self, id: &Uuid) -> Result<Option<Complaint>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM complaints WHERE id = ?1", COMPLAINT_COLUMNS),
                [id.to_string()],
                read_raw,
            )
            .optional()?;

        raw.map(parse_complaint).transpose()
    }

    /// All complaints for one owner, most recent first
    pub fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Complaint>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM complaints WHERE owner_id = ?1 ORDER BY created_at DESC",
            COMPLAINT_COLUMNS
        ))?;

        let raws = stmt
            .query_map([owner_id.to_string()], read_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raws.into_iter().map(parse_complaint).collect()
    }

    /// All complaints matching every supplied filter, in store order
    pub fn list_filtered(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            clauses.push("status = ?");
            values.push(status.to_string());
        }
        if let Some(category) = filter.category {
            clauses.push("category = ?");
            values.push(category.to_string());
        }
        if let Some(priority) = filter.priority {
            clauses.push("priority = ?");
            values.push(priority.to_string());
        }

        let mut sql = format!("SELECT {} FROM complaints", COMPLAINT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let raws = stmt
            .query_map(params_from_iter(values), read_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raws.into_iter().map(parse_complaint).collect()
    }

    /// Set status and remarks on an existing complaint and refresh its
    /// `updated_at`. Returns the updated record, or `None` if the id is
    /// unknown. Concurrent updates race last-writer-wins; there is no
    /// version counter.
    pub fn update_status(
        &self,
        id: &Uuid,
        status: Status,
        admin_remarks: &str,
    ) -> Result<Option<Complaint>> {
        let changed = self.conn.execute(
            "UPDATE complaints SET status = ?1, admin_remarks = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                status.to_string(),
                admin_remarks,
                timestamp(Utc::now()),
                id.to_string()
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_complaint(id)
    }

    /// Status tallies over the whole collection, independent of any filter
    pub fn status_counts(&self) -> Result<StatusCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM complaints GROUP BY status")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.total += count;
            match status.parse::<Status>().map_err(AppError::Storage)? {
                Status::Pending => counts.pending += count,
                Status::InProgress => counts.in_progress += count,
                Status::Solved => counts.solved += count,
            }
        }

        Ok(counts)
    }

    /// Look up a user by id
    pub fn get_user(&self, id: &Uuid) -> Result<Option<User>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, email, role, room_number FROM users WHERE id = ?1",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, email, role, room_number)) = raw else {
            return Ok(None);
        };

        Ok(Some(User {
            id: parse_uuid(&id)?,
            name,
            email,
            role: role.parse::<Role>().map_err(AppError::Storage)?,
            room_number,
        }))
    }

    /// Insert or replace a user record. Called by the auth collaborator when
    /// accounts change, and by tests to seed fixtures.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (id, name, email, role, room_number)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.role.to_string(),
                user.room_number,
            ],
        )?;
        Ok(())
    }
}

struct RawComplaint {
    id: String,
    owner_id: String,
    category: String,
    description: String,
    priority: String,
    status: String,
    admin_remarks: String,
    created_at: String,
    updated_at: String,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawComplaint> {
    Ok(RawComplaint {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        priority: row.get(4)?,
        status: row.get(5)?,
        admin_remarks: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    s.parse()
        .map_err(|e| AppError::Storage(format!("Bad uuid in row: {}", e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Storage(format!("Bad timestamp in row: {}", e)))
}

fn parse_complaint(raw: RawComplaint) -> Result<Complaint> {
    Ok(Complaint {
        id: parse_uuid(&raw.id)?,
        owner_id: parse_uuid(&raw.owner_id)?,
        category: raw.category.parse().map_err(AppError::Storage)?,
        description: raw.description,
        priority: raw.priority.parse().map_err(AppError::Storage)?,
        status: raw.status.parse().map_err(AppError::Storage)?,
        admin_remarks: raw.admin_remarks,
        created_at: parse_timestamp(&raw.created_at)?,
        updated_at: parse_timestamp(&raw.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complaint(category: Category, priority: Priority) -> Complaint {
        Complaint::new(
            Uuid::new_v4(),
            category,
            "test description".to_string(),
            priority,
        )
    }

    #[test]
    fn test_open_creates_db() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hosteldesk.db");
        let _store = ComplaintStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = ComplaintStore::open_in_memory().unwrap();
        let c = complaint(Category::WiFi, Priority::High);
        store.insert_complaint(&c).unwrap();

        let fetched = store.get_complaint(&c.id).unwrap().unwrap();
        assert_eq!(fetched.id, c.id);
        assert_eq!(fetched.owner_id, c.owner_id);
        assert_eq!(fetched.category, Category::WiFi);
        assert_eq!(fetched.priority, Priority::High);
        assert_eq!(fetched.status, Status::Pending);
        assert_eq!(fetched.admin_remarks, "");
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let store = ComplaintStore::open_in_memory().unwrap();
        assert!(store.get_complaint(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_list_by_owner_most_recent_first() {
        let store = ComplaintStore::open_in_memory().unwrap();
        let owner = Uuid::new_v4();

        let mut first = complaint(Category::Water, Priority::Low);
        first.owner_id = owner;
        let mut second = complaint(Category::WiFi, Priority::Low);
        second.owner_id = owner;
        second.created_at = first.created_at + chrono::Duration::seconds(5);
        second.updated_at = second.created_at;

        store.insert_complaint(&first).unwrap();
        store.insert_complaint(&second).unwrap();

        // Someone else's complaint must not show up.
        store
            .insert_complaint(&complaint(Category::Other, Priority::Low))
            .unwrap();

        let listed = store.list_by_owner(&owner).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_list_filtered_ands_constraints() {
        let store = ComplaintStore::open_in_memory().unwrap();
        store
            .insert_complaint(&complaint(Category::WiFi, Priority::High))
            .unwrap();
        store
            .insert_complaint(&complaint(Category::WiFi, Priority::Low))
            .unwrap();
        store
            .insert_complaint(&complaint(Category::Water, Priority::High))
            .unwrap();

        let all = store.list_filtered(&ComplaintFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let wifi = store
            .list_filtered(&ComplaintFilter {
                category: Some(Category::WiFi),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(wifi.len(), 2);

        let wifi_high = store
            .list_filtered(&ComplaintFilter {
                category: Some(Category::WiFi),
                priority: Some(Priority::High),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(wifi_high.len(), 1);

        let solved = store
            .list_filtered(&ComplaintFilter {
                status: Some(Status::Solved),
                ..Default::default()
            })
            .unwrap();
        assert!(solved.is_empty());
    }

    #[test]
    fn test_update_status_refreshes_updated_at_only() {
        let store = ComplaintStore::open_in_memory().unwrap();
        let c = complaint(Category::Electricity, Priority::Urgent);
        store.insert_complaint(&c).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = store
            .update_status(&c.id, Status::Solved, "Fuse replaced")
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, Status::Solved);
        assert_eq!(updated.admin_remarks, "Fuse replaced");
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(updated.created_at, c.created_at);
        assert_eq!(updated.owner_id, c.owner_id);
        assert_eq!(updated.category, c.category);
    }

    #[test]
    fn test_update_unknown_id_is_none() {
        let store = ComplaintStore::open_in_memory().unwrap();
        let result = store
            .update_status(&Uuid::new_v4(), Status::Solved, "")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_status_counts_tally_all_statuses() {
        let store = ComplaintStore::open_in_memory().unwrap();

        let counts = store.status_counts().unwrap();
        assert_eq!(counts.total, 0);

        let pending = complaint(Category::WiFi, Priority::Medium);
        let other = complaint(Category::Water, Priority::Medium);
        let solved = complaint(Category::Other, Priority::Medium);
        store.insert_complaint(&pending).unwrap();
        store.insert_complaint(&other).unwrap();
        store.insert_complaint(&solved).unwrap();
        store
            .update_status(&other.id, Status::InProgress, "")
            .unwrap();
        store.update_status(&solved.id, Status::Solved, "").unwrap();

        let counts = store.status_counts().unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.solved, 1);
    }

    #[test]
    fn test_user_round_trip() {
        let store = ComplaintStore::open_in_memory().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: Role::Student,
            room_number: "204".to_string(),
        };
        store.upsert_user(&user).unwrap();

        let fetched = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Asha");
        assert_eq!(fetched.role, Role::Student);
        assert_eq!(fetched.room_number, "204");

        assert!(store.get_user(&Uuid::new_v4()).unwrap().is_none());
    }
}
