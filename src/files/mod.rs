//! Owner-scoped file storage: blobs on disk, metadata in the `files` table.

mod allowlist;

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use sanitize_filename::sanitize;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    accounts,
    error::{AppError, AppResult},
};

pub use allowlist::{extension_of, resolve_content_type};

const FILE_COLUMNS: &str = "id, user_id, original_name, stored_name, content_type, file_size, subject, grade, description, uploaded_at";
const MAX_STORED_STEM_CHARS: usize = 64;

#[derive(Clone, Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub original_name: String,
    #[serde(skip)]
    pub stored_name: String,
    #[serde(rename = "fileType")]
    pub content_type: String,
    pub file_size: i64,
    pub subject: String,
    pub grade: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A file received from a client, not yet validated.
#[derive(Debug)]
pub struct NewUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

/// Exact-match filters for listings; empty values are treated as absent.
#[derive(Debug, Default, Clone)]
pub struct FileFilters {
    pub subject: Option<String>,
    pub grade: Option<String>,
}

impl FileFilters {
    pub fn new(subject: Option<String>, grade: Option<String>) -> Self {
        Self {
            subject: non_empty(subject),
            grade: non_empty(grade),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_files: i64,
    #[serde(rename = "totalSize")]
    pub total_size_bytes: i64,
    #[serde(rename = "totalSubjects")]
    pub distinct_subject_count: i64,
}

#[derive(Debug)]
pub struct FileDownload {
    pub bytes: Vec<u8>,
    pub original_name: String,
    pub content_type: String,
}

#[derive(Clone)]
pub struct FileStore {
    pool: SqlitePool,
    root: PathBuf,
    max_bytes: u64,
}

impl FileStore {
    /// Ensures the blob directory exists.
    pub async fn open(
        pool: SqlitePool,
        root: impl Into<PathBuf>,
        max_bytes: u64,
    ) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to ensure storage root at {}", root.display()))?;

        Ok(Self {
            pool,
            root,
            max_bytes,
        })
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn blob_path(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    /// Validates and persists an upload. Nothing is written unless the size and type checks
    /// pass, and the blob is removed again if the metadata insert fails.
    pub async fn save(&self, owner_id: Uuid, upload: NewUpload) -> AppResult<FileRecord> {
        let size = upload.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(AppError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let original_name = display_name(&upload.original_name);
        if original_name.is_empty() {
            return Err(AppError::validation("No file uploaded"));
        }
        let content_type = resolve_content_type(&original_name, upload.content_type.as_deref())?;

        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            user_id: owner_id,
            stored_name: stored_name_for(owner_id, &original_name, now),
            original_name,
            content_type: content_type.to_string(),
            file_size: size as i64,
            subject: trimmed(upload.subject),
            grade: trimmed(upload.grade),
            description: trimmed(upload.description),
            uploaded_at: now,
        };

        let path = self.blob_path(&record.stored_name);
        write_new_blob(&path, &upload.bytes).await?;

        if let Err(err) = self.insert_record(&record).await {
            if let Err(cleanup_err) = fs::remove_file(&path).await {
                error!(?cleanup_err, file = %path.display(), "failed to remove orphaned upload");
            }
            return Err(err);
        }

        info!(user_id = %owner_id, file_id = %record.id, size, "stored upload");
        Ok(record)
    }

    async fn insert_record(&self, record: &FileRecord) -> AppResult<()> {
        let mut transaction = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO files (id, user_id, original_name, stored_name, content_type, file_size, subject, grade, description, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.original_name)
        .bind(&record.stored_name)
        .bind(&record.content_type)
        .bind(record.file_size)
        .bind(&record.subject)
        .bind(&record.grade)
        .bind(&record.description)
        .bind(record.uploaded_at)
        .execute(&mut *transaction)
        .await?;

        sqlx::query("UPDATE users SET total_notes = total_notes + 1 WHERE id = ?")
            .bind(record.user_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        Ok(())
    }

    /// Most recent first.
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        filters: &FileFilters,
    ) -> AppResult<Vec<FileRecord>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {FILE_COLUMNS} FROM files WHERE user_id = "));
        query.push_bind(owner_id);

        if let Some(subject) = filters.subject.as_deref() {
            query.push(" AND subject = ").push_bind(subject);
        }
        if let Some(grade) = filters.grade.as_deref() {
            query.push(" AND grade = ").push_bind(grade);
        }
        query.push(" ORDER BY uploaded_at DESC, rowid DESC");

        let files = query
            .build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(files)
    }

    /// Missing files and files of other owners both come back as `NotFound`.
    pub async fn get_for_owner(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND user_id = ?"
        ))
        .bind(file_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<()> {
        let record = self.get_for_owner(owner_id, file_id).await?;

        let path = self.blob_path(&record.stored_name);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(file_id = %record.id, "blob already missing, removing metadata only");
            }
            Err(err) => return Err(err.into()),
        }

        let mut transaction = self.pool.begin().await?;

        sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(record.id)
            .bind(owner_id)
            .execute(&mut *transaction)
            .await?;

        sqlx::query("UPDATE users SET total_notes = MAX(total_notes - 1, 0) WHERE id = ?")
            .bind(owner_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        info!(user_id = %owner_id, file_id = %record.id, "deleted file");
        Ok(())
    }

    /// Reads the blob and counts the download against the owner.
    pub async fn download(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<FileDownload> {
        let record = self.get_for_owner(owner_id, file_id).await?;

        let path = self.blob_path(&record.stored_name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(file_id = %record.id, "metadata exists but blob is missing");
                return Err(AppError::NotFound);
            }
            Err(err) => return Err(err.into()),
        };

        accounts::increment_downloads(&self.pool, owner_id).await?;

        Ok(FileDownload {
            bytes,
            original_name: record.original_name,
            content_type: record.content_type,
        })
    }

    pub async fn stats(&self, owner_id: Uuid) -> AppResult<FileStats> {
        let (total_files, total_size_bytes, distinct_subject_count): (i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(file_size), 0), COUNT(DISTINCT NULLIF(subject, ''))
                 FROM files WHERE user_id = ?",
            )
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(FileStats {
            total_files,
            total_size_bytes,
            distinct_subject_count,
        })
    }

    /// Removes blobs with no metadata row that are older than `grace`. Such files are left
    /// behind when a request is dropped between writing the blob and inserting its row; the
    /// grace period keeps uploads that are still in flight.
    pub async fn sweep_orphans(&self, grace: std::time::Duration) -> AppResult<u64> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()?
                .elapsed()
                .unwrap_or(std::time::Duration::ZERO);
            if age < grace {
                continue;
            }

            let Some(stored_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let tracked: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM files WHERE stored_name = ?")
                    .bind(&stored_name)
                    .fetch_optional(&self.pool)
                    .await?;
            if tracked.is_some() {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        if removed > 0 {
            warn!(removed, "removed untracked upload blobs");
        }
        Ok(removed)
    }
}

async fn write_new_blob(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(file);
        let _ = fs::remove_file(path).await;
        return Err(err.into());
    }

    Ok(())
}

/// Last path segment of a client-supplied name; some browsers send full paths.
fn display_name(raw: &str) -> String {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim().to_string()
}

/// `<millis>-<owner>-<nonce>-<sanitized name>`; the random nonce keeps names distinct even
/// for identical uploads landing in the same millisecond.
/// The extension is taken from the original name before sanitizing, which may truncate.
fn stored_name_for(owner_id: Uuid, original_name: &str, now: DateTime<Utc>) -> String {
    let raw_stem = Path::new(original_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");
    let stem: String = sanitize(raw_stem)
        .chars()
        .take(MAX_STORED_STEM_CHARS)
        .collect();
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };

    let name = match extension_of(original_name).filter(|ext| sanitize(ext) == *ext) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    };

    format!(
        "{}-{}-{}-{}",
        now.timestamp_millis(),
        owner_id.simple(),
        Uuid::new_v4().simple(),
        name
    )
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use tempfile::TempDir;

    const LIMIT: u64 = 10 * 1024 * 1024;

    async fn setup() -> (FileStore, TempDir, SqlitePool) {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(pool.clone(), dir.path().join("uploads"), LIMIT)
            .await
            .unwrap();
        (store, dir, pool)
    }

    async fn user(pool: &SqlitePool, email: &str) -> Uuid {
        accounts::create_user(pool, "Ann", email, "hash", None)
            .await
            .unwrap()
            .id
    }

    fn upload(name: &str, content_type: &str, bytes: Vec<u8>, subject: &str) -> NewUpload {
        NewUpload {
            original_name: name.to_string(),
            content_type: Some(content_type.to_string()),
            bytes,
            subject: Some(subject.to_string()),
            grade: Some("10".to_string()),
            description: None,
        }
    }

    fn blob_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join("uploads")).unwrap().count()
    }

    #[tokio::test]
    async fn upload_round_trips_bytes_and_name() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;
        let content: Vec<u8> = (0..1024).map(|i| (i % 251) as u8).collect();

        let saved = store
            .save(owner, upload("Lecture 1.pdf", "application/pdf", content.clone(), "Physics"))
            .await
            .unwrap();
        assert_eq!(saved.file_size, 1024);
        assert_eq!(saved.subject, "Physics");
        assert_eq!(saved.description, "");

        let download = store.download(owner, saved.id).await.unwrap();
        assert_eq!(download.bytes, content);
        assert_eq!(download.original_name, "Lecture 1.pdf");
        assert_eq!(download.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn rejected_uploads_leave_nothing_behind() {
        let (store, dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;

        let err = store
            .save(owner, upload("tool.exe", "application/octet-stream", vec![1; 16], "Physics"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));

        let oversized = vec![0u8; (LIMIT + 1) as usize];
        let err = store
            .save(owner, upload("big.pdf", "application/pdf", oversized, "Physics"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TooLarge { .. }));

        assert_eq!(blob_count(&dir), 0);
        assert_eq!(store.stats(owner).await.unwrap().total_files, 0);
    }

    #[tokio::test]
    async fn failed_metadata_insert_removes_blob() {
        let (store, dir, _pool) = setup().await;
        let missing_owner = Uuid::new_v4();

        let err = store
            .save(missing_owner, upload("notes.txt", "text/plain", b"hello".to_vec(), ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(blob_count(&dir), 0);
    }

    #[tokio::test]
    async fn identical_names_get_distinct_stored_names() {
        let (store, dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;

        let (a, b) = tokio::join!(
            store.save(owner, upload("notes.txt", "text/plain", b"one".to_vec(), "")),
            store.save(owner, upload("notes.txt", "text/plain", b"two".to_vec(), "")),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.stored_name, b.stored_name);
        assert_eq!(blob_count(&dir), 2);
        assert_eq!(store.download(owner, a.id).await.unwrap().bytes, b"one");
        assert_eq!(store.download(owner, b.id).await.unwrap().bytes, b"two");
    }

    #[tokio::test]
    async fn listing_filters_and_orders_newest_first() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;
        let other = user(&pool, "bob@x.com").await;

        let first = store
            .save(owner, upload("a.pdf", "application/pdf", vec![1], "Physics"))
            .await
            .unwrap();
        store
            .save(owner, upload("b.pdf", "application/pdf", vec![2], "Maths"))
            .await
            .unwrap();
        let third = store
            .save(owner, upload("c.pdf", "application/pdf", vec![3], "Physics"))
            .await
            .unwrap();
        store
            .save(other, upload("d.pdf", "application/pdf", vec![4], "Physics"))
            .await
            .unwrap();

        let physics = store
            .list_for_owner(owner, &FileFilters::new(Some("Physics".into()), None))
            .await
            .unwrap();
        let ids: Vec<Uuid> = physics.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);

        let all = store
            .list_for_owner(owner, &FileFilters::new(Some("  ".into()), None))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, third.id);

        let by_grade = store
            .list_for_owner(
                owner,
                &FileFilters::new(Some("Maths".into()), Some("10".into())),
            )
            .await
            .unwrap();
        assert_eq!(by_grade.len(), 1);

        let none = store
            .list_for_owner(owner, &FileFilters::new(None, Some("12".into())))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn other_owners_cannot_see_or_touch_files() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;
        let intruder = user(&pool, "eve@x.com").await;

        let saved = store
            .save(owner, upload("a.pdf", "application/pdf", vec![1, 2, 3], "Physics"))
            .await
            .unwrap();

        assert!(matches!(
            store.get_for_owner(intruder, saved.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.download(intruder, saved.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.delete(intruder, saved.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.download(owner, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));

        assert!(store.get_for_owner(owner, saved.id).await.is_ok());
        let intruder_row = accounts::find_by_id(&pool, intruder).await.unwrap().unwrap();
        assert_eq!(intruder_row.downloads, 0);
    }

    #[tokio::test]
    async fn delete_tolerates_missing_blob() {
        let (store, dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;

        let saved = store
            .save(owner, upload("a.txt", "text/plain", b"x".to_vec(), "Physics"))
            .await
            .unwrap();
        std::fs::remove_file(dir.path().join("uploads").join(&saved.stored_name)).unwrap();

        assert!(matches!(
            store.download(owner, saved.id).await,
            Err(AppError::NotFound)
        ));
        store.delete(owner, saved.id).await.unwrap();
        assert!(store.list_for_owner(owner, &FileFilters::default()).await.unwrap().is_empty());

        let reloaded = accounts::find_by_id(&pool, owner).await.unwrap().unwrap();
        assert_eq!(reloaded.downloads, 0);
    }

    #[tokio::test]
    async fn downloads_count_exactly_once_each() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;

        let saved = store
            .save(owner, upload("a.png", "image/png", vec![9; 32], "Art"))
            .await
            .unwrap();
        store.download(owner, saved.id).await.unwrap();
        store.download(owner, saved.id).await.unwrap();

        let reloaded = accounts::find_by_id(&pool, owner).await.unwrap().unwrap();
        assert_eq!(reloaded.downloads, 2);
    }

    #[tokio::test]
    async fn stats_track_current_rows_and_note_counter() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;

        assert_eq!(store.stats(owner).await.unwrap(), FileStats::default());

        let a = store
            .save(owner, upload("a.pdf", "application/pdf", vec![0; 100], "Physics"))
            .await
            .unwrap();
        store
            .save(owner, upload("b.pdf", "application/pdf", vec![0; 50], "Physics"))
            .await
            .unwrap();
        store
            .save(owner, upload("c.pdf", "application/pdf", vec![0; 10], ""))
            .await
            .unwrap();

        let stats = store.stats(owner).await.unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size_bytes, 160);
        assert_eq!(stats.distinct_subject_count, 1);

        store.delete(owner, a.id).await.unwrap();
        let stats = store.stats(owner).await.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_size_bytes, 60);

        let reloaded = accounts::find_by_id(&pool, owner).await.unwrap().unwrap();
        assert_eq!(reloaded.total_notes, 2);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_file_rows() {
        let (store, _dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;
        store
            .save(owner, upload("a.pdf", "application/pdf", vec![1], "Physics"))
            .await
            .unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(owner)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(store.stats(owner).await.unwrap().total_files, 0);
    }

    #[tokio::test]
    async fn study_session_scenario() {
        let (store, _dir, pool) = setup().await;
        let hash = accounts::hash_password("secret1").unwrap();
        let ann = accounts::create_user(&pool, "Ann", "ann@x.com", &hash, None)
            .await
            .unwrap();

        let found = accounts::find_by_email(&pool, "ann@x.com").await.unwrap().unwrap();
        assert!(accounts::verify_password("secret1", &found.password_hash));

        let saved = store
            .save(ann.id, upload("notes.pdf", "application/pdf", vec![7; 1024], "Physics"))
            .await
            .unwrap();

        let files = store
            .list_for_owner(ann.id, &FileFilters::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].subject, "Physics");
        assert_eq!(store.stats(ann.id).await.unwrap().total_files, 1);

        store.delete(ann.id, saved.id).await.unwrap();
        assert!(store
            .list_for_owner(ann.id, &FileFilters::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.stats(ann.id).await.unwrap().total_files, 0);
    }

    #[tokio::test]
    async fn sweep_removes_only_untracked_blobs() {
        let (store, dir, pool) = setup().await;
        let owner = user(&pool, "ann@x.com").await;
        let kept = store
            .save(owner, upload("a.pdf", "application/pdf", vec![1; 8], "Physics"))
            .await
            .unwrap();
        std::fs::write(dir.path().join("uploads").join("stray-a.pdf"), b"orphan").unwrap();

        let untouched = store
            .sweep_orphans(std::time::Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(untouched, 0);
        assert_eq!(blob_count(&dir), 2);

        let removed = store
            .sweep_orphans(std::time::Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(blob_count(&dir), 1);
        assert_eq!(store.download(owner, kept.id).await.unwrap().bytes, vec![1; 8]);
    }

    #[test]
    fn display_name_strips_client_paths() {
        assert_eq!(display_name("C:\\Users\\ann\\notes.pdf"), "notes.pdf");
        assert_eq!(display_name("dir/sub/notes.pdf"), "notes.pdf");
        assert_eq!(display_name(" notes.pdf "), "notes.pdf");
    }

    #[test]
    fn stored_name_is_bounded_and_tagged() {
        let owner = Uuid::new_v4();
        let long = format!("{}.pdf", "x".repeat(300));
        let name = stored_name_for(owner, &long, Utc::now());

        assert!(name.contains(&owner.simple().to_string()));
        assert!(name.ends_with(".pdf"));
        assert!(name.len() < 200);
        assert!(!name.contains('/'));
    }

    #[test]
    fn stored_name_keeps_extension_of_long_names() {
        let long = format!("{}.docx", "y".repeat(400));
        let name = stored_name_for(Uuid::nil(), &long, Utc::now());

        assert!(name.ends_with(".docx"));
        let stem = name.rsplit('-').next().unwrap();
        assert_eq!(stem.len(), MAX_STORED_STEM_CHARS + ".docx".len());
    }

    #[test]
    fn stored_name_sanitizes_the_stem() {
        let name = stored_name_for(Uuid::nil(), "a:b*c?.txt", Utc::now());
        assert!(name.ends_with("-abc.txt"));
    }
}
