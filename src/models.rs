use crate::schema::{comics, progress};
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable, Debug, Clone, PartialEq)]
#[table_name = "comics"]
pub struct ComicRecord {
    pub comic_id: i32,
    /// Title from the archive listing; the comic page itself does not carry it.
    pub title: Option<String>,
    pub news: String,
    /// Path relative to the base directory, sharded by the id's last digit.
    pub file_path: String,
    pub collected_at: NaiveDateTime,
}

#[derive(Queryable, Debug)]
pub struct ProgressMarker {
    pub slot: i32,
    pub last_comic_id: i32,
    pub last_run_at: Option<NaiveDateTime>,
}
