table! {
    comics (comic_id) {
        comic_id -> Integer,
        title -> Nullable<Text>,
        news -> Text,
        file_path -> Text,
        collected_at -> Timestamp,
    }
}

table! {
    progress (slot) {
        slot -> Integer,
        last_comic_id -> Integer,
        last_run_at -> Nullable<Timestamp>,
    }
}

allow_tables_to_appear_in_same_query!(comics, progress,);
