diesel::table! {
    cached_files (id) {
        id -> BigInt,
        file_name -> Text,
        file_type -> Text,
        uploaded_at -> Text,
        size -> BigInt,
        is_public -> Bool,
        share_link -> Text,
    }
}
