/// Short, collision-resistant identifier used to make generated flyout and
/// runtime map names unique within a session.
pub fn short_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    simple[..10].to_string()
}

/// `<prefix>_<short id>`.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", short_id())
}
