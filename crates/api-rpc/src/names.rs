//! Instance name sanitizing
//!
//! Names arrive from the network and become directory names: the path is
//! cleaned lexically, then every `.` and `/` is removed.

/// Lexical path cleaning (`a/./b/../c` becomes `a/c`)
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Sanitized instance name; `None` when nothing usable remains
pub fn clean_instance_name(raw: &str) -> Option<String> {
    let name: String = clean_path(raw)
        .chars()
        .filter(|c| *c != '.' && *c != '/')
        .collect();
    (!name.is_empty()).then_some(name)
}
