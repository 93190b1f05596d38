/// Resolves `uri` against the collection `base` into a normalized absolute virtual path.
/// `.` segments are dropped and `..` never climbs above the root.
pub fn resolve(base: &str, uri: &str) -> String {
    let joined = if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), uri)
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// The collection an absolute virtual path lives in.
pub fn parent(path: &str) -> String {
    resolve(path, "..")
}
