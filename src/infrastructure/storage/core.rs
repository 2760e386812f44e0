use std::path::{Component, Path, PathBuf};

pub fn sanitize_filename(name: &str) -> String {
    let mut s = name.trim().to_string();
    let invalid = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    for ch in invalid {
        s = s.replace(ch, "-");
    }
    s = s.replace(' ', "_");
    if s.len() > 100 {
        let mut cut = 100;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    if s.is_empty() || s.chars().all(|c| c == '.') {
        s = "upload".into();
    }
    s
}

pub fn relative_from_uploads(uploads_root: &Path, full: &Path) -> String {
    match full.strip_prefix(uploads_root) {
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => full.to_string_lossy().replace('\\', "/"),
    }
}

/// Keeps only normal components; any `..`, root or prefix is rejected.
pub fn normalize_relative(rest_path: &str) -> anyhow::Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(rest_path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => continue,
            _ => anyhow::bail!("forbidden"),
        }
    }
    if relative.as_os_str().is_empty() {
        anyhow::bail!("forbidden");
    }
    Ok(relative)
}

pub fn content_hash(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}
