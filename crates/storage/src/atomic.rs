use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to a sibling temp file, then rename it over `path`.
///
/// A crash can leave the `.tmp` file behind; `path` itself is either the old
/// or the new contents.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("not a file path: {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }

    // Rename over an existing file fails on Windows; remove first.
    if cfg!(windows) && path.exists() {
        let _ = fs::remove_file(path);
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
