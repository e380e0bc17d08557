use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Local staging directory for raw attachment bytes.
///
/// Files land at `{root}/{user_id}/{case_id}/{filename}` before archival.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

/// Strip any directory components a client put in the upload name.
fn sanitize_filename(name: &str) -> Option<String> {
    let base = Path::new(name.trim()).file_name()?.to_str()?;
    // a backslash survives `file_name` on unix
    let base = base.rsplit('\\').next().unwrap_or(base);
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to the staging path and return it.
    pub async fn stage(
        &self,
        user_id: Uuid,
        case_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, String> {
        let safe = sanitize_filename(filename)
            .ok_or_else(|| format!("unusable attachment name '{filename}'"))?;
        let dir = self
            .root
            .join(user_id.to_string())
            .join(case_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
        let path = dir.join(safe);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        Ok(path)
    }
}
