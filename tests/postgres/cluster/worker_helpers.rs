//! Locating and staging the `pg_worker` binary for privileged runs.

use super::BoxError;
use super::fs_utils::open_parent_dir;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::{Permissions, PermissionsExt};
use std::sync::OnceLock;

static STAGED_WORKER: OnceLock<Utf8PathBuf> = OnceLock::new();

/// Finds the worker built alongside this test binary, falling back to `PATH`.
pub(super) fn locate_pg_worker() -> Option<Utf8PathBuf> {
    if let Some(built) = option_env!("CARGO_BIN_EXE_pg_worker") {
        return Some(Utf8PathBuf::from(built));
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join("pg_worker"))
        .find(|candidate| candidate.is_file())
        .and_then(|candidate| Utf8PathBuf::from_path_buf(candidate).ok())
}

/// Copies the worker into the temp directory with world-execute permissions.
///
/// The build directory is usually unreadable by the account the worker
/// switches to. Repeated calls return the first staged copy.
pub(super) fn prepare_pg_worker(worker: &Utf8Path) -> Result<Utf8PathBuf, BoxError> {
    if let Some(staged) = STAGED_WORKER.get() {
        return Ok(staged.clone());
    }

    let temp_dir = Utf8PathBuf::try_from(std::env::temp_dir()).map_err(|err| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("temp directory path is not valid UTF-8: {err}"),
        )) as BoxError
    })?;
    let staged = temp_dir.join(format!("colloquy_pg_worker_{}", std::process::id()));

    let (source_dir, source_name) = open_parent_dir(worker)?;
    let (target_dir, target_name) = open_parent_dir(&staged)?;
    match target_dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(Box::new(err) as BoxError),
    }
    source_dir
        .copy(source_name, &target_dir, target_name)
        .map_err(|err| Box::new(err) as BoxError)?;
    target_dir
        .set_permissions(target_name, Permissions::from_mode(0o755))
        .map_err(|err| Box::new(err) as BoxError)?;

    Ok(STAGED_WORKER.get_or_init(|| staged).clone())
}
