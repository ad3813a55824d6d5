//! Runs embedded `PostgreSQL` lifecycle steps for the integration tests when
//! the test process is privileged.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload-path>
//! ```
//!
//! The file at `payload-path` holds a JSON [`WorkerPayload`]: the cluster
//! settings plus environment overrides. The worker reads it, switches to the
//! `nobody` account and only then touches the cluster, so `initdb` and the
//! server never run as root.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::env;
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("usage: pg_worker <setup|start|stop> <payload-path> ({0})")]
    Usage(String),
    #[error("failed to read payload {path}: {source}")]
    PayloadRead {
        path: Utf8PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[source] serde_json::Error),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("failed to switch to {user}: {reason}")]
    Privileges { user: &'static str, reason: String },
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("postgres {step} failed: {reason}")]
    Postgres { step: &'static str, reason: String },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Step {
    fn parse(raw: &str) -> Result<Self, WorkerError> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::Usage(format!("unknown step '{other}'"))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let (step, payload_path) = parse_args(env::args_os().skip(1))?;
    let payload = read_payload(&payload_path)?;
    drop_privileges(UNPRIVILEGED_USER)?;
    apply_environment(&payload.environment);

    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::Runtime)?;
    runtime.block_on(run_step(step, PostgreSQL::new(settings)))?;
    Ok(())
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = std::ffi::OsString>,
) -> Result<(Step, Utf8PathBuf), WorkerError> {
    let mut next_utf8 = |what: &str| {
        args.next()
            .ok_or_else(|| WorkerError::Usage(format!("missing {what}")))?
            .into_string()
            .map_err(|_| WorkerError::Usage(format!("{what} is not valid UTF-8")))
    };
    let step = Step::parse(&next_utf8("step")?)?;
    let payload_path = Utf8PathBuf::from(next_utf8("payload path")?);
    if let Some(extra) = args.next() {
        return Err(WorkerError::Usage(format!(
            "unexpected argument {}",
            extra.to_string_lossy()
        )));
    }
    Ok((step, payload_path))
}

#[cfg(unix)]
fn read_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let read = || -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut file = dir.open(relative.as_std_path())?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    };
    let bytes = read().map_err(|source| WorkerError::PayloadRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(WorkerError::PayloadParse)
}

#[cfg(unix)]
fn drop_privileges(username: &'static str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }
    let failed = |reason: String| WorkerError::Privileges {
        user: username,
        reason,
    };

    let user = User::from_name(username)
        .map_err(|err| failed(err.to_string()))?
        .ok_or_else(|| failed(String::from("no such user")))?;
    let name = CString::new(user.name.clone()).map_err(|err| failed(err.to_string()))?;
    initgroups(&name, user.gid).map_err(|err| failed(err.to_string()))?;
    setgid(user.gid).map_err(|err| failed(err.to_string()))?;
    setuid(user.uid).map_err(|err| failed(err.to_string()))?;

    // SAFETY: no other threads exist yet.
    unsafe {
        env::set_var("HOME", &user.dir);
        env::set_var("USER", &user.name);
        env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: no other threads exist yet.
        unsafe {
            match value {
                Some(secret) => env::set_var(key, secret.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
async fn run_step(step: Step, mut postgres: PostgreSQL) -> Result<(), WorkerError> {
    match step {
        Step::Setup => {
            postgres
                .setup()
                .await
                .map_err(|err| postgres_failure("setup", &err))?;
            ensure_started(&mut postgres).await
        }
        Step::Start => {
            ensure_started(&mut postgres).await?;
            // The server must outlive this process.
            let _running = std::mem::ManuallyDrop::new(postgres);
            Ok(())
        }
        Step::Stop => postgres
            .stop()
            .await
            .map_err(|err| postgres_failure("stop", &err)),
    }
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres
        .start()
        .await
        .map_err(|err| postgres_failure("start", &err))
}

#[cfg(unix)]
fn postgres_failure(step: &'static str, err: &impl std::fmt::Display) -> WorkerError {
    WorkerError::Postgres {
        step,
        reason: err.to_string(),
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
