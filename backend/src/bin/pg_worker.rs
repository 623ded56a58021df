//! Runs embedded PostgreSQL lifecycle steps as an unprivileged helper.
//!
//! `pg_embedded_setup_unpriv` cannot run `initdb` or `postgres` as root, so
//! under root it re-executes this binary as `nobody`:
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a serialised [`WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let (step, payload_path) = parse_args(env::args_os())?;
    run(step, &payload_path)
}

/// Lifecycle step requested by the bootstrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl TryFrom<&str> for Step {
    type Error = Report;

    fn try_from(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!("unknown step {other:?}; expected setup, start or stop")),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<(Step, PathBuf)> {
    let mut args = args.into_iter().skip(1);
    let raw_step = args.next().ok_or_else(|| eyre!("missing step argument"))?;
    let step = Step::try_from(raw_step.to_string_lossy().as_ref())?;
    let payload_path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("missing payload path argument"))?;
    if let Some(extra) = args.next() {
        bail!("unexpected argument {:?}", extra.to_string_lossy());
    }
    Ok((step, payload_path))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("reading payload {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing payload {}", path.display()))
}

fn run(step: Step, payload_path: &Path) -> Result<()> {
    let payload = read_payload(payload_path)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("rebuilding postgres settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: single-threaded at this point; the runtime is built below.
        match value {
            Some(new_value) => unsafe { env::set_var(&key, new_value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async {
            match step {
                Step::Setup => postgres.setup().await,
                Step::Start => postgres.start().await,
                Step::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgres {step} failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::setup("setup", Step::Setup)]
    #[case::start("start", Step::Start)]
    #[case::stop("stop", Step::Stop)]
    fn steps_parse_with_their_payload(#[case] raw: &str, #[case] step: Step) {
        let parsed = parse_args(args(&["pg_worker", raw, "/tmp/payload.json"]))
            .expect("valid arguments");

        assert_eq!(parsed, (step, PathBuf::from("/tmp/payload.json")));
        assert_eq!(step.to_string(), raw);
    }

    #[rstest]
    #[case::unknown_step(&["pg_worker", "restart", "/tmp/p.json"], "unknown step")]
    #[case::no_step(&["pg_worker"], "missing step")]
    #[case::no_payload(&["pg_worker", "start"], "missing payload")]
    #[case::extra(&["pg_worker", "stop", "/tmp/p.json", "now"], "unexpected argument")]
    fn malformed_arguments_are_rejected(#[case] raw: &[&str], #[case] expected: &str) {
        let err = parse_args(args(raw)).expect_err("arguments must be rejected");

        assert!(err.to_string().contains(expected), "{err}");
    }

    #[rstest]
    fn unreadable_payload_names_the_file() {
        let err = run(Step::Setup, Path::new("/nonexistent/users-payload.json"))
            .expect_err("missing file");

        assert!(format!("{err:#}").contains("/nonexistent/users-payload.json"));
    }
}
