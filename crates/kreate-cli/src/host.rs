//! Host capabilities backed by local processes.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use kreate::{DialogOptions, Host, HostError};
use serde_json::{Map, Value, json};

const KUBECTL: &str = "kubectl";

/// Runs `kubectl` and other programs as child processes.
#[derive(Debug, Clone)]
pub struct CliHost {
    kubeconfig: Option<PathBuf>,
}

impl CliHost {
    #[must_use]
    pub fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self { kubeconfig }
    }

    fn command(&self, program: &str) -> Command {
        let mut command = Command::new(program);
        if let Some(path) = &self.kubeconfig {
            command.env("KUBECONFIG", path);
        }
        command
    }

    /// Run `program` with `input` on stdin and return its stdout.
    ///
    /// A program that exits before reading all of its input is reported by
    /// its own stderr, not by the failed write.
    fn pipe(&self, program: &str, args: &[&str], input: &[u8]) -> Result<String, HostError> {
        let spawn_err = |source| HostError::Spawn {
            program: program.to_string(),
            source,
        };
        let mut child = self
            .command(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input),
            None => Ok(()),
        };
        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(HostError::CommandFailed {
                stderr: stderr_of(&output),
            });
        }
        written.map_err(spawn_err)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Wrap `manifests` into a single `v1/List` document.
#[must_use]
pub fn resource_list(manifests: &[Map<String, Value>]) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": manifests,
    })
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim_end().to_string()
}

impl Host for CliHost {
    fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig.clone()
    }

    fn create_resources(
        &self,
        context: &str,
        manifests: &[Map<String, Value>],
    ) -> Result<(), HostError> {
        let body = serde_json::to_vec(&resource_list(manifests))
            .map_err(|err| HostError::Create(err.to_string()))?;
        let stdout = self.pipe(KUBECTL, &["create", "--context", context, "-f", "-"], &body)?;
        tracing::info!(%context, stdout = %stdout.trim_end(), "resources created");
        Ok(())
    }

    fn exec(&self, program: &str, args: &[String]) -> Result<String, HostError> {
        tracing::debug!(%program, ?args, "spawning");
        let output = self
            .command(program)
            .args(args)
            .output()
            .map_err(|source| HostError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(HostError::CommandFailed {
                stderr: stderr_of(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn open_dialog(&self, options: &DialogOptions) -> Result<Option<Vec<String>>, HostError> {
        tracing::debug!(title = ?options.title, "no file dialog in the command line host");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifests_are_wrapped_in_a_list() {
        let mut manifest = Map::new();
        manifest.insert("kind".to_string(), json!("ConfigMap"));
        let list = resource_list(&[manifest]);
        assert_eq!(list["kind"], "List");
        assert_eq!(list["items"][0]["kind"], "ConfigMap");
    }

    #[cfg(unix)]
    #[test]
    fn exec_returns_stdout_or_stderr() {
        let host = CliHost::new(None);
        let out = host
            .exec("sh", &["-c".to_string(), "printf hello".to_string()])
            .expect("exec");
        assert_eq!(out, "hello");

        let err = host
            .exec("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .expect_err("non-zero exit");
        assert_eq!(err.to_string(), "boom");
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_stderr_instead_of_broken_pipe() {
        let host = CliHost::new(None);
        let input = vec![b'x'; 4 * 1024 * 1024];
        let err = host
            .pipe("sh", &["-c", "echo 'error: context \"nope\" does not exist' >&2; exit 1"], &input)
            .expect_err("early exit");
        assert!(matches!(err, HostError::CommandFailed { .. }), "{err:?}");
        assert_eq!(err.to_string(), "error: context \"nope\" does not exist");

        let echoed = host.pipe("cat", &[], b"{\"kind\":\"List\"}").expect("cat");
        assert_eq!(echoed, "{\"kind\":\"List\"}");
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let host = CliHost::new(None);
        let err = host
            .exec("kreate-definitely-not-installed", &[])
            .expect_err("spawn");
        assert!(matches!(err, HostError::Spawn { .. }));
    }
}
