use crate::config::SshConfig;
use log::info;
use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;

const LOCAL_HOST: &str = "127.0.0.1";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("could not start '{program}': {source}")]
    Spawn { program: String, source: io::Error },
    #[error("could not find a free local port: {0}")]
    NoFreePort(io::Error),
    #[error("ssh exited with {0} before the tunnel was up")]
    Exited(std::process::ExitStatus),
    #[error("tunnel did not accept connections within {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Port forward through the system `ssh` client.
///
/// The `ssh` child process lives as long as this value.
pub struct SshTunnel {
    child: Child,
    local_port: u16,
}

impl SshTunnel {
    pub fn open(config: &SshConfig) -> Result<Self, TunnelError> {
        let local_port = match config.local_port {
            Some(port) => port,
            None => free_local_port()?,
        };
        let mut command = ssh_command(config, local_port);
        let program = command.get_program().to_string_lossy().into_owned();
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TunnelError::Spawn { program, source })?;

        let mut tunnel = Self { child, local_port };
        tunnel.wait_until_ready()?;
        info!(
            "SSH tunnel {}:{} -> {}:{} via {}",
            LOCAL_HOST, local_port, config.remote_host, config.remote_port, config.host
        );
        Ok(tunnel)
    }

    /// Wraps an already running forwarder listening on `local_port`.
    #[cfg(test)]
    pub(crate) fn from_child(child: Child, local_port: u16) -> Self {
        Self { child, local_port }
    }

    pub fn local_host(&self) -> &str {
        LOCAL_HOST
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    fn wait_until_ready(&mut self) -> Result<(), TunnelError> {
        let address = SocketAddr::from(([127, 0, 0, 1], self.local_port));
        let started = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Err(TunnelError::Exited(status));
            }
            if TcpStream::connect_timeout(&address, POLL_INTERVAL).is_ok() {
                return Ok(());
            }
            if started.elapsed() > STARTUP_TIMEOUT {
                return Err(TunnelError::Timeout(STARTUP_TIMEOUT));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// `ssh -N -L local:remote ...`, wrapped in `sshpass` when a password is set.
fn ssh_command(config: &SshConfig, local_port: u16) -> Command {
    let mut command = match &config.password {
        Some(password) => {
            let mut command = Command::new("sshpass");
            command.arg("-e").arg("ssh").env("SSHPASS", password);
            command
        }
        None => {
            let mut command = Command::new("ssh");
            command.arg("-o").arg("BatchMode=yes");
            command
        }
    };
    command
        .arg("-N")
        .arg("-o")
        .arg("ExitOnForwardFailure=yes")
        .arg("-o")
        .arg(format!("ConnectTimeout={}", STARTUP_TIMEOUT.as_secs()))
        .arg("-p")
        .arg(config.port.to_string())
        .arg("-L")
        .arg(format!(
            "{}:{}:{}:{}",
            LOCAL_HOST, local_port, config.remote_host, config.remote_port
        ))
        .arg(format!("{}@{}", config.username, config.host));
    command
}

fn free_local_port() -> Result<u16, TunnelError> {
    let listener = TcpListener::bind((LOCAL_HOST, 0)).map_err(TunnelError::NoFreePort)?;
    Ok(listener.local_addr().map_err(TunnelError::NoFreePort)?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(password: Option<&str>) -> SshConfig {
        SshConfig {
            host: "gateway.example.org".to_string(),
            port: 2222,
            username: "alice".to_string(),
            password: password.map(str::to_string),
            remote_host: "localhost".to_string(),
            remote_port: 5433,
            local_port: Some(15433),
        }
    }

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_ssh_command_with_key() {
        let command = ssh_command(&config(None), 15433);
        assert_eq!(command.get_program(), "ssh");
        let args = args(&command);
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(args.contains(&"127.0.0.1:15433:localhost:5433".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("alice@gateway.example.org"));
    }

    #[test]
    fn test_ssh_command_with_password() {
        let command = ssh_command(&config(Some("secret")), 15433);
        assert_eq!(command.get_program(), "sshpass");
        let args = args(&command);
        assert_eq!(&args[..2], ["-e", "ssh"]);
        assert!(!args.iter().any(|arg| arg.contains("secret")));
        assert!(args.contains(&"2222".to_string()));
    }

    #[test]
    fn test_open_fails_for_unreachable_host() -> Result<(), Box<dyn std::error::Error>> {
        // Nothing listens on a port that was just released.
        let closed_port = free_local_port()?;
        let config = SshConfig {
            host: LOCAL_HOST.to_string(),
            port: closed_port,
            local_port: None,
            ..config(None)
        };

        let started = Instant::now();
        let result = SshTunnel::open(&config);

        assert!(
            matches!(
                result,
                Err(TunnelError::Exited(_)) | Err(TunnelError::Spawn { .. })
            ),
            "unexpected result: {:?}",
            result.err()
        );
        assert!(started.elapsed() < STARTUP_TIMEOUT);
        Ok(())
    }

    #[test]
    fn test_free_local_port() -> Result<(), Box<dyn std::error::Error>> {
        assert_ne!(free_local_port()?, 0);
        Ok(())
    }
}
