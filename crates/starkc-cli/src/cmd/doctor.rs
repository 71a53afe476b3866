use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use starkc_core::config::{validate_config, CoreConfig};
use tokio::net::TcpStream;
use url::Url;

use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

pub async fn run(cfg: &CoreConfig) -> Result<()> {
    let mut checks = Vec::new();

    checks.push(match validate_config(cfg) {
        Ok(()) => Check {
            name: "config".to_string(),
            ok: true,
            detail: "valid".to_string(),
        },
        Err(e) => Check {
            name: "config".to_string(),
            ok: false,
            detail: e.to_string(),
        },
    });

    checks.push(endpoint_check(&cfg.compiler.base_url, cfg.compiler.timeout()).await);

    let ok = checks.iter().all(|c| c.ok);
    if output::is_json() {
        output::print(&DoctorOut { ok, checks })?;
    } else {
        for c in &checks {
            output::status(c.ok, &c.name, &c.detail)?;
        }
    }
    Ok(())
}

/// TCP reachability only; the compiler exposes no health route.
async fn endpoint_check(base_url: &str, timeout: Duration) -> Check {
    let name = "endpoint".to_string();

    let target = Url::parse(base_url).ok().and_then(|u| {
        let host = u.host_str()?.to_string();
        let port = u.port_or_known_default()?;
        Some((host, port))
    });
    let Some((host, port)) = target else {
        return Check {
            name,
            ok: false,
            detail: format!("cannot parse host and port from {base_url}"),
        };
    };

    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_)) => Check {
            name,
            ok: true,
            detail: format!("{host}:{port} reachable"),
        },
        Ok(Err(e)) => Check {
            name,
            ok: false,
            detail: format!("{host}:{port}: {e}"),
        },
        Err(_) => Check {
            name,
            ok: false,
            detail: format!("{host}:{port}: timed out after {} ms", timeout.as_millis()),
        },
    }
}
