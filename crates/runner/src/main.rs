//! Episode runner: connects a remote simulation host (JSON lines over TCP)
//! to the Claude oracle and drives one episode to termination.

use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{tcp::OwnedReadHalf, tcp::OwnedWriteHalf, TcpStream};
use tokio::sync::Mutex;
use tracing::info;

use pilot_core::action::Action;
use pilot_core::episode::{run_episode, EpisodeConfig, GameEnv, Pilot, StepOutcome};
use pilot_core::frame::Frame;
use pilot_core::oracle::{ClaudeConfig, ClaudeOracle};

struct SimConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Simulation environment reached over a line-delimited JSON control port.
///
/// Protocol: one request object per line, one response object per line.
/// Requests carry an `op` (`reset`, `frame`, `step`, `render`, `close`);
/// responses carry `ok` plus the op's payload.
struct RemoteGameEnv {
    conn: Mutex<SimConn>,
}

impl RemoteGameEnv {
    async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("connect simulation control port {addr}"))?;
        let (read, write) = stream.into_split();
        Ok(Self {
            conn: Mutex::new(SimConn {
                reader: BufReader::new(read),
                writer: write,
            }),
        })
    }

    async fn request_json(&self, req: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let line = format!("{req}\n");
        let mut conn = self.conn.lock().await;
        conn.writer
            .write_all(line.as_bytes())
            .await
            .context("control write")?;
        conn.writer.flush().await.ok();

        let mut resp_line = String::new();
        let n = conn
            .reader
            .read_line(&mut resp_line)
            .await
            .context("control read")?;
        if n == 0 {
            anyhow::bail!("control connection closed");
        }
        let v: serde_json::Value =
            serde_json::from_str(resp_line.trim()).context("invalid control json response")?;
        if v.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            anyhow::bail!("simulation op failed: {v}");
        }
        Ok(v)
    }

    async fn simple_op(&self, op: &str) -> anyhow::Result<()> {
        self.request_json(json!({ "op": op })).await.map(|_| ())
    }
}

impl GameEnv for RemoteGameEnv {
    fn reset<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.simple_op("reset").await })
    }

    fn frame<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<Frame>> + Send + 'a>> {
        Box::pin(async move {
            let v = self.request_json(json!({ "op": "frame" })).await?;
            let frame = v
                .get("frame")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing frame in response"))?;
            serde_json::from_value(frame).context("decode frame")
        })
    }

    fn step<'a>(
        &'a self,
        action: Action,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<StepOutcome>> + Send + 'a>> {
        Box::pin(async move {
            let v = self
                .request_json(json!({ "op": "step", "action": action.code() }))
                .await?;
            let outcome = v
                .get("outcome")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing outcome in response"))?;
            serde_json::from_value(outcome).context("decode step outcome")
        })
    }

    fn render<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.simple_op("render").await })
    }

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.simple_op("close").await })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let sim_addr = env_or("DOOM_PILOT_ENV_ADDR", "127.0.0.1:7979");
    let frames_per_action: u32 = std::env::var("DOOM_PILOT_FRAMES_PER_ACTION")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);

    let oracle_cfg = ClaudeConfig {
        endpoint: env_or(
            "DOOM_PILOT_ORACLE_ENDPOINT",
            "https://api.anthropic.com/v1/messages",
        ),
        model: env_or("DOOM_PILOT_ORACLE_MODEL", "claude-3-5-sonnet-20240620"),
        api_key: std::env::var("DOOM_PILOT_ORACLE_API_KEY")
            .context("DOOM_PILOT_ORACLE_API_KEY must be set")?,
        ..ClaudeConfig::default()
    };

    info!(
        sim_addr = sim_addr.as_str(),
        frames_per_action, "starting episode"
    );

    let env = RemoteGameEnv::connect(&sim_addr).await?;
    let oracle = ClaudeOracle::new(oracle_cfg);
    let mut pilot = Pilot::new(EpisodeConfig {
        frames_per_action,
        ..EpisodeConfig::default()
    });

    let summary = run_episode(&mut pilot, &env, &oracle).await?;
    info!(
        steps = summary.steps,
        total_reward = summary.total_reward,
        "episode finished"
    );
    Ok(())
}
