//! `homepoll run`: host one handler per configured device, print every
//! publication, and route `<device> <channel> <command>` lines from stdin
//! until Ctrl-C.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use homepoll_config::all_device_configs;
use homepoll_core::{
    AudioStationDevice, ChannelSink, Command, DeviceConfig, Handler, PiHoleDevice, StateSink,
};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

/// A handler of either device kind.
#[derive(Clone)]
enum Hosted {
    PiHole(Handler<PiHoleDevice>),
    AudioStation(Handler<AudioStationDevice>),
}

impl Hosted {
    fn build(name: &str, config: &DeviceConfig, sink: Arc<dyn StateSink>) -> Result<Self, CliError> {
        let schedule = config.schedule();
        Ok(match config {
            DeviceConfig::PiHole(c) => {
                Self::PiHole(Handler::new(name, PiHoleDevice::new(c)?, schedule, sink))
            }
            DeviceConfig::AudioStation(c) => Self::AudioStation(Handler::new(
                name,
                AudioStationDevice::new(c)?,
                schedule,
                sink,
            )),
        })
    }

    fn name(&self) -> &str {
        match self {
            Self::PiHole(h) => h.name(),
            Self::AudioStation(h) => h.name(),
        }
    }

    async fn initialize(&self) {
        match self {
            Self::PiHole(h) => h.initialize().await,
            Self::AudioStation(h) => h.initialize().await,
        }
    }

    async fn handle_command(&self, channel: &str, command: Command) {
        match self {
            Self::PiHole(h) => h.handle_command(channel, command).await,
            Self::AudioStation(h) => h.handle_command(channel, command).await,
        }
    }

    async fn dispose(&self) {
        match self {
            Self::PiHole(h) => h.dispose().await,
            Self::AudioStation(h) => h.dispose().await,
        }
    }
}

/// A hosted device and the queue its commands run through. One worker
/// per device drains the queue, so commands run in the order they arrive.
struct Route {
    hosted: Hosted,
    queue: mpsc::UnboundedSender<(String, Command)>,
    worker: JoinHandle<()>,
}

impl Route {
    fn spawn(hosted: Hosted) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<(String, Command)>();
        let target = hosted.clone();
        let worker = tokio::spawn(async move {
            while let Some((channel, command)) = rx.recv().await {
                target.handle_command(&channel, command).await;
            }
        });
        Self {
            hosted,
            queue,
            worker,
        }
    }

    async fn close(self) {
        drop(self.queue);
        self.worker.abort();
        let _ = self.worker.await;
        self.hosted.dispose().await;
    }
}

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let mut devices = all_device_configs(&cfg)?;
    if let Some(ref only) = global.device {
        devices.retain(|(name, _)| name == only);
        if devices.is_empty() {
            return Err(CliError::DeviceNotFound { name: only.clone() });
        }
    }
    if devices.is_empty() {
        return Err(CliError::NoConfig {
            path: config::display_path(global),
        });
    }

    let (sink, mut events) = ChannelSink::new();
    let sink: Arc<dyn StateSink> = Arc::new(sink);
    let hosted = devices
        .iter()
        .map(|(name, c)| Hosted::build(name, c, Arc::clone(&sink)))
        .collect::<Result<Vec<_>, _>>()?;

    for h in &hosted {
        h.initialize().await;
    }
    info!(devices = hosted.len(), "hosting devices");
    let routes: Vec<Route> = hosted.into_iter().map(Route::spawn).collect();

    let color = output::should_color(global.color);
    let mut stdin = (!args.no_stdin).then(|| BufReader::new(tokio::io::stdin()).lines());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "signal handler failed");
                }
                break;
            }
            Some(event) = events.recv() => {
                output::print_output(&output::render_event(global.output, &event, color), global.quiet);
            }
            line = next_line(&mut stdin) => match line {
                Ok(Some(line)) => route(&routes, &line),
                Ok(None) => {
                    info!("stdin closed; still polling");
                    stdin = None;
                }
                Err(e) => {
                    warn!(error = %e, "stdin unreadable; ignoring further input");
                    stdin = None;
                }
            },
        }
    }

    info!("shutting down");
    for r in routes {
        r.close().await;
    }
    while let Ok(event) = events.try_recv() {
        output::print_output(&output::render_event(global.output, &event, color), global.quiet);
    }
    Ok(())
}

async fn next_line(stdin: &mut Option<Lines<BufReader<Stdin>>>) -> std::io::Result<Option<String>> {
    match stdin {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// Queue a command line on its device without blocking the event loop.
fn route(routes: &[Route], line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let Some((device, channel, command)) = parse_line(line) else {
        warn!(line, "expected: <device> <channel> <command>");
        return;
    };
    let Some(target) = routes.iter().find(|r| r.hosted.name() == device) else {
        warn!(device, "no such device");
        return;
    };
    if target.queue.send((channel.to_owned(), command)).is_err() {
        warn!(device, "command queue closed");
    }
}

fn parse_line(line: &str) -> Option<(&str, &str, Command)> {
    let mut parts = line.split_whitespace();
    let device = parts.next()?;
    let channel = parts.next()?;
    let rest = parts.collect::<Vec<_>>().join(" ");
    if rest.is_empty() {
        return None;
    }
    Some((device, channel, Command::parse(&rest)))
}
