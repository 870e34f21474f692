//! # wayview-replay
//!
//! Replays a scripted scenario through the view core using the headless
//! collaborators and prints the damage each output would repaint.
//!
//! A scenario is a TOML file with an `[[outputs]]` list and an `[[events]]`
//! list. Views are numbered in creation order starting at 1, which is how the
//! recording policy engine allocates identities.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, error, info};
use serde::Deserialize;

use wayview::headless::{
    HeadlessSeat, HeadlessXdgToplevel, HeadlessXwaylandSurface, RecordingPolicy,
};
use wayview::{
    Compositor, CoreConfig, OutputId, Rectangle, ResizeEdges, Size, SurfaceEvent, SurfaceId,
    ViewSurface, WindowId,
};

#[derive(Parser)]
#[command(name = "wayview-replay")]
#[command(about = "Replay a scripted scenario through the wayview core")]
#[command(version)]
struct Cli {
    /// Scenario file to replay
    scenario: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    outputs: Vec<OutputSpec>,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct OutputSpec {
    name: String,
    geometry: Rectangle,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event {
    NewXdg {
        surface: u64,
        size: Size,
        #[serde(default)]
        app_id: Option<String>,
    },
    NewXwayland {
        #[serde(default)]
        surface: Option<u64>,
        geometry: Rectangle,
        #[serde(default)]
        class: Option<String>,
    },
    Associate {
        view: u64,
        surface: u64,
    },
    Map {
        view: u64,
    },
    Unmap {
        view: u64,
    },
    /// Client commits a buffer, optionally acknowledging the latest configure first
    Commit {
        view: u64,
        size: Size,
        #[serde(default)]
        damage: Option<Rectangle>,
        #[serde(default)]
        ack: bool,
    },
    RequestGeometry {
        view: u64,
        geometry: Rectangle,
    },
    RequestMove {
        view: u64,
    },
    RequestResize {
        view: u64,
        edges: u32,
    },
    Focus {
        view: u64,
    },
    Destroy {
        view: u64,
    },
    PointerMotion {
        x: f64,
        y: f64,
    },
    PointerButton {
        pressed: bool,
    },
    RemoveOutput {
        output: u32,
    },
    /// Drains and prints every output's damage
    Frame,
}

/// Client side of a headless view
enum Client {
    Xdg(HeadlessXdgToplevel),
    XWayland(HeadlessXwaylandSurface),
}

struct Replay {
    compositor: Compositor,
    clients: HashMap<WindowId, Client>,
    frames: usize,
}

impl Replay {
    fn new(config: CoreConfig) -> Result<Self> {
        let compositor = Compositor::new(
            config,
            Box::new(HeadlessSeat::new()),
            Box::new(RecordingPolicy::new()),
        )
        .context("Failed to create view core")?;

        Ok(Self {
            compositor,
            clients: HashMap::new(),
            frames: 0,
        })
    }

    fn client(&self, view: WindowId) -> Result<&Client> {
        self.clients
            .get(&view)
            .with_context(|| format!("Scenario refers to unknown view {}", view))
    }

    fn apply(&mut self, event: Event) -> Result<()> {
        debug!("Replaying {:?}", event);
        match event {
            Event::NewXdg {
                surface,
                size,
                app_id,
            } => {
                let xdg = HeadlessXdgToplevel::new(SurfaceId(surface), size);
                if let Some(app_id) = app_id {
                    xdg.set_app_id(app_id);
                }
                let id = self.compositor.new_toplevel(ViewSurface::xdg(xdg.clone()))?;
                self.clients.insert(id, Client::Xdg(xdg));
                info!("🪟 New xdg view {}", id);
            }
            Event::NewXwayland {
                surface,
                geometry,
                class,
            } => {
                let x11 = HeadlessXwaylandSurface::new(surface.map(SurfaceId), geometry);
                if let Some(class) = class {
                    x11.set_class(class);
                }
                let id = self
                    .compositor
                    .new_toplevel(ViewSurface::xwayland(x11.clone()))?;
                self.clients.insert(id, Client::XWayland(x11));
                info!("🪟 New xwayland view {}", id);
            }
            Event::Associate { view, surface } => match self.client(WindowId(view))? {
                Client::XWayland(x11) => x11.associate(SurfaceId(surface)),
                Client::Xdg(_) => bail!("View {} is not an xwayland view", view),
            },
            Event::Map { view } => self.dispatch(view, SurfaceEvent::Map)?,
            Event::Unmap { view } => self.dispatch(view, SurfaceEvent::Unmap)?,
            Event::Commit {
                view,
                size,
                damage,
                ack,
            } => {
                match self.client(WindowId(view))? {
                    Client::Xdg(xdg) => {
                        if ack {
                            xdg.ack_configure(xdg.last_serial());
                        }
                        xdg.commit(size, damage);
                    }
                    Client::XWayland(x11) => x11.commit(size, damage),
                }
                self.dispatch(view, SurfaceEvent::Commit)?;
            }
            Event::RequestGeometry { view, geometry } => {
                let token = self.compositor.request_geometry(WindowId(view), geometry)?;
                info!("📐 View {} requested {:?} ({:?})", view, geometry, token);
            }
            Event::RequestMove { view } => self.dispatch(view, SurfaceEvent::RequestMove)?,
            Event::RequestResize { view, edges } => self.dispatch(
                view,
                SurfaceEvent::RequestResize {
                    edges: ResizeEdges::from_bits(edges),
                },
            )?,
            Event::Focus { view } => self.compositor.focus(WindowId(view))?,
            Event::Destroy { view } => {
                self.dispatch(view, SurfaceEvent::Destroy)?;
                self.clients.remove(&WindowId(view));
            }
            Event::PointerMotion { x, y } => self.compositor.pointer_motion(x, y)?,
            Event::PointerButton { pressed } => self.compositor.pointer_button(pressed)?,
            Event::RemoveOutput { output } => self.compositor.remove_output(OutputId(output))?,
            Event::Frame => self.frame()?,
        }
        Ok(())
    }

    fn dispatch(&mut self, view: u64, event: SurfaceEvent) -> Result<()> {
        self.compositor
            .handle_surface_event(WindowId(view), event)
            .with_context(|| format!("Failed to handle {:?} for view {}", event, view))
    }

    fn frame(&mut self) -> Result<()> {
        self.frames += 1;
        let outputs: Vec<(OutputId, String)> = self
            .compositor
            .outputs()
            .outputs()
            .map(|output| (output.id(), output.name().to_string()))
            .collect();

        for (id, name) in outputs {
            let damage = self.compositor.drain_damage(id)?;
            if damage.is_empty() {
                continue;
            }
            println!("frame {} {} ({}):", self.frames, name, id);
            for rect in damage {
                println!("  {}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y);
            }
        }
        Ok(())
    }
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = cli.config.as_deref().map(CoreConfig::load);
    let debug = cli.debug || matches!(&loaded, Some(Ok(config)) if config.general.debug);

    // Initialize logging
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting wayview-replay");
    info!("📄 Version: {}", wayview::VERSION);

    let config = match loaded {
        Some(Ok(config)) => {
            info!("✅ Configuration loaded");
            config
        }
        Some(Err(e)) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            CoreConfig::default()
        }
        None => CoreConfig::default(),
    };

    let scenario = load_scenario(&cli.scenario)?;
    let mut replay = Replay::new(config)?;

    for output in scenario.outputs {
        replay.compositor.add_output(output.name, output.geometry);
    }

    for (index, event) in scenario.events.into_iter().enumerate() {
        replay
            .apply(event)
            .with_context(|| format!("Scenario event #{} failed", index + 1))?;
    }

    // Whatever is still pending at the end
    replay.frame()?;

    info!("👋 Replay finished after {} frame(s)", replay.frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["wayview-replay", "scenario.toml"]).unwrap();
        assert_eq!(cli.scenario, PathBuf::from("scenario.toml"));
        assert!(cli.config.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "wayview-replay",
            "--debug",
            "--config",
            "wayview.toml",
            "scenario.toml",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config.as_deref(), Some("wayview.toml"));
    }

    #[test]
    fn test_scenario_parsing() {
        let scenario: Scenario = toml::from_str(
            r#"
[[outputs]]
name = "HDMI-A-1"
geometry = { x = 0, y = 0, width = 1920, height = 1080 }

[[events]]
type = "new_xdg"
surface = 1
size = { width = 100, height = 100 }

[[events]]
type = "request_resize"
view = 1
edges = 10

[[events]]
type = "frame"
"#,
        )
        .unwrap();

        assert_eq!(scenario.outputs.len(), 1);
        assert_eq!(scenario.events.len(), 3);
        assert!(matches!(scenario.events[1], Event::RequestResize { view: 1, edges: 10 }));
    }

    #[test]
    fn test_replay_handshake() {
        let mut replay = Replay::new(CoreConfig::default()).unwrap();
        replay
            .compositor
            .add_output("HDMI-A-1", Rectangle::new(0, 0, 1920, 1080));

        let events = vec![
            Event::NewXdg {
                surface: 1,
                size: Size::new(100, 100),
                app_id: None,
            },
            Event::Map { view: 1 },
            Event::RequestGeometry {
                view: 1,
                geometry: Rectangle::new(0, 0, 200, 150),
            },
            Event::Commit {
                view: 1,
                size: Size::new(200, 150),
                damage: None,
                ack: true,
            },
        ];
        for event in events {
            replay.apply(event).unwrap();
        }

        let view = replay.compositor.views().get(WindowId(1)).unwrap();
        assert_eq!(view.geometry(), Rectangle::new(0, 0, 200, 150));
        assert!(view.pending_ack().is_none());
    }

    #[test]
    fn test_replay_unknown_view_fails() {
        let mut replay = Replay::new(CoreConfig::default()).unwrap();
        assert!(replay.apply(Event::Map { view: 42 }).is_err());
    }
}
