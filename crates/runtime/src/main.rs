#![deny(clippy::all, clippy::pedantic)]

mod sink;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::{bail, Context, Result};
use clap::Parser;
use physics::World;
use scene::Scene;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::sink::LoggingSink;

/// Steps a physics scene without a renderer and logs the body poses.
#[derive(Parser, Debug)]
#[command(name = "runtime_main", version)]
struct Args {
    /// Scene description (JSON)
    #[arg(long)]
    scene: PathBuf,

    #[arg(long, default_value_t = 600)]
    steps: u32,

    /// Fixed time step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Log poses every N steps, 0 disables
    #[arg(long, default_value_t = 60)]
    log_every: u32,

    /// Restart the simulation whenever the scene file changes
    #[arg(long)]
    watch: bool,
}

enum Outcome {
    Finished,
    Reloaded,
}

fn load(path: &Path) -> Result<World> {
    let world = Scene::from_path(path)?.into_world()?;
    info!(scene = %path.display(), bodies = world.len(), "scene loaded");
    Ok(world)
}

fn run(world: &mut World, args: &Args, changes: Option<&Receiver<()>>) -> Result<Outcome> {
    let mut sink = LoggingSink::default();
    info!("Running {} steps with dt = {}", args.steps, args.dt);

    for step in 1..=args.steps {
        if let Some(changes) = changes {
            match changes.try_recv() {
                Ok(()) => {
                    info!("scene changed at step {step}, reloading");
                    return Ok(Outcome::Reloaded);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => bail!("scene watcher stopped"),
            }
        }

        world.update(args.dt).with_context(|| format!("simulation step {step}"))?;

        for event in world.drain_collision_events() {
            debug!(phase = ?event.phase, a = %event.body_a, b = %event.body_b, "collision");
        }
        if args.log_every > 0 && step % args.log_every == 0 {
            let reported = world.synch(&mut sink);
            info!(step, reported, "step complete");
        }
    }

    info!(steps = args.steps, "simulation finished");
    for body in world.bodies() {
        info!(id = body.id(), position = ?body.position(), sleeping = body.is_sleeping(), "final pose");
    }
    Ok(Outcome::Finished)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("time step must be positive, got {}", args.dt);
    }

    if !args.watch {
        let mut world = load(&args.scene)?;
        run(&mut world, &args, None)?;
        return Ok(());
    }

    let (_watcher, changes) = watcher::start(&args.scene)?;
    loop {
        match load(&args.scene) {
            Ok(mut world) => {
                if let Outcome::Reloaded = run(&mut world, &args, Some(&changes))? {
                    continue;
                }
            }
            Err(e) => error!("Failed to load scene: {e:#}"),
        }

        info!("Waiting for changes to {}", args.scene.display());
        if changes.recv().is_err() {
            break;
        }
        // editors often emit several events per save
        while changes.try_recv().is_ok() {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["runtime_main", "--scene", "drop.json"]).unwrap();
        assert_eq!(args.steps, 600);
        assert_eq!(args.log_every, 60);
        assert!((args.dt - 1.0 / 60.0).abs() < f32::EPSILON);
        assert!(!args.watch);
    }

    #[test]
    fn scene_is_required() {
        assert!(Args::try_parse_from(["runtime_main", "--steps", "10"]).is_err());
    }

    #[test]
    fn reload_signal_interrupts_run() {
        let mut world = World::default();
        let args = Args::try_parse_from(["runtime_main", "--scene", "x.json", "--steps", "100"]).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        tx.send(()).unwrap();
        assert!(matches!(run(&mut world, &args, Some(&rx)).unwrap(), Outcome::Reloaded));
        assert!(matches!(run(&mut world, &args, None).unwrap(), Outcome::Finished));
    }
}
