use amoeba_core::AmoebaConfig;
use amoeba_limbic::{Habitat, HabitatFrame, HeartbeatConfig, MaxStressReached};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file (missing file falls back to defaults)
    #[arg(short, long, default_value = "amoeba.toml")]
    config: String,

    /// Number of simulation steps to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Override the number of amoebas in the habitat
    #[arg(short, long)]
    amoebas: Option<usize>,

    /// Seed for the ambient stressor angles
    #[arg(long, env = "AMOEBA_SEED")]
    seed: Option<u64>,

    /// Pace steps in wall-clock time instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print reported frames as JSON lines
    #[arg(long)]
    json: bool,

    /// Report every n-th frame
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn report(frame: &HabitatFrame, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(frame)?);
        return Ok(());
    }

    println!(
        "t={:>7.2}s  in flight {:>3}  (+{} spawned, {} absorbed, {} expired)",
        frame.now, frame.in_flight, frame.spawned, frame.absorbed, frame.expired
    );
    for amoeba in &frame.amoebas {
        let out = &amoeba.outputs;
        println!(
            "  {}  stress {:>6.2}/{:<6.2} {:?}  scale {:.2}  light {:.2}  colour ({:.2}, {:.2}, {:.2})",
            amoeba.id,
            out.stress_level,
            out.capacity,
            out.lashout,
            amoeba.scale,
            out.light_intensity,
            out.color.r,
            out.color.g,
            out.color.b
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json);

    let mut config = AmoebaConfig::load_or_default(&args.config);
    if let Some(n) = args.amoebas {
        config.habitat.amoebas = n;
    }
    if args.seed.is_some() {
        config.ambient.seed = args.seed;
    }

    let mut habitat = Habitat::new(&config).context("Invalid habitat configuration")?;
    let heartbeat = HeartbeatConfig::from_hz(config.habitat.tick_hz);
    let dt = heartbeat.dt();

    // Lashout notifications arrive on a channel and are logged off the tick path
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<MaxStressReached>();
    habitat.register_listener(Arc::new(event_tx));
    let events = tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(event) = event_rx.recv().await {
            count += 1;
            warn!(
                "Max stress reached: {} at t={:.2}s (capacity {:.2})",
                event.engine, event.at, event.capacity
            );
        }
        count
    });

    info!(
        "Running {} ticks at {:.0} Hz{}",
        args.ticks,
        1.0 / dt,
        if args.realtime { " (realtime)" } else { "" }
    );

    let report_every = args.report_every.max(1);
    let mut interval = tokio::time::interval(heartbeat.interval);
    for tick in 1..=args.ticks {
        if args.realtime {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted at tick {}", tick);
                    break;
                }
            }
        }

        let frame = habitat.step(dt);
        if tick % report_every == 0 || tick == args.ticks {
            report(&frame, args.json)?;
        }
    }

    for amoeba in habitat.amoebas() {
        let engine = amoeba.engine();
        info!(
            "{} finished with capacity {:.2}, stress {:.2}",
            engine.id(),
            engine.capacity(),
            engine.stress_level()
        );
    }

    // Dropping the habitat drops the last sender
    drop(habitat);
    let episodes = events.await?;
    info!("Simulation done: {} lashout episodes", episodes);

    Ok(())
}
