use anyhow::Result;
use clap::Parser;
use tracing::info;

use sim::{build_sim_app, load_config, run_steps, take_recording, Args, EpisodeBuffers, RunOptions};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        cfg.env.seed = seed;
    }
    info!(env = ?cfg.env, "Sim config loaded");

    let mut app = build_sim_app(cfg, RunOptions::from(&args))?;
    run_steps(&mut app, args.steps);

    if let Some(buf) = app.world().get_resource::<EpisodeBuffers>() {
        info!(
            steps = buf.step,
            episodes = buf.episodes_done,
            summary = ?buf.last_summary,
            "run finished"
        );
    }
    if let Some(path) = &args.record {
        if let Some(log) = take_recording(&mut app) {
            log.save(path)?;
            info!(path = %path.display(), steps = log.steps.len(), "episode log written");
        }
    }
    Ok(())
}
