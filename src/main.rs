use anyhow::Context;
use clap::Parser;
use colored::*;
use std::time::{Duration, Instant};

use lookfit::analysis::MockAnalyzer;
use lookfit::args::Args;
use lookfit::camera::{self, NokhwaDevice};
use lookfit::config::AppConfig;
use lookfit::landmarks::{PointGenerator, RandomPoints};
use lookfit::output::WindowOutput;
use lookfit::report;
use lookfit::scanner::ScanScreen;
use lookfit::types::Phase;

const DEFAULT_VIEWPORT: (u32, u32) = (480, 640); // 3:4 portrait

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        let cameras = camera::list_devices()?;
        println!("Available Cameras:");
        println!("{:<10} | {:<30}", "Index", "Name");
        println!("{}", "-".repeat(45));
        for (index, name) in cameras {
            println!("{:<10} | {:<30}", index, name);
        }
        return Ok(());
    }

    let mut config = AppConfig::load_from(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(index) = args.cam_index {
        config.camera.index = index;
    }
    if args.no_mirror {
        config.camera.mirror = false;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: AppConfig) -> anyhow::Result<()> {
    let mut device = NokhwaDevice;
    let max_delay = config.landmarks.max_reveal_delay_secs;
    let mut generator: Box<dyn PointGenerator> = match args.seed {
        Some(seed) => Box::new(RandomPoints::seeded(seed, max_delay)),
        None => Box::new(RandomPoints::from_entropy(max_delay)),
    };

    let analyzer = MockAnalyzer::new(config.timing.complete_delay(), config.analysis.clone());
    let mut screen = ScanScreen::mount(&mut device, generator.as_mut(), analyzer, &config);
    println!("Active Analyzer: {}", screen.analyzer_name());
    if !screen.camera().is_active() {
        println!("{}", "Camera not available, showing placeholder.".yellow());
    }

    let outcome = if args.headless {
        let mut last_phase = None;
        screen
            .present(Duration::from_millis(100), |_, view| {
                if last_phase != Some(view.phase) {
                    last_phase = Some(view.phase);
                    println!("{}\n", report::render(view));
                }
                view.phase != Phase::Complete
            })
            .await
    } else {
        let (width, height) = screen.camera().resolution().unwrap_or(DEFAULT_VIEWPORT);
        let mut window = WindowOutput::new(&config.ui.title, width as usize, height as usize)?;
        println!("Controls: [Esc] close");

        let dot_size = config.ui.dot_size;
        let mut revealed_at: Option<Instant> = None;
        let mut reported = false;
        screen
            .present(Duration::from_millis(16), |camera, view| {
                if !window.is_open() || window.is_key_down(minifb::Key::Escape) {
                    return false;
                }
                if view.phase >= Phase::Revealed && revealed_at.is_none() {
                    revealed_at = Some(Instant::now());
                }
                if view.phase == Phase::Complete && !reported {
                    reported = true;
                    println!("{}\n", report::render(view));
                }

                let since_reveal = revealed_at.map(|t| t.elapsed()).unwrap_or_default();
                let frame = camera.frame();
                if let Err(e) = window.render(view, frame.as_ref(), since_reveal, dot_size) {
                    log::error!("{}", e);
                    return false;
                }
                true
            })
            .await
    };

    match outcome {
        Some(Ok(timeline)) => {
            for t in &timeline.transitions {
                log::debug!("{:?} at {:?}", t.phase, t.at);
            }
        }
        Some(Err(e)) => log::error!("Scan ended without a result: {}", e),
        None => log::info!("Scan screen closed before the analysis finished"),
    }
    Ok(())
}
