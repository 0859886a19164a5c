//! Digital LCD Panel Control CLI
//!
//! Command-line interface for driving USB HID seven-segment telemetry panels.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use digital_lcd_rust::config::{self, AppConfig, DisplayMode, MetricBounds};
use digital_lcd_rust::device::SegmentPanel;
use digital_lcd_rust::layout::PeerlessLayout;
use digital_lcd_rust::metrics::{MetricsSampler, MetricsSnapshot};
use digital_lcd_rust::protocol::serialize_frame;
use digital_lcd_rust::render::color::{ColorExpr, parse_color_list};
use digital_lcd_rust::render::{ComposeInputs, Composer};

// =============================================================================
// Constants
// =============================================================================

/// Fallback sleep between open attempts while the panel is absent.
const DEVICE_RETRY_DELAY: Duration = Duration::from_secs(5);

const LAYOUT_FILE: &str = "layout.json";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Digital LCD Panel Control Tool
#[derive(Parser, Debug)]
#[command(name = "digital-lcd-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (default: per-OS config dir, or $DIGITAL_LCD_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the render loop until interrupted
    Run,

    /// Compose a single frame and print its packets as hex
    Preview,

    /// List connected panels
    List,

    /// Diagnostic: list all available temperature sensors
    Sensors,

    /// Light every LED to verify wiring
    TestPanel,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path().context("Failed to resolve config path")?,
    };

    match args.command {
        Command::Run => cmd_run(&config_path),
        Command::Preview => cmd_preview(&config_path),
        Command::List => cmd_list(&config_path),
        Command::Sensors => cmd_sensors(),
        Command::TestPanel => cmd_test_panel(&config_path),
    }
}

// =============================================================================
// Derived Settings
// =============================================================================

/// Everything re-derived from the raw config at each reload: validated mode,
/// parsed color tables and gradient bounds.
struct ActiveSettings {
    config: AppConfig,
    mode: DisplayMode,
    metrics_exprs: Vec<ColorExpr>,
    time_exprs: Vec<ColorExpr>,
    bounds: MetricBounds,
}

impl ActiveSettings {
    fn derive(config: AppConfig) -> Self {
        let mode = config
            .display_mode()
            .validate_for_layout(config.layout_mode());
        let metrics_exprs = parse_color_list(&config.metrics.colors, "metrics");
        let time_exprs = parse_color_list(&config.time.colors, "time");
        let bounds = config.bounds();
        Self {
            config,
            mode,
            metrics_exprs,
            time_exprs,
            bounds,
        }
    }

    fn apply(&self, composer: &mut Composer, sampler: &mut MetricsSampler) {
        composer.set_layout_mode(self.config.layout_mode());
        composer.set_cycle_ticks(self.config.cycle_ticks());
        sampler.set_refresh_interval(Duration::from_secs_f64(
            self.config.metrics_update_interval.max(0.0),
        ));
    }

    fn compose_inputs<'a>(&'a self, metrics: &'a MetricsSnapshot) -> ComposeInputs<'a> {
        ComposeInputs {
            metrics,
            units: self.config.temp_units(),
            now: Local::now().time(),
            metrics_exprs: &self.metrics_exprs,
            time_exprs: &self.time_exprs,
            bounds: &self.bounds,
        }
    }
}

fn layout_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(LAYOUT_FILE)
}

fn open_panel(config: &AppConfig) -> Option<SegmentPanel> {
    match SegmentPanel::open(config.vendor_id(), config.product_id()) {
        Ok(panel) => {
            info!("opened {:?}", panel);
            Some(panel)
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_run(config_path: &Path) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to set Ctrl-C handler")?;
    }

    let mut composer = Composer::new();
    composer.set_peerless_layout(PeerlessLayout::load_or_none(&layout_path(config_path)));
    let mut sampler = MetricsSampler::new();

    let mut active = ActiveSettings::derive(AppConfig::load_or_default(config_path));
    active.apply(&mut composer, &mut sampler);
    let mut panel = open_panel(&active.config);

    info!(
        "render loop started (mode '{}', {} layout)",
        active.mode.name(),
        active.config.layout_mode().name()
    );

    while running.load(Ordering::SeqCst) {
        // Pick up config edits between ticks. Settings are re-derived (and
        // incompatible modes warned about) only when the file changed.
        let config = AppConfig::load_or_default(config_path);
        if config != active.config {
            info!("configuration changed, reloading");
            let ids_changed = (config.vendor_id(), config.product_id())
                != (active.config.vendor_id(), active.config.product_id());
            active = ActiveSettings::derive(config);
            active.apply(&mut composer, &mut sampler);
            if ids_changed {
                warn!("vendor/product id changed, reacquiring device");
                panel = open_panel(&active.config);
            }
        }

        let Some(device) = panel.as_ref() else {
            std::thread::sleep(DEVICE_RETRY_DELAY);
            panel = open_panel(&active.config);
            continue;
        };

        let metrics = sampler.sample(active.config.temp_units());
        let mut write_failed = false;
        match composer.compose(&active.mode, &active.compose_inputs(&metrics)) {
            Ok(frame) => {
                let packets = serialize_frame(&frame.leds, &frame.colors);
                if let Err(e) = device.send_frame(&packets) {
                    warn!("frame write failed: {}", e);
                    write_failed = true;
                }
            }
            // Out-of-range values abort the frame; the loop keeps running.
            Err(e) => error!("frame skipped: {}", e),
        }
        if write_failed {
            panel = None;
        }

        std::thread::sleep(Duration::from_secs_f64(active.config.update_interval.max(0.0)));
    }

    info!("render loop stopped");
    Ok(())
}

fn cmd_preview(config_path: &Path) -> Result<()> {
    let mut composer = Composer::new();
    composer.set_peerless_layout(PeerlessLayout::load_or_none(&layout_path(config_path)));
    let mut sampler = MetricsSampler::new();

    let active = ActiveSettings::derive(AppConfig::load_or_default(config_path));
    active.apply(&mut composer, &mut sampler);

    let metrics = sampler.sample(active.config.temp_units());
    let frame = composer
        .compose(&active.mode, &active.compose_inputs(&metrics))
        .context("Failed to compose frame")?;

    let lit = frame.leds.iter().filter(|&&l| l != 0).count();
    println!("mode:     {}", active.mode.name());
    println!("layout:   {}", active.config.layout_mode().name());
    println!("metrics:  {:?}", metrics);
    println!("lit LEDs: {}/{}", lit, frame.leds.len());

    for (i, packet) in serialize_frame(&frame.leds, &frame.colors)
        .iter()
        .enumerate()
    {
        println!("packet {}: {}", i, hex::encode(packet));
    }

    Ok(())
}

fn cmd_list(config_path: &Path) -> Result<()> {
    let config = AppConfig::load_or_default(config_path);
    let devices = SegmentPanel::list_devices(config.vendor_id(), config.product_id())
        .context("Failed to enumerate HID devices")?;

    if devices.is_empty() {
        println!(
            "No panels found (vendor {:#06x}, product {:#06x}).",
            config.vendor_id(),
            config.product_id()
        );
        return Ok(());
    }

    println!("Found {} panel(s):", devices.len());
    for (path, serial) in devices {
        match serial {
            Some(serial) => println!("  {} (serial: {})", path, serial),
            None => println!("  {}", path),
        }
    }
    Ok(())
}

fn cmd_sensors() -> Result<()> {
    let sampler = MetricsSampler::new();
    let sensors = sampler.list_sensors();

    if sensors.is_empty() {
        println!("No temperature sensors detected.");
        return Ok(());
    }

    println!("Detected sensors:");
    for (label, temperature) in sensors {
        println!("  {:<40} {:>6.1} C", label, temperature);
    }
    Ok(())
}

fn cmd_test_panel(config_path: &Path) -> Result<()> {
    let config = AppConfig::load_or_default(config_path);
    let panel = SegmentPanel::open(config.vendor_id(), config.product_id())
        .context("Failed to open panel")?;

    let mut composer = Composer::new();
    composer.set_layout_mode(config.layout_mode());
    let mut sampler = MetricsSampler::new();

    let active = ActiveSettings::derive(config);
    let metrics = sampler.sample(active.config.temp_units());
    let frame = composer
        .compose(&DisplayMode::DebugUi, &active.compose_inputs(&metrics))
        .context("Failed to compose test frame")?;

    panel
        .send_frame(&serialize_frame(&frame.leds, &frame.colors))
        .context("Failed to write test frame")?;
    println!("Test frame sent: all {} LEDs lit.", frame.leds.len());
    Ok(())
}
