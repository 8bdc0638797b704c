//! Demo documentation page with embedded clips.
//!
//! Renders a long scrollable page - headings, body text, one `ClipView` per
//! entry - from a JSON page manifest or from clip paths on the command
//! line. Scrolling exercises the lazy-load lifecycle: clips attach shortly
//! before entering the viewport and free their decoded frames on exit.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::{debug, info};

use clipview::cli::Args;
use clipview::{ClipConfig, ClipView};

/// One page section: heading, prose, embedded clip.
struct Section {
    heading: String,
    body: String,
    clip: ClipView,
}

struct PageApp {
    sections: Vec<Section>,
}

impl PageApp {
    fn new(configs: Vec<ClipConfig>) -> Self {
        let sections = configs
            .into_iter()
            .enumerate()
            .map(|(i, config)| {
                let name = config
                    .source
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("clip")
                    .to_string();
                Section {
                    heading: format!("{}. {}", i + 1, name),
                    body: format!(
                        "The clip below plays {} on loop. It attaches when this \
                         section scrolls near the viewport and releases its decoded \
                         frames as soon as it scrolls away, so the page stays light \
                         no matter how many sections it has.",
                        config.source.display()
                    ),
                    clip: ClipView::new(config),
                }
            })
            .collect();
        Self { sections }
    }
}

impl eframe::App for PageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    ui.heading("clipview demo page");
                    ui.label(
                        "Scroll through the sections. Watch attach/detach activity \
                         with -v on the command line.",
                    );
                    ui.add_space(24.0);

                    for section in &mut self.sections {
                        ui.heading(&section.heading);
                        ui.add_space(4.0);
                        ui.label(&section.body);
                        ui.add_space(8.0);
                        section.clip.show(ui);
                        ui.add_space(48.0);
                    }
                });
        });
    }
}

/// Read a page manifest: a JSON array of clip configurations.
fn load_manifest(path: &Path) -> anyhow::Result<Vec<ClipConfig>> {
    let file =
        File::open(path).with_context(|| format!("cannot open manifest {}", path.display()))?;
    let configs: Vec<ClipConfig> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed manifest {}", path.display()))?;
    Ok(configs)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
        .format_timestamp_millis()
        .init();

    info!("clipview demo starting...");
    debug!("Command-line args: {:?}", args);

    let mut configs = match &args.page {
        Some(path) => load_manifest(path)?,
        None => args.clips.iter().map(ClipConfig::new).collect(),
    };
    if args.eager {
        for config in &mut configs {
            config.lazy_load = false;
        }
    }
    anyhow::ensure!(
        !configs.is_empty(),
        "no clips to show; pass clip files or --page <manifest.json>"
    );
    info!("page has {} clip(s), eager={}", configs.len(), args.eager);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("clipview v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([900.0, 700.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "clipview",
        native_options,
        Box::new(move |_cc| Ok(Box::new(PageApp::new(configs)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
