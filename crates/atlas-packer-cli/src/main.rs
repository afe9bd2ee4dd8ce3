use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use atlas_packer_core::source::{FsImageSource, ImageEntry, ImageSourceProvider};
use atlas_packer_core::{
    ImageMetadata, PackAlgorithm, PixelBuffer, PixelFormat, SETTINGS_FILE_NAME, Settings,
    TextureFilter, page_file_names, pack_directory, to_atlas_text, to_json,
};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "atlas-packer",
    about = "Pack a directory of images into texture atlas pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar while loading (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a directory into atlas pages plus metadata
    Pack(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json, or name_<i>.png for several pages)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// Settings file (.json, or .yaml/.yml). Defaults to <input>/_packSettings.json when present
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob, matched against the path relative to the input)
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob, matched against the path relative to the input)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Subdirectory levels to scan below the input (0 = input directory only)
    #[arg(long, help_heading = "Input/Output")]
    max_depth: Option<usize>,

    // Layout
    /// Max page width
    #[arg(long, help_heading = "Layout")]
    max_width: Option<u32>,
    /// Max page height
    #[arg(long, help_heading = "Layout")]
    max_height: Option<u32>,
    /// Round page dims up to powers of two
    #[arg(long, help_heading = "Layout")]
    pow2: Option<bool>,
    /// Algorithm: best | greedy
    #[arg(long, value_parser = ["best", "maxrects", "greedy", "shelf"], help_heading = "Layout")]
    algorithm: Option<String>,
    /// Allow 90deg rotation
    #[arg(long, help_heading = "Layout")]
    allow_rotation: Option<bool>,
    /// Horizontal gutter between regions
    #[arg(long, help_heading = "Layout")]
    padding_x: Option<u32>,
    /// Vertical gutter between regions
    #[arg(long, help_heading = "Layout")]
    padding_y: Option<u32>,
    /// Also keep the gutter along the page edges
    #[arg(long, help_heading = "Layout")]
    edge_padding: Option<bool>,
    /// Reserve and paint an opaque white pixel in the page corner
    #[arg(long, help_heading = "Layout")]
    white_pixel: Option<bool>,

    // Image Processing
    /// Strip transparent borders
    #[arg(long, help_heading = "Image Processing")]
    strip_whitespace: Option<bool>,
    /// Alpha at or below this counts as whitespace (0.0..=1.0)
    #[arg(long, help_heading = "Image Processing")]
    alpha_threshold: Option<f32>,
    /// Page pixel format: rgba | rgb
    #[arg(long, value_parser = ["rgba", "rgb"], help_heading = "Image Processing")]
    pixel_format: Option<String>,
    /// Premultiply color by alpha
    #[arg(long, help_heading = "Image Processing")]
    premultiplied_alpha: Option<bool>,
    /// Minification filter recorded in the metadata
    #[arg(long, help_heading = "Image Processing")]
    filter_min: Option<String>,
    /// Magnification filter recorded in the metadata
    #[arg(long, help_heading = "Image Processing")]
    filter_mag: Option<String>,

    // Export
    /// Metadata format: json | atlas
    #[arg(long, default_value = "json", value_parser = ["json", "atlas"], help_heading = "Export")]
    metadata: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged settings (file + CLI) as json or yaml and exit
    #[arg(long, value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config: Option<String>,
    /// Dry run: pack and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let settings = resolve_settings(cli)?;

    if let Some(format) = &cli.print_config {
        match format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&settings)?),
            _ => println!("{}", serde_json::to_string_pretty(&settings)?),
        }
        return Ok(());
    }

    if !cli.input.is_dir() {
        anyhow::bail!("input is not a directory: {}", cli.input.display());
    }

    let provider = FilteredSource::new(&cli.include, &cli.exclude, show_progress)?;
    let out = pack_directory(&provider, &cli.input, settings)?;
    provider.finish();

    let stats = out.stats();
    info!(
        pages = stats.num_pages,
        regions = stats.num_regions,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    let page_names = page_file_names(&cli.name, out.pages.len());

    if cli.dry_run {
        println!("{}", stats.summary());
        return Ok(());
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

    for (i, (page, file)) in out.pages.iter().zip(&page_names).enumerate() {
        let png_path = cli.out_dir.join(file);
        page.pixels
            .clone()
            .into_dynamic()
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, id = i, "wrote page");
    }

    match cli.metadata.as_str() {
        "json" => {
            let json_path = cli.out_dir.join(format!("{}.json", cli.name));
            let json = serde_json::to_string_pretty(&to_json(&out, &page_names)?)?;
            fs::write(&json_path, json)
                .with_context(|| format!("write {}", json_path.display()))?;
            info!(?json_path, pages = out.pages.len(), "atlas written");
        }
        "atlas" => {
            let atlas_path = cli.out_dir.join(format!("{}.atlas", cli.name));
            fs::write(&atlas_path, to_atlas_text(&out, &page_names))
                .with_context(|| format!("write {}", atlas_path.display()))?;
            info!(?atlas_path, pages = out.pages.len(), "atlas written");
        }
        other => anyhow::bail!("unknown metadata format: {}", other),
    }

    if let Some(stats_path) = &cli.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

/// Explicit `--config`, else the input's `_packSettings.json`, else defaults; CLI flags win.
fn resolve_settings(cli: &PackArgs) -> anyhow::Result<Settings> {
    let implicit = cli.input.join(SETTINGS_FILE_NAME);
    let mut settings = match &cli.config {
        Some(path) => load_settings_file(path)?,
        None if implicit.is_file() => load_settings_file(&implicit)?,
        None => Settings::default(),
    };
    apply_overrides(cli, &mut settings)?;
    settings.validate()?;
    Ok(settings)
}

fn load_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let settings = if is_yaml {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        Settings::load(path).with_context(|| format!("load {}", path.display()))?
    };
    debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

fn apply_overrides(cli: &PackArgs, s: &mut Settings) -> anyhow::Result<()> {
    let a = &mut s.algorithm_settings;
    if let Some(v) = cli.max_width {
        a.page_max_width = v;
    }
    if let Some(v) = cli.max_height {
        a.page_max_height = v;
    }
    if let Some(v) = cli.pow2 {
        a.power_of_two = v;
    }
    if let Some(v) = cli.allow_rotation {
        a.allow_rotation = v;
    }
    if let Some(v) = cli.padding_x {
        a.padding_x = v;
    }
    if let Some(v) = cli.padding_y {
        a.padding_y = v;
    }
    if let Some(v) = cli.edge_padding {
        a.edge_padding = v;
    }
    if let Some(v) = cli.white_pixel {
        a.add_white_pixel = v;
    }
    if let Some(v) = &cli.algorithm {
        s.pack_algorithm = v
            .parse::<PackAlgorithm>()
            .map_err(|_| anyhow::anyhow!("unknown algorithm: {}", v))?;
    }
    if let Some(v) = cli.strip_whitespace {
        s.strip_whitespace = v;
    }
    if let Some(v) = cli.alpha_threshold {
        s.alpha_threshold = v;
    }
    if let Some(v) = &cli.pixel_format {
        s.pixel_format = v
            .parse::<PixelFormat>()
            .map_err(|_| anyhow::anyhow!("unknown pixel format: {}", v))?;
    }
    if let Some(v) = cli.premultiplied_alpha {
        s.premultiplied_alpha = v;
    }
    if let Some(v) = cli.max_depth {
        s.max_directory_depth = v;
    }
    if let Some(v) = &cli.filter_min {
        s.filter_min = parse_filter(v)?;
    }
    if let Some(v) = &cli.filter_mag {
        s.filter_mag = parse_filter(v)?;
    }
    Ok(())
}

fn parse_filter(v: &str) -> anyhow::Result<TextureFilter> {
    v.parse::<TextureFilter>()
        .map_err(|_| anyhow::anyhow!("unknown texture filter: {}", v))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob: {pat}"))?);
    }
    Ok(Some(b.build()?))
}

/// Filesystem source with include/exclude globs and a loading progress bar.
struct FilteredSource {
    inner: FsImageSource,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    bar: Option<ProgressBar>,
}

impl FilteredSource {
    fn new(include: &[String], exclude: &[String], progress: bool) -> anyhow::Result<Self> {
        let bar = if progress {
            let b = ProgressBar::new(0);
            b.set_style(ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )?);
            Some(b)
        } else {
            None
        };
        Ok(Self {
            inner: FsImageSource,
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
            bar,
        })
    }

    fn keep(&self, relative_path: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|ex| ex.is_match(relative_path)) {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|inc| inc.is_match(relative_path))
    }

    fn finish(&self) {
        if let Some(b) = &self.bar {
            b.finish_and_clear();
        }
    }
}

impl ImageSourceProvider for FilteredSource {
    fn list_images(
        &self,
        root: &Path,
        max_depth: usize,
    ) -> atlas_packer_core::Result<Vec<ImageEntry>> {
        let mut list = self.inner.list_images(root, max_depth)?;
        list.retain(|e| self.keep(&e.relative_path));
        if let Some(b) = &self.bar {
            b.set_length(list.len() as u64);
        }
        info!(count = list.len(), "input images");
        Ok(list)
    }

    fn load_pixel_buffer(&self, path: &Path) -> atlas_packer_core::Result<PixelBuffer> {
        if let Some(b) = &self.bar {
            let msg = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
        }
        let pixels = self.inner.load_pixel_buffer(path)?;
        if let Some(b) = &self.bar {
            b.inc(1);
        }
        Ok(pixels)
    }

    fn load_sidecar_metadata(
        &self,
        path: &Path,
    ) -> atlas_packer_core::Result<Option<ImageMetadata>> {
        self.inner.load_sidecar_metadata(path)
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
