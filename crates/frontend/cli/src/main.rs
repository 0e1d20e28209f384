mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::BlitConfig;
use mdflip_core::logging::{LogConfig, LogLevel};
use mdflip_core::renderer::Renderer;
use mdflip_genesis::{BlitOutcome, ImageAsset, MirroredTileBlit, TileUploader, TileMapWriter, Vdp};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdflip", about = "Blit a Genesis image mirrored onto a background plane")]
struct Args {
    /// Image asset (JSON with tileset, tilemap and optional palette)
    asset: PathBuf,

    /// Settings file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target plane: a, b or window
    #[arg(long)]
    plane: Option<String>,

    /// VRAM tile index for the image's first tile
    #[arg(long)]
    base_tile: Option<u16>,

    /// Left column in cells
    #[arg(long)]
    x: Option<u16>,

    /// Top row in cells
    #[arg(long)]
    y: Option<u16>,

    /// Palette line 0-3
    #[arg(long)]
    palette: Option<u8>,

    /// Draw with high priority (--priority=false turns a config value off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    priority: Option<bool>,

    /// Draw the image unmirrored (--plain=false turns a config value off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    plain: Option<bool>,

    /// Dump VDP save-state to this file as JSON
    #[arg(long, default_value = "vdp_state.json")]
    save: PathBuf,

    /// Write a 320x224 PPM preview of the planes
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Core log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "off")]
    log_level: String,

    /// Send core logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Suppress the summary output (still writes --save)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl Args {
    fn resolve_config(&self) -> BlitConfig {
        let mut config = self
            .config
            .as_deref()
            .map(BlitConfig::load)
            .unwrap_or_default();

        if let Some(plane) = &self.plane {
            config.plane = plane.clone();
        }
        if let Some(base_tile) = self.base_tile {
            config.base_tile = base_tile;
        }
        if let Some(x) = self.x {
            config.x = x;
        }
        if let Some(y) = self.y {
            config.y = y;
        }
        if let Some(palette) = self.palette {
            config.palette = palette;
        }
        if let Some(priority) = self.priority {
            config.priority = priority;
        }
        if let Some(plain) = self.plain {
            config.plain = plain;
        }
        if let Some(preview) = &self.preview {
            config.preview = Some(preview.display().to_string());
        }
        config
    }
}

fn configure_core_logging(args: &Args) -> Result<()> {
    let Some(level) = LogLevel::from_str(&args.log_level) else {
        anyhow::bail!("Unknown log level: {}", args.log_level);
    };
    let log_config = LogConfig::global();
    log_config.set_global_level(level);
    if let Some(path) = &args.log_file {
        log_config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    Ok(())
}

fn blit<T>(target: &mut T, image: &ImageAsset, config: &BlitConfig) -> Result<BlitOutcome>
where
    T: TileUploader + TileMapWriter,
{
    let req = config.placement()?;
    let outcome = if config.plain {
        mdflip_genesis::draw_image(
            target,
            req.plane,
            Some(image),
            req.base_tile_index,
            req.x,
            req.y,
            req.palette,
            req.priority,
        )
    } else {
        MirroredTileBlit::render(target, Some(image), &req)
    };
    Ok(outcome)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    configure_core_logging(&args)?;

    let config = args.resolve_config();
    let image = ImageAsset::load(&args.asset)
        .with_context(|| format!("loading asset {}", args.asset.display()))?;

    let mut vdp = Vdp::with_plane_size(config.plane_width, config.plane_height)?;
    if let Some(palette) = &image.palette {
        vdp.load_palette(config.palette, palette.colors())?;
    }

    let outcome = blit(&mut vdp, &image, &config)?;
    match outcome {
        BlitOutcome::Drawn { cells } => log::info!("Wrote {} cells to plane {}", cells, config.plane),
        BlitOutcome::Skipped(reason) => log::warn!("Nothing drawn: {:?}", reason),
    }

    if !args.quiet {
        let stats = vdp.stats();
        println!("{:?}", outcome);
        println!(
            "Uploads: {} DMA, {} tiles; plane {} at ({}, {})",
            stats.dma, stats.tiles, config.plane, config.x, config.y
        );
    }

    let mut f = File::create(&args.save)
        .with_context(|| format!("creating {}", args.save.display()))?;
    write!(f, "{}", serde_json::to_string_pretty(&vdp.save_state())?)?;

    if let Some(path) = &config.preview {
        vdp.render();
        let out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path))?);
        vdp.get_frame().write_ppm(out)?;
    }

    Ok(())
}
