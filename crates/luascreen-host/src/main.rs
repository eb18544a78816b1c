use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use luascreen_engine::config::ScreenConfig;
use luascreen_engine::core::{Display, HeadlessDisplay};
use luascreen_engine::logging::{LoggingConfig, init_logging};
use luascreen_engine::window::{RuntimeConfig, WindowDisplay};
use luascreen_lua::DisplayOpener;
use mlua::{Lua, Table};

/// Runs a Lua script against a pixel screen
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Lua script to run
    script: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Present to an in-memory display instead of a window
    #[arg(long)]
    headless: bool,

    /// Close the headless display after this many frames
    #[arg(long, requires = "headless")]
    frames: Option<u64>,

    /// Save the final render target as a PNG
    #[arg(long, value_name = "OUT.png")]
    screenshot: Option<PathBuf>,

    /// Arguments passed to the script as `arg[1..]`
    #[arg(last = true)]
    script_args: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // No-op if `run` got far enough to configure logging.
            init_logging(LoggingConfig::default());
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = ScreenConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    init_logging(LoggingConfig::from(&config.logging));

    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;

    let lua = Lua::new();
    prepare_globals(&lua, &args.script, &args.script_args).map_err(|e| anyhow!("{e}"))?;
    luascreen_lua::install(&lua, config, display_opener(args)).map_err(|e| anyhow!("{e}"))?;

    log::info!("running {}", args.script.display());
    let result = lua
        .load(source.as_str())
        .set_name(format!("@{}", args.script.display()))
        .exec()
        .map_err(|e| anyhow!("{e}"));

    match &args.screenshot {
        Some(out) => combine_outcomes(result, save_screenshot(&lua, out)),
        None => result,
    }
}

/// The script's own error wins; a failed screenshot is only logged then.
fn combine_outcomes(script: Result<()>, screenshot: Result<()>) -> Result<()> {
    match (script, screenshot) {
        (Err(e), Err(shot)) => {
            log::error!("{shot:#}");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn display_opener(args: &Args) -> DisplayOpener {
    if args.headless {
        let frames = args.frames;
        Box::new(move |config: &ScreenConfig| -> Result<Box<dyn Display>> {
            let display = HeadlessDisplay::new(&config.window.title);
            Ok(Box::new(match frames {
                Some(n) => display.with_frame_limit(n),
                None => display,
            }))
        })
    } else {
        Box::new(|config: &ScreenConfig| -> Result<Box<dyn Display>> {
            let display = WindowDisplay::open(RuntimeConfig::from(config))
                .context("failed to open window")?;
            Ok(Box::new(display))
        })
    }
}

/// Makes modules next to the script requireable and sets `arg`.
fn prepare_globals(lua: &Lua, script: &Path, script_args: &[String]) -> mlua::Result<()> {
    let globals = lua.globals();

    if let Some(dir) = script.parent().filter(|d| !d.as_os_str().is_empty()) {
        let package: Table = globals.get("package")?;
        let path: String = package.get("path")?;
        package.set("path", format!("{}/?.lua;{path}", dir.display()))?;
    }

    let arg = lua.create_table()?;
    arg.raw_set(0, script.display().to_string())?;
    for (i, value) in script_args.iter().enumerate() {
        arg.raw_set(i + 1, value.as_str())?;
    }
    globals.set("arg", arg)
}

fn save_screenshot(lua: &Lua, out: &Path) -> Result<()> {
    let Some(canvas) = luascreen_lua::canvas_snapshot(lua) else {
        log::warn!("no screenshot written: the script never opened the screen");
        return Ok(());
    };

    let image = image::RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.as_bytes().to_vec())
        .context("render target does not match its own size")?;
    image
        .save(out)
        .with_context(|| format!("failed to write screenshot {}", out.display()))?;
    log::info!("saved {}x{} screenshot to {}", canvas.width(), canvas.height(), out.display());
    Ok(())
}
