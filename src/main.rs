use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use engine_bootstrap::{Engine, HeadlessLimits, HeadlessPlatform, Platform};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let binary = env::current_exe().context("unable to locate the running binary")?;
    if options.headless {
        run_headless(&binary, &options)
    } else {
        run_native(&binary, &options)
    }
}

fn run_headless(binary: &Path, options: &CliOptions) -> Result<()> {
    let mut limits = HeadlessLimits::default();
    if let Some(level) = options.max_antialiasing {
        limits.max_antialiasing = level;
    }
    limits.fullscreen = !options.no_fullscreen_support;
    limits.audio = !options.no_audio;
    let engine = Engine::create(
        HeadlessPlatform::new(limits),
        binary,
        options.data.as_deref(),
    )?;
    finish(engine, options)
}

#[cfg(feature = "sdl2")]
fn run_native(binary: &Path, options: &CliOptions) -> Result<()> {
    use engine_bootstrap::Sdl2Platform;

    let platform = Sdl2Platform::new("Engine Bootstrap");
    match Engine::create(platform, binary, options.data.as_deref()) {
        Ok(engine) => finish(engine, options),
        Err(err) if matches!(err.service(), Some("system") | Some("video")) => {
            eprintln!("{err}. Falling back to --headless mode.");
            run_headless(binary, options)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(not(feature = "sdl2"))]
fn run_native(binary: &Path, options: &CliOptions) -> Result<()> {
    log::info!("built without the sdl2 feature, running headless");
    run_headless(binary, options)
}

fn finish<P: Platform>(engine: Engine<P>, options: &CliOptions) -> Result<()> {
    println!("Platform: {}", engine.platform().name());
    println!("Services:");
    for (name, summary) in engine.describe() {
        match summary {
            Some(summary) => println!(" - {name}: {summary}"),
            None => println!(" - {name}"),
        }
    }
    if options.save_settings {
        engine
            .save_settings()
            .context("failed to save negotiated settings")?;
        if let Some(paths) = engine.paths() {
            println!("Saved settings to {}", paths.settings_file().display());
        }
    }
    engine.destroy();
    println!("Shut down cleanly");
    Ok(())
}

struct CliOptions {
    data: Option<PathBuf>,
    headless: bool,
    max_antialiasing: Option<u8>,
    no_fullscreen_support: bool,
    no_audio: bool,
    save_settings: bool,
}

const USAGE: &str = "Usage: engine-bootstrap [--data <dir>] [--headless] [--max-antialiasing <n>] [--no-fullscreen-support] [--no-audio] [--save-settings]";

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            data: None,
            headless: false,
            max_antialiasing: None,
            no_fullscreen_support: false,
            no_audio: false,
            save_settings: false,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--data expects a directory\n{USAGE}"))?;
                    options.data = Some(PathBuf::from(dir));
                }
                "--max-antialiasing" => {
                    let level = args
                        .next()
                        .ok_or_else(|| anyhow!("--max-antialiasing expects a level\n{USAGE}"))?;
                    options.max_antialiasing = Some(
                        level
                            .parse()
                            .with_context(|| format!("invalid antialiasing level: {level}"))?,
                    );
                }
                "--headless" => options.headless = true,
                "--no-fullscreen-support" => options.no_fullscreen_support = true,
                "--no-audio" => options.no_audio = true,
                "--save-settings" => options.save_settings = true,
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(options)
    }
}
