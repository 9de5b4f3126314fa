use std::path::Path;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use wraith::WatchConfig;
use wraith::bcd;
use wraith::replay::Recording;
use wraith::rom;
use wraith::rom::CartridgeHeader;

pub mod command;
pub mod config;
pub mod run;

use command::*;

fn main() -> anyhow::Result<()> {
    let Args {
        config,
        verbose,
        command,
    } = Args::parse();

    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(config.as_deref())?;
    match command {
        Command::Verify { rom } => verify(&rom, &config),
        Command::Decode { bytes } => {
            let Ok(bytes) = <[u8; 3]>::try_from(bytes) else {
                bail!("exactly three score bytes are required");
            };
            println!("{}", bcd::decode(bytes)?);
            Ok(())
        }
        Command::Scan { dump, base } => scan(&dump, base, &config),
        Command::Replay {
            recording,
            frames,
            rom,
        } => replay(&recording, frames, rom.as_deref(), config),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn verify(path: &Path, config: &WatchConfig) -> anyhow::Result<()> {
    let data = std::fs::read(path).with_context(|| format!("could not read ROM at {path:?}"))?;
    let header = CartridgeHeader::extract_from_rom(&data)?;
    println!("title:  {}", header.title());
    println!("sha256: {}", rom::digest(&data));
    rom::verify(&data, &config.rom_digest)?;
    println!("supported");
    Ok(())
}

fn scan(path: &Path, base: u16, config: &WatchConfig) -> anyhow::Result<()> {
    let image = std::fs::read(path).with_context(|| format!("could not read dump at {path:?}"))?;
    println!("{}", run::scan_score(&image, base, config)?);
    Ok(())
}

fn replay(
    path: &Path,
    limit: Option<usize>,
    rom: Option<&Path>,
    config: WatchConfig,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("could not read recording at {path:?}"))?;
    let recording = Recording::from_toml(&data)?;
    let rom = rom
        .map(|rom| std::fs::read(rom).with_context(|| format!("could not read ROM at {rom:?}")))
        .transpose()?;
    for (frame, over) in run::replay_games(recording, limit, rom.as_deref(), config)? {
        println!("frame {frame:>6}: {over}");
    }
    Ok(())
}
