#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use muid::{
    Decoded, IdGenerator, MemoryKvStore, SystemClock, Uid, UidType, UrlStore, alphanumeric,
};
use std::{
    io::{self, Write},
    thread,
    time::Duration,
};
use telemetry::init_tracing;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_tracing();
    tracing::debug!(source = config.source, capacity = config.capacity, "starting");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &config.command {
        Command::Generate { ty, count, raw } => generate(&mut out, &config, *ty, *count, *raw)?,
        Command::Decode { ids } => {
            for s in ids {
                decode(&mut out, s)?;
            }
        }
        Command::Path { ids } => {
            for s in ids {
                let id = parse_id(s)?;
                writeln!(out, "{s}\t{}", id.storage_path())?;
            }
        }
        Command::Types => {
            for ty in UidType::ALL {
                writeln!(out, "{}\t{}", ty.code(), ty.name())?;
            }
        }
        Command::Intern { urls } => intern(&mut out, urls)?,
    }
    Ok(())
}

fn generate(
    out: &mut impl Write,
    config: &CliConfig,
    ty: UidType,
    count: usize,
    raw: bool,
) -> anyhow::Result<()> {
    let generator = IdGenerator::with_capacity(config.capacity, SystemClock)?;
    let mut issued = 0;
    while issued < count {
        match generator.allocate(ty, config.source) {
            Ok(id) if raw => writeln!(out, "{}", id.to_raw())?,
            Ok(id) => writeln!(out, "{id}")?,
            Err(e) if e.is_overloaded() => {
                tracing::debug!(issued, "capacity exhausted, waiting for the next second");
                thread::sleep(Duration::from_millis(10));
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        issued += 1;
    }
    tracing::info!(count, ty = %ty, source = config.source, "generated identifiers");
    Ok(())
}

fn decode(out: &mut impl Write, s: &str) -> anyhow::Result<()> {
    let id = parse_id(s)?;
    let fields = id.fields().with_context(|| format!("failed to decode {s}"))?;
    write!(out, "{id}\traw=0x{:016x}", id.to_raw())?;
    match fields {
        Decoded::Entity {
            ty,
            source,
            timestamp,
            sequence,
        } => writeln!(
            out,
            "\ttype={ty}({})\tsource={source}\ttimestamp={timestamp}\tsequence={sequence}",
            ty.code()
        )?,
        Decoded::Url(url) => writeln!(
            out,
            "\ttype=url({})\tdomain_hash=0x{:04x}\tfile_hash=0x{:08x}",
            UidType::Url.code(),
            url.domain_hash,
            url.file_hash
        )?,
    }
    if !id.is_valid() {
        tracing::warn!(id = %id, "reserved bits are set");
    }
    Ok(())
}

fn intern(out: &mut impl Write, urls: &[String]) -> anyhow::Result<()> {
    let store = UrlStore::new(MemoryKvStore::new());
    for url in urls {
        let interned = store
            .intern(url)
            .with_context(|| format!("failed to intern {url}"))?;
        let canonical = store.resolve(interned.id)?.unwrap_or_default();
        let state = if interned.created { "new" } else { "existing" };
        writeln!(out, "{}\t{state}\t{canonical}", interned.id)?;
    }
    Ok(())
}

/// Accepts a decimal integer or the 11-character form.
///
/// All-digit input is always an integer: an 11-character string of digits
/// ends in a digit worth 52 or more, which the alphanumeric form rejects.
fn parse_id(s: &str) -> anyhow::Result<Uid> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let raw: u64 = s
            .parse()
            .with_context(|| format!("invalid identifier {s:?}, integer exceeds 64 bits"))?;
        return Ok(Uid::from_raw(raw));
    }
    if s.len() == alphanumeric::ENCODED_LEN {
        return Uid::decode(s).with_context(|| format!("invalid identifier {s:?}"));
    }
    anyhow::bail!("invalid identifier {s:?}, expected 11 characters or an integer")
}
