use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

/// One coloured status line on stdout. No-op in JSON mode.
pub fn status(ok: bool, label: &str, detail: &str) -> anyhow::Result<()> {
    if is_json() {
        return Ok(());
    }
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    let color = if ok { Color::Green } else { Color::Red };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", if ok { "ok  " } else { "fail" })?;
    out.reset()?;
    writeln!(out, " {label}  {detail}")?;
    Ok(())
}
