// src/bin/poolparse.rs
// Converts a text question pool to JSON: poolparse <pool.txt> [out.json]
// Without an output path the JSON goes to stdout.
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use hamtrainer::poolparse::{decode_pool_text, sanity_check, PoolParser};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: poolparse <pool.txt> [out.json]")?;

    let raw = std::fs::read(&input).with_context(|| format!("read {input}"))?;
    let pool = PoolParser::new()?.parse(&decode_pool_text(&raw));
    let element = sanity_check(&pool).with_context(|| format!("sanity check {input}"))?;

    match args.next() {
        Some(out) => {
            let mut w = BufWriter::new(File::create(&out).with_context(|| format!("create {out}"))?);
            serde_json::to_writer_pretty(&mut w, &pool).context("write pool JSON")?;
            w.flush().with_context(|| format!("flush {out}"))?;
        }
        None => {
            let mut w = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut w, &pool).context("write pool JSON")?;
            writeln!(w)?;
        }
    }

    eprintln!(
        "[poolparse] element {element}: {} subelements, {} topics, {} questions",
        pool.subelements.len(),
        pool.topics.len(),
        pool.questions.len()
    );
    Ok(())
}
