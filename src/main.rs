use std::env;
use std::fs;
use std::process;

use scorecolor::{ColorConfig, Document, Variant};

const USAGE: &str = "Usage: scorecolor <colornotes|degreecolors> <input.musicxml|input.mxl> \
[--config config.json] [--measures A-B] [--output out.json] [--score]";

struct Options {
    variant: Variant,
    input: String,
    config: Option<String>,
    measures: Option<(i32, i32)>,
    output: Option<String>,
    emit_score: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut measures = None;
    let mut output = None;
    let mut emit_score = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(flag_value(&mut iter, "--config")?),
            "--output" => output = Some(flag_value(&mut iter, "--output")?),
            "--measures" => {
                let range = flag_value(&mut iter, "--measures")?;
                measures = Some(parse_range(&range)?);
            }
            "--score" => emit_score = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown flag '{flag}'")),
            _ => positional.push(arg.clone()),
        }
    }

    let [variant, input] = <[String; 2]>::try_from(positional)
        .map_err(|_| "Expected a variant and an input file".to_string())?;
    let variant = variant.parse::<Variant>().map_err(|e| e.to_string())?;

    Ok(Options {
        variant,
        input,
        config,
        measures,
        output,
        emit_score,
    })
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("Missing value for {flag}"))
}

/// `A-B` or a single measure number `A`.
fn parse_range(s: &str) -> Result<(i32, i32), String> {
    let bad = || format!("Invalid measure range '{s}'");
    let (first, last) = s.split_once('-').unwrap_or((s, s));
    let first = first.trim().parse::<i32>().map_err(|_| bad())?;
    let last = last.trim().parse::<i32>().map_err(|_| bad())?;
    if first > last {
        return Err(bad());
    }
    Ok((first, last))
}

fn run(options: &Options) -> Result<(), scorecolor::ScoreError> {
    let config = match &options.config {
        Some(path) => ColorConfig::from_file(path)?,
        None => options.variant.default_config(),
    };

    let score = scorecolor::parse_file(&options.input)?;
    let mut doc = Document::new(score);
    if let Some((first, last)) = options.measures {
        doc.select_measures(first..=last);
    }

    let report = scorecolor::plugin::run(&mut doc, options.variant, &config)?;
    let json = if options.emit_score {
        scorecolor::score_to_json(doc.score())?
    } else {
        scorecolor::report_to_json(&report)?
    };

    match &options.output {
        Some(path) => {
            fs::write(path, &json).map_err(|e| scorecolor::ScoreError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;
            eprintln!(
                "Wrote {} color assignments for {} notes to {path}",
                report.assignments.len(),
                report.notes
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
