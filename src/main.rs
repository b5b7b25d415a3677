//! hyper – command-line style document → PDF converter.
//!
//! Usage:
//!   hyper <input.json> [output] [--landscape] [--title "My Report"] [--commands]
//!
//! If `output` is omitted it is written next to the input file with the same
//! stem: `report.json` → `report.pdf`, or `report.commands.json` with
//! `--commands`.

use std::{env, fs, path::Path, path::PathBuf, process};

use hyperpdf::draw::{commands_to_json, DrawCommand};
use hyperpdf::pipeline::{compute_draw_commands, generate_pdf, PageOrientation, PipelineConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut commands_only = false;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--commands" | "-c" => commands_only = true,
            "--title" | "-t" => match iter.next() {
                Some(v) => title = Some(v.clone()),
                None => {
                    eprintln!("Error: --title needs a value.");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension(if commands_only { "commands.json" } else { "pdf" });
        o
    });

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let default_title = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("hyperpdf output")
        .to_string();

    let config = PipelineConfig {
        title: title.unwrap_or(default_title),
        orientation: if landscape {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        },
        ..PipelineConfig::default()
    };

    let result = if commands_only {
        compute_draw_commands(&json, &config).and_then(|commands| {
            let out = commands_to_json(&commands)?;
            Ok((out.into_bytes(), commands))
        })
    } else {
        generate_pdf(&json, &config)
    };

    match result {
        Ok((bytes, commands)) => {
            write_output(&output, &bytes);
            let cells = count_cells(&commands);
            eprintln!(
                "Wrote '{}' ({} bytes, {} cell{})",
                output.display(),
                bytes.len(),
                cells,
                if cells == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn count_cells(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Cell(_)))
        .count()
}

fn write_output(output: &Path, bytes: &[u8]) {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(output, bytes) {
        eprintln!("Error writing '{}': {e}", output.display());
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("hyper – style document to PDF converter (hyperpdf)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.json> [output] [--landscape] [--title \"My Report\"] [--commands]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.json>   Style document: one rule object or an array of rules");
    eprintln!("  [output]       Output path  (default: same stem as input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t    Document title in PDF metadata (default: input filename stem)");
    eprintln!("  --landscape    Use landscape page orientation (A4 841×595 pt)");
    eprintln!("  --commands     Write the draw-command stream as JSON instead of a PDF");
    eprintln!("  --help         Print this message");
}
