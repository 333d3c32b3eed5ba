use anyhow::{Context, Result, bail};
use chrono::Datelike;
use shamsidate_config::Config;
use shamsidate_engine::{Engine, ScanOptions, Tree};
use std::io::Read;
use std::{env, path::PathBuf, process};

struct Args {
    input: Input,
    in_place: bool,
    show_stats: bool,
}

enum Input {
    Stdin,
    File(PathBuf),
}

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: shamsidate [--in-place] [--stats] <FILE | ->");
    eprintln!();
    eprintln!("Rewrites Gregorian dates in the input as Jalali dates.");
    eprintln!("  --in-place   write the result back to FILE");
    eprintln!("  --stats      print scan statistics to stderr");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut input = None;
    let mut in_place = false;
    let mut show_stats = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--in-place" => in_place = true,
            "--stats" => show_stats = true,
            "--help" | "-h" => print_usage_and_exit(),
            "-" => input = Some(Input::Stdin),
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {other}");
                print_usage_and_exit();
            }
            path => input = Some(Input::File(PathBuf::from(path))),
        }
    }

    match input {
        Some(input) => Args {
            input,
            in_place,
            show_stats,
        },
        None => print_usage_and_exit(),
    }
}

fn read_input(input: &Input) -> Result<String> {
    match input {
        Input::Stdin => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("reading stdin")?;
            Ok(content)
        }
        Input::File(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
    }
}

/// Build the engine's node tree: one text node per input line.
fn tree_from_text(content: &str) -> Tree {
    let mut tree = Tree::new("body");
    for line in content.lines() {
        tree.push_text(tree.root(), line);
    }
    tree
}

fn render(tree: &Tree, had_trailing_newline: bool) -> String {
    let lines: Vec<&str> = tree
        .preorder(tree.root())
        .filter_map(|id| tree.text(id))
        .collect();
    let mut out = lines.join("\n");
    if had_trailing_newline {
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args();

    let config = Config::load()
        .unwrap_or_else(|err| {
            log::warn!("ignoring unreadable config: {err}");
            None
        })
        .unwrap_or_default();

    let content = read_input(&args.input)?;

    if !config.enabled {
        // Disabled means the scanner never starts; input passes through.
        log::info!("conversion disabled by config, passing input through");
        print!("{content}");
        return Ok(());
    }

    let mut options = ScanOptions::new(chrono::Local::now().year());
    options.annotate_bare_months = config.annotate_bare_months;

    let mut tree = tree_from_text(&content);
    let mut engine = Engine::new(options);
    let stats = engine.initial_scan(&mut tree);

    if args.show_stats {
        if let Some(profile) = engine.last_profile() {
            eprintln!(
                "dominant format: {} ({} observations)",
                profile.dominant.label(),
                profile.observations
            );
        }
        eprintln!(
            "nodes: {}, conversions: {}, annotations: {}, warnings: {}",
            stats.nodes_visited, stats.conversions, stats.annotations, stats.warnings
        );
    }

    let output = render(&tree, content.ends_with('\n'));
    match (&args.input, args.in_place) {
        (Input::File(path), true) => {
            std::fs::write(path, output).with_context(|| format!("writing {}", path.display()))?;
        }
        (Input::Stdin, true) => bail!("--in-place requires a file input"),
        _ => print!("{output}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_round_trips_line_structure() {
        let content = "first 2024-03-20\nsecond\n";
        let mut tree = tree_from_text(content);
        let mut engine = Engine::new(ScanOptions::new(2024));
        engine.initial_scan(&mut tree);
        assert_eq!(
            render(&tree, content.ends_with('\n')),
            "first 1403/01/01\nsecond\n"
        );
    }

    #[test]
    fn no_trailing_newline_is_preserved() {
        let content = "only line";
        let tree = tree_from_text(content);
        assert_eq!(render(&tree, content.ends_with('\n')), "only line");
    }
}
