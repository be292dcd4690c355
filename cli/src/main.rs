//! Command line driver: parse a rules file and a theory file, then
//! verify the theory. The exit code is the number of parse errors.

use anyhow::Context;
use std::process::exit;
use theoria::{Parser, Theory, Writer};

const DEFAULT_RULES: &str = "basic/rules.lth";

const USAGE: &str = "\
usage: theoria [options] <theory-file> [<rules-file>]

Parses <rules-file> (default: basic/rules.lth) and <theory-file>, then
verifies every lemma of the theory. Exits with the number of parse
errors; the verification outcome is printed.

options:
    --print         pretty-print the parsed theory to stdout
    --width <n>     column width for --print (default 80)
    --spaces <n>    indent with <n> spaces instead of tabs
    -h, --help      show this help
";

fn parse_file(path: &str, rules: Option<Theory>) -> anyhow::Result<(Theory, usize)> {
    let src =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?;
    let mut parser = Parser::new(&src, path);
    if let Some(r) = rules {
        parser.set_rules(r);
    }
    let theory = parser.parse_theory();
    for m in parser.messages() {
        eprintln!("{}", m);
    }
    if parser.errors() > 0 || parser.warnings() > 0 {
        eprintln!("{}", parser.summary());
    }
    Ok((theory, parser.errors()))
}

fn exit_with(errors: usize) -> ! {
    exit(errors.min(255) as i32)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{}", USAGE);
        return Ok(());
    }
    let print_back = args.contains("--print");
    let width: usize = args.opt_value_from_str("--width")?.unwrap_or(80);
    let spaces: Option<usize> = args.opt_value_from_str("--spaces")?;

    let theory_file: String = match args.opt_free_from_str()? {
        Some(f) => f,
        None => {
            print!("{}", USAGE);
            return Ok(());
        }
    };
    let rules_file: String = args
        .opt_free_from_str()?
        .unwrap_or_else(|| DEFAULT_RULES.to_string());

    log::info!("loading rules from {}", rules_file);
    let (rules, errors) = parse_file(&rules_file, None)?;
    if errors > 0 {
        eprintln!("could not parse rules file {}", rules_file);
        exit_with(errors);
    }

    log::info!("loading theory from {}", theory_file);
    let (theory, errors) = parse_file(&theory_file, Some(rules))?;
    if errors > 0 {
        eprintln!("could not parse theory file {}", theory_file);
        exit_with(errors);
    }

    if print_back {
        let mut writer = match spaces {
            Some(n) => Writer::with_config(width, n, false),
            None => Writer::with_config(width, 4, true),
        };
        writer.write_theory(&theory);
        print!("{}", writer.finish());
    }

    if theory.verify() {
        println!("Verified theory.");
    } else {
        println!("Could not verify theory.");
    }
    Ok(())
}
