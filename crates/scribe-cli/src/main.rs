use std::{
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context};
use scribe_runtime::{ParseTree, Terminal};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Entry {
    Document,
    Expression,
    Type,
}

#[derive(PartialEq, Eq, Debug)]
struct Options {
    tokens: bool,
    tree: bool,
    ast: bool,
    json: bool,
    entry: Entry,
    resource: Option<String>,
    file: Option<PathBuf>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Options> {
        let mut options = Options {
            tokens: false,
            tree: false,
            ast: false,
            json: false,
            entry: Entry::Document,
            resource: None,
            file: None,
        };

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--tokens" => options.tokens = true,
                "--tree" => options.tree = true,
                "--ast" => options.ast = true,
                "--json" => options.json = true,
                "--expr" => options.entry = Entry::Expression,
                "--type" => options.entry = Entry::Type,
                "--resource" => {
                    let Some(name) = iter.next() else {
                        bail!("Expected a name after --resource");
                    };
                    options.resource = Some(name);
                }
                "-" => {}
                flag if flag.starts_with("--") => bail!("Unknown flag `{flag}`"),
                _ => {
                    if options.file.is_some() {
                        bail!("Only one file may be provided");
                    }
                    options.file = Some(PathBuf::from(&arg));
                }
            }
        }

        if !(options.tokens || options.tree || options.ast) {
            options.ast = true;
        }
        Ok(options)
    }

    fn resource(&self) -> String {
        match (&self.resource, &self.file) {
            (Some(name), _) => name.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => "<stdin>".to_owned(),
        }
    }
}

fn read_source(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{}`", path.display())),
        None => {
            let mut src = String::new();
            std::io::stdin()
                .read_to_string(&mut src)
                .context("Failed to read stdin")?;
            Ok(src)
        }
    }
}

fn parse(entry: Entry, tokens: &[Terminal]) -> anyhow::Result<ParseTree> {
    let tree = match entry {
        Entry::Document => scribe_wdl::parse(tokens)?,
        Entry::Expression => scribe_wdl::parse_expression(tokens)?,
        Entry::Type => scribe_wdl::parse_type_expression(tokens)?,
    };
    Ok(tree)
}

fn run() -> anyhow::Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;
    let resource = options.resource();
    let src = read_source(options.file.as_deref())?;

    let tokens = scribe_wdl::lex(&src, &resource)?;
    log::debug!("{resource}: {} tokens", tokens.len());

    if options.tokens {
        if options.json {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        } else {
            for token in &tokens {
                println!("{token}");
            }
        }
    }

    if !(options.tree || options.ast) {
        return Ok(());
    }

    let tree = parse(options.entry, &tokens)?;
    if options.tree {
        println!("{tree}");
    }

    if options.ast {
        let ast = tree.to_ast();
        if options.json {
            println!("{}", serde_json::to_string_pretty(&ast)?);
        } else {
            match ast {
                Some(ast) => println!("{ast}"),
                None => println!("None"),
            }
        }
    }

    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_owned());
    let level = log::LevelFilter::from_str(&level).unwrap_or(log::LevelFilter::Warn);

    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )
    .context("Failed to install logger")
}

fn main() {
    if let Err(e) = init_logging().and_then(|_| run()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
fn options(args: &[&str]) -> anyhow::Result<Options> {
    Options::parse(args.iter().map(|s| s.to_string()))
}

#[test]
fn test_default_options() {
    let parsed = options(&[]).unwrap();
    assert!(parsed.ast && !parsed.tokens && !parsed.tree);
    assert_eq!(parsed.entry, Entry::Document);
    assert_eq!(parsed.resource(), "<stdin>");
}

#[test]
fn test_options() {
    let parsed = options(&["--tokens", "--json", "--expr", "main.wdl"]).unwrap();
    assert!(parsed.tokens && parsed.json && !parsed.ast);
    assert_eq!(parsed.entry, Entry::Expression);
    assert_eq!(parsed.resource(), "main.wdl");

    let parsed = options(&["--type", "--resource", "t", "-"]).unwrap();
    assert_eq!(parsed.entry, Entry::Type);
    assert_eq!(parsed.file, None);
    assert_eq!(parsed.resource(), "t");
}

#[test]
fn test_bad_options() {
    assert!(options(&["--resource"]).is_err());
    assert!(options(&["--verbose"]).is_err());
    assert!(options(&["a.wdl", "b.wdl"]).is_err());
}
