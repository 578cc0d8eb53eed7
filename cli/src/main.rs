use std::process;

use clap::Parser as ClapParser;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use bluemark::{Blueprint, ParseOptions, Parser};

#[derive(ClapParser)]
#[command(name = "bluemark", version, about = "API blueprint parser")]
struct Cli {
    /// Markdown source file to parse
    file: String,

    /// Parse only, report diagnostics (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the parsed blueprint tree
    #[arg(long)]
    ast: bool,

    /// List resource groups, resources and methods
    #[arg(long)]
    list: bool,

    /// Treat a missing blueprint name as an error
    #[arg(long)]
    require_name: bool,

    /// Disable colored diagnostic output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read source
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(cli.file.clone(), source.clone());

    // Parse
    let options = ParseOptions {
        require_blueprint_name: cli.require_name,
    };
    let (blueprint, report) = Parser::new(source).with_options(options).parse();

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in &report.warnings {
        let diagnostic = warning.to_diagnostic(file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
    }
    if let Some(error) = &report.error {
        let diagnostic = error.to_diagnostic(file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
        process::exit(1);
    }

    if cli.check {
        eprintln!("ok: {} parsed with {} warning(s)", cli.file, report.warnings.len());
        return;
    }

    if cli.ast {
        println!("{:#?}", blueprint);
        return;
    }

    if cli.list {
        list_blueprint(&blueprint);
    }
}

/// Print the blueprint outline, one entity per line.
fn list_blueprint(blueprint: &Blueprint) {
    if !blueprint.name.is_empty() {
        println!("{}", blueprint.name);
    }
    for group in &blueprint.resource_groups {
        if group.name.is_empty() {
            println!("group (anonymous)");
        } else {
            println!("group {}", group.name);
        }
        for resource in &group.resources {
            if resource.name.is_empty() {
                println!("  {}", resource.uri_template);
            } else {
                println!("  {} [{}]", resource.name, resource.uri_template);
            }
            for method in &resource.methods {
                println!(
                    "    {} ({} request(s), {} response(s))",
                    method.method,
                    method.requests.len(),
                    method.responses.len()
                );
            }
        }
    }
}
