use anyhow::Result;
use std::io;
use std::path::PathBuf;

use into_folders::catalog::Catalog;
use into_folders::config::Config;
use into_folders::logging;
use into_folders::naming::NamingStrategy;
use into_folders::organise::{self, OrganiseOptions};
use into_folders::relocate::default_workers;
use into_folders::tree::RootSelector;

#[derive(Debug, Default)]
struct Args {
    command: Command,
    naming: Option<NamingStrategy>,
    library: Option<PathBuf>,
    root: Option<RootSelector>,
    output: Option<PathBuf>,
    jobs: Option<usize>,
    config_path: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug, Default)]
enum Command {
    #[default]
    Missing,
    Organise(PathBuf),
    ListAlbums,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("into-folders {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--indexed" => parsed.naming = Some(NamingStrategy::Indexed),
            "--natural" => parsed.naming = Some(NamingStrategy::Natural),
            "--verbose" | "-v" => parsed.verbose = true,
            "--library" | "-l" => parsed.library = Some(PathBuf::from(value(&args, &mut i))),
            "--root" | "-r" => {
                let selector = value(&args, &mut i)
                    .parse::<RootSelector>()
                    .unwrap_or(RootSelector::All);
                parsed.root = Some(selector);
            }
            "--output" | "-o" => parsed.output = Some(PathBuf::from(value(&args, &mut i))),
            "--config" | "-c" => parsed.config_path = Some(PathBuf::from(value(&args, &mut i))),
            "--jobs" | "-j" => match value(&args, &mut i).parse() {
                Ok(jobs) => parsed.jobs = Some(jobs),
                Err(_) => fail("--jobs requires a number"),
            },
            "list" if matches!(parsed.command, Command::Missing) => {
                if args.get(i + 1).map(String::as_str) != Some("albums") {
                    fail("Unknown command; did you mean \"list albums\"?");
                }
                parsed.command = Command::ListAlbums;
                i += 1;
            }
            arg if !arg.starts_with('-') && matches!(parsed.command, Command::Missing) => {
                parsed.command = Command::Organise(PathBuf::from(arg));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

/// The value following the flag at `args[*i]`.
fn value<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    if *i + 1 < args.len() {
        *i += 1;
        &args[*i]
    } else {
        fail(&format!("{} requires an argument", args[*i]))
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_help() {
    println!(
        r#"into-folders - organise exported photos into folders matching your albums

Select all photos in the photo application and save them to one folder. All
files end up in that folder, without albums. This tool moves them into a
folder per album, following the catalog's album hierarchy.

USAGE:
    into-folders FOLDER [--indexed | --natural] [-l PATH] [-r ALBUM] [-o DIR]
    into-folders list albums [-l PATH]

OPTIONS:
    --indexed             Number output files: 1.aaa.jpg, 2.bbb.jpg, ...
                          Preserves album order (default)
    --natural             Keep original names, appending a counter on
                          collisions: aaa.jpg, bbb.jpg, aaa-2.jpg, ...
    --library, -l PATH    Catalog file, or the folder containing
                          "Managed Catalog.wfindex"
    --root, -r ALBUM      Album id that was exported (see "list albums"),
                          or "all". Sub-albums are included, parents are not
    --output, -o DIR      Where to create album folders (default: FOLDER)
    --jobs, -j N          Parallel file operations (default: CPU count)
    --config, -c PATH     Path to config file
    --verbose, -v         Print every file operation
    --version, -V         Show version
    --help, -h            Show this help message

ENVIRONMENT:
    INTO_FOLDERS_CONFIG   Path to config file (overrides default location)
    INTO_FOLDERS_LOG      Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/into-folders/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();
    if matches!(args.command, Command::Missing) {
        print_help();
        std::process::exit(1);
    }

    let _ = logging::init(None, args.verbose);

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let library = args.library.as_deref().or(config.catalog_path.as_deref());
    let catalog_path = organise::locate_catalog(&mut input, &mut stdout, library)?;
    let catalog = Catalog::open(&catalog_path)?;
    println!("Using catalog file: \"{}\"", catalog.path().display());

    match args.command {
        Command::Missing => unreachable!("checked after parsing"),
        Command::ListAlbums => {
            let tree = organise::load_tree(&catalog)?;
            organise::list_albums(&mut stdout, &tree)?;
        }
        Command::Organise(folder) => {
            let root = match args.root {
                Some(root) => root,
                None => {
                    let tree = organise::load_tree(&catalog)?;
                    organise::prompt_root(&mut input, &mut stdout, &tree)?
                }
            };

            let options = OrganiseOptions {
                output_folder: args.output.unwrap_or_else(|| folder.clone()),
                export_folder: folder,
                naming: args.naming.unwrap_or(config.naming),
                root,
                workers: args.jobs.or(config.workers).unwrap_or_else(default_workers),
            };

            let result = organise::organise(&catalog, &options, &mut stdout)?;
            organise::print_summary(&mut stdout, &result)?;

            if !result.report.is_success() {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
