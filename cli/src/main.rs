mod commands;
mod show;
mod tessellate;

use clap::*;
use commands::*;

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::process;
use std::result::Result;

use vector_image::{LoadError, LoadOptions, Units};

#[derive(Debug)]
pub enum CliError {
    Load(LoadError),
    Io(io::Error),
    Tessellation(usize),
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        CliError::Load(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

fn main() {
    env_logger::init();

    let input_arg = Arg::with_name("INPUT")
        .help("The SVG file to load")
        .value_name("FILE")
        .required(true)
        .index(1);

    let matches = App::new("Vector image command-line interface")
        .version("0.1")
        .about("Loads SVG files into vector images")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("DPI")
                .long("dpi")
                .help("Resolution used to convert physical units (96 by default)")
                .value_name("DPI")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("UNITS")
                .short("u")
                .long("units")
                .help("Unit of the loaded coordinates")
                .value_name("UNITS")
                .takes_value(true)
                .possible_values(&["px", "pt", "pc", "mm", "cm", "in"])
                .global(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Sets the output file to use")
                .value_name("FILE")
                .short("o")
                .long("output")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Prints the shapes and paths of a vector image")
                .arg(input_arg.clone())
                .arg(
                    Arg::with_name("EDGES")
                        .short("e")
                        .long("edges")
                        .help("Prints every edge"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tessellate")
                .about("Tessellates the visible shapes of a vector image")
                .arg(input_arg)
                .arg(
                    Arg::with_name("FILL")
                        .short("f")
                        .long("fill")
                        .help("Only tessellates fills"),
                )
                .arg(
                    Arg::with_name("STROKE")
                        .short("s")
                        .long("stroke")
                        .help("Only tessellates strokes"),
                )
                .arg(
                    Arg::with_name("TOLERANCE")
                        .short("t")
                        .long("tolerance")
                        .help("Sets the tolerance threshold for flattening (0.1 by default)")
                        .value_name("TOLERANCE")
                        .takes_value(true),
                ),
        )
        .get_matches();

    let result = if let Some(matches) = matches.subcommand_matches("show") {
        ShowCmd {
            input: get_input(matches),
            options: get_load_options(matches),
            edges: matches.is_present("EDGES"),
            output: get_output(matches),
        }
        .run()
    } else if let Some(matches) = matches.subcommand_matches("tessellate") {
        let fill = matches.is_present("FILL");
        let stroke = matches.is_present("STROKE");
        TessellateCmd {
            input: get_input(matches),
            options: get_load_options(matches),
            tolerance: get_tolerance(matches),
            fill: fill || !stroke,
            stroke: stroke || !fill,
            output: get_output(matches),
        }
        .run()
    } else {
        Ok(())
    };

    match result {
        Ok(()) => {}
        Err(CliError::Load(err)) => {
            eprintln!("{}", err);
            process::exit(1);
        }
        Err(CliError::Io(err)) => {
            eprintln!("Failed to write the output: {}", err);
            process::exit(1);
        }
        Err(CliError::Tessellation(errors)) => {
            eprintln!("{} paths failed to tessellate", errors);
            process::exit(2);
        }
    }
}

impl ShowCmd {
    fn run(self) -> Result<(), CliError> {
        show::show(self)
    }
}

impl TessellateCmd {
    fn run(self) -> Result<(), CliError> {
        tessellate::tessellate(self)
    }
}

fn get_input(matches: &ArgMatches) -> PathBuf {
    PathBuf::from(matches.value_of("INPUT").unwrap_or(""))
}

fn get_load_options(matches: &ArgMatches) -> LoadOptions {
    let mut options = LoadOptions::DEFAULT;
    if let Some(dpi) = matches.value_of("DPI") {
        match dpi.parse() {
            Ok(dpi) => options.dpi = dpi,
            Err(_) => log::warn!("Invalid dpi {:?}, using {}", dpi, options.dpi),
        }
    }
    if let Some(units) = matches.value_of("UNITS") {
        options.units = units.parse().unwrap_or(Units::Px);
    }

    options
}

fn get_tolerance(matches: &ArgMatches) -> f32 {
    let default = 0.1;
    if let Some(tolerance_str) = matches.value_of("TOLERANCE") {
        return tolerance_str.parse().unwrap_or(default);
    }
    default
}

fn get_output(matches: &ArgMatches) -> Box<dyn io::Write> {
    if let Some(output_file) = matches.value_of("OUTPUT") {
        match File::create(output_file) {
            Ok(file) => return Box::new(file),
            Err(err) => log::error!("Cannot create {:?}: {}", output_file, err),
        }
    }

    Box::new(stdout())
}
