use clap::{Args, Parser, Subcommand};
use qmmm_partition::engine::host::AtomOrdering;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "qmmm - Generate and read back the &QMMM partition section of CP2K input files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the &QMMM section (cell, QM kinds, link atoms) for a QM/MM partition.
    Generate(GenerateArgs),
    /// Restore the QM selection from the &QM_KIND blocks of a &QMMM section.
    Load(LoadArgs),
    /// Parse a &QMMM section and print its cell, kinds and links.
    Inspect(InspectArgs),
}

/// Options shared by the commands that load a structure.
#[derive(Args, Debug, Default)]
pub struct StructureArgs {
    /// Path to the molecular structure file (BGF).
    #[arg(short, long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name of the object the structure is loaded as. Defaults to the file stem.
    #[arg(long, value_name = "NAME")]
    pub object_name: Option<String>,

    /// Atom ordering applied when loading the structure ('retained' or 'sorted').
    #[arg(long, value_name = "ORDERING", value_parser = parse_atom_ordering)]
    pub atom_ordering: Option<AtomOrdering>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generate.mm-selection=all
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub structure: StructureArgs,

    /// Selection expression (or selection name) for the QM region.
    #[arg(long, value_name = "EXPR")]
    pub qm: Option<String>,

    /// Selection expression (or selection name) for the MM region.
    #[arg(long, value_name = "EXPR")]
    pub mm: Option<String>,

    /// Path of the &QMMM section file to write.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub structure: StructureArgs,

    /// Path of the &QMMM section file to read.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Object the listed atom ids refer to.
    #[arg(long, value_name = "NAME")]
    pub object: Option<String>,

    /// Name of the selection that receives the QM atoms.
    #[arg(long, value_name = "NAME")]
    pub selection: Option<String>,

    /// Also write the selected atoms to this BGF file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path of the &QMMM section file to read.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

pub fn parse_atom_ordering(value: &str) -> Result<AtomOrdering, String> {
    match value.to_ascii_lowercase().as_str() {
        "retained" => Ok(AtomOrdering::Retained),
        "sorted" => Ok(AtomOrdering::Sorted),
        _ => Err(format!(
            "invalid atom ordering '{}', expected 'retained' or 'sorted'",
            value
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_arguments_are_parsed() {
        let cli = Cli::parse_from([
            "qmmm", "generate", "-s", "complex.bgf", "--qm", "resn LIG", "-o", "qmmm.inc", "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Generate(args) = cli.command else {
            panic!("expected the generate command");
        };
        assert_eq!(args.structure.structure, Some(PathBuf::from("complex.bgf")));
        assert_eq!(args.qm.as_deref(), Some("resn LIG"));
        assert!(args.mm.is_none());
        assert_eq!(args.output, Some(PathBuf::from("qmmm.inc")));
    }

    #[test]
    fn load_requires_an_input_file() {
        assert!(Cli::try_parse_from(["qmmm", "load", "-s", "complex.bgf"]).is_err());

        let cli = Cli::parse_from([
            "qmmm",
            "load",
            "-s",
            "complex.bgf",
            "-i",
            "qmmm.inc",
            "--selection",
            "core",
            "--atom-ordering",
            "retained",
        ]);
        let Commands::Load(args) = cli.command else {
            panic!("expected the load command");
        };
        assert_eq!(args.input, PathBuf::from("qmmm.inc"));
        assert_eq!(args.selection.as_deref(), Some("core"));
        assert_eq!(args.structure.atom_ordering, Some(AtomOrdering::Retained));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["qmmm", "-q", "-v", "inspect", "-i", "a.inc"]).is_err());
    }

    #[test]
    fn atom_ordering_parser_is_case_insensitive() {
        assert_eq!(parse_atom_ordering("Sorted"), Ok(AtomOrdering::Sorted));
        assert!(parse_atom_ordering("shuffled").is_err());
    }
}
