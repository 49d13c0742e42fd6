//! Command-line entry point: `cholla <parameter-file-or-preset>
//! [key=value]...`, modernizing a `windsr.rs`-style binary (which used
//! the pre-derive `clap::Clap`) onto `clap`'s derive API, in the style of
//! `NNPDF-pineappl`'s `pineappl_cli::Opts`.

use std::path::PathBuf;

use clap::Parser;

/// Run a hydrodynamics/MHD simulation from a parameter file or a built-in
/// preset name, optionally overridden by trailing `key=value` arguments.
#[derive(Parser, Debug)]
#[command(name = "cholla", version, about = "Finite-volume hydrodynamics/MHD core")]
pub struct Cli {
    /// A built-in preset name (see `crate::presets::presets`) or a path to a
    /// parameter file.
    pub parameter_source: String,

    /// Parameter overrides, each `key=value`, applied after the parameter
    /// file or preset is loaded.
    pub overrides: Vec<String>,

    /// Reject parameter keys that were never declared by the parameter file
    /// (or preset) plus overrides, and keys present but never read.
    #[arg(long)]
    pub strict: bool,

    /// Emit `tracing` logs at this level or above (error, warn, info, debug,
    /// trace).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_preset_name_with_overrides() {
        let cli = Cli::parse_from(["cholla", "sod_shock_tube", "control.final_time=0.1"]);
        assert_eq!(cli.parameter_source, "sod_shock_tube");
        assert_eq!(cli.overrides, vec!["control.final_time=0.1".to_string()]);
    }
}

/// `true` if `source` names a real, readable file rather than a preset.
pub fn is_file_path(source: &str) -> bool {
    PathBuf::from(source).is_file()
}
