// Command-line frontend: `sufdiff diff`, `sufdiff patch`, `sufdiff show`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::compress::{self, Compression};
use crate::control::ControlReader;
use crate::engine::DiffOptions;
use crate::format;
use crate::io::{diff_file, patch_file};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Suffix-array binary diff/patch tool.
#[derive(Parser, Debug)]
#[command(
    name = "sufdiff",
    version,
    about = "Suffix-array binary delta diff/patch tool",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a patch transforming SOURCE into TARGET.
    Diff(DiffArgs),
    /// Apply a patch to SOURCE, reconstructing the target.
    Patch(PatchArgs),
    /// Print the header (and optionally the control entries) of a patch.
    Show(ShowArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompressorArg {
    None,
    Zlib,
    Lzma,
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Source (old) file.
    source: PathBuf,

    /// Target (new) file.
    target: PathBuf,

    /// Patch output file.
    output: PathBuf,

    /// Stream compressor for the patch segments.
    #[arg(long, value_enum, default_value_t = CompressorArg::Zlib)]
    compressor: CompressorArg,

    /// Zlib compression level (0-9).
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = 6)]
    level: u32,
}

#[derive(Args, Debug)]
struct PatchArgs {
    /// Source (old) file.
    source: PathBuf,

    /// Patch file.
    patch: PathBuf,

    /// Reconstructed output file.
    output: PathBuf,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Patch file to inspect.
    patch: PathBuf,

    /// Also decode and list every control entry.
    #[arg(long)]
    entries: bool,
}

// ---------------------------------------------------------------------------
// Compressor selection
// ---------------------------------------------------------------------------

fn resolve_compression(arg: CompressorArg, level: u32) -> Result<Compression, String> {
    match arg {
        CompressorArg::None => Ok(Compression::None),

        #[cfg(feature = "zlib")]
        CompressorArg::Zlib => Ok(Compression::Zlib { level }),
        #[cfg(not(feature = "zlib"))]
        CompressorArg::Zlib => Err("built without the 'zlib' feature".into()),

        #[cfg(feature = "lzma")]
        CompressorArg::Lzma => {
            let _ = level;
            Ok(Compression::Lzma)
        }
        #[cfg(not(feature = "lzma"))]
        CompressorArg::Lzma => Err("built without the 'lzma' feature".into()),
    }
}

fn refuse_overwrite(path: &Path, force: bool) -> bool {
    if path.exists() && !force {
        eprintln!(
            "sufdiff: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// diff command
// ---------------------------------------------------------------------------

fn cmd_diff(cli: &Cli, args: &DiffArgs) -> i32 {
    let compression = match resolve_compression(args.compressor, args.level) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("sufdiff: --compressor: {e}");
            return 1;
        }
    };

    if refuse_overwrite(&args.output, cli.force) {
        return 1;
    }

    let opts = DiffOptions { compression };
    let stats = match diff_file(&args.source, &args.target, &args.output, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("sufdiff: diff: {e}");
            return 1;
        }
    };

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "sufdiff: diff: source {} B, target {} B, patch {} B ({:.1}% of target)",
            stats.source_size,
            stats.target_size,
            stats.patch_size,
            if stats.target_size > 0 {
                stats.patch_size as f64 * 100.0 / stats.target_size as f64
            } else {
                0.0
            }
        );
    }

    if cli.json_output {
        let json = serde_json::json!({
            "command": "diff",
            "source_size": stats.source_size,
            "target_size": stats.target_size,
            "patch_size": stats.patch_size,
            "source_sha256": stats.source_sha256.as_ref().map(hex),
            "target_sha256": stats.target_sha256.as_ref().map(hex),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// patch command
// ---------------------------------------------------------------------------

fn cmd_patch(cli: &Cli, args: &PatchArgs) -> i32 {
    if refuse_overwrite(&args.output, cli.force) {
        return 1;
    }

    let stats = match patch_file(&args.source, &args.patch, &args.output) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("sufdiff: patch: {e}");
            return 1;
        }
    };

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "sufdiff: patch: source {} B, patch {} B, output {} B",
            stats.source_size, stats.patch_size, stats.output_size
        );
    }

    if cli.json_output {
        let json = serde_json::json!({
            "command": "patch",
            "source_size": stats.source_size,
            "patch_size": stats.patch_size,
            "output_size": stats.output_size,
            "output_sha256": stats.output_sha256.as_ref().map(hex),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// show command
// ---------------------------------------------------------------------------

fn cmd_show(cli: &Cli, args: &ShowArgs) -> i32 {
    let data = match std::fs::read(&args.patch) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("sufdiff: {}: {e}", args.patch.display());
            return 1;
        }
    };

    let (header, control, _diff, _extra) = match format::read_container(&data) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("sufdiff: invalid patch: {e}");
            return 1;
        }
    };

    if cli.json_output {
        let json = serde_json::json!({
            "command": "show",
            "version": format::VERSION,
            "compressor": compress::name_for_id(header.compressor),
            "control_len": header.control_len,
            "diff_len": header.diff_len,
            "extra_len": header.extra_len,
            "target_len": header.target_len,
            "container_len": data.len() as u64,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    } else {
        println!("container version:      {}", format::VERSION);
        println!(
            "compressor:             {} (id {})",
            compress::name_for_id(header.compressor),
            header.compressor
        );
        println!("control stream length:  {}", header.control_len);
        println!("diff stream length:     {}", header.diff_len);
        println!("extra stream length:    {}", header.extra_len);
        println!("target length:          {}", header.target_len);
        println!("container length:       {}", data.len());
    }

    if args.entries {
        let backend = match compress::backend_for_id(header.compressor) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("sufdiff: {e}");
                return 1;
            }
        };
        let (control_max, _, _) = compress::stream_limits(header.target_len);
        let control = match backend.decompress(control, control_max) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("sufdiff: control stream: {e}");
                return 1;
            }
        };
        let reader = match ControlReader::new(&control) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("sufdiff: control stream: {e}");
                return 1;
            }
        };

        println!("  Entry      Diff     Extra      Seek");
        for (i, entry) in reader.enumerate() {
            println!(
                "  {i:>5} {:>9} {:>9} {:>9}",
                entry.diff_len, entry.extra_len, entry.seek
            );
        }
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Cmd::Diff(args) => cmd_diff(&cli, args),
        Cmd::Patch(args) => cmd_patch(&cli, args),
        Cmd::Show(args) => cmd_show(&cli, args),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
