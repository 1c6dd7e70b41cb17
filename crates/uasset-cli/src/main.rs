use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use tracing::{error, warn};
use uasset_core::json::JsonOpts;
use uasset_core::package::{DecodeOpts, decode_file};
use uasset_core::scan::list_assets;

#[derive(Parser, Debug)]
#[command(
    name = "uasset-cli",
    about = "Inspect Unreal Engine .uasset packages",
    version
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Dump a package as JSON
    Dump(DumpArgs),
    /// One-line summary of a package
    Info(InfoArgs),
    /// Decode every candidate asset under a directory
    Scan(ScanArgs),
    /// Extract embedded thumbnails to image files
    Thumbs(ThumbsArgs),
}

#[derive(ClapArgs, Debug)]
struct DumpArgs {
    /// Package file to dump
    path: PathBuf,
    /// Max name entries to include
    #[arg(long, default_value_t = 128)]
    max_array: usize,
    /// Emit full thumbnail bytes instead of summaries
    #[arg(long, default_value_t = false)]
    bytes_full: bool,
    /// Skip undecodable thumbnail rows instead of failing
    #[arg(long, default_value_t = false)]
    lenient: bool,
}

#[derive(ClapArgs, Debug)]
struct InfoArgs {
    /// Package file to summarize
    path: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct ScanArgs {
    /// Directory to walk
    root: PathBuf,
    /// Emit a JSON array instead of tab-separated lines
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct ThumbsArgs {
    /// Package file to extract from
    path: PathBuf,
    /// Output directory for the image files
    #[arg(long)]
    out: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Dump(a) => cmd_dump(a),
        Cmd::Info(a) => cmd_info(a),
        Cmd::Scan(a) => cmd_scan(a),
        Cmd::Thumbs(a) => cmd_thumbs(a),
    }
}

fn cmd_dump(args: DumpArgs) {
    let opts = DecodeOpts {
        lenient_thumbnails: args.lenient,
    };
    let pkg = decode_file(&args.path, &opts).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });
    let jopts = JsonOpts {
        max_array_elems: args.max_array,
        bytes_summary: !args.bytes_full,
    };
    print!("{}", uasset_core::json::dump_package_json(&pkg, &jopts));
}

fn cmd_info(args: InfoArgs) {
    let pkg = decode_file(&args.path, &DecodeOpts::default()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });
    println!(
        "class={} saved_by={} compatible_with={} names={} thumbnails={}",
        pkg.asset_class().unwrap_or("<none>"),
        pkg.header.saved_by_engine_version,
        pkg.header.compatible_with_engine_version,
        pkg.names.len(),
        pkg.thumbnails.len()
    );
}

fn cmd_scan(args: ScanArgs) {
    let files = list_assets(&args.root);
    if files.is_empty() {
        eprintln!("no candidate assets under {}", args.root.display());
        std::process::exit(2);
    }

    let mut records = Vec::new();
    for path in files {
        match decode_file(&path, &DecodeOpts::default()) {
            Ok(pkg) => {
                records.push(serde_json::json!({
                    "path": path.display().to_string(),
                    "asset_class": pkg.asset_class(),
                    "saved_by": pkg.header.saved_by_engine_version.to_string(),
                    "compatible_with": pkg.header.compatible_with_engine_version.to_string(),
                }));
            }
            // one bad asset never aborts the batch; unsupported is a
            // known limitation, anything else warrants a look
            Err(e) if e.is_unsupported() => {
                warn!("{}: skipped unsupported package: {e}", path.display());
            }
            Err(e) => {
                error!("{}: failed to decode: {e}", path.display());
            }
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
        );
    } else {
        for r in &records {
            println!(
                "{}\t{}\t{}\t{}",
                r["path"].as_str().unwrap_or(""),
                r["asset_class"].as_str().unwrap_or("<none>"),
                r["saved_by"].as_str().unwrap_or(""),
                r["compatible_with"].as_str().unwrap_or("")
            );
        }
    }
}

fn cmd_thumbs(args: ThumbsArgs) {
    let pkg = decode_file(&args.path, &DecodeOpts::default()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });
    fs::create_dir_all(&args.out).unwrap_or_else(|e| {
        eprintln!("error creating {}: {e}", args.out.display());
        std::process::exit(3);
    });

    let mut written = 0usize;
    for (i, t) in pkg.thumbnails.iter().enumerate() {
        let Some(bytes) = &t.bytes else { continue };
        let stem: String = t
            .object_path
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() {
            format!("thumb_{i}")
        } else {
            stem
        };
        let dest = args.out.join(format!("{stem}.{}", t.format.extension()));
        fs::write(&dest, bytes).unwrap_or_else(|e| {
            eprintln!("error writing {}: {e}", dest.display());
            std::process::exit(4);
        });
        println!("{}", dest.display());
        written += 1;
    }
    if written == 0 {
        eprintln!("no thumbnail payloads in {}", args.path.display());
    }
}
