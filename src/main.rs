//! jsonk CLI.
//!
//! Small inspection tool over the library: validate documents, look up
//! dot paths, and apply merge patches from the command line.

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

use jsonk::{apply_patch, get_by_path, parse, serialize, serialized_len, PatchOutcome};

#[derive(Parser)]
#[command(name = "jsonk")]
#[command(about = "Bounded JSON parsing and atomic merge patching", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print its compact serialization
    Validate {
        /// Path to the JSON document
        file: String,
    },

    /// Look up a dot-separated path and print the value found there
    Get {
        /// Path to the JSON document
        file: String,
        /// Dot-separated key path, e.g. user.profile.name
        path: String,
    },

    /// Apply a merge patch to a target document and print the result
    Patch {
        /// Path to the target JSON document
        target: String,
        /// Path to the merge-patch JSON document
        patch: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => validate(&file),
        Commands::Get { file, path } => get(&file, &path),
        Commands::Patch { target, patch } => patch_files(&target, &patch),
    }
}

fn read_file(path: &str) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            eprintln!("{path}: {e}");
            None
        }
    }
}

fn print_compact(value: &jsonk::JsonValue) -> ExitCode {
    let mut buf = vec![0u8; serialized_len(value)];
    match serialize(value, &mut buf) {
        Ok(written) => {
            println!("{}", String::from_utf8_lossy(&buf[..written]));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("serialize failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate(file: &str) -> ExitCode {
    let Some(input) = read_file(file) else {
        return ExitCode::FAILURE;
    };
    match parse(&input) {
        Ok(value) => print_compact(&value),
        Err(e) => {
            eprintln!("parse failed: {e} (code {})", e.code());
            ExitCode::FAILURE
        }
    }
}

fn get(file: &str, path: &str) -> ExitCode {
    let Some(input) = read_file(file) else {
        return ExitCode::FAILURE;
    };
    let value = match parse(&input) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("parse failed: {e} (code {})", e.code());
            return ExitCode::FAILURE;
        }
    };
    match get_by_path(&value, path) {
        Some(found) => print_compact(found),
        None => {
            eprintln!("no value at {path}");
            ExitCode::FAILURE
        }
    }
}

fn patch_files(target_path: &str, patch_path: &str) -> ExitCode {
    let (Some(target), Some(patch)) = (read_file(target_path), read_file(patch_path)) else {
        return ExitCode::FAILURE;
    };

    // The merged document draws every byte from one input or the other,
    // so their combined size bounds the result.
    let mut out = vec![0u8; target.len() + patch.len() + 64];
    match apply_patch(&target, &patch, &mut out) {
        Ok(report) => {
            match report.outcome {
                PatchOutcome::Applied => eprintln!("patched"),
                PatchOutcome::NoChange => eprintln!("no change"),
            }
            println!("{}", String::from_utf8_lossy(&out[..report.len]));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("patch failed: {e} (code {})", e.code());
            ExitCode::FAILURE
        }
    }
}
