//! Binary to generate/update .expected.json and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- page    # Update only fixtures matching "page"

use std::fs;
use std::path::Path;
use temple_compiler::tokenize;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tml" || ext == "dtml"))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let is_error_test = path.to_string_lossy().contains("/errors/");

    match tokenize(&source) {
        Ok(document) => {
            if is_error_test {
                eprintln!("ERROR: {:?} is in errors/ but tokenized cleanly", path);
                return;
            }

            let expected_json = path.with_extension("expected.json");
            let json = match serde_json::to_string_pretty(&document.summary()) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Failed to serialize summary for {:?}: {}", path, e);
                    return;
                }
            };
            if let Err(e) = fs::write(&expected_json, json + "\n") {
                eprintln!("Failed to write {:?}: {}", expected_json, e);
            } else {
                println!("  wrote {}", expected_json.display());
            }
        }
        Err(e) => {
            if is_error_test {
                let expected_err = path.with_extension("expected.err");
                let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
                if let Err(err) = fs::write(&expected_err, e.render(&source, filename)) {
                    eprintln!("Failed to write {:?}: {}", expected_err, err);
                } else {
                    println!("  wrote {}", expected_err.display());
                }
            } else {
                eprintln!("ERROR: {:?} failed to tokenize but is not in errors/: {}", path, e);
            }
        }
    }
}
