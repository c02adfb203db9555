use kitstudio_markup::{validate_file, validation_exit_code, MarkupError};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: catalog-validate <file.yaml>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  catalog-validate catalog/button.yaml");
        eprintln!("  catalog-validate catalog/*.yaml");
        process::exit(1);
    }

    let mut results = Vec::with_capacity(args.len() - 1);

    for file_path in &args[1..] {
        let result = validate_file(file_path);
        match &result {
            Ok(count) => {
                println!("✓ {} is valid ({} component(s))", file_path, count);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(e);
            }
        }
        results.push(result);
    }

    process::exit(validation_exit_code(&results));
}

fn print_error(error: &MarkupError) {
    match error {
        MarkupError::YamlError(msg) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", msg);
        }
        MarkupError::MalformedSpec { reason } => {
            eprintln!("  Malformed element spec:");
            eprintln!("    {}", reason);
        }
        MarkupError::MissingVariantItems { variant } => {
            eprintln!("  Variant '{}' is missing its items list", variant);
        }
        MarkupError::InvalidAttribute {
            tag,
            attribute,
            reason,
        } => {
            eprintln!("  Invalid attribute '{}' on <{}>:", attribute, tag);
            eprintln!("    {}", reason);
        }
        MarkupError::MaxNestingDepthExceeded { max_depth } => {
            eprintln!("  Maximum nesting depth ({}) exceeded", max_depth);
            eprintln!("    Element specs are nested too deeply");
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
