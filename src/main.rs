//! Command-line access to the shared record layouts.
//!
//! ```text
//! shader-types wgsl <demo>           print the WGSL structs for a demo
//! shader-types layout <demo>         print every record's field table
//! shader-types check <config.json>   load and validate a configuration
//! shader-types init <demo> <path>    write a default configuration
//! ```

use std::env;
use std::path::Path;
use std::process::ExitCode;

use shader_types::config::RecordInfo;
use shader_types::DemoConfig;

fn usage() {
    eprintln!("Usage:");
    eprintln!("  shader-types wgsl <demo>");
    eprintln!("  shader-types layout <demo>");
    eprintln!("  shader-types check <config.json>");
    eprintln!("  shader-types init <demo> <config.json>");
    eprintln!("Demos: {}", DemoConfig::NAMES.join(", "));
}

fn demo_by_name(name: &str) -> Option<DemoConfig> {
    let config = DemoConfig::default_for(name);
    if config.is_none() {
        eprintln!("Unknown demo '{}'", name);
        eprintln!("Demos: {}", DemoConfig::NAMES.join(", "));
    }
    config
}

fn print_layout(record: &RecordInfo) {
    let layout = record.layout();
    println!(
        "{} ({} bytes, align {}, {} padding)",
        record.name,
        record.stride,
        layout.align,
        layout.padding_bytes()
    );
    for field in record.fields {
        println!(
            "  @{:<6} {:<20} {}",
            field.offset,
            field.name,
            field.kind.wgsl_type()
        );
    }
    for pad in &layout.padding {
        println!("  @{:<6} {:<20} {} bytes", pad.offset, "(padding)", pad.bytes);
    }
}

fn check(path: &Path) -> ExitCode {
    let config = match DemoConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {:?}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("{}: {}", config.name(), e);
        return ExitCode::FAILURE;
    }

    println!("{}: ok", config.name());
    println!("  instances: {}", config.instance_count());
    for record in config.records() {
        println!("  {:<22} {} bytes", record.name, record.stride);
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let operand = args.get(2).map(String::as_str);

    match (command, operand) {
        (Some("wgsl"), Some(demo)) => {
            let Some(config) = demo_by_name(demo) else {
                return ExitCode::FAILURE;
            };
            print!("{}", config.wgsl_prelude());
            ExitCode::SUCCESS
        }
        (Some("layout"), Some(demo)) => {
            let Some(config) = demo_by_name(demo) else {
                return ExitCode::FAILURE;
            };
            for (i, record) in config.records().iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_layout(record);
            }

            let instances = config.instance_layout();
            println!();
            println!("instance attributes (stride {})", instances.stride());
            for attr in instances.attributes() {
                println!("  @location({}) offset {:<4} {:?}", attr.shader_location, attr.offset, attr.format);
            }
            ExitCode::SUCCESS
        }
        (Some("check"), Some(path)) => check(Path::new(path)),
        (Some("init"), Some(demo)) => {
            let Some(path) = args.get(3) else {
                usage();
                return ExitCode::FAILURE;
            };
            let Some(config) = demo_by_name(demo) else {
                return ExitCode::FAILURE;
            };
            match config.save(path) {
                Ok(()) => {
                    log::info!("Wrote default {} config to {}", config.name(), path);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to write {}: {}", path, e);
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            usage();
            ExitCode::FAILURE
        }
    }
}
