//! gvinfo: print the serialization layout of GVariant types.
//!
//! Set `RUST_LOG=gv_typeinfo=debug` (or `trace`) to watch the cache work.

use std::process::ExitCode;
use std::sync::Once;

use gv_signature::Signature;
use gv_typeinfo::{CacheConfig, MemberEnding, TypeInfo, TypeInfoCache, TypeInfoError};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

#[derive(Default)]
struct Options {
    config: CacheConfig,
    members: bool,
    signatures: Vec<String>,
}

fn print_usage() {
    eprintln!("Usage: gvinfo [options] <signature>...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --members               Show per-member framing of tuples");
    eprintln!("  --sweep-threshold=<n>   Pending descriptors before an automatic sweep");
    eprintln!("  -h, --help              Show this help");
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(None);
        } else if arg == "--members" || arg == "-m" {
            options.members = true;
        } else if let Some(value) = arg.strip_prefix("--sweep-threshold=") {
            let threshold = value
                .parse()
                .map_err(|_| format!("invalid sweep threshold: {value}"))?;
            options.config = options.config.with_sweep_threshold(threshold);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option: {arg}"));
        } else {
            options.signatures.push(arg.clone());
        }
    }
    if options.signatures.is_empty() {
        return Err("missing signature".to_string());
    }
    Ok(Some(options))
}

fn describe(cache: &TypeInfoCache, text: &str, members: bool) -> Result<(), TypeInfoError> {
    let signature = Signature::parse(text)?;
    let info = cache.try_get(signature.as_str())?;

    let size = if info.is_fixed_size() {
        info.fixed_size().to_string()
    } else {
        "variable".to_string()
    };
    println!(
        "{info}: alignment {}, size {size}, depth {}, {:?}",
        usize::from(info.alignment()) + 1,
        info.depth(),
        info.class()
    );

    if members {
        if let Some(member_list) = info.try_members() {
            for (index, member) in member_list.iter().enumerate() {
                print_member(index, member.type_info(), member.ending(), member.framing());
            }
        } else if let Some(element) = info.try_element() {
            println!("  element {element}: {:?}", element.query());
        }
    }
    Ok(())
}

fn print_member(index: usize, ty: &TypeInfo, ending: MemberEnding, framing: gv_typeinfo::Framing) {
    let slot = framing.i.map_or_else(|| "-".to_string(), |i| i.to_string());
    println!(
        "  [{index}] {ty}: {ending:?}, i={slot} a={} b={} c={}",
        framing.a, framing.b, framing.c
    );
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let cache = TypeInfoCache::with_config(options.config);
    let mut failed = false;
    for text in &options.signatures {
        if let Err(err) = describe(&cache, text, options.members) {
            eprintln!("error: {text}: {err}");
            failed = true;
        }
    }

    let reclaimed = cache.sweep();
    tracing::debug!(reclaimed, remaining = cache.len(), "final sweep");

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
