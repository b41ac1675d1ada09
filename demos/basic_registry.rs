use config_expect::{DataType, ExpectationRegistry};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> config_expect::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut args = std::env::args().skip(1);
    let source = args.next().unwrap_or_else(|| "./app.ini".to_string());
    let destination = args.next().map(PathBuf::from);

    let mut registry = ExpectationRegistry::new();
    registry.register("Net", "host", DataType::String, "localhost", Some("bind address"))?;
    registry.register("Net", "port", DataType::Integer, 8080, Some("listen port"))?;
    registry.register("Net", "tls", DataType::Boolean, false, None)?;
    registry.register("Limits", "ratio", DataType::Float, 0.25, Some("sampling ratio"))?;

    match registry.load_from(&source) {
        Ok(report) => println!(
            "Loaded {source}: {} from file, {} fallbacks, {} defaulted, {} ignored",
            report.from_source.len(),
            report.fallbacks.len(),
            report.defaulted.len(),
            report.ignored
        ),
        Err(err) => println!("Running on defaults: {err}"),
    }

    println!("{registry}");

    if let Some(path) = destination {
        registry.write_to(Some(path.as_path()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
