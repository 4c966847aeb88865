//! bgcarve CLI tool
//!
//! Command-line interface for carving the largest foreground region out
//! of a photograph using the bgcarve library.

#[cfg(feature = "cli")]
use bgcarve::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
