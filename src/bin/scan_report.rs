use std::collections::BTreeMap;
use std::path::PathBuf;
use tunedeck::{Config, MediaScanner};

// Prints what a scan finds without touching the terminal UI.
// Usage: scan_report [DIR]...  (defaults to the configured media directories)
fn main() -> anyhow::Result<()> {
    let mut roots: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let config = Config::load(None)?;
    if roots.is_empty() {
        roots = config.media_directories.clone();
    }

    println!("TuneDeck scan report");
    println!("====================");
    for root in &roots {
        println!("Root: {}", root.display());
    }
    println!();

    let scanner = MediaScanner::with_extensions(&config.scan.extensions);
    let catalog = match scanner.build_catalog(&roots) {
        Ok(catalog) => catalog,
        Err(e) => {
            println!("Scan failed: {}", e);
            return Ok(());
        }
    };

    println!("Found {} playable files", catalog.len());
    println!();

    for (name, item) in catalog.names().iter().zip(catalog.items()).take(10) {
        println!("{}", name);
        println!("   Format: {:?}", item.format);
        match &item.metadata {
            Some(metadata) => {
                if let Some(album) = &metadata.album {
                    println!("   Album: {}", album);
                }
                if let Some(year) = metadata.year {
                    println!("   Year: {}", year);
                }
            }
            None => println!("   (no tags)"),
        }
        println!("   Path: {}", item.path.display());
    }

    if catalog.len() > 10 {
        println!("... and {} more", catalog.len() - 10);
    }

    let mut format_counts = BTreeMap::new();
    for item in catalog.items() {
        *format_counts.entry(format!("{:?}", item.format)).or_insert(0usize) += 1;
    }

    println!("\nFormat breakdown:");
    for (format, count) in format_counts {
        println!("   {}: {} files", format, count);
    }

    Ok(())
}
