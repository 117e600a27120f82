use lookfit::config::AppConfig;
use lookfit::types::ProductRecord;

fn print_entry(label: &str, products: &[ProductRecord]) {
    println!("{}:", label);
    for p in products {
        println!(
            "  #{:<4} {:<20} {:>10} {}",
            p.id,
            p.name,
            p.price,
            p.label.as_deref().unwrap_or("")
        );
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or(AppConfig::DEFAULT_PATH);
    let config = AppConfig::read_from(path)?;
    let catalog = &config.catalog;

    println!("Catalog v{} ({})", catalog.version(), path);

    match args.get(2) {
        Some(label) => {
            let resolved = if catalog.contains(label) { label.as_str() } else { "(fallback)" };
            print_entry(resolved, catalog.lookup(label));
        }
        None => {
            for label in catalog.labels() {
                print_entry(label, catalog.lookup(label));
            }
            print_entry("(fallback)", catalog.fallback());
        }
    }

    Ok(())
}
