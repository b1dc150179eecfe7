use dee_schema::{CompileDetails, EventSchema, SchemaCatalog};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn wrap(&self, s: &str, code: &str) -> String {
        if self.enabled { format!("{}{}{}", code, s, ansi::RESET) } else { s.to_string() }
    }

    pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
        self.wrap(s.as_ref(), color)
    }

    pub fn bold(&self, s: impl AsRef<str>) -> String {
        self.wrap(s.as_ref(), ansi::BOLD)
    }

    pub fn dim(&self, s: impl AsRef<str>) -> String {
        self.wrap(s.as_ref(), ansi::DIM)
    }
}

pub fn print_catalog(catalog: &SchemaCatalog, details: Option<&CompileDetails>, palette: &Palette) {
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Schemas: {}", catalog.len()), ansi::CYAN)));

    if let Some(details) = details {
        println!("\n{}", palette.paint("━━━ Trigger blocks ━━━", ansi::GRAY));
        print_blocks(details, palette);
    }

    println!("\n{}", palette.paint("━━━ Schemas ━━━", ansi::GRAY));
    if catalog.is_empty() {
        println!("{}", palette.dim("  No schemas produced"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • Every block was skipped as malformed (rerun with --strict to see why)");
        println!("  • The input contains no '<event type> = {{ ... }}' blocks");
    } else {
        for (idx, schema) in catalog.schemas().iter().enumerate() {
            print_schema(idx, schema, palette);
        }
    }

    let dups = catalog.duplicate_event_types();
    if !dups.is_empty() {
        println!("\n{} {}", palette.paint("Duplicate event types:", ansi::YELLOW), dups.join(", "));
    }
    let shared = catalog.duplicate_identifiers();
    if !shared.is_empty() {
        println!("{} {}", palette.paint("Shared identifiers:", ansi::YELLOW), shared.join(", "));
    }

    if let Some(details) = details {
        println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
        println!(
            "  Total: {}  │  Parse: {}  │  Compile: {}",
            palette.paint(format!("{:?}", details.total), ansi::GREEN),
            palette.paint(format!("{:?}", details.parse), ansi::CYAN),
            palette.dim(format!("{:?}", details.compile)),
        );
    }
    println!();
}

fn print_blocks(details: &CompileDetails, palette: &Palette) {
    for block in &details.blocks {
        let issues =
            if block.issues.is_empty() { palette.dim("ok") } else { palette.paint(block.issues.join(", "), ansi::YELLOW) };
        println!(
            "  {} {} {} {} {}",
            palette.paint(format!("line {}:", block.line), ansi::BLUE),
            palette.bold(&block.event_type),
            palette.dim(format!("→ {}", block.identifier)),
            palette.dim(format!("│ {} fields, {} ranks │", block.fields, block.ranks)),
            issues
        );
    }
    for skipped in &details.skipped {
        println!(
            "  {} {}",
            palette.paint(format!("line {}:", skipped.line), ansi::BLUE),
            palette.paint(format!("✗ skipped ({})", skipped.reason), ansi::YELLOW)
        );
    }
}

fn print_schema(idx: usize, schema: &EventSchema, palette: &Palette) {
    println!(
        "  {} {} {} {}",
        palette.paint(format!("[{}]", idx), ansi::GRAY),
        palette.bold(palette.paint(schema.identifier(), ansi::GREEN)),
        palette.dim("│"),
        palette.paint(schema.name(), ansi::CYAN),
    );
    let fields: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| if schema.is_key_field(f) { palette.bold(format!("{f}*")) } else { f.clone() })
        .collect();
    println!("      {} {}", palette.dim("fields:"), fields.join(", "));
    let min_match = palette.paint(schema.min_match_count().to_string(), ansi::YELLOW);
    println!("      {} {}", palette.dim("min match:"), min_match);
}
