//! Template Resolver CLI
//!
//! Usage:
//!   tmpl-render [OPTIONS] <NAME>
//!
//! Options:
//!   -p, --page <FILE>      HTML document holding `<script id="tmpl-NAME">` templates
//!   -t, --template <FILE>  Inline template source for NAME
//!   -d, --data <FILE>      JSON data (reads stdin when piped, `{}` otherwise)
//!       --prefix <PREFIX>  Element id prefix (default "tmpl-")
//!   -c, --config <FILE>    Resolver configuration (TOML format)
//!   -v, --verbose          Log resolution and compile steps
//!   -h, --help             Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use tmpl_resolver::{
    ElementLookup, HtmlDocumentLookup, ResolverConfig, StaticLookup, TemplateError,
    TemplateResolver,
};

#[derive(Parser)]
#[command(name = "tmpl-render")]
#[command(about = "Render a named template with JSON data")]
struct Cli {
    /// Template name
    name: String,

    /// HTML document used for element lookups
    #[arg(short, long)]
    page: Option<PathBuf>,

    /// Inline template source file
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// JSON data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Element id prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Resolver configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log resolution and compile steps
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match ResolverConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(&format!("Error loading config '{}': {}", path.display(), e)),
        },
        None => ResolverConfig::default(),
    };
    if let Some(prefix) = &cli.prefix {
        config = config.with_prefix(prefix.clone());
    }

    // Element lookup over the page, if any
    let page = match &cli.page {
        Some(path) => match HtmlDocumentLookup::from_file(path) {
            Ok(page) => Some(page),
            Err(e) => fail(&format!("Error loading page: {}", e)),
        },
        None => None,
    };

    let source = cli.template.as_ref().map(|path| match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
    });

    let data = read_data(cli.data.as_ref());

    // Source text for diagnostics, whichever way the template is found
    let (diagnostic_source, filename) = match (&source, &page) {
        (Some(source), _) => (
            Some(source.clone()),
            cli.template
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ),
        (None, Some(page)) => {
            let key = config.lookup_key(&cli.name);
            (page.lookup(&key).ok(), format!("#{}", key))
        }
        (None, None) => (None, String::new()),
    };

    let mut templates = match page {
        Some(page) => TemplateResolver::with_config(config, page),
        None => TemplateResolver::with_config(config, StaticLookup::new()),
    };

    match templates.resolve(&cli.name, Some(&data), source.as_deref()) {
        Ok(resolved) => {
            println!("{}", resolved.into_rendered().unwrap_or_default());
        }
        Err(TemplateError::Compile(errors)) => {
            for error in &errors {
                match &diagnostic_source {
                    Some(text) => eprint!("{}", error.format(text, &filename)),
                    None => eprintln!("Error: {}", error),
                }
            }
            std::process::exit(1);
        }
        Err(e) => fail(&format!("Error: {}", e)),
    }
}

fn read_data(path: Option<&PathBuf>) -> Value {
    let text = match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
        },
        None if io::stdin().is_terminal() => return Value::Object(Default::default()),
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(&format!("Error reading from stdin: {}", e)),
            }
        }
    };

    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => fail(&format!("Error parsing JSON data: {}", e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
