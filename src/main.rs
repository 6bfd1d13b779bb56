//! # Folio CLI
//!
//! Command-line interface for template rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Render a template against a data file
//! folio render invoice.json --data customer.json --out invoice.pdf
//!
//! # Write a PNG preview instead of a PDF
//! folio render invoice.json --data customer.json --png preview.png
//!
//! # Check a template's structure
//! folio validate invoice.json
//!
//! # List element types and their starter properties
//! folio types
//!
//! # Serve the HTTP API
//! folio serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio::{
    FolioError, RenderOptions, Renderer, ServerConfig, Template,
    resource::{DefaultImageSource, OfflineImageSource},
    template::element_types,
};

/// Folio - Template-driven PDF rendering with data binding
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to a single-page PDF
    Render {
        /// Template JSON file
        template: PathBuf,

        /// Data context JSON file (omit for an empty context)
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Output PDF path (defaults to the template name with .pdf)
        #[arg(long, short, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Write a PNG preview instead of a PDF
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Render even if the template fails validation
        #[arg(long)]
        no_validate: bool,

        /// Only load data: URI images (no network or file access)
        #[arg(long)]
        offline: bool,
    },

    /// Validate a template's structure
    Validate {
        /// Template JSON file
        template: PathBuf,
    },

    /// List element types with their starter properties
    Types,

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Directory templates may load relative image paths from
        #[arg(long, value_name = "DIR")]
        image_root: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), FolioError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            data,
            out,
            png,
            no_validate,
            offline,
        } => {
            let template_path = template;
            let template = read_template(&template_path)?;
            let data = match data {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
                None => Value::Object(Default::default()),
            };

            let options = RenderOptions {
                validate: !no_validate,
                ..Default::default()
            };
            let renderer = if offline {
                Renderer::new(Arc::new(OfflineImageSource), options)
            } else {
                let mut images = DefaultImageSource::new(&options)?;
                if let Some(dir) = template_path.parent() {
                    images = images.with_base_dir(dir);
                }
                Renderer::new(Arc::new(images), options)
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let page = runtime.block_on(renderer.render_page(&template, &data))?;
            for diagnostic in &page.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }

            if let Some(png_path) = png {
                std::fs::write(&png_path, page.to_png()?)?;
                println!("Saved preview to {}", png_path.display());
                return Ok(());
            }

            let out = out.unwrap_or_else(|| template_path.with_extension("pdf"));
            let output = page.into_output()?;
            std::fs::write(&out, &output.document)?;
            println!("Rendered '{}' to {}", template.name, out.display());
            Ok(())
        }

        Commands::Validate { template } => {
            let template = read_template(&template)?;
            template.validate()?;
            println!(
                "Template '{}' is valid ({} elements, {} mapped)",
                template.id,
                template.elements.len(),
                template.mapped_elements().count()
            );
            Ok(())
        }

        Commands::Types => {
            for meta in element_types() {
                println!("{:<10} {:<10} {}", meta.type_name, meta.label, meta.properties);
            }
            Ok(())
        }

        Commands::Serve { listen, image_root } => {
            let config = ServerConfig {
                listen_addr: listen,
                image_root,
                ..Default::default()
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(folio::server::serve(config))
        }
    }
}

fn read_template(path: &Path) -> Result<Template, FolioError> {
    let json = std::fs::read_to_string(path)?;
    Template::from_json(&json)
}
