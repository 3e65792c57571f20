use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use quote_core::file_io::load_specification;
use quote_core::ProjectSpecification;

#[derive(Parser, Debug)]
#[command(name = "quote_cli")]
#[command(about = "Construction quotations from a building specification.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a priced quotation
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Print the bill of quantities for a specification
    #[command(alias = "c")]
    Classify(ClassifyArgs),
    /// Cost a single delivery
    #[command(alias = "t")]
    Transport(TransportArgs),
    /// Write the built-in reference data to a JSON feed
    ExportReference {
        /// Destination file
        #[arg(long, short)]
        output: PathBuf,
    },
}

/// A specification file, or the building described inline
#[derive(Args, Debug)]
pub struct SpecArgs {
    /// JSON specification file
    #[arg(long, conflicts_with_all = ["area", "location"])]
    pub spec: Option<PathBuf>,
    /// Gross floor area in square metres
    #[arg(long)]
    pub area: Option<f64>,
    #[arg(long, default_value_t = 1)]
    pub floors: u32,
    #[arg(long, default_value_t = 0)]
    pub bedrooms: u32,
    #[arg(long, default_value_t = 1)]
    pub bathrooms: u32,
    /// Site location, e.g. "nairobi"
    #[arg(long)]
    pub location: Option<String>,
    /// Project name
    #[arg(long)]
    pub name: Option<String>,
    /// Client budget in KES
    #[arg(long)]
    pub budget: Option<f64>,
}

impl SpecArgs {
    pub fn specification(&self) -> Result<ProjectSpecification> {
        if let Some(path) = &self.spec {
            return Ok(load_specification(path)?);
        }
        let (Some(area), Some(location)) = (self.area, self.location.as_deref()) else {
            bail!("either --spec or both --area and --location are required");
        };

        let mut spec = ProjectSpecification::new(area, self.floors, self.bedrooms, self.bathrooms, location);
        if let Some(name) = &self.name {
            spec = spec.with_name(name.clone());
        }
        if let Some(budget) = self.budget {
            spec = spec.with_budget(budget);
        }
        Ok(spec)
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub spec: SpecArgs,
    /// Reference feed (defaults to QUOTE_REFERENCE_PATH, then built-in data)
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Seed for reproducible market variation
    #[arg(long)]
    pub seed: Option<u64>,
    /// Save the quotation as JSON
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Render the quotation to PDF
    #[arg(long)]
    pub pdf: Option<PathBuf>,
    /// Print the full quotation JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub spec: SpecArgs,
}

#[derive(Args, Debug)]
pub struct TransportArgs {
    /// Payload in kilograms
    #[arg(long)]
    pub weight: f64,
    /// Origin (supplier depot)
    #[arg(long)]
    pub from: String,
    /// Destination (site)
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub reference: Option<PathBuf>,
}
