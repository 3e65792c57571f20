//! # Quote CLI
//!
//! Command-line host for `quote_core`: generates quotations, prints bills of
//! quantities, costs deliveries and exports the reference snapshot.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use quote_core::file_io::{load_reference_data, save_quotation, save_reference_data};
use quote_core::pdf::render_quotation_pdf;
use quote_core::pricing::UniformVariation;
use quote_core::transport::TransportOptimizer;
use quote_core::units::Kilograms;
use quote_core::{Quotation, QuotationEngine, ReferenceData};

use commands::{ClassifyArgs, CommandLine, Commands, GenerateArgs, TransportArgs};
use config::Settings;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_logging(settings.env);

    let cli = CommandLine::parse();
    match cli.command {
        Commands::Generate(args) => generate(&settings, args),
        Commands::Classify(args) => classify(args),
        Commands::Transport(args) => transport(&settings, args),
        Commands::ExportReference { output } => {
            save_reference_data(ReferenceData::builtin(), &output)?;
            println!("Reference data written to {}", output.display());
            Ok(())
        }
    }
}

fn reference_data(settings: &Settings, flag: Option<PathBuf>) -> Result<ReferenceData> {
    match settings.reference_path(flag) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading reference data");
            load_reference_data(&path)
                .with_context(|| format!("failed to load reference data from {}", path.display()))
        }
        None => Ok(ReferenceData::builtin().clone()),
    }
}

fn generate(settings: &Settings, args: GenerateArgs) -> Result<()> {
    let spec = args.spec.specification()?;
    let engine = QuotationEngine::new(reference_data(settings, args.reference)?)?;

    let quotation = match args.seed {
        Some(seed) => engine.generate_with(&spec, &mut UniformVariation::seeded(seed), Utc::now())?,
        None => engine.generate(&spec)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quotation)?);
    } else {
        print_quotation(&quotation);
    }

    if let Some(path) = &args.output {
        save_quotation(&quotation, path)?;
        tracing::info!(path = %path.display(), "quotation saved");
    }
    if let Some(path) = &args.pdf {
        let bytes = render_quotation_pdf(&quotation)?;
        std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "quotation pdf written");
    }
    Ok(())
}

fn classify(args: ClassifyArgs) -> Result<()> {
    let spec = args.spec.specification()?;
    let engine = QuotationEngine::new(ReferenceData::builtin().clone())?;
    let bill = engine.classify(&spec)?;

    for section in bill.sections() {
        println!("{}", section.category.display_name());
        for line in &section.lines {
            println!(
                "  {:<6} {:<45} {:>12.2} {}",
                line.item_code, line.description, line.quantity, line.unit
            );
        }
    }
    Ok(())
}

fn transport(settings: &Settings, args: TransportArgs) -> Result<()> {
    let reference = reference_data(settings, args.reference)?;
    reference.validate()?;
    let optimizer = TransportOptimizer::new(reference.transport);
    let cost = optimizer.cost(Kilograms(args.weight), &args.from, &args.to);

    println!("Vehicle:   {}", cost.vehicle_type);
    println!(
        "Distance:  {:.0} km{}",
        cost.distance_km,
        if cost.distance_defaulted { " (default, route not listed)" } else { "" }
    );
    println!("Fuel:      {:>12.2}", cost.fuel_cost);
    println!("Driver:    {:>12.2}", cost.driver_cost);
    println!("Loading:   {:>12.2}", cost.loading_cost);
    println!("Total:     {:>12.2}", cost.total_transport_cost);
    println!("Per kg:    {:>12.2}", cost.cost_per_kg);
    Ok(())
}

fn print_quotation(q: &Quotation) {
    let t = &q.totals;
    println!("{}  {}  ({})", q.reference, q.project_name, q.project_location);
    println!("{}", "=".repeat(86));
    println!("{:<6} {:<40} {:>10} {:<6} {:>10} {:>12}", "Code", "Description", "Qty", "Unit", "Rate", "Total");
    for item in &q.items {
        let flag = if item.price.is_missing() { " *" } else { "" };
        println!(
            "{:<6} {:<40} {:>10.2} {:<6} {:>10.2} {:>12.2}{}",
            item.material.item_code,
            item.material.description,
            item.material.quantity,
            item.material.unit.symbol(),
            item.unit_rate,
            item.total,
            flag
        );
    }
    println!("{}", "-".repeat(86));
    println!("{:<70} {:>15.2}", "Subtotal", t.subtotal);
    println!("{:<70} {:>15.2}", "Transport", t.transport_total);
    println!("{:<70} {:>15.2}", format!("VAT {:.0}%", t.tax_rate * 100.0), t.tax_amount);
    println!("{:<70} {:>15.2}", format!("Grand total ({})", t.currency), t.grand_total);

    if let Some(budget) = &q.budget {
        let status = if budget.within_budget { "within budget" } else { "over budget" };
        println!("Budget {:.2}: {} (variance {:.2})", budget.budget, status, budget.variance);
    }

    println!();
    println!("Payment schedule");
    for phase in &q.payment_schedule {
        println!("  {:<16} {:>3}% {:>15.2}  due {}", phase.phase, phase.percentage, phase.amount, phase.due_date);
    }

    let degraded = q.degraded_items();
    if !degraded.is_empty() {
        println!();
        println!("* no market price for {}; shown at zero", degraded.join(", "));
    }
}
