//! # PDF Generation Module
//!
//! Renders a quotation to PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via placeholder substitution before compilation
//! - Fonts come from `typst-assets`, so no system fonts are needed
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::pdf::render_quotation_pdf;
//! use quote_core::project::ProjectSpecification;
//! use quote_core::quotation::QuotationEngine;
//! use quote_core::reference::ReferenceData;
//!
//! let engine = QuotationEngine::new(ReferenceData::builtin().clone()).unwrap();
//! let quotation = engine.generate(&ProjectSpecification::new(120.0, 1, 3, 2, "nairobi")).unwrap();
//! let pdf_bytes = render_quotation_pdf(&quotation).unwrap();
//! std::fs::write("quotation.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{DateTime, Datelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{QuoteError, QuoteResult};
use crate::quotation::Quotation;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling one in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
    /// Reported as "today", so the document is dated by its quotation
    today: DateTime<Utc>,
}

impl PdfWorld {
    fn new(source: String, today: DateTime<Utc>) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
            today,
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(
            self.today.year(),
            u8::try_from(self.today.month()).ok()?,
            u8::try_from(self.today.day()).ok()?,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const QUOTATION_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 1.8cm, right: 1.8cm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[Construction Quotation {{REFERENCE}}]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{REFERENCE}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(size: 10pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Construction Quotation]
    #v(4pt)
    #text(size: 13pt)[{{PROJECT_NAME}}]
  ]
]

#v(10pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 2pt,
  [Reference:], [{{REFERENCE}}],
  [Location:], [{{LOCATION}}],
  [Date:], [{{DATE}}],
  [Valid until:], [{{VALID_UNTIL}}],
)

#v(8pt)

== Bill of Quantities

#table(
  columns: (auto, 1fr, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, left, right, left, right, right),
  table.header([*Code*], [*Description*], [*Qty*], [*Unit*], [*Rate*], [*Total*]),
{{ITEM_ROWS}}
)

{{DEGRADED_NOTE}}

== Transport

#table(
  columns: (auto, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, left, right, right, right),
  table.header([*Code*], [*Vehicle*], [*Weight (kg)*], [*Distance (km)*], [*Cost*]),
{{TRANSPORT_ROWS}}
)

== Totals

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  [Materials subtotal], [{{CURRENCY}} {{SUBTOTAL}}],
  [Transport], [{{CURRENCY}} {{TRANSPORT_TOTAL}}],
  [VAT ({{TAX_PERCENT}}%)], [{{CURRENCY}} {{TAX_AMOUNT}}],
  [*Grand total*], [*{{CURRENCY}} {{GRAND_TOTAL}}*],
)

{{BUDGET_BLOCK}}

== Payment Schedule

#table(
  columns: (1fr, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, right, right, left),
  table.header([*Phase*], [*%*], [*Amount*], [*Due*]),
{{PAYMENT_ROWS}}
)

== Suppliers

#table(
  columns: (auto, 1fr, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, left, left, right, right),
  table.header([*ID*], [*Name*], [*Location*], [*Items*], [*Amount*]),
{{SUPPLIER_ROWS}}
)

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#v(6pt)

#text(size: 8pt, fill: gray)[
{{NOTES}}
]
"##;

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render a quotation to PDF bytes.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The PDF document
/// * `Err(QuoteError::Internal)` - Typst compilation or PDF export failed
pub fn render_quotation_pdf(quotation: &Quotation) -> QuoteResult<Vec<u8>> {
    let source = build_source(quotation);
    let world = PdfWorld::new(source, quotation.generated_at);

    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        QuoteError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        QuoteError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(reference = %quotation.reference, bytes = pdf_bytes.len(), "quotation pdf rendered");
    Ok(pdf_bytes)
}

fn build_source(q: &Quotation) -> String {
    let t = &q.totals;

    let item_rows = q
        .items
        .iter()
        .map(|item| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&item.material.item_code),
                escape_typst(&item.material.description),
                format_amount(item.material.quantity),
                item.material.unit.symbol(),
                format_amount(item.unit_rate),
                format_amount(item.total),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let transport_rows = q
        .transport_breakdown
        .iter()
        .map(|line| {
            let distance = if line.cost.distance_defaulted {
                format!("{:.0} (est.)", line.cost.distance_km)
            } else {
                format!("{:.0}", line.cost.distance_km)
            };
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&line.item_code),
                line.cost.vehicle_type.code().replace('_', " "),
                format_amount(line.cost.weight_kg),
                distance,
                format_amount(line.cost.total_transport_cost),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let payment_rows = q
        .payment_schedule
        .iter()
        .map(|phase| {
            format!(
                "  [{}], [{}], [{}], [{}],",
                escape_typst(&phase.phase),
                phase.percentage,
                format_amount(phase.amount),
                phase.due_date.format("%Y-%m-%d"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let supplier_rows = q
        .supplier_summary
        .iter()
        .map(|s| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&s.supplier_id),
                escape_typst(&s.supplier_name),
                escape_typst(&s.location),
                s.item_count,
                format_amount(s.total_amount),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let degraded = q.degraded_items();
    let degraded_note = if degraded.is_empty() {
        String::new()
    } else {
        format!(
            "#text(fill: rgb(\"#b00020\"))[No market price available for: {}. These lines are shown at zero.]",
            escape_typst(&degraded.join(", "))
        )
    };

    let budget_block = match &q.budget {
        Some(check) => {
            let (fill, label) = if check.within_budget {
                ("#d4edda", "Within budget")
            } else {
                ("#f8d7da", "Over budget")
            };
            format!(
                "#block(width: 100%, fill: rgb(\"{}\"), inset: 8pt, radius: 4pt)[*{}*: budget {} {}, variance {} {}]",
                fill,
                label,
                t.currency,
                format_amount(check.budget),
                t.currency,
                format_amount(check.variance),
            )
        }
        None => String::new(),
    };

    let notes = q
        .notes
        .iter()
        .map(|n| format!("- {}", escape_typst(n)))
        .collect::<Vec<_>>()
        .join("\n");

    QUOTATION_TEMPLATE
        .replace("{{REFERENCE}}", &escape_typst(&q.reference))
        .replace("{{PROJECT_NAME}}", &escape_typst(&q.project_name))
        .replace("{{LOCATION}}", &escape_typst(&q.project_location))
        .replace("{{DATE}}", &q.generated_at.format("%Y-%m-%d").to_string())
        .replace("{{VALID_UNTIL}}", &q.valid_until().format("%Y-%m-%d").to_string())
        .replace("{{ITEM_ROWS}}", &item_rows)
        .replace("{{DEGRADED_NOTE}}", &degraded_note)
        .replace("{{TRANSPORT_ROWS}}", &transport_rows)
        .replace("{{CURRENCY}}", &escape_typst(&t.currency))
        .replace("{{SUBTOTAL}}", &format_amount(t.subtotal))
        .replace("{{TRANSPORT_TOTAL}}", &format_amount(t.transport_total))
        .replace("{{TAX_PERCENT}}", &format!("{:.0}", t.tax_rate * 100.0))
        .replace("{{TAX_AMOUNT}}", &format_amount(t.tax_amount))
        .replace("{{GRAND_TOTAL}}", &format_amount(t.grand_total))
        .replace("{{BUDGET_BLOCK}}", &budget_block)
        .replace("{{PAYMENT_ROWS}}", &payment_rows)
        .replace("{{SUPPLIER_ROWS}}", &supplier_rows)
        .replace("{{NOTES}}", &notes)
}

/// Two decimals with thousands separators: 1234567.8 -> "1,234,567.80"
fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::NoVariation;
    use crate::project::ProjectSpecification;
    use crate::quotation::QuotationEngine;
    use crate::reference::ReferenceData;

    fn quotation(spec: ProjectSpecification) -> Quotation {
        let engine = QuotationEngine::new(ReferenceData::builtin().clone()).unwrap();
        engine.generate_with(&spec, &mut NoVariation, Utc::now()).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(1000.0), "1,000.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-2500.0), "-2,500.00");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("Villa #2 [east]"), "Villa \\#2 \\[east\\]");
        assert_eq!(escape_typst("plain"), "plain");
    }

    #[test]
    fn test_source_has_no_unfilled_placeholders() {
        let q = quotation(ProjectSpecification::new(120.0, 1, 3, 2, "nairobi").with_budget(5_000_000.0));
        let source = build_source(&q);
        assert!(!source.contains("{{"), "unfilled placeholder in template");
        assert!(source.contains("Mobilization"));
        assert!(source.contains("Nairobi Building Supplies"));
        assert!(source.contains("budget"));
    }

    #[test]
    fn test_pdf_generation() {
        let q = quotation(ProjectSpecification::new(120.0, 1, 3, 2, "nairobi").with_name("Villa #7 *Karen*"));
        let pdf = render_quotation_pdf(&q);

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
