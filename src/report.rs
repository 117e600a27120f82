use crate::view::{ReportPanel, ScreenView, Viewport, PLACEHOLDER_TEXT};
use colored::*;

/// Terminal rendition of the scan screen.
pub fn render(view: &ScreenView) -> String {
    let (r, g, b) = view.accent;
    let gold = |s: &str| s.truecolor(r, g, b);
    let mut out = Vec::new();

    out.push(gold(view.title.as_str()).bold().to_string());
    out.push(String::new());

    match view.viewport {
        Viewport::Connecting => out.push(format!("[ {} ]", PLACEHOLDER_TEXT).dimmed().to_string()),
        Viewport::Live { mirrored } => out.push(format!(
            "[ camera live{} | {} landmark(s) ]",
            if mirrored { ", mirrored" } else { "" },
            view.overlay.points.len()
        )),
    }
    out.push(String::new());

    out.push(gold("AI FACE ANALYSIS").to_string());
    match &view.report {
        ReportPanel::Skeleton => {
            out.push("░░░░░░░░░░░░░░░░░░░░".dimmed().to_string());
            out.push("analyzing...".dimmed().to_string());
        }
        ReportPanel::Revealed { headline, score_caption, score_text, description } => {
            out.push(headline.bold().to_string());
            out.push(format!("{}: {}", score_caption, gold(score_text.as_str()).bold()));
            out.push(description.clone());
        }
    }
    out.push(String::new());

    out.push("Recommended".bold().to_string());
    for product in &view.recommendations {
        let label = product
            .label
            .as_deref()
            .map(|l| format!(" [{}]", gold(l)))
            .unwrap_or_default();
        out.push(format!("  {:<20} {}{}", product.name, gold(product.price.as_str()), label));
    }
    out.push(String::new());

    let nav: Vec<String> = view
        .nav
        .iter()
        .map(|item| if item.active { gold(item.label).bold().to_string() } else { item.label.dimmed().to_string() })
        .collect();
    out.push(nav.join("   "));

    out.join("\n")
}
