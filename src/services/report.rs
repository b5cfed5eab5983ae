use crate::models::{CartItem, Design};
use std::fmt::Write;

pub const REPORT_TITLE: &str = "Neue Bestellung";

const UNKNOWN_IMAGE: &str = "unbekannt";

/// Customer block of the report
pub struct Customer<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub email: &'a str,
}

/// Render the plain-text order report sent to the shop.
pub fn format_report(customer: &Customer<'_>, items: &[CartItem]) -> String {
    let mut report = format!(
        "{REPORT_TITLE}\n\nKunde:\nName: {}\nAdresse: {}\nE-Mail: {}\n\nProdukte:\n\n",
        customer.name, customer.address, customer.email
    );

    for (idx, item) in items.iter().enumerate() {
        // Writing into a String cannot fail
        let _ = writeln!(
            report,
            "{}. Größe: {} x {} cm",
            idx + 1,
            centimeters(item.width),
            centimeters(item.height)
        );
        if let Some(front) = &item.front {
            let _ = writeln!(report, "   Front: {}", describe_design(front));
        }
        if let Some(back) = &item.back {
            let _ = writeln!(report, "   Back: {}", describe_design(back));
        }
        report.push('\n');
    }

    report
}

fn describe_design(design: &Design) -> String {
    if design.is_color() {
        let colour = design
            .value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_IMAGE);
        format!("Farbe ({colour})")
    } else {
        format!("Bild ({})", image_name(design.value.as_deref()))
    }
}

/// Short display name for an image reference. Inline data URLs have no
/// useful name, so they collapse to "Bild".
pub fn image_name(value: Option<&str>) -> &str {
    match value {
        None | Some("") => UNKNOWN_IMAGE,
        Some(v) if v.starts_with("data:") => "Bild",
        Some(v) => v.rsplit('/').next().unwrap_or(v),
    }
}

/// Meters to whole centimeters, rounded half away from zero.
fn centimeters(meters: f64) -> String {
    let cm = (meters * 100.0).round();
    if cm.is_nan() {
        "NaN".to_string()
    } else if cm.is_infinite() {
        let sign = if cm > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if cm == 0.0 {
        "0".to_string()
    } else {
        format!("{cm}")
    }
}
