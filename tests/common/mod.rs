//! Fixture files shaped like WDI CSV downloads.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Render a WDI-style CSV: metadata banner, quoted header with a trailing
/// comma, then one row per `(name, code, values)` where `values` line up with
/// `years` and `""` marks a missing cell.
pub fn wdi_csv<const N: usize>(years: &[i32; N], rows: &[(&str, &str, [&str; N])]) -> String {
    let mut out = String::from(
        "\u{feff}\"Data Source\",\"World Development Indicators\",\n\n\"Last Updated Date\",\"2025-01-28\",\n\n",
    );
    out.push_str("\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",");
    for y in years {
        out.push_str(&format!("\"{y}\","));
    }
    out.push('\n');
    for (name, code, values) in rows {
        out.push_str(&format!("\"{name}\",\"{code}\",\"Fixture\",\"FX.TEST\","));
        for v in values.iter() {
            out.push_str(&format!("\"{v}\","));
        }
        out.push('\n');
    }
    out
}

pub fn write(root: &Path, locator: &str, content: &str) {
    let path = root.join(locator);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(path, content).unwrap();
}
