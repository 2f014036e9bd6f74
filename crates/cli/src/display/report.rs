use cmd_cache_core::Inspection;

/// Render a dry-run report, one `label: value` pair per line
pub fn format_inspection(inspection: &Inspection) -> String {
    let rows = [
        ("key", inspection.key.to_string()),
        ("state", inspection.state.as_str().to_string()),
        ("status", inspection.entry.status_path.display().to_string()),
        ("stdout", inspection.entry.stdout_path.display().to_string()),
        ("stderr", inspection.entry.stderr_path.display().to_string()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<8}{}", format!("{label}:"), value))
        .collect::<Vec<_>>()
        .join("\n")
}
