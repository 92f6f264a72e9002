use flowstat_analysis::experiment;

pub(crate) fn run() -> anyhow::Result<()> {
    let experiments = experiment::builtin()?;

    println!(
        "  {:<12} {:<12} {:>10} {:<20}",
        "ID", "Cell line", "Replicates", "Tukey category"
    );
    println!("  {}", "-".repeat(57));
    for e in &experiments {
        println!(
            "  {:<12} {:<12} {:>10} {:<20}",
            e.id,
            e.cell_line,
            e.table.len(),
            e.tukey_category
        );
        println!(
            "  {:<12} categories: {}",
            "",
            e.table.category_names().collect::<Vec<_>>().join(", ")
        );
        println!("  {:<12} outputs: {}", "", e.files.all().join(", "));
    }
    Ok(())
}
