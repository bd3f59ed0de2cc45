use bondfilms::{
    analyze::report::{batch_head_table, summary_table},
    analyze::stats::describe,
    output::read_cleaned_csv,
    process::dedup::drop_duplicate_rows,
    schema::types::{FILM_LENGTH, MARTINIS_CONSUMED},
};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a cleaned CSV.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CLEANED_CSV>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_cleaned(Path::new(&args[1])) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

/// Read the cleaned file back and print its schema, first rows, the ranges of
/// the outlier-checked columns and whether any duplicate rows are left.
fn inspect_cleaned(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let batch = read_cleaned_csv(path, None)?;

    println!("=== Cleaned CSV: {} ===", path.display());
    println!("Rows:    {}", batch.num_rows());
    println!("Columns: {}", batch.num_columns());
    println!();

    println!("=== Schema ===");
    for field in batch.schema().fields() {
        println!("- {:<30} | {}", field.name(), field.data_type());
    }
    println!();

    println!("=== Head ===");
    batch_head_table(&batch, 5)?.printstd();
    println!();

    let summaries = [FILM_LENGTH, MARTINIS_CONSUMED]
        .iter()
        .filter(|c| batch.schema().index_of(c).is_ok())
        .map(|c| describe(&batch, c))
        .collect::<Result<Vec<_>, _>>()?;
    if !summaries.is_empty() {
        println!("=== Ranges ===");
        summary_table(&summaries).printstd();
        println!();
    }

    let (_, duplicates) = drop_duplicate_rows(&batch)?;
    println!("Duplicate rows: {} {:?}", duplicates.len(), duplicates);
    Ok(())
}
