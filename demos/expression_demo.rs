//! Example demonstrating deferred expressions in dimexpr

use dimexpr::expression::{DimensionRange, Kwargs, Ufunc};
use dimexpr::source::{Graph, Table};
use dimexpr::{dim, ApplyOptions, Value};

fn main() -> anyhow::Result<()> {
    // Set up logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Create a table
    let table = Table::new()
        .with_key("x", vec![1, 2, 3, 4])
        .with_value("y", vec![0.5, 2.0, 4.5, 8.0])
        .with_value("kind", vec!["a", "b", "a", "c"])
        .with_index(vec!["w", "x", "y", "z"]);
    let options = ApplyOptions::default();

    println!("=== Expressions Demo ===");

    let scaled = dim("x") * 2 + 1;
    println!("\n{} => {:?}", scaled, scaled.apply(&table, &options)?.to_values());

    let reflected = 10_i32 - dim("x");
    println!("{} => {:?}", reflected, reflected.apply(&table, &options)?.to_values());

    let ratio = dim("y") / dim("x");
    println!("{} => {:?}", ratio, ratio.apply(&table, &options)?.to_values());

    // Transforms
    println!("\n--- Transforms ---");
    let normalized = dim("y").norm(None);
    println!("{} => {:?}", normalized, normalized.apply(&table, &options)?.to_values());

    let binned = dim("y").bin(vec![0, 2, 10], Some(vec!["small".into(), "large".into()]));
    println!("{} => {:?}", binned, binned.apply(&table, &options)?.to_values());

    let categories = dim("kind").categorize(vec!["red", "green"], Value::from("grey"));
    println!("{} => {:?}", categories, categories.apply(&table, &options)?.to_values());

    let root = dim("y").ufunc(Ufunc::Sqrt, Kwargs::new()).round(2);
    println!("{} => {:?}", root, root.apply(&table, &options)?.to_values());

    // Reductions
    println!("\n--- Reductions ---");
    for expr in [dim("y").sum(), dim("y").mean(), dim("y").std(), dim("x").cumsum()] {
        println!("{} => {:?}", expr, expr.apply(&table, &options)?);
    }

    // Precomputed ranges and index preservation
    println!("\n--- Options ---");
    let ranged = ApplyOptions::new()
        .range("y", DimensionRange::combined(0.0, 16.0))
        .keep_index(true);
    println!("{} with combined range => {:?}", normalized, normalized.apply(&table, &ranged)?);

    // Graph node redirection
    let graph = Graph::new(
        Table::new()
            .with_key("start", vec![0, 1])
            .with_key("end", vec![1, 2]),
        Table::new()
            .with_key("x", vec![0.0, 1.0, 2.0])
            .with_key("y", vec![0.0, 1.0, 0.0])
            .with_key("index", vec![0, 1, 2])
            .with_value("size", vec![3, 6, 9]),
    );
    let size = dim("size").norm(None);
    println!(
        "\n{} on graph nodes => {:?}",
        size,
        size.apply(&graph, &options)?.to_values()
    );
    println!("applies to graph: {}", size.applies(&graph));
    println!("dim('missing') applies to table: {}", dim("missing").applies(&table));

    Ok(())
}
