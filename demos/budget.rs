//! Monthly budget allocation with soft spending goals.
//!
//! Run with `cargo run --example budget`; set `RUST_LOG=u_relax=debug` to
//! follow the relaxation attempts.

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = serde_json::json!({
        "variables": [
            {"name": "housing", "lower_bound": 0, "upper_bound": 5000},
            {"name": "dining", "lower_bound": 0, "upper_bound": 5000},
            {"name": "savings", "lower_bound": 0, "upper_bound": 5000},
            {"name": "transport", "lower_bound": 0, "upper_bound": 5000},
            {"name": "entertainment", "lower_bound": 0, "upper_bound": 5000}
        ],
        "constraints": [
            {"expression": "housing + dining + savings + transport + entertainment <= 5000",
             "constraint_type": "hard", "description": "Total budget cannot exceed $5000"},
            {"expression": "housing == 1500",
             "constraint_type": "hard", "description": "Rent is $1500/month"},
            {"expression": "savings >= 1000",
             "constraint_type": "soft", "priority": 0, "description": "Save at least $1000"},
            {"expression": "dining <= 500",
             "constraint_type": "soft", "priority": 1, "description": "Dining under $500"},
            {"expression": "entertainment <= 300",
             "constraint_type": "soft", "priority": 2, "description": "Entertainment under $300"}
        ],
        "objective": {"expression": "savings", "direction": "maximize"}
    });

    println!("--- Problem ---");
    println!("{input:#}");

    let result = u_relax::solve_value(input);

    println!("\n--- Result ---");
    println!("Status:     {}", result.status);
    println!("Objective:  {:?}", result.objective_value);
    println!("Solution:   {:?}", result.solution);
    println!("Satisfied:  {:?}", result.satisfied_constraints);
    println!("Dropped:    {:?}", result.dropped_constraints);
    println!("Attempts:   {}", result.attempts);

    match result.to_json() {
        Ok(json) => println!("\n{json}"),
        Err(err) => eprintln!("failed to encode result: {err}"),
    }
}
