//! End-to-end relaxation scenarios through the public entry points.

use u_relax::problem::{Constraint, Objective, Problem, Variable};
use u_relax::relax::{solve_batch, RelaxConfig, ResultStatus};

#[test]
fn fixed_rent_is_reported() {
    let problem = Problem::new(vec![Variable::new("rent", 0, 5000)])
        .with_constraint(Constraint::hard("rent == 1500"));

    let result = u_relax::solve(&problem);
    assert!(result.is_solution_found());
    assert_eq!(result.solution["rent"], 1500);
    assert!(result.dropped_constraints.is_empty());
    assert_eq!(result.satisfied_constraints, ["rent == 1500"]);
    assert_eq!(result.attempts, 1);
}

#[test]
fn conflicting_soft_floors_drop_the_less_important() {
    let problem = Problem::new(vec![Variable::new("a", 0, 10), Variable::new("b", 0, 10)])
        .with_constraint(Constraint::hard("a + b <= 10"))
        .with_constraint(Constraint::soft("a >= 8", 0))
        .with_constraint(Constraint::soft("b >= 8", 1));

    let result = u_relax::solve(&problem);
    assert!(result.is_solution_found());
    assert_eq!(result.dropped_constraints, ["b >= 8"]);
    let (a, b) = (result.solution["a"], result.solution["b"]);
    assert!(a >= 8);
    assert!(a + b <= 10);
}

#[test]
fn infeasible_hard_core_reports_nothing() {
    let problem = Problem::new(vec![Variable::new("x", 0, 20)])
        .with_constraint(Constraint::hard("x <= 5"))
        .with_constraint(Constraint::hard("x >= 10"));

    let result = u_relax::solve(&problem);
    assert!(matches!(
        result.status,
        ResultStatus::Infeasible | ResultStatus::Unknown
    ));
    assert!(result.solution.is_empty());
    assert!(result.dropped_constraints.is_empty());
    assert!(result.satisfied_constraints.is_empty());
    assert_eq!(result.attempts, 1);
}

#[test]
fn maximized_savings_hit_their_cap() {
    let problem = Problem::new(vec![Variable::new("savings", 0, 5000)])
        .with_constraint(Constraint::hard("savings <= 1000"))
        .with_objective(Objective::maximize("savings"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Optimal);
    assert_eq!(result.objective_value, Some(1000.0));
    assert_eq!(result.solution["savings"], 1000);
}

#[test]
fn hard_constraints_hold_in_every_solution() {
    let problem = Problem::new(vec![
        Variable::new("housing", 0, 5000),
        Variable::new("dining", 0, 5000),
        Variable::new("savings", 0, 5000),
    ])
    .with_constraint(Constraint::hard("housing + dining + savings <= 3000"))
    .with_constraint(Constraint::hard("housing == 1500"))
    .with_constraint(Constraint::soft("savings >= 1000", 0))
    .with_constraint(Constraint::soft("dining >= 1200", 1))
    .with_constraint(Constraint::soft("dining <= 100", 2))
    .with_objective(Objective::maximize("savings"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Optimal);
    let s = &result.solution;
    assert_eq!(s["housing"], 1500);
    assert!(s["housing"] + s["dining"] + s["savings"] <= 3000);
    assert!(s["savings"] >= 1000);
    assert_eq!(result.dropped_constraints, ["dining <= 100", "dining >= 1200"]);
    assert_eq!(result.objective_value, Some(1500.0));
    assert_eq!(result.attempts, 3);
}

#[test]
fn rejected_expressions_surface_as_errors() {
    for expression in [
        "x / 2 <= 3",
        "x ** 2 <= 9",
        "x * x <= 9",
        "__import__('os') <= 1",
        "x < y",
        "abs(x) <= 1",
        "x <= 1 and x >= 0",
        "1 < x < 5",
    ] {
        let problem = Problem::new(vec![Variable::new("x", 0, 10)])
            .with_constraint(Constraint::hard(expression));
        let result = u_relax::solve(&problem);
        let status = result.status.to_string();
        assert!(status.starts_with("ERROR: "), "{expression}: {status}");
        assert!(result.solution.is_empty(), "{expression}");
        assert_eq!(result.wall_time, 0.0);
    }
}

#[test]
fn json_round_trip_surface() {
    let input = r#"{
        "variables": [
            {"name": "rent", "lower_bound": 0, "upper_bound": 5000},
            {"name": "fun", "lower_bound": 0, "upper_bound": 5000}
        ],
        "constraints": [
            {"expression": "rent + fun <= 2000", "description": "Income"},
            {"expression": "rent == 1500", "constraint_type": "hard"},
            {"expression": "fun >= 800", "constraint_type": "soft", "priority": 3,
             "description": "Plenty of fun"}
        ],
        "objective": {"expression": "fun", "direction": "maximize"}
    }"#;

    let result = u_relax::solve_json(input);
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["status"], "OPTIMAL");
    assert_eq!(json["objective_value"], 500.0);
    assert_eq!(json["solution"]["rent"], 1500);
    assert_eq!(json["solution"]["fun"], 500);
    assert_eq!(json["satisfied_constraints"], serde_json::json!(["Income", "rent == 1500"]));
    assert_eq!(json["dropped_constraints"], serde_json::json!(["Plenty of fun"]));
    assert_eq!(json["attempts"], 2);
    assert!(json["wall_time"].as_f64().unwrap() >= 0.0);
}

#[test]
fn validation_failures_use_their_own_status() {
    let bad_bounds = r#"{"variables": [{"name": "x", "lower_bound": 5, "upper_bound": 1}],
                         "constraints": []}"#;
    let bad_name = r#"{"variables": [{"name": "import os", "lower_bound": 0, "upper_bound": 1}],
                       "constraints": []}"#;
    for input in [bad_bounds, bad_name, "[]"] {
        let result = u_relax::solve_json(input);
        assert!(
            result.status.to_string().starts_with("VALIDATION_ERROR: "),
            "{input}: {}",
            result.status
        );
    }
}

#[test]
fn batch_results_are_independent() {
    let ok = Problem::new(vec![Variable::new("x", 0, 9)])
        .with_constraint(Constraint::soft("x >= 4", 0))
        .with_objective(Objective::minimize("x"));
    let broken = Problem::new(vec![Variable::new("x", 0, 9)])
        .with_constraint(Constraint::hard("x % 2 == 0"));

    let results = solve_batch(&[ok.clone(), broken, ok], &RelaxConfig::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].solution["x"], 4);
    assert!(results[1].status.is_error());
    assert_eq!(results[0], {
        let mut third = results[2].clone();
        third.wall_time = results[0].wall_time;
        third
    });
}

fn wide_pair() -> Problem {
    Problem::new(vec![
        Variable::new("x", 0, 1_000_000_000),
        Variable::new("y", 0, 1_000_000_000),
    ])
}

#[test]
fn even_difference_cannot_be_odd() {
    let problem = wide_pair().with_constraint(Constraint::hard("2 * x - 2 * y == 1"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Infeasible);
    assert!(result.solution.is_empty());
}

#[test]
fn opposite_strict_orders_are_infeasible() {
    let problem = wide_pair()
        .with_constraint(Constraint::hard("x < y"))
        .with_constraint(Constraint::hard("y < x"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Infeasible);
}

#[test]
fn unreachable_parity_is_relaxed() {
    let problem = wide_pair()
        .with_constraint(Constraint::hard("x + y <= 10"))
        .with_constraint(Constraint::soft("2 * x - 2 * y == 1", 0))
        .with_objective(Objective::maximize("x"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Optimal);
    assert_eq!(result.dropped_constraints, ["2 * x - 2 * y == 1"]);
    assert_eq!(result.solution["x"], 10);
}

#[test]
fn parenthesized_constraint_is_accepted() {
    let problem = Problem::new(vec![Variable::new("x", 0, 20)])
        .with_constraint(Constraint::hard("(x <= 5)"))
        .with_objective(Objective::maximize("x"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Optimal);
    assert_eq!(result.solution["x"], 5);
    assert_eq!(result.satisfied_constraints, ["(x <= 5)"]);
}

#[test]
fn long_sums_are_solved() {
    let terms = 12_000;
    let problem = Problem::new(vec![Variable::new("x", 0, 100)])
        .with_constraint(Constraint::hard(format!("x{} <= {}", " + x".repeat(terms - 1), 3 * terms)))
        .with_objective(Objective::maximize("x"));

    let result = u_relax::solve(&problem);
    assert_eq!(result.status, ResultStatus::Optimal);
    assert_eq!(result.solution["x"], 3);
}
