//! Benchmark formulations solved end to end by branch-and-bound.

use std::time::Duration;

use ilpbb_problems::{AtspInstance, GapInstance, ProblemKind, UflFormulation, UflInstance};
use ilpbb_search::branch_and_bound;
use ilpbb_solver::Solver;

const GAP_SMALL: &str = "2 4
3 2 5 4
4 3 2 6
2 3 2 3
3 2 2 2
5 4
";

const UFL_SMALL: &str = "2 3
capacity 10
capacity 4
1 2 5
1 3 1
1 4 6
";

/// Two cheap 2-cycles tempt the assignment relaxation into subtours.
const ATSP_SUBTOURS: &str = "NAME: twocycles
TYPE: ATSP
DIMENSION: 4
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
EDGE_WEIGHT_SECTION
 0  1 10 10
 1  0 10 10
10 10  0  1
10 10  1  0
EOF
";

fn assert_solved(kind: ProblemKind, source: &str, expected: f64) {
    let problem = kind.build(source).unwrap();
    let outcome = branch_and_bound(problem, 1e-6, Duration::from_secs(120)).unwrap();

    assert!(
        (outcome.best_objective - expected).abs() < 1e-6,
        "{:?}: obj = {} (expected {})",
        kind,
        outcome.best_objective,
        expected
    );
    assert_eq!(outcome.gap_percent, 0.0, "{:?}", kind);
}

#[test]
fn test_gap() {
    assert_solved(ProblemKind::Gap, GAP_SMALL, 12.0);
}

#[test]
fn test_ufl_both_formulations_agree() {
    assert_solved(ProblemKind::UflStrong, UFL_SMALL, 16.0);
    assert_solved(ProblemKind::UflWeak, UFL_SMALL, 16.0);
}

#[test]
fn test_strong_ufl_relaxation_is_tighter() {
    let instance = UflInstance::parse(UFL_SMALL).unwrap();
    let solver = Solver::new();
    let strong = solver.solve(&instance.to_problem(UflFormulation::Strong).unwrap());
    let weak = solver.solve(&instance.to_problem(UflFormulation::Weak).unwrap());

    assert!(strong.status.is_optimal() && weak.status.is_optimal());
    assert!(strong.objective_value >= weak.objective_value - 1e-9);
    assert!(strong.objective_value <= 16.0 + 1e-9);
}

#[test]
fn test_atsp_formulations_break_subtours() {
    assert_solved(ProblemKind::AtspMtz, ATSP_SUBTOURS, 22.0);
    assert_solved(ProblemKind::AtspMcf, ATSP_SUBTOURS, 22.0);
}

#[test]
fn test_atsp_tour_is_a_single_cycle() {
    let instance = AtspInstance::parse(ATSP_SUBTOURS).unwrap();
    let outcome = branch_and_bound(instance.to_mtz_problem().unwrap(), 1e-6, Duration::from_secs(120)).unwrap();
    let values = outcome.incumbent.unwrap().rounded_values();

    let mut city = 0;
    let mut steps = 0;
    loop {
        city = (0..instance.cities)
            .find(|&j| values[instance.arc_var(city, j)] == 1.0)
            .unwrap();
        steps += 1;
        if city == 0 {
            break;
        }
    }
    assert_eq!(steps, instance.cities);

    let visited: usize = (0..instance.cities)
        .map(|i| (0..instance.cities).filter(|&j| values[instance.arc_var(i, j)] == 1.0).count())
        .sum();
    assert_eq!(visited, instance.cities);
}

#[test]
fn test_gap_instance_round_trip_through_kind() {
    let direct = GapInstance::parse(GAP_SMALL).unwrap().to_problem().unwrap();
    let via_kind = ProblemKind::Gap.build(GAP_SMALL).unwrap();
    assert_eq!(direct.variables, via_kind.variables);
    assert_eq!(direct.objective.coefficients, via_kind.objective.coefficients);
}
