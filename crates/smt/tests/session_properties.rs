//! Property tests for the LRA session.
//!
//! Each property compares the session verdict against a closed-form answer and
//! re-checks every `Sat` model against the asserted formulas.

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use seqarrange_core::Budget;
use seqarrange_smt::{
    BoolVar, CheckOutcome, Formula, LinearExpr, LraSession, RealVar, SolverSession,
};

fn q(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn var(v: RealVar) -> LinearExpr {
    LinearExpr::var(v)
}

/// Asserts `t_i >= 0`, `t_i + d_i <= horizon` and pairwise exclusivity.
fn exclusive_jobs(
    session: &mut LraSession,
    durations: &[i64],
    horizon: i64,
) -> (Vec<RealVar>, Vec<Formula>) {
    let ts: Vec<RealVar> = (0..durations.len())
        .map(|i| session.declare_real(&format!("t{}", i)))
        .collect();
    let mut formulas = Vec::new();
    for (i, &t) in ts.iter().enumerate() {
        formulas.push(var(t).ge(&LinearExpr::zero()).into());
        formulas.push(
            var(t)
                .shifted(&q(durations[i]))
                .le(&LinearExpr::constant(q(horizon)))
                .into(),
        );
    }
    for i in 0..ts.len() {
        for j in (i + 1)..ts.len() {
            formulas.push(Formula::or([
                var(ts[i]).shifted(&q(durations[i])).le(&var(ts[j])).into(),
                var(ts[j]).shifted(&q(durations[j])).le(&var(ts[i])).into(),
            ]));
        }
    }
    for f in &formulas {
        session.assert(f).unwrap();
    }
    (ts, formulas)
}

fn model_satisfies(session: &LraSession, formulas: &[Formula]) -> bool {
    let real = |v: RealVar| session.real_value(v).unwrap_or_else(|| q(0));
    let boolean = |_: BoolVar| false;
    formulas.iter().all(|f| f.evaluate(&real, &boolean))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Jobs on one exclusive resource fit iff their total duration fits.
    #[test]
    fn exclusive_jobs_fit_iff_total_fits(
        durations in prop::collection::vec(1i64..5, 1..5),
        horizon in 1i64..16,
    ) {
        let mut session = LraSession::new();
        let (_, formulas) = exclusive_jobs(&mut session, &durations, horizon);
        let outcome = session.check(&[], &Budget::unlimited());
        let total: i64 = durations.iter().sum();

        if total <= horizon {
            prop_assert_eq!(outcome, CheckOutcome::Sat);
            prop_assert!(model_satisfies(&session, &formulas));
        } else {
            prop_assert_eq!(outcome, CheckOutcome::Unsat);
        }
    }

    /// Tightening the horizon inside a scope never changes the verdict of the
    /// base assertions once the scope is popped.
    #[test]
    fn pop_restores_base_verdict(
        durations in prop::collection::vec(1i64..4, 2..5),
        cut in 0i64..6,
    ) {
        let total: i64 = durations.iter().sum();
        let mut session = LraSession::new();
        let (ts, formulas) = exclusive_jobs(&mut session, &durations, total);
        prop_assert!(session.check(&[], &Budget::unlimited()).is_sat());

        session.push();
        let tight = total - cut;
        for (i, &t) in ts.iter().enumerate() {
            session
                .assert(&var(t).shifted(&q(durations[i])).le(&LinearExpr::constant(q(tight))).into())
                .unwrap();
        }
        let scoped = session.check(&[], &Budget::unlimited());
        prop_assert_eq!(scoped.is_sat(), cut == 0);

        session.pop(1).unwrap();
        prop_assert!(session.check(&[], &Budget::unlimited()).is_sat());
        prop_assert!(model_satisfies(&session, &formulas));
    }

    /// Box bounds plus one sum constraint: feasible iff the lower bounds fit.
    #[test]
    fn box_with_sum_cap(
        lows in prop::collection::vec(-5i64..5, 1..5),
        widths in prop::collection::vec(0i64..4, 5),
        cap in -10i64..15,
    ) {
        let mut session = LraSession::new();
        let xs: Vec<RealVar> = (0..lows.len())
            .map(|i| session.declare_real(&format!("x{}", i)))
            .collect();
        let mut formulas: Vec<Formula> = Vec::new();
        let mut sum = LinearExpr::zero();
        for (i, &x) in xs.iter().enumerate() {
            formulas.push(var(x).ge(&LinearExpr::constant(q(lows[i]))).into());
            formulas.push(var(x).le(&LinearExpr::constant(q(lows[i] + widths[i]))).into());
            sum = sum.plus(&var(x));
        }
        formulas.push(sum.le(&LinearExpr::constant(q(cap))).into());
        for f in &formulas {
            session.assert(f).unwrap();
        }

        let outcome = session.check(&[], &Budget::unlimited());
        let min_sum: i64 = lows.iter().sum();
        if min_sum <= cap {
            prop_assert_eq!(outcome, CheckOutcome::Sat);
            prop_assert!(model_satisfies(&session, &formulas));
        } else {
            prop_assert_eq!(outcome, CheckOutcome::Unsat);
        }
    }
}

#[test]
fn conflict_cap_reports_budget_exceeded() {
    let mut session = LraSession::new();
    let durations = [1, 1, 1, 1, 1];
    exclusive_jobs(&mut session, &durations, 4);
    let budget = Budget::unlimited().with_max_conflicts(1);
    match session.check(&[], &budget) {
        CheckOutcome::Unknown(_) | CheckOutcome::Unsat => {}
        CheckOutcome::Sat => panic!("five unit jobs cannot fit in four time units"),
    }
}
