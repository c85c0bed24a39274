//! End-to-end tests for the rekh engine.
//!
//! These exercise the full assert → chain → ask → explain → retract cycle
//! through the public API, including the truth-maintenance behaviors:
//! support merging, independent justifications, and cascade retraction.

use rekh::kb::{KbConfig, KnowledgeBase};
use rekh::term::{Statement, Term};

fn c(name: &str) -> Term {
    Term::constant(name)
}

fn v(name: &str) -> Term {
    Term::variable(name)
}

fn stmt(pred: &str, terms: Vec<Term>) -> Statement {
    Statement::new(pred, terms)
}

/// `(isa ?x bird) -> (can ?x fly)` plus `isa(tweety, bird)`.
fn bird_kb() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new(KbConfig::default());
    kb.assert_rule(
        vec![stmt("isa", vec![v("x"), c("bird")])],
        stmt("can", vec![v("x"), c("fly")]),
    )
    .unwrap();
    kb.assert_fact(stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    kb
}

#[test]
fn derivation_with_support_metadata() {
    let kb = bird_kb();

    let conclusion = stmt("can", vec![c("tweety"), c("fly")]);
    let id = kb.get_fact(&conclusion).expect("conclusion derived");
    let fact = kb.fact(id).unwrap();
    assert!(!fact.asserted);
    assert_eq!(fact.supported_by.len(), 1);

    let pair = fact.supported_by[0];
    let premise = kb.fact(pair.fact).unwrap();
    assert_eq!(premise.statement, stmt("isa", vec![c("tweety"), c("bird")]));
    let rule = kb.rule(pair.rule).unwrap();
    assert_eq!(rule.rhs, stmt("can", vec![v("x"), c("fly")]));
}

#[test]
fn assertion_order_does_not_matter() {
    let mut kb = KnowledgeBase::default();
    kb.assert_fact(stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    kb.assert_rule(
        vec![stmt("isa", vec![v("x"), c("bird")])],
        stmt("can", vec![v("x"), c("fly")]),
    )
    .unwrap();

    assert!(kb.contains_fact(&stmt("can", vec![c("tweety"), c("fly")])));
}

#[test]
fn query_returns_binding_and_supporting_fact() {
    let kb = bird_kb();

    let answers = kb.ask(&stmt("can", vec![c("tweety"), v("what")]));
    assert_eq!(answers.len(), 1);

    let answer = &answers.as_slice()[0];
    assert_eq!(answer.bindings.bound("what"), Some(&c("fly")));
    assert_eq!(answer.facts.len(), 1);
    let matched = kb.fact(answer.facts[0]).unwrap();
    assert_eq!(matched.statement, stmt("can", vec![c("tweety"), c("fly")]));
}

#[test]
fn retraction_cascades_to_derived_facts() {
    let mut kb = bird_kb();
    let conclusion = stmt("can", vec![c("tweety"), c("fly")]);
    assert!(kb.contains_fact(&conclusion));

    let result = kb
        .retract_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();

    assert_eq!(result.retracted.len(), 2);
    assert!(!kb.contains_fact(&stmt("isa", vec![c("tweety"), c("bird")])));
    assert!(!kb.contains_fact(&conclusion));
    // The rule was directly asserted and is untouched.
    assert_eq!(kb.rule_count(), 1);
}

#[test]
fn retraction_preserves_independent_support() {
    let mut kb = bird_kb();
    // Second, independent derivation path for the same conclusion.
    kb.assert_rule(
        vec![stmt("has", vec![v("x"), c("wings")])],
        stmt("can", vec![v("x"), c("fly")]),
    )
    .unwrap();
    kb.assert_fact(stmt("has", vec![c("tweety"), c("wings")]))
        .unwrap();

    let conclusion = stmt("can", vec![c("tweety"), c("fly")]);
    let id = kb.get_fact(&conclusion).unwrap();
    assert_eq!(kb.fact(id).unwrap().supported_by.len(), 2);

    let result = kb
        .retract_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    assert!(result.weakened.contains(&id));

    let survivor = kb.fact(id).expect("conclusion survives on second path");
    assert_eq!(survivor.supported_by.len(), 1);

    // Removing the second path finishes it off.
    kb.retract_fact(&stmt("has", vec![c("tweety"), c("wings")]))
        .unwrap();
    assert!(!kb.contains_fact(&conclusion));
}

#[test]
fn directly_asserted_fact_survives_losing_its_derivation() {
    let mut kb = bird_kb();
    let conclusion = stmt("can", vec![c("tweety"), c("fly")]);

    // The derived conclusion is also asserted directly.
    kb.assert_fact(conclusion.clone()).unwrap();

    kb.retract_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    let id = kb.get_fact(&conclusion).expect("assertion keeps it alive");
    let fact = kb.fact(id).unwrap();
    assert!(fact.asserted);
    assert!(fact.supported_by.is_empty());

    // Only withdrawing the direct assertion removes it now.
    kb.retract_fact(&conclusion).unwrap();
    assert!(!kb.contains_fact(&conclusion));
}

#[test]
fn multi_antecedent_chain_via_intermediate_rule() {
    let mut kb = KnowledgeBase::default();
    kb.assert_rule(
        vec![
            stmt("isa", vec![v("x"), c("bird")]),
            stmt("not_penguin", vec![v("x")]),
        ],
        stmt("can", vec![v("x"), c("fly")]),
    )
    .unwrap();
    kb.assert_fact(stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();

    let reduced_lhs = vec![stmt("not_penguin", vec![c("tweety")])];
    let reduced_rhs = stmt("can", vec![c("tweety"), c("fly")]);
    let reduced = kb.get_rule(&reduced_lhs, &reduced_rhs).unwrap();
    assert!(!kb.rule(reduced).unwrap().asserted);
    assert!(!kb.contains_fact(&reduced_rhs));

    kb.assert_fact(stmt("not_penguin", vec![c("tweety")]))
        .unwrap();
    assert!(kb.contains_fact(&reduced_rhs));

    // Retracting the first premise removes the reduced rule and the
    // conclusion in one cascade.
    kb.retract_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    assert!(kb.get_rule(&reduced_lhs, &reduced_rhs).is_none());
    assert!(!kb.contains_fact(&reduced_rhs));
    // The premise satisfying the second antecedent stands on its own.
    assert!(kb.contains_fact(&stmt("not_penguin", vec![c("tweety")])));
}

#[test]
fn explanation_of_derived_fact_matches_format() {
    let kb = bird_kb();
    let conclusion = stmt("can", vec![c("tweety"), c("fly")]);

    let proof = kb.explain_fact(&conclusion).unwrap();
    assert_eq!(
        proof,
        "fact: (can tweety fly)\n\
         \x20 SUPPORTED BY\n\
         \x20   fact: (isa tweety bird) ASSERTED\n\
         \x20   rule: ((isa ?x bird)) -> (can ?x fly) ASSERTED\n"
    );
}

#[test]
fn explanation_of_asserted_fact_is_one_line() {
    let kb = bird_kb();
    let proof = kb
        .explain_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    assert_eq!(proof.lines().count(), 1);
    assert!(proof.trim_end().ends_with("ASSERTED"));
    assert!(!proof.contains("SUPPORTED BY"));
}

#[test]
fn explanation_depth_follows_support_chain() {
    let mut kb = KnowledgeBase::default();
    kb.assert_rule(
        vec![stmt("p", vec![v("x")])],
        stmt("q", vec![v("x")]),
    )
    .unwrap();
    kb.assert_rule(
        vec![stmt("q", vec![v("x")])],
        stmt("r", vec![v("x")]),
    )
    .unwrap();
    kb.assert_fact(stmt("p", vec![c("a")])).unwrap();

    let proof = kb.explain_fact(&stmt("r", vec![c("a")])).unwrap();
    // Two nested SUPPORTED BY blocks for the two-step chain.
    assert_eq!(proof.matches("SUPPORTED BY").count(), 2);
    assert!(proof.contains("\n      SUPPORTED BY\n"));
}

#[test]
fn explain_missing_item_errors() {
    let kb = KnowledgeBase::default();
    let err = kb
        .explain_fact(&stmt("isa", vec![c("ghost"), c("bird")]))
        .unwrap_err();
    assert!(matches!(err, rekh::error::KbError::ItemNotFound { .. }));
}

#[test]
fn export_snapshot_round_trips_through_json() {
    let kb = bird_kb();
    let export = kb.export();
    assert_eq!(export.facts.len(), 2);
    assert_eq!(export.rules.len(), 1);

    let json = serde_json::to_value(&export).unwrap();
    let facts = json["facts"].as_array().unwrap();
    assert!(facts.iter().any(|f| {
        f["statement"] == "(can tweety fly)" && f["asserted"] == false
    }));
    assert_eq!(json["rules"][0]["rhs"], "(can ?x fly)");
}

#[test]
fn kb_dump_lists_everything() {
    let kb = bird_kb();
    let dump = kb.to_string();
    assert!(dump.starts_with("Knowledge Base:\n"));
    assert!(dump.contains("(isa tweety bird)"));
    assert!(dump.contains("(can tweety fly)"));
    assert!(dump.contains("((isa ?x bird)) -> (can ?x fly)"));
}

#[test]
fn trace_config_does_not_change_semantics() {
    let mut kb = KnowledgeBase::new(KbConfig {
        trace_inference: true,
    });
    kb.assert_rule(
        vec![stmt("isa", vec![v("x"), c("bird")])],
        stmt("can", vec![v("x"), c("fly")]),
    )
    .unwrap();
    kb.assert_fact(stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    assert!(kb.contains_fact(&stmt("can", vec![c("tweety"), c("fly")])));
    assert!(kb.config().trace_inference);
}

#[test]
fn dependents_track_derivations() {
    let kb = bird_kb();
    let premise = kb
        .get_fact(&stmt("isa", vec![c("tweety"), c("bird")]))
        .unwrap();
    let rule = kb
        .get_rule(
            &[stmt("isa", vec![v("x"), c("bird")])],
            &stmt("can", vec![v("x"), c("fly")]),
        )
        .unwrap();
    let derived = kb
        .get_fact(&stmt("can", vec![c("tweety"), c("fly")]))
        .unwrap();

    // Both halves of the justification point at the same derived fact.
    assert_eq!(kb.dependents_of(premise), vec![derived]);
    assert_eq!(kb.dependents_of(rule), vec![derived]);
    assert!(kb.dependents_of(derived).is_empty());
}
