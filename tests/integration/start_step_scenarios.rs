#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::sync::Arc;

use penumbra::query::physical::IndexQuery;
use penumbra::storage::memory::Fault;
use penumbra::{
    AccessPath, Constraint, Element, ElementId, ElementKind, Graph, GraphStep, MemGraph,
    PenumbraError, Predicate, Result,
};

fn social() -> Result<MemGraph> {
    MemGraph::new()
        .with_element(
            Element::vertex(1, "Person")
                .with_property("name", "Alice")
                .with_property("age", 30i64),
        )
        .with_element(
            Element::vertex(2, "Person")
                .with_property("name", "Bob")
                .with_property("age", 41i64),
        )
        .with_element(
            Element::vertex(3, "Person")
                .with_property("name", "Alice")
                .with_property("age", 52i64),
        )
        .with_element(Element::vertex(4, "City").with_property("name", "Alice"))
        .with_element(Element::edge(10, "knows", 1, 2).with_property("weight", 1i64))
        .with_element(Element::edge(11, "knows", 2, 3).with_property("weight", 3i64))
        .with_element(Element::edge(12, "knows", 3, 1).with_property("weight", 7i64))
        .with_element(Element::edge(13, "lives_in", 1, 4).with_property("weight", 2i64))
        .with_index("Person.name", ElementKind::Vertex, "Person", ["name"])
}

fn attach(graph: MemGraph) -> Arc<dyn Graph> {
    Arc::new(graph)
}

fn ids(elements: &[Element]) -> Vec<u64> {
    elements.iter().map(|e| e.id.0).collect()
}

#[test]
fn explicit_ids_resolve_existing_elements_only() -> Result<()> {
    let step = GraphStep::vertices([1u64, 2, 99]).attach(attach(social()?));
    assert_eq!(
        step.plan()?,
        AccessPath::ById {
            ids: vec![ElementId(1), ElementId(2), ElementId(99)]
        }
    );
    assert_eq!(ids(&step.resolve()?), vec![1, 2]);
    Ok(())
}

#[test]
fn label_and_equality_select_the_name_index() -> Result<()> {
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(social()?))
        .has(Constraint::label("Person"))
        .has(Constraint::eq("name", "Alice"));
    let AccessPath::ByIndex(IndexQuery { index, key, values }) = step.plan()? else {
        panic!("expected an index probe");
    };
    assert_eq!(index.name, "Person.name");
    assert_eq!(key, "name");
    assert_eq!(values, vec!["Alice".into()]);
    // The City named Alice lives in another class and never shows up.
    assert_eq!(ids(&step.resolve()?), vec![1, 3]);
    Ok(())
}

#[test]
fn membership_without_index_scans_edges() -> Result<()> {
    let step = GraphStep::edges(Vec::<u64>::new())
        .attach(attach(social()?))
        .has(Constraint::within("weight", [1i64, 2, 3]));
    assert_eq!(step.plan()?, AccessPath::FullScan);
    assert_eq!(ids(&step.resolve()?), vec![10, 11, 13]);
    Ok(())
}

#[test]
fn range_predicates_never_drive_an_index() -> Result<()> {
    let graph =
        social()?.with_index("knows.weight", ElementKind::Edge, "knows", ["weight"])?;
    let step = GraphStep::edges(Vec::<u64>::new())
        .attach(attach(graph))
        .has(Constraint::label("knows"))
        .has(Constraint::new("weight", Predicate::Gt, 5i64));
    assert_eq!(step.plan()?, AccessPath::FullScan);
    assert_eq!(ids(&step.resolve()?), vec![12]);
    Ok(())
}

#[test]
fn resolving_twice_yields_the_same_set() -> Result<()> {
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(social()?))
        .has(Constraint::label("Person"))
        .has(Constraint::within("name", ["Alice", "Bob"]));
    let first: BTreeSet<u64> = ids(&step.resolve()?).into_iter().collect();
    let second: BTreeSet<u64> = ids(&step.resolve()?).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first, BTreeSet::from([1, 2, 3]));
    Ok(())
}

#[test]
fn every_path_rechecks_all_constraints() -> Result<()> {
    let graph = attach(social()?);
    let constraints = [
        Constraint::label("Person"),
        Constraint::eq("name", "Alice"),
        Constraint::new("age", Predicate::Ge, 40i64),
    ];
    let mut by_id = GraphStep::vertices([1u64, 2, 3, 4]).attach(graph.clone());
    let mut by_index = GraphStep::vertices(Vec::<u64>::new()).attach(graph);
    for constraint in &constraints {
        by_id.add_constraint(constraint.clone());
        by_index.add_constraint(constraint.clone());
    }
    assert!(matches!(by_id.plan()?, AccessPath::ById { .. }));
    assert!(by_index.plan()?.is_index());
    assert_eq!(ids(&by_id.resolve()?), vec![3]);
    assert_eq!(ids(&by_index.resolve()?), vec![3]);
    Ok(())
}

#[test]
fn metadata_failure_is_not_mistaken_for_a_miss() -> Result<()> {
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(social()?.with_fault(Fault::Metadata)))
        .has(Constraint::label("Person"))
        .has(Constraint::eq("name", "Bob"));
    assert!(matches!(step.plan(), Err(PenumbraError::Storage(_))));
    assert!(matches!(step.resolve(), Err(PenumbraError::Storage(_))));
    Ok(())
}

#[test]
fn provider_failure_aborts_resolution() -> Result<()> {
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(social()?.with_fault(Fault::MidStream { after: 1 })))
        .has(Constraint::eq("name", "Alice"));
    assert!(matches!(step.resolve(), Err(PenumbraError::Storage(_))));
    Ok(())
}

#[test]
fn negated_label_scans_instead_of_probing_the_excluded_class() -> Result<()> {
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(social()?))
        .has(Constraint::new("~label", Predicate::Neq, "Person"))
        .has(Constraint::eq("name", "Alice"));
    assert_eq!(step.find_index()?, None);
    assert_eq!(step.plan()?, AccessPath::FullScan);
    assert_eq!(ids(&step.resolve()?), vec![4]);
    Ok(())
}

#[test]
fn composite_index_serves_its_second_field() -> Result<()> {
    let graph = MemGraph::new()
        .with_element(
            Element::vertex(1, "Person")
                .with_property("age", 30i64)
                .with_property("name", "Alice"),
        )
        .with_element(
            Element::vertex(2, "Person")
                .with_property("age", 41i64)
                .with_property("name", "Bob"),
        )
        .with_index("Person.age_name", ElementKind::Vertex, "Person", ["age", "name"])?;
    let step = GraphStep::vertices(Vec::<u64>::new())
        .attach(attach(graph))
        .has(Constraint::label("Person"))
        .has(Constraint::eq("name", "Alice"));
    let AccessPath::ByIndex(query) = step.plan()? else {
        panic!("expected the composite index");
    };
    assert_eq!(query.index.name, "Person.age_name");
    assert_eq!(query.key, "name");
    assert_eq!(ids(&step.resolve()?), vec![1]);
    Ok(())
}
