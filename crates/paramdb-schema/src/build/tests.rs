use crate::{build::Composer, def::ParamDef, error::DefinitionError};
use std::sync::Arc;

// ---- helpers -----------------------------------------------------------

fn def(name: &str, owner: &str) -> ParamDef {
    ParamDef::define(name, owner)
        .default(0.0)
        .build()
        .expect("valid definition")
}

// Reactor hierarchy with fields on composite, block, and component.
fn hierarchy() -> Composer {
    let composer = Composer::new();
    composer.declare_kind("composite", None).expect("declare");
    composer
        .declare_kind("reactor", Some("composite"))
        .expect("declare");
    composer.declare_kind("core", Some("reactor")).expect("declare");
    composer.declare_kind("assembly", Some("core")).expect("declare");
    composer.declare_kind("block", Some("assembly")).expect("declare");
    composer
        .declare_kind("component", Some("block"))
        .expect("declare");

    composer
        .contribute_all([def("serial_flags", "composite"), def("volume", "composite")])
        .expect("contribute");
    composer
        .contribute_all([def("power", "block"), def("flux", "block")])
        .expect("contribute");
    composer.contribute(def("mass", "component")).expect("contribute");

    composer
}

// ---- composition -------------------------------------------------------

#[test]
fn composed_schema_unions_ancestor_fields() {
    let composer = hierarchy();

    let block = composer.schema_for("block").expect("compose");
    assert_eq!(block.names(), vec!["serial_flags", "volume", "power", "flux"]);
    assert!(block.is_locked());

    let component = composer.schema_for("component").expect("compose");
    assert_eq!(component.len(), 5);
    assert!(component.contains_key("component", "mass"));
}

#[test]
fn kinds_without_own_fields_share_the_ancestor_schema() {
    let composer = hierarchy();

    let composite = composer.schema_for("composite").expect("compose");
    let reactor = composer.schema_for("reactor").expect("compose");
    let core = composer.schema_for("core").expect("compose");
    let assembly = composer.schema_for("assembly").expect("compose");
    let block = composer.schema_for("block").expect("compose");

    // reactor, core, and assembly introduce nothing; all three alias the
    // composite schema object.
    assert!(Arc::ptr_eq(&reactor, &composite));
    assert!(Arc::ptr_eq(&core, &composite));
    assert!(Arc::ptr_eq(&assembly, &composite));
    assert!(!Arc::ptr_eq(&block, &composite));
}

#[test]
fn schema_for_is_idempotent() {
    let composer = hierarchy();

    let first = composer.schema_for("block").expect("compose");
    let second = composer.schema_for("block").expect("compose");

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn duplicate_fragment_contribution_names_the_parameter() {
    let composer = hierarchy();

    // A second plugin fragment declares "mass" for the same kind.
    let err = composer.contribute(def("mass", "component")).unwrap_err();

    assert!(matches!(err, DefinitionError::DuplicateParam { .. }));
    assert!(err.to_string().contains("mass"));
}

#[test]
fn collision_with_inherited_field_names_kind_and_parameter() {
    let composer = hierarchy();
    composer.contribute(def("volume", "block")).expect("contribute");

    let err = composer.schema_for("block").unwrap_err();

    assert!(matches!(
        err,
        DefinitionError::AncestorCollision { ref kind, ref name }
            if kind == "block" && name == "volume"
    ));
}

#[test]
fn contribution_window_closes_at_first_composition() {
    let composer = hierarchy();
    composer.schema_for("block").expect("compose");

    let err = composer.contribute(def("late", "block")).unwrap_err();
    assert!(matches!(err, DefinitionError::ComposedKind { .. }));

    // Ancestors were composed transitively; their windows are closed too.
    let err = composer.contribute(def("late", "composite")).unwrap_err();
    assert!(matches!(err, DefinitionError::ComposedKind { .. }));
}

#[test]
fn unknown_kind_and_unknown_ancestor_fail() {
    let composer = Composer::new();
    composer.declare_kind("block", Some("assembly")).expect("declare");

    assert!(matches!(
        composer.contribute(def("power", "pin")).unwrap_err(),
        DefinitionError::UnknownKind { .. }
    ));

    // "assembly" was never declared.
    assert!(matches!(
        composer.schema_for("block").unwrap_err(),
        DefinitionError::UnknownKind { .. }
    ));
}

#[test]
fn cyclic_ancestry_is_a_build_error() {
    let composer = Composer::new();
    composer.declare_kind("a", Some("b")).expect("declare");
    composer.declare_kind("b", Some("a")).expect("declare");

    assert!(matches!(
        composer.schema_for("a").unwrap_err(),
        DefinitionError::CyclicAncestry { .. }
    ));
}

#[test]
fn duplicate_kind_declaration_fails() {
    let composer = Composer::new();
    composer.declare_kind("block", None).expect("declare");

    assert!(matches!(
        composer.declare_kind("block", None).unwrap_err(),
        DefinitionError::DuplicateKind { .. }
    ));
}

// ---- multiple-ancestor exception ---------------------------------------

#[test]
fn multi_ancestor_exception_unions_disjoint_schemas() {
    let composer = Composer::new();
    composer.declare_kind("material", None).expect("declare");
    composer.declare_kind("geometry", None).expect("declare");
    composer
        .declare_kind_multi("clad_material", &["material", "geometry"])
        .expect("declare");

    composer.contribute(def("density", "material")).expect("contribute");
    composer.contribute(def("thickness", "geometry")).expect("contribute");

    let schema = composer.schema_for("clad_material").expect("compose");
    assert_eq!(schema.names(), vec!["density", "thickness"]);
}

#[test]
fn multi_ancestor_exception_is_single_use() {
    let composer = Composer::new();
    for kind in ["material", "geometry", "mesh"] {
        composer.declare_kind(kind, None).expect("declare");
    }
    composer
        .declare_kind_multi("clad_material", &["material", "geometry"])
        .expect("first use");

    let err = composer
        .declare_kind_multi("duct_material", &["material", "mesh"])
        .unwrap_err();

    assert!(matches!(
        err,
        DefinitionError::MultiAncestorExhausted { ref taken_by, .. }
            if taken_by == "clad_material"
    ));
}

#[test]
fn multi_ancestor_union_still_rejects_duplicate_names() {
    let composer = Composer::new();
    composer.declare_kind("material", None).expect("declare");
    composer.declare_kind("geometry", None).expect("declare");
    composer
        .declare_kind_multi("clad_material", &["material", "geometry"])
        .expect("declare");

    composer.contribute(def("density", "material")).expect("contribute");
    composer.contribute(def("density", "geometry")).expect("contribute");

    let err = composer.schema_for("clad_material").unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::AncestorCollision { ref name, .. } if name == "density"
    ));
}

// ---- validation gate ---------------------------------------------------

#[test]
fn validate_reports_every_offending_kind() {
    let composer = Composer::new();
    composer.declare_kind("composite", None).expect("declare");
    composer.declare_kind("block", Some("composite")).expect("declare");
    composer.declare_kind("orphan", Some("missing")).expect("declare");

    composer.contribute(def("volume", "composite")).expect("contribute");
    composer.contribute(def("volume", "block")).expect("contribute");

    let errs = composer.validate().unwrap_err();
    let text = errs.to_string();

    assert!(text.contains("block"));
    assert!(text.contains("volume"));
    assert!(text.contains("orphan"));
    assert!(text.contains("missing"));
}

#[test]
fn validate_passes_on_a_clean_hierarchy() {
    let composer = hierarchy();
    assert!(composer.validate().is_ok());
    assert!(composer.is_composed("component"));
}
