//! Local models checked against an external index of other modules.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use trellis_constraint::CheckerOptions;
use trellis_ident::{ExternalIdentifierProvider, IndexedExternalProvider};
use trellis_metamodel::Metamodel;
use trellis_tests::prelude::*;
use trellis_workspace::WorkspaceOptions;

const INDEX: &str = r#"[
    {"name": "base", "elements": [
        {"_class": "Package", "name": "lang", "elements": [
            {"_class": "Datatype", "name": "String"},
            {"_class": "Class", "name": "Object"}
        ]}
    ]},
    {"name": "app", "elements": {"_class": "Package", "name": "app", "elements": [
        {"_class": "Class", "name": "Main"}
    ]}},
    {"name": "legacy", "elements": {"_class": "Gadget", "name": "old"}}
]"#;

fn scenario(own_module: Option<&str>) -> Scenario {
    let mut checker = CheckerOptions::new();
    if let Some(module) = own_module {
        checker = checker.with_external_module(module);
    }
    Scenario::new("external")
        .metamodel(PACKAGE_METAMODEL)
        .options(WorkspaceOptions::new().with_checker(checker))
        .external_index(INDEX)
}

#[test]
fn test_references_resolve_to_external_elements() {
    scenario(None)
        .step("create", create_root(package("mine")), |a| a.clean())
        .step(
            "class",
            create_in("/mine", "classes", class("Widget").with_text("superClass", "/lang/Object")),
            |a| a.clean(),
        )
        .step(
            "attribute",
            create_in("/mine/Widget", "attributes", attribute("label", "/lang/String")),
            |a| a.clean(),
        )
        .step("wrong_class", set_value("/mine/Widget", "superClass", "/lang/String"), |a| {
            a.feature_problems(
                "/mine/Widget",
                "superClass",
                &["reference to class 'Datatype' not allowed"],
            )
        })
        .step("trailing_separator", set_value("/mine/Widget", "superClass", "/lang/"), |a| {
            a.feature_problems("/mine/Widget", "superClass", &["can not resolve reference"])
        })
        .run()
        .unwrap();
}

#[test]
fn test_duplicate_with_external_names_module() {
    scenario(None)
        .step("create", create_root(package("lang")), |a| {
            a.element_problems("/lang", &["duplicate identifier '/lang', also defined in base"])
                .problems(1)
        })
        .step("own_module", create_root(package("app")), |a| {
            a.element_problems("/app", &["duplicate identifier '/app', also defined in app"])
                .problems(2)
        })
        .run()
        .unwrap();
}

#[test]
fn test_own_module_is_ignored() {
    scenario(Some("app"))
        .step("create", create_root(package("app")), |a| a.clean())
        .step(
            "main",
            create_in("/app", "classes", class("Main").with_text("superClass", "/app/Main")),
            // the local Main is the only target once the own module is skipped
            |a| a.clean(),
        )
        .step("other", create_root(package("lang")), |a| a.problems(1))
        .run()
        .unwrap();
}

#[test]
fn test_local_and_external_target_is_ambiguous() {
    scenario(None)
        .step(
            "create",
            create_root(vec![package("lang"), class("User").with_text("superClass", "/lang")]),
            |a| {
                a.feature_problems("/User", "superClass", &["multiple targets for reference"])
                    .problems(2)
            },
        )
        .run()
        .unwrap();
}

#[test]
fn test_unknown_external_class_is_skipped() {
    scenario(None)
        .step("create", create_root(class("User").with_text("superClass", "/old")), |a| {
            a.feature_problems("/User", "superClass", &["can not resolve reference"])
        })
        .run()
        .unwrap();
}

#[test]
fn test_provider_listings() {
    let metamodel = Arc::new(Metamodel::from_json(PACKAGE_METAMODEL).unwrap());
    let provider = IndexedExternalProvider::from_json(metamodel, INDEX).unwrap();

    assert_eq!(provider.identifiers("Class"), vec!["/lang/Object", "/app/Main"]);
    assert_eq!(
        provider.identifiers("Classifier"),
        vec!["/lang/String", "/lang/Object", "/app/Main"]
    );

    let all = provider.all_element_info();
    assert_eq!(all.len(), 6);
    assert_eq!(all[5].class_name, "Gadget");
    assert_eq!(all[5].module, "legacy");
}
