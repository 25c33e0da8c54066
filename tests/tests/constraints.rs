//! Constraint engine scenarios.

use trellis_constraint::{CheckerOptions, FeatureConstraint, Target};
use trellis_core::Record;
use trellis_tests::prelude::*;
use trellis_workspace::WorkspaceOptions;

fn base() -> Scenario {
    Scenario::new("constraints")
        .metamodel(PACKAGE_METAMODEL)
        .seed(
            r#"[{"_class": "Package", "name": "p",
                 "classes": [{"_class": "Class", "name": "A"}],
                 "datatypes": [{"_class": "Datatype", "name": "D"}]}]"#,
        )
}

mod multiplicity {
    use super::*;

    #[test]
    fn test_required_feature_missing() {
        base()
            .step(
                "create",
                create_in("/p", "classes", Record::new("Class").with_child("attributes", {
                    Record::new("Attribute")
                        .with_text("name", "x")
                        .with_text("tags", "a")
                        .with_text("tags", "b")
                })),
                |a| {
                    a.feature_problems("/p/x", "type", &["'type' must be specified"])
                        .problems(2)
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_lower_and_upper_limits() {
        base()
            .step("create", create_in("/p/A", "attributes", attribute("x", "/p/D")), |a| a.clean())
            .step("no_tags", clear_values("/p/A/x", "tags"), |a| {
                a.feature_problems("/p/A/x", "tags", &["below lower limit of '2'"])
            })
            .step("fill", add_value("/p/A/x", "tags", "a"), |a| a.problems(1))
            .step("fill_more", add_value("/p/A/x", "tags", "b"), |a| a.clean())
            .step("three", add_value("/p/A/x", "tags", "c"), |a| a.clean())
            .step("four", add_value("/p/A/x", "tags", "d"), |a| {
                a.feature_problems("/p/A/x", "tags", &["above upper limit of '3'"])
                    .problems(1)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_single_valued_features() {
        base()
            .step("second_final", add_value("/p/A", "final", "true"), |a| a.clean())
            .step("third_final", add_value("/p/A", "final", "false"), |a| {
                a.feature_problems(
                    "/p/A",
                    "final",
                    &["only one value may be specified as 'final'", "above upper limit of '1'"],
                )
            })
            .step("main", create_in("/p", "main", class("M1")), |a| a.problems(2))
            .step("second_main", create_in("/p", "main", class("M2")), |a| {
                a.feature_problems(
                    "/p",
                    "main",
                    &["only one element may be specified as 'main'", "above upper limit of '1'"],
                )
                .problems(4)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_placeholder_counts_as_missing() {
        base()
            .step("blank", set_value("/p/A", "name", ""), |a| a.problems(1))
            .run()
            .unwrap();
    }
}

mod values {
    use super::*;

    #[test]
    fn test_typed_attributes() {
        base()
            .step("create", create_in("/p/A", "attributes", attribute("x", "/p/D")), |a| a.clean())
            .step("integer", set_value("/p/A/x", "size", "12"), |a| a.clean())
            .step("bad_integer", set_value("/p/A/x", "size", "012"), |a| {
                a.feature_problems("/p/A/x", "size", &["value not allowed"])
            })
            .step("float", set_value("/p/A/x", "weight", "-1.5"), |a| {
                a.feature_problems("/p/A/x", "weight", &[]).problems(1)
            })
            .step("negative_zero_fraction", set_value("/p/A/x", "weight", "-0.5"), |a| {
                a.feature_problems("/p/A/x", "weight", &["value not allowed"]).problems(2)
            })
            .step("bad_float", set_value("/p/A/x", "weight", "1e3"), |a| a.problems(2))
            .step("enum", set_value("/p/A/x", "visibility", "private"), |a| a.problems(2))
            .step("bad_enum", set_value("/p/A/x", "visibility", "protected"), |a| {
                a.feature_problems("/p/A/x", "visibility", &["value not allowed"])
                    .problems(3)
            })
            .step("bad_boolean", set_value("/p/A", "final", "yes"), |a| {
                a.feature_problems("/p/A", "final", &["value not allowed"]).problems(4)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_repeated_problem_reported_once() {
        base()
            .step("create", create_in("/p/A", "attributes", attribute("x", "/p/D")), |a| a.clean())
            .step("first", add_value("/p/A/x", "tags", "c"), |a| a.clean())
            .step(
                "bad_sizes",
                action(|ws| {
                    for text in ["x", "y"] {
                        add_value("/p/A/x", "size", text)(ws)?;
                    }
                    Ok(())
                }),
                |a| {
                    a.feature_problems(
                        "/p/A/x",
                        "size",
                        &["only one value may be specified as 'size'", "above upper limit of '1'", "value not allowed"],
                    )
                },
            )
            .run()
            .unwrap();
    }
}

mod references {
    use super::*;

    #[test]
    fn test_reference_resolution() {
        base()
            .step("create", create_in("/p", "classes", class("B")), |a| a.clean())
            .step("resolved", set_value("/p/B", "superClass", "/p/A"), |a| a.clean())
            .step("unresolved", set_value("/p/B", "superClass", "/p/Z"), |a| {
                a.feature_problems("/p/B", "superClass", &["can not resolve reference"])
            })
            .step("wrong_class", set_value("/p/B", "superClass", "/p/D"), |a| {
                a.feature_problems("/p/B", "superClass", &["reference to class 'Datatype' not allowed"])
            })
            .step("subtype_target", create_in("/p/B", "attributes", attribute("x", "/p/D")), |a| {
                a.feature_problems("/p/B/x", "type", &[]).problems(1)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_reference_to_collision_is_ambiguous() {
        base()
            .step("create", create_in("/p", "classes", class("B").with_text("superClass", "/p/A")), |a| {
                a.clean()
            })
            .step("collide", create_in("/p", "classes", class("A")), |a| {
                a.feature_problems("/p/B", "superClass", &["multiple targets for reference"])
                    .element_problems("/p/A", &["duplicate identifier '/p/A'"])
                    .problems(3)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_rename_breaks_then_restores_reference() {
        base()
            .step("create", create_in("/p", "classes", class("B").with_text("superClass", "/p/A")), |a| {
                a.clean()
            })
            .step("rename", set_value("/p/A", "name", "Z"), |a| {
                a.feature_problems("/p/B", "superClass", &["can not resolve reference"])
            })
            .step("restore", set_value("/p/Z", "name", "A"), |a| a.clean())
            .run()
            .unwrap();
    }
}

mod placement {
    use super::*;

    #[test]
    fn test_root_classes_restriction() {
        let options = WorkspaceOptions::new().with_checker(CheckerOptions::new().with_root_classes(["Package"]));
        Scenario::new("root_classes")
            .metamodel(PACKAGE_METAMODEL)
            .options(options)
            .step("package", create_root(package("p")), |a| a.clean())
            .step("class", create_root(class("C")), |a| {
                a.element_problems("/C", &["element of class 'Class' not allowed"])
                    .problems(1)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_wrong_containment_and_abstract_class() {
        base()
            .step("misplaced", create_in("/p", "classes", datatype("E")), |a| {
                a.element_problems("/p/E", &["element of class 'Datatype' not allowed"])
            })
            .step("abstract", create_root(Record::new("Classifier").with_text("name", "K")), |a| {
                a.element_problems("/K", &["class 'Classifier' is abstract"]).problems(2)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_allow_duplicates_exempts_class() {
        let options =
            WorkspaceOptions::new().with_checker(CheckerOptions::new().with_allow_duplicates(["Note"]));
        Scenario::new("allow_duplicates")
            .metamodel(PACKAGE_METAMODEL)
            .options(options)
            .step("notes", create_root(vec![note("n"), note("n")]), |a| a.bound("/n", 2).clean())
            .step("classes", create_root(vec![class("C"), class("C")]), |a| a.problems(2))
            .run()
            .unwrap();
    }
}

mod custom {
    use super::*;

    fn capitalized() -> FeatureConstraint {
        FeatureConstraint::new(
            "Class",
            "name",
            |_, _, target| match target {
                Target::Text(text) => text.chars().next().is_some_and(char::is_uppercase),
                Target::Element(_) => true,
            },
            "name must be capitalized",
        )
    }

    fn no_self_inheritance() -> FeatureConstraint {
        FeatureConstraint::new(
            "Class",
            "superClass",
            |_, element, target| target != Target::Element(element),
            "",
        )
        .with_message_fn(|store, element, _| {
            format!(
                "'{}' can not extend itself",
                store.attribute_text(element, "name").unwrap_or_default()
            )
        })
    }

    #[test]
    fn test_attribute_constraint() {
        base()
            .constraint(capitalized())
            .step("lower", create_in("/p", "classes", class("b")), |a| {
                a.feature_problems("/p/b", "name", &["name must be capitalized"])
                    .problems(1)
            })
            .step("fix", set_value("/p/b", "name", "B"), |a| a.clean())
            .run()
            .unwrap();
    }

    #[test]
    fn test_reference_constraint_with_computed_message() {
        base()
            .constraint(no_self_inheritance())
            .step("self", set_value("/p/A", "superClass", "/p/A"), |a| {
                a.feature_problems("/p/A", "superClass", &["'A' can not extend itself"])
            })
            .step("other", create_in("/p", "classes", class("B")), |a| a.problems(1))
            .step("fix", set_value("/p/A", "superClass", "/p/B"), |a| a.clean())
            .run()
            .unwrap();
    }

    #[test]
    fn test_unknown_constraint_target_fails_setup() {
        let result = base()
            .constraint(FeatureConstraint::new("Class", "color", |_, _, _| true, "x"))
            .run();
        assert!(matches!(result, Err(ScenarioError::Setup { .. })));
    }
}

mod manual {
    use super::*;

    #[test]
    fn test_manual_checking_waits_for_request() {
        let mut options = WorkspaceOptions::new();
        options.checker.automatic_checking = false;
        Scenario::new("manual")
            .metamodel(PACKAGE_METAMODEL)
            .options(options)
            .step("create", create_root(class("C").with_text("final", "yes")), |a| a.problems(0))
            .step("check", check_all(), |a| a.problems(1))
            .step("fix_unchecked", set_value("/C", "final", "true"), |a| a.problems(1))
            .step("recheck", check_all(), |a| a.clean())
            .step("replace", import_json(r#"[{"_class": "Class"}]"#), |a| a.clean())
            .step("check_again", check_all(), |a| a.problems(1))
            .run()
            .unwrap();
    }
}
